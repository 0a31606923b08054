//! Hourly throttle and trailing window for the completed-applications pass
//!
//! The running-apps query is cheap and runs on every invocation. Completed
//! applications are only accounted once an hour, over the hour that just
//! ended, to keep load off the ResourceManager.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

/// Length of the trailing window in milliseconds
pub const WINDOW_MS: i64 = 60 * 60 * 1000;

/// Time bounds used to filter completed applications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionWindow {
    pub now_ms: i64,
    pub window_start_ms: i64,
}

impl CollectionWindow {
    /// Window of one hour ending at `now_ms`
    pub fn ending_at(now_ms: i64) -> Self {
        Self {
            now_ms,
            window_start_ms: window_start(now_ms),
        }
    }

    /// Window of one hour ending at `now`
    pub fn ending_at_time<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        Self::ending_at(now.timestamp_millis())
    }
}

/// Lower bound of the trailing window
pub fn window_start(now_ms: i64) -> i64 {
    now_ms.saturating_sub(WINDOW_MS)
}

/// Whether the completed-applications pass runs at `now`
///
/// True only on the first minute of the hour, so an invocation every minute
/// runs the pass once per hour.
pub fn should_run_completed_pass<T: Timelike>(now: &T) -> bool {
    now.minute() == 0
}

/// Claims the completed pass for at most one invocation per hour
///
/// Invocations closer together than a minute, or a late tick followed by an
/// on-time one, can both land on minute 0. Only the first of them claims the
/// hour.
#[derive(Debug)]
pub struct HourlyGate {
    last_claimed: AtomicI64,
}

impl Default for HourlyGate {
    fn default() -> Self {
        Self {
            last_claimed: AtomicI64::new(i64::MIN),
        }
    }
}

impl HourlyGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the pass runs at `now`; true at most once per clock hour
    pub fn try_claim<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        if !should_run_completed_pass(now) {
            return false;
        }
        let hour = hour_start(now);
        self.last_claimed.fetch_max(hour, Ordering::AcqRel) < hour
    }
}

/// Unix seconds at the top of the local hour containing `now`
fn hour_start<Tz: TimeZone>(now: &DateTime<Tz>) -> i64 {
    now.timestamp() - i64::from(now.minute() * 60 + now.second())
}
