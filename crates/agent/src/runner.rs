//! Periodic check loop
//!
//! Every tick runs one invocation per configured instance. Each invocation is
//! bounded by a timeout; one that overruns is dropped and the next tick
//! starts from scratch. Late ticks push the schedule back instead of bursting,
//! so two ticks are never closer than the interval.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, Local};
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio::time::{interval, timeout, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use yarn_lib::YarnCheck;

/// Runs every configured check on a fixed interval
pub struct CheckRunner {
    checks: Vec<Arc<YarnCheck>>,
    interval: Duration,
    run_timeout: Duration,
}

/// Outcome of one tick across all instances
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunResults {
    pub succeeded: usize,
    pub aborted: usize,
    pub timed_out: usize,
    pub crashed: usize,
}

impl CheckRunner {
    pub fn new(checks: Vec<Arc<YarnCheck>>, interval: Duration, run_timeout: Duration) -> Self {
        Self {
            checks,
            interval,
            run_timeout,
        }
    }

    /// Run until a shutdown signal is received
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            interval_secs = self.interval.as_secs(),
            instances = self.checks.len(),
            "Starting check loop"
        );

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let start = Instant::now();
                    let results = self.run_once().await;
                    debug!(
                        succeeded = results.succeeded,
                        aborted = results.aborted,
                        timed_out = results.timed_out,
                        crashed = results.crashed,
                        elapsed_ms = start.elapsed().as_millis(),
                        "Check cycle complete"
                    );
                }
                _ = shutdown.recv() => {
                    info!("Shutting down check loop");
                    break;
                }
            }
        }
    }

    /// Run every instance once, concurrently, at the current local time
    pub async fn run_once(&self) -> RunResults {
        let now = Local::now();
        self.run_once_at(now.with_timezone(now.offset())).await
    }

    /// Run every instance once as if the clock read `now`
    pub async fn run_once_at(&self, now: DateTime<FixedOffset>) -> RunResults {
        let mut tasks = JoinSet::new();
        for check in &self.checks {
            let check = Arc::clone(check);
            let run_timeout = self.run_timeout;
            tasks.spawn(async move {
                let host = check.host().to_string();
                (host, timeout(run_timeout, check.collect_at(now)).await)
            });
        }

        let mut results = RunResults::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(summary))) if summary.aborted => results.aborted += 1,
                Ok((_, Ok(_))) => results.succeeded += 1,
                Ok((host, Err(_))) => {
                    results.timed_out += 1;
                    warn!(
                        host = %host,
                        timeout_secs = self.run_timeout.as_secs_f64(),
                        "Check invocation timed out"
                    );
                }
                Err(e) => {
                    results.crashed += 1;
                    warn!(error = %e, "Check task failed");
                }
            }
        }
        results
    }
}
