//! Submission of gauges and events to the metrics backend
//!
//! Emission is fire-and-forget: the check never waits on or inspects the
//! outcome of a submission.

mod logging;
mod recorder;

pub use logging::TracingEmitter;
pub use recorder::RecordingEmitter;

use serde::{Deserialize, Serialize};

/// Event type attached to every event raised by the check
pub const EVENT_TYPE: &str = "yarn_check";

/// Alert level of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Error,
    Warn,
    Info,
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlertLevel::Error => write!(f, "error"),
            AlertLevel::Warn => write!(f, "warn"),
            AlertLevel::Info => write!(f, "info"),
        }
    }
}

/// One numeric observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gauge {
    pub name: String,
    pub value: f64,
    pub tags: Vec<String>,
    pub host: String,
}

impl Gauge {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// Structured event, e.g. a failed ResourceManager query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Seconds since the epoch
    pub timestamp: i64,
    pub event_type: String,
    pub alert_type: AlertLevel,
    pub title: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation_key: Option<String>,
    pub host: String,
    pub tags: Vec<String>,
}

/// Receiver of gauges and events
pub trait Emitter: Send + Sync {
    fn gauge(&self, name: &str, value: f64, tags: &[String], host: &str);

    fn event(&self, event: Event);
}

impl<E: Emitter + ?Sized> Emitter for std::sync::Arc<E> {
    fn gauge(&self, name: &str, value: f64, tags: &[String], host: &str) {
        (**self).gauge(name, value, tags, host)
    }

    fn event(&self, event: Event) {
        (**self).event(event)
    }
}
