//! Emitter writing every submission as a structured log record

use tracing::{error, info, warn};

use super::{AlertLevel, Emitter, Event};

/// Emitter that turns gauges and events into `tracing` records
///
/// With a JSON subscriber installed this yields one line per observation,
/// which a log shipper can forward to the metrics backend.
#[derive(Debug, Clone, Default)]
pub struct TracingEmitter {
    check_name: String,
}

impl TracingEmitter {
    pub fn new(check_name: impl Into<String>) -> Self {
        Self {
            check_name: check_name.into(),
        }
    }
}

impl Emitter for TracingEmitter {
    fn gauge(&self, name: &str, value: f64, tags: &[String], host: &str) {
        info!(
            event = "gauge",
            check = %self.check_name,
            metric = %name,
            value = value,
            tags = %tags.join(","),
            host = %host,
            "Gauge submitted"
        );
    }

    fn event(&self, event: Event) {
        let tags = event.tags.join(",");
        let aggregation_key = event.aggregation_key.as_deref().unwrap_or_default();
        match event.alert_type {
            AlertLevel::Error => error!(
                event = "check_event",
                check = %self.check_name,
                event_type = %event.event_type,
                alert_type = %event.alert_type,
                timestamp = event.timestamp,
                title = %event.title,
                text = %event.text,
                aggregation_key = %aggregation_key,
                host = %event.host,
                tags = %tags,
                "Event submitted"
            ),
            AlertLevel::Warn => warn!(
                event = "check_event",
                check = %self.check_name,
                event_type = %event.event_type,
                alert_type = %event.alert_type,
                timestamp = event.timestamp,
                title = %event.title,
                text = %event.text,
                aggregation_key = %aggregation_key,
                host = %event.host,
                tags = %tags,
                "Event submitted"
            ),
            AlertLevel::Info => info!(
                event = "check_event",
                check = %self.check_name,
                event_type = %event.event_type,
                alert_type = %event.alert_type,
                timestamp = event.timestamp,
                title = %event.title,
                text = %event.text,
                aggregation_key = %aggregation_key,
                host = %event.host,
                tags = %tags,
                "Event submitted"
            ),
        }
    }
}
