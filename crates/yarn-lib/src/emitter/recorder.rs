//! In-memory emitter that keeps everything it receives

use std::sync::Mutex;

use super::{Emitter, Event, Gauge};

/// Emitter that records submissions for later inspection
///
/// Used by tests and by the CLI to print what a collection produced.
#[derive(Debug, Default)]
pub struct RecordingEmitter {
    gauges: Mutex<Vec<Gauge>>,
    events: Mutex<Vec<Event>>,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All gauges received so far, in submission order
    pub fn gauges(&self) -> Vec<Gauge> {
        self.gauges
            .lock()
            .map(|g| g.clone())
            .unwrap_or_default()
    }

    /// All events received so far, in submission order
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }

    /// Gauges with the given name
    pub fn gauges_named(&self, name: &str) -> Vec<Gauge> {
        self.gauges()
            .into_iter()
            .filter(|g| g.name == name)
            .collect()
    }

    /// Value of the gauge with the given name carrying every tag in `tags`
    pub fn value_of(&self, name: &str, tags: &[&str]) -> Option<f64> {
        self.gauges()
            .into_iter()
            .find(|g| g.name == name && tags.iter().all(|t| g.has_tag(t)))
            .map(|g| g.value)
    }

    /// Drop everything recorded so far
    pub fn clear(&self) {
        if let Ok(mut gauges) = self.gauges.lock() {
            gauges.clear();
        }
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl Emitter for RecordingEmitter {
    fn gauge(&self, name: &str, value: f64, tags: &[String], host: &str) {
        if let Ok(mut gauges) = self.gauges.lock() {
            gauges.push(Gauge {
                name: name.to_string(),
                value,
                tags: tags.to_vec(),
                host: host.to_string(),
            });
        }
    }

    fn event(&self, event: Event) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}
