//! Structured logging for check invocations
//!
//! Every record carries the ResourceManager host so that logs from several
//! instances running in one agent can be told apart.

use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::fetcher::AppQuery;

/// Structured logger for check lifecycle events
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    host: String,
}

impl StructuredLogger {
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    /// Log the start of an invocation
    pub fn log_check_started(&self, completed_pass: bool) {
        debug!(
            event = "check_started",
            host = %self.host,
            completed_pass = completed_pass,
            "Starting YARN check"
        );
    }

    /// Log the end of an invocation
    pub fn log_check_completed(
        &self,
        running_apps: usize,
        gauges: usize,
        events: usize,
        elapsed_ms: u128,
    ) {
        info!(
            event = "check_completed",
            host = %self.host,
            running_apps = running_apps,
            gauges = gauges,
            events = events,
            elapsed_ms = elapsed_ms,
            "YARN check complete"
        );
    }

    /// Log an invocation stopped by a failed running-apps query
    pub fn log_check_aborted(&self, error: &FetchError) {
        warn!(
            event = "check_aborted",
            host = %self.host,
            kind = %error.kind(),
            status = ?error.status(),
            error = %error,
            "Running applications unavailable, skipping metrics"
        );
    }

    /// Log a failed ResourceManager query
    pub fn log_fetch_failed(&self, query: &AppQuery, error: &FetchError) {
        warn!(
            event = "fetch_failed",
            host = %self.host,
            query = %query,
            kind = %error.kind(),
            status = ?error.status(),
            error = %error,
            "ResourceManager query failed"
        );
    }

    /// Log that the completed-applications pass was not due
    pub fn log_completed_pass_skipped(&self, minute: u32) {
        debug!(
            event = "completed_pass_skipped",
            host = %self.host,
            minute = minute,
            "Completed applications pass runs once, on the hour"
        );
    }

    /// Log the outcome of one completed-status query
    pub fn log_completed_status(&self, query: &AppQuery, fetched: usize, in_window: usize) {
        debug!(
            event = "completed_status",
            host = %self.host,
            query = %query,
            fetched = fetched,
            in_window = in_window,
            "Completed applications filtered to trailing window"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("rm1.example.com");
        assert_eq!(logger.host, "rm1.example.com");

        let err = FetchError::Http {
            host: "rm1.example.com".to_string(),
            status: 500,
        };
        logger.log_check_started(true);
        logger.log_fetch_failed(&AppQuery::running(), &err);
        logger.log_check_aborted(&err);
        logger.log_completed_pass_skipped(17);
        logger.log_check_completed(3, 40, 0, 12);
    }
}
