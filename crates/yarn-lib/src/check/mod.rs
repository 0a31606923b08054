//! One invocation of the YARN check
//!
//! An invocation fetches running applications, then the queued states, then
//! (on the hour) the completed statuses, and emits every metric family once
//! all of its inputs are folded. A failed running-apps query ends the
//! invocation with a single error event. Failures of the secondary queries
//! only cost the family that depended on them.

pub mod catalog;

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, FixedOffset, Local, Timelike};
use serde::Serialize;

use crate::aggregator::{aggregate_by_dimension, aggregate_by_submit_type, summarize};
use crate::classifier::is_within_window;
use crate::config::{InitConfig, InstanceConfig, InstanceSettings};
use crate::emitter::{AlertLevel, Emitter, Event, EVENT_TYPE};
use crate::error::{CheckError, FetchError};
use crate::fetcher::{AppQuery, ApplicationFetcher, ResourceManagerClient};
use crate::models::{AppState, ApplicationRecord, FinalStatus, SubmitType};
use crate::observability::StructuredLogger;
use crate::schedule::{CollectionWindow, HourlyGate};
use catalog::BreakdownNames;

/// What one invocation produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub host: String,
    pub running_apps: usize,
    pub gauges: usize,
    pub events: usize,
    pub completed_pass: bool,
    /// The running-apps query failed and nothing was measured
    pub aborted: bool,
}

/// Check bound to one ResourceManager
///
/// Holds configuration and collaborator handles; every invocation starts
/// from fresh aggregation state. The only thing remembered between
/// invocations is the hour the completed pass last ran in.
pub struct YarnCheck {
    instance: InstanceConfig,
    fetcher: Arc<dyn ApplicationFetcher>,
    emitter: Arc<dyn Emitter>,
    logger: StructuredLogger,
    completed_gate: HourlyGate,
}

impl YarnCheck {
    pub fn new(
        instance: InstanceConfig,
        fetcher: Arc<dyn ApplicationFetcher>,
        emitter: Arc<dyn Emitter>,
    ) -> Self {
        let logger = StructuredLogger::new(instance.endpoint.host());
        Self {
            instance,
            fetcher,
            emitter,
            logger,
            completed_gate: HourlyGate::new(),
        }
    }

    /// Validate raw settings and build a check talking HTTP to the endpoint
    pub fn configure(
        init: &InitConfig,
        settings: &InstanceSettings,
        emitter: Arc<dyn Emitter>,
    ) -> Result<Self, CheckError> {
        let instance = InstanceConfig::resolve(init, settings)?;
        Self::connect(instance, emitter)
    }

    /// Build a check talking HTTP to a validated instance
    pub fn connect(instance: InstanceConfig, emitter: Arc<dyn Emitter>) -> Result<Self, CheckError> {
        let client = ResourceManagerClient::new(instance.endpoint.clone(), instance.timeout)
            .map_err(CheckError::Client)?;
        Ok(Self::new(instance, Arc::new(client), emitter))
    }

    pub fn host(&self) -> &str {
        self.instance.endpoint.host()
    }

    /// Run one invocation at the current local time
    pub async fn collect(&self) -> CheckSummary {
        let now = Local::now();
        self.collect_at(now.with_timezone(now.offset())).await
    }

    /// Run one invocation as if the clock read `now`
    pub async fn collect_at(&self, now: DateTime<FixedOffset>) -> CheckSummary {
        let started = Instant::now();
        let completed_pass = self.completed_gate.try_claim(&now);
        self.logger.log_check_started(completed_pass);

        let mut report = Report::new(self.emitter.as_ref(), self.host(), &self.instance.tags, &now);

        let running_query = AppQuery::running();
        let running = match self.fetcher.fetch_apps(&running_query).await {
            Ok(apps) => ApplicationRecord::from_json_list(&apps),
            Err(err) => {
                self.logger.log_check_aborted(&err);
                report.fetch_failed(&running_query, &err);
                return report.finish(0, completed_pass, true);
            }
        };

        let queued = self.fetch_queued(&mut report).await;
        self.emit_running(&mut report, &running, queued);

        if completed_pass {
            let window = CollectionWindow::ending_at_time(&now);
            self.completed_pass(&mut report, &window).await;
        } else {
            self.logger.log_completed_pass_skipped(now.minute());
        }

        let summary = report.finish(running.len(), completed_pass, false);
        self.logger.log_check_completed(
            summary.running_apps,
            summary.gauges,
            summary.events,
            started.elapsed().as_millis(),
        );
        summary
    }

    /// Number of applications waiting to run, or `None` if any state failed
    async fn fetch_queued(&self, report: &mut Report<'_>) -> Option<usize> {
        let queries = AppState::QUEUED.map(AppQuery::State);
        let (new, new_saving, submitted, accepted) = tokio::join!(
            self.fetcher.fetch_apps(&queries[0]),
            self.fetcher.fetch_apps(&queries[1]),
            self.fetcher.fetch_apps(&queries[2]),
            self.fetcher.fetch_apps(&queries[3]),
        );

        let mut total = Some(0usize);
        for (query, result) in queries.iter().zip([new, new_saving, submitted, accepted]) {
            match result {
                Ok(apps) => total = total.map(|t| t.saturating_add(apps.len())),
                Err(err) => {
                    self.logger.log_fetch_failed(query, &err);
                    report.fetch_failed(query, &err);
                    total = None;
                }
            }
        }
        total
    }

    fn emit_running(&self, report: &mut Report<'_>, running: &[ApplicationRecord], queued: Option<usize>) {
        let cluster = summarize(running);
        let cluster_tags = catalog::cluster_tags();
        for (name, value) in catalog::cluster_values(&cluster) {
            report.gauge(name, value, &cluster_tags);
        }
        if let Some(queued) = queued {
            report.gauge(catalog::QUEUED_APPS, queued as f64, &cluster_tags);
        }

        let by_submit_type = aggregate_by_submit_type(running, &self.instance.user_pattern);
        for submit_type in SubmitType::ALL {
            let count = by_submit_type.get(&submit_type).map_or(0, |b| b.count);
            report.gauge(
                catalog::SUBMIT_TYPE_APPS,
                count as f64,
                &catalog::submit_type_tags(submit_type),
            );
        }

        for names in [catalog::QUEUE, catalog::APP_TYPE] {
            emit_breakdown(report, &names, running);
        }
    }

    async fn completed_pass(&self, report: &mut Report<'_>, window: &CollectionWindow) {
        let queries = FinalStatus::ALL.map(|status| AppQuery::Completed {
            status,
            finished_since_ms: Some(window.window_start_ms),
        });
        let (failed, succeeded, killed) = tokio::join!(
            self.fetcher.fetch_apps(&queries[0]),
            self.fetcher.fetch_apps(&queries[1]),
            self.fetcher.fetch_apps(&queries[2]),
        );

        for (query, result) in queries.iter().zip([failed, succeeded, killed]) {
            let AppQuery::Completed { status, .. } = *query else {
                continue;
            };
            let apps = match result {
                Ok(apps) => apps,
                Err(err) => {
                    self.logger.log_fetch_failed(query, &err);
                    report.fetch_failed(query, &err);
                    continue;
                }
            };

            let records = ApplicationRecord::from_json_list(&apps);
            let in_window: Vec<&ApplicationRecord> = records
                .iter()
                .filter(|record| is_within_window(record, window))
                .collect();
            self.logger
                .log_completed_status(query, records.len(), in_window.len());

            for dimension in catalog::COMPLETED_DIMENSIONS {
                let name = catalog::completed_metric(status, dimension);
                let buckets = aggregate_by_dimension(in_window.iter().copied(), dimension);
                for (key, bucket) in sorted(buckets) {
                    report.gauge(
                        &name,
                        bucket.count as f64,
                        &catalog::completed_tags(status, dimension, &key),
                    );
                }
            }
        }
    }
}

/// Resolve settings and run a single invocation against the configured endpoint
pub async fn collect(
    init: &InitConfig,
    settings: &InstanceSettings,
    emitter: Arc<dyn Emitter>,
) -> Result<CheckSummary, CheckError> {
    let check = YarnCheck::configure(init, settings, emitter)?;
    Ok(check.collect().await)
}

fn emit_breakdown(report: &mut Report<'_>, names: &BreakdownNames, running: &[ApplicationRecord]) {
    let buckets = aggregate_by_dimension(running, names.dimension);
    for (key, bucket) in sorted(buckets) {
        let tags = names.tags(&key);
        for (name, value) in names.values(&bucket) {
            report.gauge(name, value, &tags);
        }
    }
}

/// Buckets in key order, so output is stable from one run to the next
fn sorted<V>(buckets: std::collections::HashMap<String, V>) -> Vec<(String, V)> {
    let mut entries: Vec<(String, V)> = buckets.into_iter().collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}

/// Submissions of one invocation, with host and instance tags applied
struct Report<'a> {
    emitter: &'a dyn Emitter,
    host: &'a str,
    instance_tags: &'a [String],
    timestamp: i64,
    gauges: usize,
    events: usize,
}

impl<'a> Report<'a> {
    fn new(
        emitter: &'a dyn Emitter,
        host: &'a str,
        instance_tags: &'a [String],
        now: &DateTime<FixedOffset>,
    ) -> Self {
        Self {
            emitter,
            host,
            instance_tags,
            timestamp: now.timestamp(),
            gauges: 0,
            events: 0,
        }
    }

    fn gauge(&mut self, name: &str, value: f64, family_tags: &[String]) {
        let mut tags = family_tags.to_vec();
        tags.extend(self.instance_tags.iter().cloned());
        self.emitter.gauge(name, value, &tags, self.host);
        self.gauges += 1;
    }

    fn fetch_failed(&mut self, query: &AppQuery, error: &FetchError) {
        let text = match error {
            FetchError::Http { status, .. } => format!(
                "Query {} against ResourceManager {} failed with {} (status code {})",
                query,
                error.host(),
                error.kind(),
                status
            ),
            FetchError::Transport { reason, .. } => format!(
                "Query {} against ResourceManager {} failed with {}: {}",
                query,
                error.host(),
                error.kind(),
                reason
            ),
        };

        let mut tags = vec![format!("query:{}", query)];
        tags.extend(self.instance_tags.iter().cloned());

        self.emitter.event(Event {
            timestamp: self.timestamp,
            event_type: EVENT_TYPE.to_string(),
            alert_type: AlertLevel::Error,
            title: format!("YARN check failed on {}", self.host),
            text,
            aggregation_key: Some(format!("{}:{}", EVENT_TYPE, self.host)),
            host: self.host.to_string(),
            tags,
        });
        self.events += 1;
    }

    fn finish(self, running_apps: usize, completed_pass: bool, aborted: bool) -> CheckSummary {
        CheckSummary {
            host: self.host.to_string(),
            running_apps,
            gauges: self.gauges,
            events: self.events,
            completed_pass,
            aborted,
        }
    }
}
