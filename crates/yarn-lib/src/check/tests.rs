//! Invocation tests against a scripted fetcher

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone};
use serde_json::{json, Value};

use super::*;
use crate::classifier::UserPattern;
use crate::emitter::RecordingEmitter;

/// Fetcher answering from a table keyed by query; unknown queries match nothing
#[derive(Default)]
struct ScriptedFetcher {
    responses: HashMap<String, Result<Vec<Value>, FetchError>>,
    calls: Mutex<Vec<AppQuery>>,
}

impl ScriptedFetcher {
    fn answer(mut self, query: AppQuery, apps: Vec<Value>) -> Self {
        self.responses.insert(query.to_string(), Ok(apps));
        self
    }

    fn fail(mut self, query: AppQuery, error: FetchError) -> Self {
        self.responses.insert(query.to_string(), Err(error));
        self
    }

    fn calls(&self) -> Vec<AppQuery> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApplicationFetcher for ScriptedFetcher {
    async fn fetch_apps(&self, query: &AppQuery) -> Result<Vec<Value>, FetchError> {
        self.calls.lock().unwrap().push(*query);
        self.responses
            .get(&query.to_string())
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

fn at(hour: u32, minute: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 3, 1, hour, minute, 0)
        .unwrap()
}

fn instance(user_pattern: Option<&str>, tags: &[&str]) -> InstanceConfig {
    let mut instance = InstanceConfig::for_endpoint("rm.example.com:8088").unwrap();
    instance.user_pattern = UserPattern::from_option(user_pattern).unwrap();
    instance.tags = tags.iter().map(|t| t.to_string()).collect();
    instance
}

fn setup(
    fetcher: ScriptedFetcher,
    instance: InstanceConfig,
) -> (YarnCheck, Arc<ScriptedFetcher>, Arc<RecordingEmitter>) {
    let fetcher = Arc::new(fetcher);
    let emitter = Arc::new(RecordingEmitter::new());
    let check = YarnCheck::new(instance, fetcher.clone(), emitter.clone());
    (check, fetcher, emitter)
}

fn app(user: &str, queue: &str, app_type: &str, allocated_mb: u64) -> Value {
    json!({
        "user": user,
        "queue": queue,
        "applicationType": app_type,
        "name": format!("{}-{}", queue, app_type),
        "elapsedTime": 60_000,
        "allocatedMB": allocated_mb,
        "allocatedVCores": 2,
        "runningContainers": 3,
        "memorySeconds": 1000,
        "vcoreSeconds": 10
    })
}

fn finished(user: &str, queue: &str, app_type: &str, finished_ms: i64) -> Value {
    json!({
        "user": user,
        "queue": queue,
        "applicationType": app_type,
        "finishedTime": finished_ms
    })
}

fn http_error(status: u16) -> FetchError {
    FetchError::Http {
        host: "rm.example.com".to_string(),
        status,
    }
}

fn three_running() -> Vec<Value> {
    vec![
        app("alice", "default", "MAPREDUCE", 1000),
        app("hue", "production", "SPARK", 2000),
        app("bob", "default", "SPARK", 500),
    ]
}

#[tokio::test]
async fn test_running_apps_breakdowns() {
    let fetcher = ScriptedFetcher::default().answer(AppQuery::running(), three_running());
    let (check, fetcher, emitter) = setup(fetcher, instance(None, &[]));

    let summary = check.collect_at(at(14, 17)).await;

    assert!(!summary.aborted);
    assert!(!summary.completed_pass);
    assert_eq!(summary.running_apps, 3);
    assert_eq!(summary.events, 0);
    assert_eq!(summary.gauges, emitter.gauges().len());

    assert_eq!(emitter.value_of(catalog::RUNNING_APPS, &["yarn_cluster"]), Some(3.0));
    assert_eq!(emitter.value_of(catalog::ALLOCATED_GB, &["yarn_cluster"]), Some(3.5));
    assert_eq!(emitter.value_of(catalog::ALLOCATED_TB, &["yarn_cluster"]), Some(0.0035));
    assert_eq!(emitter.value_of(catalog::MAX_ALLOCATED_GB, &["yarn_cluster"]), Some(2.0));
    assert_eq!(emitter.value_of(catalog::ALLOCATED_VCORES, &["yarn_cluster"]), Some(6.0));

    assert_eq!(emitter.value_of("yarn.queue.apps", &["queue:default"]), Some(2.0));
    assert_eq!(emitter.value_of("yarn.queue.allocated_gb", &["queue:default"]), Some(1.5));
    assert_eq!(emitter.value_of("yarn.queue.apps", &["queue:production"]), Some(1.0));
    assert_eq!(emitter.value_of("yarn.queue.allocated_gb", &["queue:production"]), Some(2.0));
    assert_eq!(emitter.value_of("yarn.apptype.apps", &["apptype:SPARK"]), Some(2.0));
    assert_eq!(
        emitter.value_of("yarn.apptype.total_memory_seconds", &["apptype:SPARK"]),
        Some(2000.0)
    );

    // Off the hour only the running and queued states are queried
    let calls = fetcher.calls();
    assert_eq!(calls.len(), 5);
    assert!(calls
        .iter()
        .all(|q| !matches!(q, AppQuery::Completed { .. })));
    assert!(emitter
        .gauges()
        .iter()
        .all(|g| !g.name.starts_with("yarn.completed.")));
}

#[tokio::test]
async fn test_completed_pass_runs_once_within_the_hour() {
    let fetcher = ScriptedFetcher::default().answer(AppQuery::running(), three_running());
    let (check, fetcher, _emitter) = setup(fetcher, instance(None, &[]));

    let mut passes = 0;
    for secs in [0, 15, 30, 45] {
        let summary = check.collect_at(at(14, 0) + chrono::Duration::seconds(secs)).await;
        passes += usize::from(summary.completed_pass);
    }
    let completed_fetches = fetcher
        .calls()
        .iter()
        .filter(|q| matches!(q, AppQuery::Completed { .. }))
        .count();
    assert_eq!(passes, 1);
    assert_eq!(completed_fetches, 3);

    assert!(check.collect_at(at(15, 0)).await.completed_pass);
}

#[tokio::test]
async fn test_primary_failure_emits_single_event() {
    let fetcher = ScriptedFetcher::default().fail(AppQuery::running(), http_error(503));
    let (check, fetcher, emitter) = setup(fetcher, instance(None, &[]));

    let summary = check.collect_at(at(14, 0)).await;

    assert!(summary.aborted);
    assert_eq!(summary.gauges, 0);
    assert_eq!(summary.events, 1);
    assert!(emitter.gauges().is_empty());

    let events = emitter.events();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.alert_type, AlertLevel::Error);
    assert_eq!(event.event_type, EVENT_TYPE);
    assert_eq!(event.host, "rm.example.com");
    assert!(event.text.contains("HTTP_ERROR"));
    assert!(event.text.contains("503"));
    assert!(event.text.contains("rm.example.com"));
    assert_eq!(event.timestamp, at(14, 0).timestamp());

    assert_eq!(fetcher.calls(), vec![AppQuery::running()]);
}

#[tokio::test]
async fn test_transport_failure_names_kind() {
    let fetcher = ScriptedFetcher::default().fail(
        AppQuery::running(),
        FetchError::Transport {
            host: "rm.example.com".to_string(),
            reason: "connection refused".to_string(),
        },
    );
    let (check, _fetcher, emitter) = setup(fetcher, instance(None, &[]));

    check.collect_at(at(9, 30)).await;

    let events = emitter.events();
    assert_eq!(events.len(), 1);
    assert!(events[0].text.contains("TRANSPORT_ERROR"));
    assert!(events[0].text.contains("connection refused"));
}

#[tokio::test]
async fn test_no_running_apps_reports_zero_cluster_metrics() {
    let (check, _fetcher, emitter) = setup(ScriptedFetcher::default(), instance(None, &[]));

    let summary = check.collect_at(at(3, 45)).await;

    assert_eq!(summary.running_apps, 0);
    for (name, _) in catalog::cluster_values(&Default::default()) {
        assert_eq!(emitter.value_of(name, &["yarn_cluster"]), Some(0.0), "{}", name);
    }
    assert_eq!(emitter.value_of(catalog::QUEUED_APPS, &["yarn_cluster"]), Some(0.0));
    assert_eq!(
        emitter.value_of(catalog::SUBMIT_TYPE_APPS, &["submittype:BATCH"]),
        Some(0.0)
    );
    assert_eq!(
        emitter.value_of(catalog::SUBMIT_TYPE_APPS, &["submittype:INTERACTIVE"]),
        Some(0.0)
    );
    assert!(emitter.gauges_named("yarn.queue.apps").is_empty());
    assert!(emitter.events().is_empty());
}

#[tokio::test]
async fn test_queued_is_sum_of_waiting_states() {
    let fetcher = ScriptedFetcher::default()
        .answer(AppState::New.into_query(), vec![json!({})])
        .answer(AppState::Submitted.into_query(), vec![json!({}), json!({})])
        .answer(AppState::Accepted.into_query(), vec![json!({}), json!({}), json!({})]);
    let (check, _fetcher, emitter) = setup(fetcher, instance(None, &[]));

    check.collect_at(at(10, 5)).await;

    assert_eq!(emitter.value_of(catalog::QUEUED_APPS, &["yarn_cluster"]), Some(6.0));
}

#[tokio::test]
async fn test_queued_failure_is_isolated() {
    let fetcher = ScriptedFetcher::default()
        .answer(AppQuery::running(), three_running())
        .answer(AppState::Accepted.into_query(), vec![json!({})])
        .fail(AppState::NewSaving.into_query(), http_error(500));
    let (check, _fetcher, emitter) = setup(fetcher, instance(None, &[]));

    let summary = check.collect_at(at(10, 5)).await;

    assert!(!summary.aborted);
    assert_eq!(summary.events, 1);
    assert!(emitter.events()[0].text.contains("states=NEW_SAVING"));
    assert!(emitter.gauges_named(catalog::QUEUED_APPS).is_empty());
    assert_eq!(emitter.value_of(catalog::RUNNING_APPS, &["yarn_cluster"]), Some(3.0));
    assert_eq!(emitter.value_of("yarn.queue.apps", &["queue:default"]), Some(2.0));
}

#[tokio::test]
async fn test_submit_type_uses_user_pattern() {
    let fetcher = ScriptedFetcher::default().answer(AppQuery::running(), three_running());
    let (check, _fetcher, emitter) = setup(fetcher, instance(Some("hue|zeppelin"), &[]));

    check.collect_at(at(10, 5)).await;

    assert_eq!(
        emitter.value_of(catalog::SUBMIT_TYPE_APPS, &["yarn_submittype", "submittype:INTERACTIVE"]),
        Some(1.0)
    );
    assert_eq!(
        emitter.value_of(catalog::SUBMIT_TYPE_APPS, &["yarn_submittype", "submittype:BATCH"]),
        Some(2.0)
    );
}

#[tokio::test]
async fn test_completed_pass_counts_only_trailing_hour() {
    let now = at(14, 0);
    let now_ms = now.timestamp_millis();
    let failed = AppQuery::Completed {
        status: FinalStatus::Failed,
        finished_since_ms: Some(now_ms - crate::schedule::WINDOW_MS),
    };
    let fetcher = ScriptedFetcher::default()
        .answer(AppQuery::running(), three_running())
        .answer(
            failed,
            vec![
                finished("alice", "etl", "SPARK", now_ms - 10 * 60 * 1000),
                finished("bob", "stale", "SPARK", now_ms - 2 * 60 * 60 * 1000),
            ],
        );
    let (check, fetcher, emitter) = setup(fetcher, instance(None, &[]));

    let summary = check.collect_at(now).await;

    assert!(summary.completed_pass);
    assert_eq!(
        emitter.value_of(
            "yarn.completed.failed.by_queue",
            &["yarn_completed", "status:failed", "queue:etl"]
        ),
        Some(1.0)
    );
    assert_eq!(
        emitter.value_of("yarn.completed.failed.by_queue", &["queue:stale"]),
        None
    );
    assert_eq!(
        emitter.value_of("yarn.completed.failed.by_apptype", &["apptype:SPARK"]),
        Some(1.0)
    );
    assert_eq!(
        emitter.value_of("yarn.completed.failed.by_user", &["user:alice"]),
        Some(1.0)
    );
    assert!(emitter.gauges_named("yarn.completed.killed.by_queue").is_empty());

    let completed: Vec<AppQuery> = fetcher
        .calls()
        .into_iter()
        .filter(|q| matches!(q, AppQuery::Completed { .. }))
        .collect();
    assert_eq!(completed.len(), 3);
    assert!(completed.iter().all(|q| matches!(
        q,
        AppQuery::Completed { finished_since_ms: Some(since), .. } if *since == now_ms - 3_600_000
    )));
}

#[tokio::test]
async fn test_completed_status_failure_skips_only_that_status() {
    let now = at(8, 0);
    let now_ms = now.timestamp_millis();
    let since = Some(now_ms - crate::schedule::WINDOW_MS);
    let fetcher = ScriptedFetcher::default()
        .answer(
            AppQuery::Completed {
                status: FinalStatus::Succeeded,
                finished_since_ms: since,
            },
            vec![finished("carol", "default", "MAPREDUCE", now_ms - 1000)],
        )
        .fail(
            AppQuery::Completed {
                status: FinalStatus::Killed,
                finished_since_ms: since,
            },
            http_error(502),
        );
    let (check, _fetcher, emitter) = setup(fetcher, instance(None, &[]));

    let summary = check.collect_at(now).await;

    assert_eq!(summary.events, 1);
    assert!(emitter.events()[0].text.contains("finalStatus=KILLED"));
    assert_eq!(
        emitter.value_of("yarn.completed.succeeded.by_queue", &["queue:default"]),
        Some(1.0)
    );
    assert!(emitter
        .gauges()
        .iter()
        .all(|g| !g.name.starts_with("yarn.completed.killed")));
}

#[tokio::test]
async fn test_completed_record_without_finish_time_is_ignored() {
    let now = at(8, 0);
    let since = Some(now.timestamp_millis() - crate::schedule::WINDOW_MS);
    let fetcher = ScriptedFetcher::default().answer(
        AppQuery::Completed {
            status: FinalStatus::Failed,
            finished_since_ms: since,
        },
        vec![json!({"user": "alice", "queue": "etl"})],
    );
    let (check, _fetcher, emitter) = setup(fetcher, instance(None, &[]));

    check.collect_at(now).await;

    assert!(emitter.gauges_named("yarn.completed.failed.by_queue").is_empty());
}

#[tokio::test]
async fn test_missing_dimensions_report_sentinel_tags() {
    let fetcher = ScriptedFetcher::default()
        .answer(AppQuery::running(), vec![json!({"allocatedMB": 1000})]);
    let (check, _fetcher, emitter) = setup(fetcher, instance(None, &[]));

    check.collect_at(at(11, 11)).await;

    assert_eq!(emitter.value_of("yarn.queue.apps", &["no_queue"]), Some(1.0));
    assert_eq!(emitter.value_of("yarn.apptype.apps", &["no_apptype"]), Some(1.0));
    assert_eq!(
        emitter.value_of(catalog::SUBMIT_TYPE_APPS, &["submittype:BATCH"]),
        Some(1.0)
    );
}

#[tokio::test]
async fn test_queue_named_unknown_is_not_merged_with_missing_queue() {
    let fetcher = ScriptedFetcher::default().answer(
        AppQuery::running(),
        vec![
            json!({"queue": "unknown", "allocatedMB": 1000}),
            json!({"queue": "unknown", "allocatedMB": 1000}),
            json!({"allocatedMB": 1000}),
        ],
    );
    let (check, _fetcher, emitter) = setup(fetcher, instance(None, &[]));

    check.collect_at(at(11, 11)).await;

    assert_eq!(emitter.value_of("yarn.queue.apps", &["queue:unknown"]), Some(2.0));
    assert_eq!(emitter.value_of("yarn.queue.apps", &["no_queue"]), Some(1.0));
    assert_eq!(emitter.gauges_named("yarn.queue.apps").len(), 2);
}

#[tokio::test]
async fn test_instance_tags_and_host_on_every_gauge() {
    let fetcher = ScriptedFetcher::default().answer(AppQuery::running(), three_running());
    let (check, _fetcher, emitter) = setup(fetcher, instance(None, &["env:prod"]));

    check.collect_at(at(10, 5)).await;

    let gauges = emitter.gauges();
    assert!(!gauges.is_empty());
    for gauge in gauges {
        assert_eq!(gauge.host, "rm.example.com");
        assert!(gauge.has_tag("env:prod"), "{} lacks instance tag", gauge.name);
    }
}

#[tokio::test]
async fn test_invocations_do_not_share_state() {
    let fetcher = ScriptedFetcher::default().answer(AppQuery::running(), three_running());
    let (check, _fetcher, emitter) = setup(fetcher, instance(None, &[]));

    let first = check.collect_at(at(10, 5)).await;
    let first_gauges = emitter.gauges();
    emitter.clear();
    let second = check.collect_at(at(10, 6)).await;

    assert_eq!(first.gauges, second.gauges);
    assert_eq!(first_gauges, emitter.gauges());
}

#[tokio::test]
async fn test_missing_endpoint_fails_before_fetching() {
    let emitter: Arc<dyn Emitter> = Arc::new(RecordingEmitter::new());
    let result = collect(&InitConfig::default(), &InstanceSettings::default(), emitter).await;

    assert!(matches!(
        result,
        Err(CheckError::Config(crate::error::ConfigError::MissingEndpoint))
    ));
}

trait IntoQuery {
    fn into_query(self) -> AppQuery;
}

impl IntoQuery for AppState {
    fn into_query(self) -> AppQuery {
        AppQuery::State(self)
    }
}
