//! Core data models for the YARN check
//!
//! Application records are built from the ResourceManager `/ws/v1/cluster/apps`
//! payload. Parsing never fails: missing or malformed fields degrade to
//! defaults so that every entry in a response is accounted for.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier used for a record whose user, queue or application type is absent
pub const UNKNOWN_DIMENSION: &str = "";

/// One application entry as reported by the ResourceManager
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub user: Option<String>,
    pub queue: Option<String>,
    pub app_type: Option<String>,
    pub name: String,
    pub elapsed_time_ms: u64,
    pub allocated_mb: u64,
    pub allocated_vcores: u64,
    pub running_containers: u64,
    pub memory_seconds: u64,
    pub vcore_seconds: u64,
    /// Epoch milliseconds, only set for completed applications
    pub finished_time_ms: Option<i64>,
}

impl ApplicationRecord {
    /// Build a record from one raw JSON application object
    pub fn from_json(value: &Value) -> Self {
        Self {
            user: string_field(value, "user"),
            queue: string_field(value, "queue"),
            app_type: string_field(value, "applicationType"),
            name: string_field(value, "name").unwrap_or_default(),
            elapsed_time_ms: count_field(value, "elapsedTime"),
            allocated_mb: count_field(value, "allocatedMB"),
            allocated_vcores: count_field(value, "allocatedVCores"),
            running_containers: count_field(value, "runningContainers"),
            memory_seconds: count_field(value, "memorySeconds"),
            vcore_seconds: count_field(value, "vcoreSeconds"),
            finished_time_ms: timestamp_field(value, "finishedTime"),
        }
    }

    /// Build records from a list of raw JSON application objects
    pub fn from_json_list(values: &[Value]) -> Vec<Self> {
        values.iter().map(Self::from_json).collect()
    }
}

/// Extract the application list from a `{"apps": {"app": [...]}}` envelope
///
/// The ResourceManager answers `{"apps": null}` when nothing matches, which
/// yields an empty list like any other unexpected shape.
pub fn apps_from_envelope(body: Value) -> Vec<Value> {
    match body {
        Value::Object(mut root) => match root.remove("apps") {
            Some(Value::Object(mut apps)) => match apps.remove("app") {
                Some(Value::Array(list)) => list,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn signed_field(value: &Value, key: &str) -> Option<i64> {
    match value.get(key)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|v| i64::try_from(v).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Non-negative counter; YARN reports -1 for resources of finished apps
fn count_field(value: &Value, key: &str) -> u64 {
    match value.get(key) {
        Some(Value::Number(n)) if n.is_u64() => n.as_u64().unwrap_or(0),
        _ => signed_field(value, key)
            .and_then(|v| u64::try_from(v).ok())
            .unwrap_or(0),
    }
}

fn timestamp_field(value: &Value, key: &str) -> Option<i64> {
    signed_field(value, key).filter(|ts| *ts > 0)
}

/// Whether a user counts as interactive or batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubmitType {
    Interactive,
    Batch,
}

impl SubmitType {
    pub const ALL: [SubmitType; 2] = [SubmitType::Batch, SubmitType::Interactive];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmitType::Interactive => "INTERACTIVE",
            SubmitType::Batch => "BATCH",
        }
    }
}

impl std::fmt::Display for SubmitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application states accepted by the `states` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppState {
    New,
    NewSaving,
    Submitted,
    Accepted,
    Running,
}

impl AppState {
    /// States that count toward the queued-applications gauge
    pub const QUEUED: [AppState; 4] = [
        AppState::New,
        AppState::NewSaving,
        AppState::Submitted,
        AppState::Accepted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppState::New => "NEW",
            AppState::NewSaving => "NEW_SAVING",
            AppState::Submitted => "SUBMITTED",
            AppState::Accepted => "ACCEPTED",
            AppState::Running => "RUNNING",
        }
    }
}

impl std::fmt::Display for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal outcome of a completed application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FinalStatus {
    Failed,
    Succeeded,
    Killed,
}

impl FinalStatus {
    pub const ALL: [FinalStatus; 3] = [
        FinalStatus::Failed,
        FinalStatus::Succeeded,
        FinalStatus::Killed,
    ];

    /// Value of the `finalStatus` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            FinalStatus::Failed => "FAILED",
            FinalStatus::Succeeded => "SUCCEEDED",
            FinalStatus::Killed => "KILLED",
        }
    }

    /// Lowercase form used in metric names and tags
    pub fn slug(&self) -> &'static str {
        match self {
            FinalStatus::Failed => "failed",
            FinalStatus::Succeeded => "succeeded",
            FinalStatus::Killed => "killed",
        }
    }
}

impl std::fmt::Display for FinalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_query())
    }
}

/// Grouping axis over application records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Queue,
    AppType,
    User,
}

impl Dimension {
    /// Prefix of the dimension tag, e.g. `queue:default`
    pub fn tag_key(&self) -> &'static str {
        match self {
            Dimension::Queue => "queue",
            Dimension::AppType => "apptype",
            Dimension::User => "user",
        }
    }

    /// Render the tag for one dimension value
    ///
    /// The missing-value sentinel renders as a bare `no_<key>` tag, which no
    /// `<key>:<value>` tag can equal, so a queue that is really named
    /// `unknown` keeps a bucket of its own.
    pub fn tag(&self, value: &str) -> String {
        if value == UNKNOWN_DIMENSION {
            return format!("no_{}", self.tag_key());
        }
        format!("{}:{}", self.tag_key(), value)
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag_key())
    }
}
