//! Retrieval of application lists from the ResourceManager
//!
//! The check only needs to know whether a query produced records or failed;
//! timeouts belong to the client and retries are not attempted.

mod client;

pub use client::ResourceManagerClient;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::FetchError;
use crate::models::{AppState, FinalStatus};

/// One logical query against `/ws/v1/cluster/apps`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppQuery {
    /// Applications currently in a given state
    State(AppState),
    /// Applications that ended with a given final status
    Completed {
        status: FinalStatus,
        /// Lower bound on the finish time, passed through as `finishedTimeBegin`
        finished_since_ms: Option<i64>,
    },
}

impl AppQuery {
    pub fn running() -> Self {
        AppQuery::State(AppState::Running)
    }

    /// Query parameters for this query
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        match self {
            AppQuery::State(state) => vec![("states", state.as_str().to_string())],
            AppQuery::Completed {
                status,
                finished_since_ms,
            } => {
                let mut pairs = vec![("finalStatus", status.as_query().to_string())];
                if let Some(since) = finished_since_ms {
                    pairs.push(("finishedTimeBegin", since.to_string()));
                }
                pairs
            }
        }
    }
}

impl std::fmt::Display for AppQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppQuery::State(state) => write!(f, "states={}", state),
            AppQuery::Completed { status, .. } => write!(f, "finalStatus={}", status),
        }
    }
}

/// Source of raw application objects
#[async_trait]
pub trait ApplicationFetcher: Send + Sync {
    /// Run one query and return the application objects it matched
    async fn fetch_apps(&self, query: &AppQuery) -> Result<Vec<Value>, FetchError>;
}
