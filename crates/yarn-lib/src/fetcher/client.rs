//! HTTP client for the ResourceManager REST API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{AppQuery, ApplicationFetcher};
use crate::config::ResourceManagerEndpoint;
use crate::error::FetchError;
use crate::models::apps_from_envelope;

const APPS_PATH: [&str; 4] = ["ws", "v1", "cluster", "apps"];

/// Fetches application lists over HTTP with a per-request timeout
pub struct ResourceManagerClient {
    client: Client,
    endpoint: ResourceManagerEndpoint,
}

impl ResourceManagerClient {
    /// Create a client for one ResourceManager
    pub fn new(endpoint: ResourceManagerEndpoint, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport {
                host: endpoint.host().to_string(),
                reason: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, endpoint })
    }

    /// Full URL of a query
    pub fn query_url(&self, query: &AppQuery) -> Result<Url, FetchError> {
        let mut url = self.endpoint.base_url().clone();
        url.path_segments_mut()
            .map_err(|_| self.transport_error("endpoint cannot be used as a base URL"))?
            .pop_if_empty()
            .extend(APPS_PATH);

        {
            let mut pairs = url.query_pairs_mut();
            pairs.clear();
            for (key, value) in query.query_pairs() {
                pairs.append_pair(key, &value);
            }
        }

        Ok(url)
    }

    fn transport_error(&self, reason: impl Into<String>) -> FetchError {
        FetchError::Transport {
            host: self.endpoint.host().to_string(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ApplicationFetcher for ResourceManagerClient {
    async fn fetch_apps(&self, query: &AppQuery) -> Result<Vec<Value>, FetchError> {
        let url = self.query_url(query)?;
        debug!(url = %url, "Querying ResourceManager");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(format!("request timed out: {}", e))
            } else {
                self.transport_error(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                host: self.endpoint.host().to_string(),
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| self.transport_error(format!("invalid JSON body: {}", e)))?;

        let apps = apps_from_envelope(body);
        debug!(query = %query, apps = apps.len(), "ResourceManager query complete");
        Ok(apps)
    }
}
