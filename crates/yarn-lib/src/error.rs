//! Error types for the YARN check

use thiserror::Error;

/// Invalid or missing check configuration
///
/// Raised before any request is sent to the ResourceManager.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("resourcemanager_uri is required")]
    MissingEndpoint,

    #[error("invalid resourcemanager_uri '{uri}': {reason}")]
    InvalidEndpoint { uri: String, reason: String },

    #[error("invalid user_pattern '{pattern}': {source}")]
    InvalidUserPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("timeout must be a positive number of seconds, got {0}")]
    InvalidTimeout(f64),

    #[error("failed to load check configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("check configuration has no instances")]
    NoInstances,
}

/// Category of a fetch failure, as reported in error events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    HttpError,
    TransportError,
}

impl std::fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchErrorKind::HttpError => write!(f, "HTTP_ERROR"),
            FetchErrorKind::TransportError => write!(f, "TRANSPORT_ERROR"),
        }
    }
}

/// A single ResourceManager query that did not produce records
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("ResourceManager {host} answered HTTP {status}")]
    Http { host: String, status: u16 },

    #[error("request to ResourceManager {host} failed: {reason}")]
    Transport { host: String, reason: String },
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Http { .. } => FetchErrorKind::HttpError,
            FetchError::Transport { .. } => FetchErrorKind::TransportError,
        }
    }

    pub fn host(&self) -> &str {
        match self {
            FetchError::Http { host, .. } | FetchError::Transport { host, .. } => host,
        }
    }

    /// HTTP status code, when the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            FetchError::Transport { .. } => None,
        }
    }
}

/// Failure that stops an invocation before any metric is computed
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to set up ResourceManager client: {0}")]
    Client(#[source] FetchError),
}
