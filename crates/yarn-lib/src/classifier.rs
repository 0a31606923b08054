//! Classification of application records into dimension buckets
//!
//! All functions here are total: every record resolves to a submit type and
//! a key for each dimension, whatever the payload left out.

use regex::Regex;

use crate::error::ConfigError;
use crate::models::{ApplicationRecord, Dimension, SubmitType, UNKNOWN_DIMENSION};
use crate::schedule::CollectionWindow;

/// Regular expression selecting interactive users
///
/// The pattern is anchored at the start of the user name only, so `hue`
/// matches both `hue` and `hue-svc`. An unset pattern matches nobody.
#[derive(Debug, Clone, Default)]
pub struct UserPattern {
    regex: Option<Regex>,
}

impl UserPattern {
    /// Pattern that matches no user
    pub fn none() -> Self {
        Self { regex: None }
    }

    /// Compile a user pattern from configuration
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(&format!("^(?:{})", pattern)).map_err(|source| {
            ConfigError::InvalidUserPattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        Ok(Self { regex: Some(regex) })
    }

    /// Compile an optional pattern, falling back to matching nobody
    pub fn from_option(pattern: Option<&str>) -> Result<Self, ConfigError> {
        match pattern {
            Some(p) => Self::new(p),
            None => Ok(Self::none()),
        }
    }

    pub fn is_match(&self, user: &str) -> bool {
        self.regex.as_ref().is_some_and(|re| re.is_match(user))
    }

    pub fn as_str(&self) -> Option<&str> {
        self.regex.as_ref().map(|re| re.as_str())
    }
}

/// Decide whether a record was submitted by an interactive or a batch user
pub fn classify_submit_type(record: &ApplicationRecord, pattern: &UserPattern) -> SubmitType {
    match record.user.as_deref() {
        Some(user) if pattern.is_match(user) => SubmitType::Interactive,
        _ => SubmitType::Batch,
    }
}

/// Whether a completed record finished inside the trailing window
///
/// The lower bound is inclusive. Records without a finish time never match.
pub fn is_within_window(record: &ApplicationRecord, window: &CollectionWindow) -> bool {
    record
        .finished_time_ms
        .is_some_and(|finished| finished >= window.window_start_ms)
}

/// Value of a record along one dimension, verbatim
pub fn dimension_key(record: &ApplicationRecord, dimension: Dimension) -> &str {
    let value = match dimension {
        Dimension::Queue => record.queue.as_deref(),
        Dimension::AppType => record.app_type.as_deref(),
        Dimension::User => record.user.as_deref(),
    };
    value.unwrap_or(UNKNOWN_DIMENSION)
}
