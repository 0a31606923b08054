//! YARN ResourceManager application metrics
//!
//! This crate provides the core functionality for:
//! - Parsing application records from the ResourceManager REST API
//! - Classifying and aggregating them by submit type, queue, application type and user
//! - Windowing completed applications to the trailing hour
//! - Emitting the resulting gauges and error events

pub mod aggregator;
pub mod check;
pub mod classifier;
pub mod config;
pub mod emitter;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod observability;
pub mod schedule;

pub use check::{CheckSummary, YarnCheck};
pub use config::{CheckConfig, InitConfig, InstanceConfig, InstanceSettings};
pub use emitter::{Emitter, RecordingEmitter, TracingEmitter};
pub use error::{CheckError, ConfigError, FetchError};
pub use fetcher::{AppQuery, ApplicationFetcher, ResourceManagerClient};
pub use models::*;
pub use observability::StructuredLogger;
