//! Bucket tables of running or recently completed applications

use anyhow::Result;
use chrono::Utc;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;
use yarn_lib::aggregator::{aggregate_by_dimension, aggregate_by_submit_type, Bucket};
use yarn_lib::classifier::{is_within_window, UserPattern};
use yarn_lib::schedule::CollectionWindow;
use yarn_lib::{
    AppQuery, ApplicationFetcher, ApplicationRecord, Dimension, FinalStatus, InstanceConfig,
    ResourceManagerClient,
};

use crate::output::{format_gb, print_table, OutputFormat};

/// Grouping of the bucket table
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GroupBy {
    Queue,
    Apptype,
    User,
    Submittype,
}

/// Final status of completed applications to look at instead of running ones
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusFilter {
    Failed,
    Succeeded,
    Killed,
}

impl From<StatusFilter> for FinalStatus {
    fn from(status: StatusFilter) -> Self {
        match status {
            StatusFilter::Failed => FinalStatus::Failed,
            StatusFilter::Succeeded => FinalStatus::Succeeded,
            StatusFilter::Killed => FinalStatus::Killed,
        }
    }
}

/// Row for the bucket table
#[derive(Debug, Tabled, Serialize)]
pub struct BucketRow {
    #[tabled(rename = "Group")]
    pub group: String,
    #[tabled(rename = "Apps")]
    pub apps: u64,
    #[tabled(rename = "Allocated GB")]
    pub allocated_gb: String,
    #[tabled(rename = "VCores")]
    pub allocated_vcores: u64,
    #[tabled(rename = "Containers")]
    pub running_containers: u64,
    #[tabled(rename = "Memory-Seconds")]
    pub memory_seconds: u64,
    #[tabled(rename = "VCore-Seconds")]
    pub vcore_seconds: u64,
}

impl BucketRow {
    fn new(group: impl Into<String>, bucket: &Bucket) -> Self {
        Self {
            group: group.into(),
            apps: bucket.count,
            allocated_gb: format_gb(bucket.sum_allocated_mb),
            allocated_vcores: bucket.sum_allocated_vcores,
            running_containers: bucket.sum_running_containers,
            memory_seconds: bucket.sum_memory_seconds,
            vcore_seconds: bucket.sum_vcore_seconds,
        }
    }
}

/// Aggregate records into table rows, ordered by group
pub fn bucket_rows(records: &[ApplicationRecord], by: GroupBy, pattern: &UserPattern) -> Vec<BucketRow> {
    let mut rows: Vec<BucketRow> = match by {
        GroupBy::Submittype => aggregate_by_submit_type(records, pattern)
            .iter()
            .map(|(submit_type, bucket)| BucketRow::new(submit_type.as_str(), bucket))
            .collect(),
        GroupBy::Queue | GroupBy::Apptype | GroupBy::User => {
            let dimension = match by {
                GroupBy::Queue => Dimension::Queue,
                GroupBy::Apptype => Dimension::AppType,
                _ => Dimension::User,
            };
            aggregate_by_dimension(records, dimension)
                .iter()
                .map(|(key, bucket)| BucketRow::new(dimension.tag(key), bucket))
                .collect()
        }
    };
    rows.sort_by(|a, b| a.group.cmp(&b.group));
    rows
}

/// Fetch applications and print them grouped
pub async fn show_apps(
    instance: InstanceConfig,
    by: GroupBy,
    status: Option<StatusFilter>,
    format: OutputFormat,
) -> Result<()> {
    let client = ResourceManagerClient::new(instance.endpoint.clone(), instance.timeout)?;

    let (title, records) = match status {
        None => {
            let apps = client.fetch_apps(&AppQuery::running()).await?;
            ("Running applications".to_string(), ApplicationRecord::from_json_list(&apps))
        }
        Some(status) => {
            let status = FinalStatus::from(status);
            let window = CollectionWindow::ending_at_time(&Utc::now());
            let query = AppQuery::Completed {
                status,
                finished_since_ms: Some(window.window_start_ms),
            };
            let apps = client.fetch_apps(&query).await?;
            let records = ApplicationRecord::from_json_list(&apps)
                .into_iter()
                .filter(|record| is_within_window(record, &window))
                .collect();
            (format!("Applications {} in the last hour", status.slug()), records)
        }
    };

    let rows = bucket_rows(&records, by, &instance.user_pattern);
    if let OutputFormat::Table = format {
        println!(
            "{} on {} ({} total)",
            title.bold(),
            instance.endpoint.host().cyan(),
            records.len()
        );
    }
    print_table(&rows, format);

    Ok(())
}
