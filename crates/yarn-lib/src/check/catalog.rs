//! Names and tags of every metric the check emits

use crate::aggregator::Bucket;
use crate::models::{Dimension, FinalStatus, SubmitType};

/// Group of related metrics, identified by a base tag on each of them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricFamily {
    Cluster,
    SubmitType,
    Queue,
    AppType,
    Completed,
}

impl MetricFamily {
    pub fn base_tag(&self) -> &'static str {
        match self {
            MetricFamily::Cluster => "yarn_cluster",
            MetricFamily::SubmitType => "yarn_submittype",
            MetricFamily::Queue => "yarn_queue",
            MetricFamily::AppType => "yarn_apptype",
            MetricFamily::Completed => "yarn_completed",
        }
    }
}

pub const RUNNING_APPS: &str = "yarn.apps.running";
pub const QUEUED_APPS: &str = "yarn.apps.queued";
pub const ALLOCATED_GB: &str = "yarn.apps.allocated_gb";
pub const ALLOCATED_TB: &str = "yarn.apps.allocated_tb";
pub const ALLOCATED_VCORES: &str = "yarn.apps.allocated_vcores";
pub const RUNNING_CONTAINERS: &str = "yarn.apps.running_containers";
pub const MAX_ELAPSED_TIME: &str = "yarn.apps.max_elapsed_time";
pub const MAX_ALLOCATED_GB: &str = "yarn.apps.max_allocated_gb";
pub const MAX_ALLOCATED_VCORES: &str = "yarn.apps.max_allocated_vcores";
pub const MAX_RUNNING_CONTAINERS: &str = "yarn.apps.max_running_containers";
pub const MAX_MEMORY_SECONDS: &str = "yarn.apps.max_memory_seconds";
pub const MAX_VCORE_SECONDS: &str = "yarn.apps.max_vcore_seconds";

pub const SUBMIT_TYPE_APPS: &str = "yarn.submittype.apps";

/// Cluster-wide gauges derived from the running-apps summary
pub fn cluster_values(cluster: &Bucket) -> [(&'static str, f64); 11] {
    [
        (RUNNING_APPS, cluster.count as f64),
        (ALLOCATED_GB, cluster.allocated_gb()),
        (ALLOCATED_TB, cluster.allocated_tb()),
        (ALLOCATED_VCORES, cluster.sum_allocated_vcores as f64),
        (RUNNING_CONTAINERS, cluster.sum_running_containers as f64),
        (MAX_ELAPSED_TIME, cluster.max_elapsed_time_ms as f64),
        (MAX_ALLOCATED_GB, cluster.max_allocated_gb()),
        (MAX_ALLOCATED_VCORES, cluster.max_allocated_vcores as f64),
        (MAX_RUNNING_CONTAINERS, cluster.max_running_containers as f64),
        (MAX_MEMORY_SECONDS, cluster.max_memory_seconds as f64),
        (MAX_VCORE_SECONDS, cluster.max_vcore_seconds as f64),
    ]
}

/// Metric names of a per-bucket breakdown family
#[derive(Debug, Clone, Copy)]
pub struct BreakdownNames {
    pub family: MetricFamily,
    pub dimension: Dimension,
    pub apps: &'static str,
    pub allocated_gb: &'static str,
    pub allocated_vcores: &'static str,
    pub running_containers: &'static str,
    pub total_memory_seconds: &'static str,
    pub total_vcore_seconds: &'static str,
}

impl BreakdownNames {
    pub fn values(&self, bucket: &Bucket) -> [(&'static str, f64); 6] {
        [
            (self.apps, bucket.count as f64),
            (self.allocated_gb, bucket.allocated_gb()),
            (self.allocated_vcores, bucket.sum_allocated_vcores as f64),
            (self.running_containers, bucket.sum_running_containers as f64),
            (self.total_memory_seconds, bucket.sum_memory_seconds as f64),
            (self.total_vcore_seconds, bucket.sum_vcore_seconds as f64),
        ]
    }

    /// Family and dimension tags for one bucket
    pub fn tags(&self, key: &str) -> Vec<String> {
        vec![
            self.family.base_tag().to_string(),
            self.dimension.tag(key),
        ]
    }
}

pub const QUEUE: BreakdownNames = BreakdownNames {
    family: MetricFamily::Queue,
    dimension: Dimension::Queue,
    apps: "yarn.queue.apps",
    allocated_gb: "yarn.queue.allocated_gb",
    allocated_vcores: "yarn.queue.allocated_vcores",
    running_containers: "yarn.queue.running_containers",
    total_memory_seconds: "yarn.queue.total_memory_seconds",
    total_vcore_seconds: "yarn.queue.total_vcore_seconds",
};

pub const APP_TYPE: BreakdownNames = BreakdownNames {
    family: MetricFamily::AppType,
    dimension: Dimension::AppType,
    apps: "yarn.apptype.apps",
    allocated_gb: "yarn.apptype.allocated_gb",
    allocated_vcores: "yarn.apptype.allocated_vcores",
    running_containers: "yarn.apptype.running_containers",
    total_memory_seconds: "yarn.apptype.total_memory_seconds",
    total_vcore_seconds: "yarn.apptype.total_vcore_seconds",
};

/// Dimensions the completed-applications counts are broken out by
pub const COMPLETED_DIMENSIONS: [Dimension; 3] =
    [Dimension::Queue, Dimension::AppType, Dimension::User];

pub fn cluster_tags() -> Vec<String> {
    vec![MetricFamily::Cluster.base_tag().to_string()]
}

pub fn submit_type_tags(submit_type: SubmitType) -> Vec<String> {
    vec![
        MetricFamily::SubmitType.base_tag().to_string(),
        format!("submittype:{}", submit_type),
    ]
}

/// Name of a completed-applications count, e.g. `yarn.completed.failed.by_queue`
pub fn completed_metric(status: FinalStatus, dimension: Dimension) -> String {
    format!("yarn.completed.{}.by_{}", status.slug(), dimension.tag_key())
}

pub fn completed_tags(status: FinalStatus, dimension: Dimension, key: &str) -> Vec<String> {
    vec![
        MetricFamily::Completed.base_tag().to_string(),
        format!("status:{}", status.slug()),
        dimension.tag(key),
    ]
}
