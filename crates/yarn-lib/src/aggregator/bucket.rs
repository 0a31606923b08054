//! Per-group summary statistics

use serde::{Deserialize, Serialize};

use crate::models::ApplicationRecord;

const MB_PER_GB: f64 = 1_000.0;
const MB_PER_TB: f64 = 1_000_000.0;

/// Counts, sums and maxima over the records sharing one dimension value
///
/// An empty bucket has every field at zero, which is also the maximum
/// reported for a group without records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub count: u64,
    pub sum_allocated_mb: u64,
    pub sum_allocated_vcores: u64,
    pub sum_running_containers: u64,
    pub sum_memory_seconds: u64,
    pub sum_vcore_seconds: u64,
    pub max_elapsed_time_ms: u64,
    pub max_allocated_mb: u64,
    pub max_allocated_vcores: u64,
    pub max_running_containers: u64,
    pub max_memory_seconds: u64,
    pub max_vcore_seconds: u64,
}

impl Bucket {
    /// Fold one record into the bucket
    pub fn add(&mut self, record: &ApplicationRecord) {
        self.count = self.count.saturating_add(1);

        self.sum_allocated_mb = self.sum_allocated_mb.saturating_add(record.allocated_mb);
        self.sum_allocated_vcores = self
            .sum_allocated_vcores
            .saturating_add(record.allocated_vcores);
        self.sum_running_containers = self
            .sum_running_containers
            .saturating_add(record.running_containers);
        self.sum_memory_seconds = self.sum_memory_seconds.saturating_add(record.memory_seconds);
        self.sum_vcore_seconds = self.sum_vcore_seconds.saturating_add(record.vcore_seconds);

        self.max_elapsed_time_ms = self.max_elapsed_time_ms.max(record.elapsed_time_ms);
        self.max_allocated_mb = self.max_allocated_mb.max(record.allocated_mb);
        self.max_allocated_vcores = self.max_allocated_vcores.max(record.allocated_vcores);
        self.max_running_containers = self.max_running_containers.max(record.running_containers);
        self.max_memory_seconds = self.max_memory_seconds.max(record.memory_seconds);
        self.max_vcore_seconds = self.max_vcore_seconds.max(record.vcore_seconds);
    }

    /// Combine two buckets as if their records had been folded together
    pub fn merge(&self, other: &Bucket) -> Bucket {
        Bucket {
            count: self.count.saturating_add(other.count),
            sum_allocated_mb: self.sum_allocated_mb.saturating_add(other.sum_allocated_mb),
            sum_allocated_vcores: self
                .sum_allocated_vcores
                .saturating_add(other.sum_allocated_vcores),
            sum_running_containers: self
                .sum_running_containers
                .saturating_add(other.sum_running_containers),
            sum_memory_seconds: self
                .sum_memory_seconds
                .saturating_add(other.sum_memory_seconds),
            sum_vcore_seconds: self.sum_vcore_seconds.saturating_add(other.sum_vcore_seconds),
            max_elapsed_time_ms: self.max_elapsed_time_ms.max(other.max_elapsed_time_ms),
            max_allocated_mb: self.max_allocated_mb.max(other.max_allocated_mb),
            max_allocated_vcores: self.max_allocated_vcores.max(other.max_allocated_vcores),
            max_running_containers: self
                .max_running_containers
                .max(other.max_running_containers),
            max_memory_seconds: self.max_memory_seconds.max(other.max_memory_seconds),
            max_vcore_seconds: self.max_vcore_seconds.max(other.max_vcore_seconds),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Total allocated memory in gigabytes (1 GB = 1000 MB)
    pub fn allocated_gb(&self) -> f64 {
        self.sum_allocated_mb as f64 / MB_PER_GB
    }

    /// Total allocated memory in terabytes (1 TB = 1,000,000 MB)
    pub fn allocated_tb(&self) -> f64 {
        self.sum_allocated_mb as f64 / MB_PER_TB
    }

    /// Largest single allocation in gigabytes
    pub fn max_allocated_gb(&self) -> f64 {
        self.max_allocated_mb as f64 / MB_PER_GB
    }
}

impl<'a> FromIterator<&'a ApplicationRecord> for Bucket {
    fn from_iter<I: IntoIterator<Item = &'a ApplicationRecord>>(iter: I) -> Self {
        let mut bucket = Bucket::default();
        for record in iter {
            bucket.add(record);
        }
        bucket
    }
}
