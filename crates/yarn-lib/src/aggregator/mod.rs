//! Grouped aggregation of application records
//!
//! Records are partitioned by equality on a selector key in a single pass;
//! no ordering over keys is needed. Each record updates the count, the
//! running sums and the running maxima of its bucket.

mod bucket;


pub use bucket::Bucket;

use std::collections::HashMap;
use std::hash::Hash;

use crate::classifier::{classify_submit_type, dimension_key, UserPattern};
use crate::models::{ApplicationRecord, Dimension, SubmitType};

/// Group records by `selector` and fold each group into a [`Bucket`]
///
/// An empty input yields an empty map.
pub fn aggregate_by<'a, K, I, F>(records: I, mut selector: F) -> HashMap<K, Bucket>
where
    K: Eq + Hash,
    I: IntoIterator<Item = &'a ApplicationRecord>,
    F: FnMut(&'a ApplicationRecord) -> K,
{
    let mut buckets: HashMap<K, Bucket> = HashMap::new();
    for record in records {
        buckets.entry(selector(record)).or_default().add(record);
    }
    buckets
}

/// Group records by one of the string dimensions
pub fn aggregate_by_dimension<'a, I>(records: I, dimension: Dimension) -> HashMap<String, Bucket>
where
    I: IntoIterator<Item = &'a ApplicationRecord>,
{
    aggregate_by(records, |record| {
        dimension_key(record, dimension).to_string()
    })
}

/// Group records by submit type
///
/// Both submit types are always present so that an absent class reports
/// zero rather than disappearing.
pub fn aggregate_by_submit_type<'a, I>(
    records: I,
    pattern: &UserPattern,
) -> HashMap<SubmitType, Bucket>
where
    I: IntoIterator<Item = &'a ApplicationRecord>,
{
    let mut buckets = aggregate_by(records, |record| classify_submit_type(record, pattern));
    for submit_type in SubmitType::ALL {
        buckets.entry(submit_type).or_default();
    }
    buckets
}

/// Fold every record into a single cluster-wide bucket
///
/// Zero records give an all-zero summary.
pub fn summarize<'a, I>(records: I) -> Bucket
where
    I: IntoIterator<Item = &'a ApplicationRecord>,
{
    records.into_iter().collect()
}
