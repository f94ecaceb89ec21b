//! Aggregate statistics over the full brief collection.
//!
//! Grouping is exact-match on the enumeration fields; buckets are ordered by
//! count descending, key ascending on ties (canonical string form).

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::storage::BriefStore;

/// One aggregation bucket. `total_hours` is only present for groupings that
/// sum a numeric field.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StatBucket {
    pub key: String,
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_hours: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatsSummary {
    pub total_briefs: u64,
    pub by_level: Vec<StatBucket>,
    pub by_status: Vec<StatBucket>,
    pub mean_hours_by_level: BTreeMap<String, f64>,
}

fn sort_buckets(buckets: &mut Vec<StatBucket>) {
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
}

/// Counts and total estimated hours per level.
pub async fn by_level(store: &BriefStore) -> Vec<StatBucket> {
    let mut groups: HashMap<String, (u64, u64)> = HashMap::new();
    for brief in store.all().await {
        let entry = groups.entry(brief.level.to_string()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += u64::from(brief.estimated_hours);
    }
    let mut buckets: Vec<StatBucket> = groups
        .into_iter()
        .map(|(key, (count, hours))| StatBucket { key, count, total_hours: Some(hours) })
        .collect();
    sort_buckets(&mut buckets);
    buckets
}

/// Counts per lifecycle status.
pub async fn by_status(store: &BriefStore) -> Vec<StatBucket> {
    let mut groups: HashMap<String, u64> = HashMap::new();
    for brief in store.all().await {
        *groups.entry(brief.status.to_string()).or_insert(0) += 1;
    }
    let mut buckets: Vec<StatBucket> = groups
        .into_iter()
        .map(|(key, count)| StatBucket { key, count, total_hours: None })
        .collect();
    sort_buckets(&mut buckets);
    buckets
}

/// Combined summary: total count, both groupings, mean hours per level.
pub async fn summary(store: &BriefStore) -> StatsSummary {
    let by_level = by_level(store).await;
    let by_status = by_status(store).await;
    let total_briefs: u64 = by_status.iter().map(|b| b.count).sum();

    let mean_hours_by_level = by_level
        .iter()
        .filter(|b| b.count > 0)
        .map(|b| {
            let hours = b.total_hours.unwrap_or(0) as f64;
            (b.key.clone(), hours / b.count as f64)
        })
        .collect();

    StatsSummary { total_briefs, by_level, by_status, mean_hours_by_level }
}
