//! Optional memoization of snapshot computation.
//!
//! The cache is explicit and opt-in at the call site: a hit returns a clone
//! of the stored snapshot, so hit and miss are bit-identical. Keys are a
//! 64-bit fingerprint of the record set plus the computation parameters.

use chrono::Duration;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};

use crate::analysis::metrics::compute_snapshot;
use crate::analysis::types::MetricsSnapshot;
use crate::record::StoppageRecord;

#[derive(Debug, Default)]
pub struct SnapshotCache {
    entries: HashMap<u64, MetricsSnapshot>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        SnapshotCache::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the cached snapshot for this input, computing and storing it
    /// on a miss.
    pub fn get_or_compute(
        &mut self,
        records: &[StoppageRecord],
        scheduled: Duration,
        critical_limit: Duration,
    ) -> MetricsSnapshot {
        let key = fingerprint(records, scheduled, critical_limit);

        if let Some(hit) = self.entries.get(&key) {
            return hit.clone();
        }

        let snapshot = compute_snapshot(records, scheduled, critical_limit);
        self.entries.insert(key, snapshot.clone());
        snapshot
    }
}

fn fingerprint(records: &[StoppageRecord], scheduled: Duration, critical_limit: Duration) -> u64 {
    let mut hasher = DefaultHasher::new();

    records.len().hash(&mut hasher);
    for record in records {
        record.machine.hash(&mut hasher);
        record.start.hash(&mut hasher);
        record.end.hash(&mut hasher);
        record.duration.num_seconds().hash(&mut hasher);
        record.cause.hash(&mut hasher);
        record.responsible_area.hash(&mut hasher);
    }
    scheduled.num_seconds().hash(&mut hasher);
    critical_limit.num_seconds().hash(&mut hasher);

    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RawStoppageRow, normalize};

    fn records() -> Vec<StoppageRecord> {
        let rows: Vec<RawStoppageRow> = (1..=4)
            .map(|d| RawStoppageRow {
                machine: Some("78".to_string()),
                start: Some(format!("2024-03-{:02} 08:00:00", d)),
                end: Some(format!("2024-03-{:02} 10:00:00", d)),
                duration: Some("02:00:00".to_string()),
                cause: Some("Setup".to_string()),
                responsible_area: Some("PCP".to_string()),
            })
            .collect();
        normalize(&rows)
    }

    #[test]
    fn test_hit_equals_miss() {
        let records = records();
        let mut cache = SnapshotCache::new();

        let miss = cache.get_or_compute(&records, Duration::hours(120), Duration::hours(1));
        assert_eq!(cache.len(), 1);

        let hit = cache.get_or_compute(&records, Duration::hours(120), Duration::hours(1));
        assert_eq!(cache.len(), 1);
        assert_eq!(miss, hit);
    }

    #[test]
    fn test_parameter_change_is_a_distinct_key() {
        let records = records();
        let mut cache = SnapshotCache::new();

        cache.get_or_compute(&records, Duration::hours(120), Duration::hours(1));
        cache.get_or_compute(&records, Duration::hours(240), Duration::hours(1));
        cache.get_or_compute(&records, Duration::hours(120), Duration::minutes(30));
        assert_eq!(cache.len(), 3);
    }
}
