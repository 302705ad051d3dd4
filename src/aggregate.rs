//! Grouping of detection records by arbitrary keys into ranked severity
//! tallies. One generic engine replaces the per-chart grouping the dashboard
//! surfaces would otherwise each reimplement (province rankings, daily trend
//! buckets, top-N lists).

use serde::Serialize;
use std::collections::HashMap;
use std::hash::Hash;

use crate::record::DetectionRecord;
use crate::severity::Severity;

/// Per-group severity tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupCounts {
    pub low: u32,
    pub moderate: u32,
    pub severe: u32,
    pub total: u32,
}

impl GroupCounts {
    pub(crate) fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Low => self.low += 1,
            Severity::Moderate => self.moderate += 1,
            Severity::Severe => self.severe += 1,
        }
        self.total += 1;
    }
}

/// One group produced by [`group_by`] or [`group_by_day`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeverityGroup<K> {
    pub key: K,
    pub counts: GroupCounts,
}

struct Accumulated<K> {
    key: K,
    first_seen: usize,
    counts: GroupCounts,
}

/// Tallies records into groups, preserving the order in which each group's
/// first contributing record appeared.
fn accumulate<K, F>(records: &[DetectionRecord], mut key_fn: F) -> Vec<Accumulated<K>>
where
    K: Eq + Hash + Clone,
    F: FnMut(&DetectionRecord) -> Option<K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<Accumulated<K>> = Vec::new();

    for (position, record) in records.iter().enumerate() {
        // Records without a key are excluded from every group; ungrouped
        // totals are the caller's concern.
        let Some(key) = key_fn(record) else { continue };
        let severity = record.severity();
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(Accumulated {
                key,
                first_seen: position,
                counts: GroupCounts::default(),
            });
            groups.len() - 1
        });
        groups[slot].counts.add(severity);
    }

    groups
}

/// Groups `records` by `key_fn`, ranked descending by total. Ties are broken
/// by first-seen order: the group whose first contributing record appears
/// earliest in the input sorts first. The tie-break is an explicit comparator
/// over the recorded first-seen position, not an artifact of sort stability.
///
/// Records for which `key_fn` returns `None` join no group. An empty input
/// yields an empty vec; this never fails.
pub fn group_by<K, F>(records: &[DetectionRecord], key_fn: F) -> Vec<SeverityGroup<K>>
where
    K: Eq + Hash + Clone,
    F: FnMut(&DetectionRecord) -> Option<K>,
{
    let mut groups = accumulate(records, key_fn);
    groups.sort_by(|a, b| {
        b.counts
            .total
            .cmp(&a.counts.total)
            .then(a.first_seen.cmp(&b.first_seen))
    });
    groups
        .into_iter()
        .map(|g| SeverityGroup { key: g.key, counts: g.counts })
        .collect()
}

/// Buckets records by UTC calendar day (`YYYY-MM-DD`), sorted chronologically.
/// Days with no records are simply absent — the sequence is sparse, never
/// gap-filled — and the result is never truncated. Timestamps that do not
/// represent a valid UTC instant join no bucket.
#[must_use]
pub fn group_by_day(records: &[DetectionRecord]) -> Vec<SeverityGroup<String>> {
    let mut groups = accumulate(records, day_key);
    groups.sort_by(|a, b| a.key.cmp(&b.key));
    groups
        .into_iter()
        .map(|g| SeverityGroup { key: g.key, counts: g.counts })
        .collect()
}

/// Count-ranked provinces, truncated to the top `n` after ordering.
#[must_use]
pub fn top_regions(records: &[DetectionRecord], n: usize) -> Vec<SeverityGroup<String>> {
    let mut groups = group_by(records, province_key);
    groups.truncate(n);
    groups
}

/// Key preset: the record's province, if any.
#[must_use]
pub fn province_key(record: &DetectionRecord) -> Option<String> {
    record.province().map(str::to_owned)
}

/// Key preset: the record's UTC calendar day, if representable.
#[must_use]
pub fn day_key(record: &DetectionRecord) -> Option<String> {
    record.created_at.utc_day_key()
}
