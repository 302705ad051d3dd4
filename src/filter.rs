//! Record filtering for the map dashboard and analytics views: severity,
//! province, and date windows, applied to an in-memory snapshot without
//! mutating it.

use crate::record::{DetectionRecord, UnixTimeMs};
use crate::severity::Severity;
use crate::MS_PER_DAY;

/// A date constraint, mirroring the dashboard's filter control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateWindow {
    /// Same UTC-relative day as `now` (less than one whole day old).
    Today,
    /// At most this many whole days old. The dashboard presets are 7, 30,
    /// 90, and 365.
    PastDays(u32),
    /// Inclusive custom range.
    Custom { start: UnixTimeMs, end: UnixTimeMs },
}

impl DateWindow {
    /// Whether a record created at `ts` falls inside the window, evaluated
    /// against the caller-supplied `now`. Timestamps in the future count as
    /// zero days old.
    #[must_use]
    pub fn contains(self, ts: UnixTimeMs, now: UnixTimeMs) -> bool {
        match self {
            Self::Today => now.elapsed_since(ts) / MS_PER_DAY == 0,
            Self::PastDays(days) => now.elapsed_since(ts) / MS_PER_DAY <= u64::from(days),
            Self::Custom { start, end } => ts >= start && ts <= end,
        }
    }
}

/// Conjunction of the dashboard's filter controls. `None` fields match
/// everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub severity: Option<Severity>,
    pub province: Option<String>,
    pub window: Option<DateWindow>,
}

impl RecordFilter {
    #[must_use]
    pub fn matches(&self, record: &DetectionRecord, now: UnixTimeMs) -> bool {
        if let Some(severity) = self.severity {
            if record.severity() != severity {
                return false;
            }
        }
        if let Some(province) = self.province.as_deref() {
            if record.province() != Some(province) {
                return false;
            }
        }
        if let Some(window) = self.window {
            if !window.contains(record.created_at, now) {
                return false;
            }
        }
        true
    }

    /// Matching records in input order; the snapshot itself is untouched.
    #[must_use]
    pub fn apply<'a>(
        &self,
        records: &'a [DetectionRecord],
        now: UnixTimeMs,
    ) -> Vec<&'a DetectionRecord> {
        records.iter().filter(|r| self.matches(r, now)).collect()
    }
}

/// The map's plottable subset: records carrying a validated coordinate pair.
#[must_use]
pub fn with_coordinates(records: &[DetectionRecord]) -> Vec<&DetectionRecord> {
    records.iter().filter(|r| r.coordinates().is_some()).collect()
}

/// Leading `n` records of the (storage-ordered, newest-first) snapshot, as
/// shown in the dashboard's recent-detections card.
#[must_use]
pub fn recent(records: &[DetectionRecord], n: usize) -> &[DetectionRecord] {
    &records[..records.len().min(n)]
}
