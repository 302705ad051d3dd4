//! Whole-collection statistic bundles consumed by the dashboard header,
//! exports, and the printable report.

use serde::Serialize;

use crate::aggregate::{top_regions, SeverityGroup};
use crate::record::DetectionRecord;
use crate::severity::Severity;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total: u32,
    pub low: u32,
    pub moderate: u32,
    pub severe: u32,
    /// Mean `total_count` across records, rounded to one decimal place.
    pub avg_insects_per_record: f64,
    pub top_regions: Vec<SeverityGroup<String>>,
}

/// Summarizes a record snapshot as one implicit group plus the top-`n`
/// province ranking. Pure; an empty snapshot yields all-zero stats.
#[must_use]
pub fn summarize(records: &[DetectionRecord], top_n: usize) -> SummaryStats {
    let mut low = 0u32;
    let mut moderate = 0u32;
    let mut severe = 0u32;
    let mut insects = 0u64;

    for record in records {
        match record.severity() {
            Severity::Low => low += 1,
            Severity::Moderate => moderate += 1,
            Severity::Severe => severe += 1,
        }
        insects += u64::from(record.total_count);
    }

    let total = records.len() as u32;
    let avg_insects_per_record = if records.is_empty() {
        0.0
    } else {
        let mean = insects as f64 / f64::from(total);
        (mean * 10.0).round() / 10.0
    };

    SummaryStats {
        total,
        low,
        moderate,
        severe,
        avg_insects_per_record,
        top_regions: top_regions(records, top_n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RecordId, Region, UnixTimeMs};

    fn record(province: Option<&str>, count: u32) -> DetectionRecord {
        DetectionRecord {
            id: RecordId::generate(),
            instances: Vec::new(),
            total_count: count,
            avg_confidence: 0.8,
            created_at: UnixTimeMs(1_704_067_200_000),
            processing_time_ms: None,
            region: province.map(|p| Region {
                province: Some(p.to_owned()),
                ..Region::default()
            }),
        }
    }

    #[test]
    fn empty_snapshot_is_all_zero() {
        let stats = summarize(&[], 5);
        assert_eq!(
            stats,
            SummaryStats {
                total: 0,
                low: 0,
                moderate: 0,
                severe: 0,
                avg_insects_per_record: 0.0,
                top_regions: Vec::new(),
            }
        );
    }

    #[test]
    fn tallies_severities_and_average() {
        let records = vec![
            record(Some("Batangas"), 2),
            record(Some("Batangas"), 7),
            record(Some("Quezon"), 12),
        ];
        let stats = summarize(&records, 5);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.low, 1);
        assert_eq!(stats.moderate, 1);
        assert_eq!(stats.severe, 1);
        // (2 + 7 + 12) / 3 = 7.0
        assert!((stats.avg_insects_per_record - 7.0).abs() < f64::EPSILON);
        assert_eq!(stats.top_regions[0].key, "Batangas");
    }

    #[test]
    fn average_rounds_to_one_decimal() {
        let records = vec![record(None, 1), record(None, 1), record(None, 2)];
        // 4 / 3 = 1.333... -> 1.3
        let stats = summarize(&records, 5);
        assert!((stats.avg_insects_per_record - 1.3).abs() < 1e-9);
    }

    #[test]
    fn top_regions_respects_n() {
        let records = vec![
            record(Some("A"), 1),
            record(Some("B"), 1),
            record(Some("C"), 1),
        ];
        assert_eq!(summarize(&records, 2).top_regions.len(), 2);
    }
}
