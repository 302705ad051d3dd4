//! Content for the export collaborators. File creation, downloads, and
//! printing live outside the core; this module only composes what those
//! artifacts must contain: CSV rows for the analytics export and the
//! plain-text summary report.

use std::fmt::Write as _;

use crate::record::{DetectionRecord, UnixTimeMs};
use crate::summary::SummaryStats;

/// Column order of the analytics CSV.
pub const CSV_HEADER: [&str; 10] = [
    "Date",
    "Province",
    "Municipality",
    "Barangay",
    "Severity",
    "Total Detections",
    "Avg Confidence",
    "Farm Name",
    "Latitude",
    "Longitude",
];

/// One CSV row for a record, columns as [`CSV_HEADER`]. Optional fields
/// render as empty strings.
#[must_use]
pub fn csv_row(record: &DetectionRecord) -> [String; 10] {
    let region = record.region.as_ref();
    let coords = record.coordinates();
    [
        format_datetime(record.created_at),
        region.and_then(|r| r.province.clone()).unwrap_or_default(),
        region.and_then(|r| r.municipality.clone()).unwrap_or_default(),
        region.and_then(|r| r.barangay.clone()).unwrap_or_default(),
        record.severity().as_str().to_owned(),
        record.total_count.to_string(),
        format_confidence(record.avg_confidence),
        region.and_then(|r| r.farm_name.clone()).unwrap_or_default(),
        coords.map(|c| c.lat.to_string()).unwrap_or_default(),
        coords.map(|c| c.lon.to_string()).unwrap_or_default(),
    ]
}

/// The full CSV document: header line plus one row per record, fields quoted
/// where needed.
#[must_use]
pub fn csv_document(records: &[DetectionRecord]) -> String {
    let mut out = String::new();
    push_csv_line(&mut out, CSV_HEADER.iter().copied());
    for record in records {
        let row = csv_row(record);
        push_csv_line(&mut out, row.iter().map(String::as_str));
    }
    out
}

/// The plain-text analytics report: generation stamp, summary block, ranked
/// provinces, and per-record detail blocks.
#[must_use]
pub fn summary_report(
    records: &[DetectionRecord],
    stats: &SummaryStats,
    generated_at: UnixTimeMs,
) -> String {
    let mut out = String::new();
    out.push_str("COCOLISAP DETECTION ANALYTICS REPORT\n");
    let _ = writeln!(out, "Generated: {}", format_report_datetime(generated_at));
    out.push_str("================================================\n\n");

    out.push_str("SUMMARY STATISTICS\n------------------\n");
    let _ = writeln!(out, "Total Detections: {}", stats.total);
    let _ = writeln!(out, "Severe Cases: {}", stats.severe);
    let _ = writeln!(out, "Moderate Cases: {}", stats.moderate);
    let _ = writeln!(out, "Low Cases: {}", stats.low);
    let _ = writeln!(
        out,
        "Average Insects per Detection: {}",
        stats.avg_insects_per_record
    );

    out.push_str("\nTOP AFFECTED PROVINCES\n-----------------------\n");
    for (rank, group) in stats.top_regions.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {}: {} detections",
            rank + 1,
            group.key,
            group.counts.total
        );
    }

    out.push_str("\nDETAILED DATA\n-------------\n");
    let blocks: Vec<String> = records
        .iter()
        .enumerate()
        .map(|(i, r)| record_block(i + 1, r))
        .collect();
    out.push_str(&blocks.join("\n---\n"));

    out.push_str("\n\n================================================\n");
    out.push_str("Philippine Coconut Authority - Cocolisap Monitoring System\n");
    out
}

fn record_block(number: usize, record: &DetectionRecord) -> String {
    let region = record.region.as_ref();
    let mut block = String::new();
    let _ = writeln!(block, "Detection #{number}");
    let _ = writeln!(block, "Date: {}", format_datetime(record.created_at));

    let mut location = region
        .and_then(|r| r.province.clone())
        .unwrap_or_else(|| "N/A".to_owned());
    for part in [
        region.and_then(|r| r.municipality.as_deref()),
        region.and_then(|r| r.barangay.as_deref()),
    ]
    .into_iter()
    .flatten()
    {
        location.push_str(", ");
        location.push_str(part);
    }
    let _ = writeln!(block, "Location: {location}");

    let _ = writeln!(block, "Severity: {}", record.severity().as_str().to_uppercase());
    let _ = writeln!(block, "Total Detections: {}", record.total_count);
    let _ = writeln!(block, "Confidence: {}", format_confidence(record.avg_confidence));
    if let Some(farm) = region.and_then(|r| r.farm_name.as_deref()) {
        let _ = writeln!(block, "Farm: {farm}");
    }
    match record.coordinates() {
        Some(c) => {
            let _ = writeln!(block, "Coordinates: {:.6}, {:.6}", c.lat, c.lon);
        }
        None => block.push_str("Coordinates: N/A\n"),
    }
    block
}

fn push_csv_line<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        first = false;
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
}

fn format_confidence(avg: f32) -> String {
    format!("{:.1}%", f64::from(avg) * 100.0)
}

fn format_datetime(ts: UnixTimeMs) -> String {
    ts.datetime_utc()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

fn format_report_datetime(ts: UnixTimeMs) -> String {
    ts.datetime_utc()
        .map(|dt| dt.format("%B %d, %Y - %H:%M:%S").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{LatLon, RecordId, Region};
    use crate::summary::summarize;

    fn record(province: &str, count: u32) -> DetectionRecord {
        DetectionRecord {
            id: RecordId::generate(),
            instances: Vec::new(),
            total_count: count,
            avg_confidence: 0.873,
            // 2024-01-01T10:30:00Z
            created_at: UnixTimeMs(1_704_105_000_000),
            processing_time_ms: None,
            region: Some(Region {
                province: Some(province.to_owned()),
                municipality: Some("Sariaya".to_owned()),
                barangay: None,
                farm_name: Some("Dela Cruz Farm".to_owned()),
                farm_owner: None,
                coordinates: LatLon::new(13.962, 121.526),
            }),
        }
    }

    #[test]
    fn csv_row_matches_column_contract() {
        let row = csv_row(&record("Quezon", 12));
        assert_eq!(row[0], "2024-01-01 10:30:00");
        assert_eq!(row[1], "Quezon");
        assert_eq!(row[2], "Sariaya");
        assert_eq!(row[3], "");
        assert_eq!(row[4], "severe");
        assert_eq!(row[5], "12");
        assert_eq!(row[6], "87.3%");
        assert_eq!(row[7], "Dela Cruz Farm");
        assert_eq!(row[8], "13.962");
        assert_eq!(row[9], "121.526");
    }

    #[test]
    fn csv_document_has_header_and_rows() {
        let records = vec![record("Quezon", 2), record("Cebu", 7)];
        let doc = csv_document(&records);
        let lines: Vec<&str> = doc.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Date,Province,Municipality"));
        assert!(lines[1].contains("low"));
        assert!(lines[2].contains("moderate"));
    }

    #[test]
    fn csv_quotes_fields_containing_commas() {
        let mut r = record("Quezon", 1);
        r.region.as_mut().unwrap().farm_name = Some("Reyes, Sons \"East\"".to_owned());
        let doc = csv_document(&[r]);
        assert!(doc.contains("\"Reyes, Sons \"\"East\"\"\""));
    }

    #[test]
    fn summary_report_contains_stats_and_blocks() {
        let records = vec![record("Quezon", 12), record("Cebu", 2)];
        let stats = summarize(&records, 5);
        let report = summary_report(&records, &stats, UnixTimeMs(1_704_105_000_000));

        assert!(report.starts_with("COCOLISAP DETECTION ANALYTICS REPORT"));
        assert!(report.contains("Generated: January 01, 2024 - 10:30:00"));
        assert!(report.contains("Total Detections: 2"));
        assert!(report.contains("Severe Cases: 1"));
        assert!(report.contains("1. Quezon: 1 detections"));
        assert!(report.contains("Detection #1"));
        assert!(report.contains("Severity: SEVERE"));
        assert!(report.contains("Location: Quezon, Sariaya"));
        assert!(report.contains("Coordinates: 13.962000, 121.526000"));
        assert!(report.contains("\n---\n"));
        assert!(report.trim_end().ends_with("Cocolisap Monitoring System"));
    }

    #[test]
    fn missing_region_renders_placeholders() {
        let mut r = record("Quezon", 1);
        r.region = None;
        let block = record_block(1, &r);
        assert!(block.contains("Location: N/A"));
        assert!(block.contains("Coordinates: N/A"));
    }
}
