//! End-to-end scenarios: a season of detection records flows through
//! filtering, aggregation, summary composition, and export content; a fresh
//! analysis flows through the overlay renderer.

use cocolisap_core::{
    export, filter, group_by_day, render_encoded, summarize, BoundingBox, DateWindow,
    DetectionInstance, DetectionRecord, LatLon, OverlayOptions, RecordFilter, RecordId, Region,
    Severity, Typeface, UnixTimeMs, MS_PER_DAY,
};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};

/// Fixed-advance block typeface so pixel output is deterministic without a
/// bundled font.
struct BlockTypeface;

impl Typeface for BlockTypeface {
    fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * 0.5
    }

    fn draw_text(
        &self,
        image: &mut RgbaImage,
        text: &str,
        size: f32,
        x: i32,
        y: i32,
        color: Rgba<u8>,
    ) {
        let advance = (size * 0.5).max(1.0) as i64;
        let glyph_w = (size * 0.4).max(1.0) as u32;
        let glyph_h = size.max(1.0) as u32;
        for i in 0..text.chars().count() as i64 {
            let gx = i64::from(x) + i * advance;
            for dy in 0..glyph_h {
                for dx in 0..glyph_w {
                    let px = gx + i64::from(dx);
                    let py = i64::from(y) + i64::from(dy);
                    if px >= 0
                        && py >= 0
                        && (px as u32) < image.width()
                        && (py as u32) < image.height()
                    {
                        image.put_pixel(px as u32, py as u32, color);
                    }
                }
            }
        }
    }
}

// 2024-03-01T00:00:00Z
const SEASON_START: u64 = 1_709_251_200_000;
const NOW: UnixTimeMs = UnixTimeMs(SEASON_START + 10 * MS_PER_DAY);

fn record(province: &str, count: u32, days_in: u64) -> DetectionRecord {
    DetectionRecord {
        id: RecordId::generate(),
        instances: Vec::new(),
        total_count: count,
        avg_confidence: 0.82,
        created_at: UnixTimeMs(SEASON_START + days_in * MS_PER_DAY),
        processing_time_ms: Some(412),
        region: Some(Region {
            province: Some(province.to_owned()),
            municipality: None,
            barangay: None,
            farm_name: None,
            farm_owner: None,
            coordinates: LatLon::new(13.9, 121.5),
        }),
    }
}

fn season_records() -> Vec<DetectionRecord> {
    vec![
        record("Quezon", 12, 0),
        record("Batangas", 3, 0),
        record("Quezon", 7, 2),
        record("Cebu", 1, 2),
        record("Batangas", 15, 6),
        record("Quezon", 2, 9),
    ]
}

#[test]
fn season_snapshot_summarizes_and_exports() {
    let records = season_records();

    let stats = summarize(&records, 5);
    assert_eq!(stats.total, 6);
    assert_eq!(stats.severe, 2);
    assert_eq!(stats.moderate, 1);
    assert_eq!(stats.low, 3);
    // (12 + 3 + 7 + 1 + 15 + 2) / 6 = 6.666... -> 6.7
    assert!((stats.avg_insects_per_record - 6.7).abs() < 1e-9);

    // Quezon (3 records, first seen first) ranks ahead of Batangas (2), Cebu (1).
    let keys: Vec<&str> = stats.top_regions.iter().map(|g| g.key.as_str()).collect();
    assert_eq!(keys, ["Quezon", "Batangas", "Cebu"]);

    let trend = group_by_day(&records);
    let days: Vec<&str> = trend.iter().map(|g| g.key.as_str()).collect();
    assert_eq!(days, ["2024-03-01", "2024-03-03", "2024-03-07", "2024-03-10"]);
    assert_eq!(trend[0].counts.total, 2);

    let csv = export::csv_document(&records);
    assert_eq!(csv.lines().count(), 7);
    assert!(csv.lines().nth(1).unwrap().contains("Quezon"));
    assert!(csv.lines().nth(1).unwrap().contains("severe"));

    let report = export::summary_report(&records, &stats, NOW);
    assert!(report.contains("Total Detections: 6"));
    assert!(report.contains("1. Quezon: 3 detections"));
    assert!(report.contains("Detection #6"));
}

#[test]
fn dashboard_filters_narrow_the_snapshot() {
    let records = season_records();

    let severe_in_quezon = RecordFilter {
        severity: Some(Severity::Severe),
        province: Some("Quezon".into()),
        window: None,
    };
    let hits = severe_in_quezon.apply(&records, NOW);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].total_count, 12);

    let last_week = RecordFilter {
        severity: None,
        province: None,
        window: Some(DateWindow::PastDays(7)),
    };
    // Days 6 and 9 fall within the window ending at day 10.
    assert_eq!(last_week.apply(&records, NOW).len(), 2);

    // Filtered snapshots feed the same summary path.
    let filtered: Vec<DetectionRecord> =
        last_week.apply(&records, NOW).into_iter().cloned().collect();
    let stats = summarize(&filtered, 5);
    assert_eq!(stats.total, 2);
    assert_eq!(stats.severe, 1);

    assert_eq!(filter::with_coordinates(&records).len(), 6);
}

#[test]
fn fresh_analysis_renders_an_annotated_copy() {
    let base = RgbaImage::from_fn(320, 240, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 40, 255])
    });
    let mut encoded = Vec::new();
    PngEncoder::new(&mut encoded)
        .write_image(base.as_raw(), 320, 240, ExtendedColorType::Rgba8)
        .unwrap();

    let instances = vec![
        DetectionInstance {
            bbox: BoundingBox::new(30.0, 5.0, 80.0, 60.0),
            confidence: 0.93,
            label: Some("cocolisap".into()),
        },
        DetectionInstance {
            bbox: BoundingBox::new(180.0, 120.0, 70.0, 50.0),
            confidence: 0.41,
            label: None,
        },
        // Malformed payload entry; must be skipped, not fatal.
        DetectionInstance {
            bbox: BoundingBox::new(f32::NAN, 0.0, 10.0, 10.0),
            confidence: 0.9,
            label: None,
        },
    ];

    let annotated =
        render_encoded(&encoded, &instances, &OverlayOptions::detail(), &BlockTypeface).unwrap();
    assert_eq!(annotated.dimensions(), (320, 240));
    assert_ne!(annotated.as_raw(), base.as_raw());

    // Deterministic end to end.
    let again =
        render_encoded(&encoded, &instances, &OverlayOptions::detail(), &BlockTypeface).unwrap();
    assert_eq!(annotated.as_raw(), again.as_raw());

    // The record built from the same analysis classifies consistently.
    let record = DetectionRecord::from_analysis(
        RecordId::generate(),
        instances,
        UnixTimeMs(SEASON_START),
        None,
    );
    assert_eq!(record.total_count, 3);
    assert_eq!(record.severity(), Severity::Low);
}

#[test]
fn decode_failure_is_fatal_and_produces_nothing() {
    let result = render_encoded(
        &[0xde, 0xad, 0xbe, 0xef],
        &[],
        &OverlayOptions::report(),
        &BlockTypeface,
    );
    assert!(result.is_err());
}
