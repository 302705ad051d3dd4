//! Data model shared with the inference and storage collaborators.
//!
//! A [`DetectionRecord`] is one completed analysis of one photograph. The core
//! never mutates a record once built; it only derives views (overlay images,
//! aggregated statistics) from read-only snapshots.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;
use uuid::Uuid;

use crate::severity::Severity;

/// Explicit timestamp unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnixTimeMs(pub u64);

impl UnixTimeMs {
    #[must_use]
    pub fn now() -> Self {
        let ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self(ms)
    }

    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn elapsed_since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// UTC timestamp as a `chrono` datetime, `None` if the value does not
    /// represent a valid UTC instant.
    #[must_use]
    pub fn datetime_utc(self) -> Option<chrono::DateTime<chrono::Utc>> {
        i64::try_from(self.0)
            .ok()
            .and_then(chrono::DateTime::from_timestamp_millis)
    }

    /// UTC calendar-day key (`YYYY-MM-DD`), the grouping key used by trend
    /// charts. `None` for timestamps outside the representable range.
    #[must_use]
    pub fn utc_day_key(self) -> Option<String> {
        self.datetime_utc().map(|dt| dt.format("%Y-%m-%d").to_string())
    }
}

/// Opaque record identifier, assigned by the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl RecordId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated lat/lon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) {
            return None;
        }
        if !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        Some(Self { lat, lon })
    }
}

/// Structured farm location, used only as a grouping key by the aggregation
/// engine and echoed into exports. Opaque to everything else.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub province: Option<String>,
    pub municipality: Option<String>,
    pub barangay: Option<String>,
    pub farm_name: Option<String>,
    pub farm_owner: Option<String>,
    pub coordinates: Option<LatLon>,
}

/// Bounding box in the pixel coordinate space of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Whether the renderer may draw this box: all fields finite and a
    /// strictly positive area.
    #[must_use]
    pub fn is_drawable(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// One detected object within an analyzed image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionInstance {
    pub bbox: BoundingBox,
    /// Expected in `[0, 1]` but tolerated outside that range; clamped only
    /// when formatted for percentage display.
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl DetectionInstance {
    /// Label text shown to users; absent labels get a placeholder, never an
    /// empty string.
    #[must_use]
    pub fn display_label(&self) -> &str {
        match self.label.as_deref() {
            Some(l) if !l.is_empty() => l,
            _ => "unknown",
        }
    }

    /// Confidence as a whole-number percentage, clamped to `0..=100`.
    #[must_use]
    pub fn confidence_percent(&self) -> u32 {
        if self.confidence.is_finite() {
            (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u32
        } else {
            0
        }
    }
}

/// One completed analysis of one image.
///
/// `total_count` equals `instances.len()` for records built through
/// [`DetectionRecord::from_analysis`]. Historical records restored from
/// storage may carry a count without the retained `instances` payload, in
/// which case `total_count` is authoritative for severity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub id: RecordId,
    pub instances: Vec<DetectionInstance>,
    pub total_count: u32,
    pub avg_confidence: f32,
    pub created_at: UnixTimeMs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
}

impl DetectionRecord {
    /// Builds a record from a fresh analysis, deriving `total_count` and
    /// `avg_confidence` from the instance list.
    #[must_use]
    pub fn from_analysis(
        id: RecordId,
        instances: Vec<DetectionInstance>,
        created_at: UnixTimeMs,
        region: Option<Region>,
    ) -> Self {
        let total_count = instances.len() as u32;
        let avg_confidence = mean_confidence(&instances);
        Self {
            id,
            instances,
            total_count,
            avg_confidence,
            created_at,
            processing_time_ms: None,
            region,
        }
    }

    #[must_use]
    pub fn with_processing_time(mut self, ms: u32) -> Self {
        self.processing_time_ms = Some(ms);
        self
    }

    /// Severity is always recomputed from `total_count`; it is never stored,
    /// so a stale or tampered severity field cannot disagree with the count.
    #[must_use]
    pub fn severity(&self) -> Severity {
        Severity::classify(self.total_count)
    }

    #[must_use]
    pub fn province(&self) -> Option<&str> {
        self.region.as_ref()?.province.as_deref()
    }

    #[must_use]
    pub fn coordinates(&self) -> Option<LatLon> {
        self.region.as_ref()?.coordinates
    }
}

/// Mean confidence across instances; `0.0` for an empty list. Non-finite
/// confidences contribute `0.0` to the mean so a single poisoned value cannot
/// turn the whole record's average into NaN.
#[must_use]
pub fn mean_confidence(instances: &[DetectionInstance]) -> f32 {
    if instances.is_empty() {
        return 0.0;
    }
    let mut sum = 0.0f64;
    for instance in instances {
        if instance.confidence.is_finite() {
            sum += f64::from(instance.confidence);
        } else {
            warn!(confidence = ?instance.confidence, "non-finite confidence treated as 0");
        }
    }
    (sum / instances.len() as f64) as f32
}
