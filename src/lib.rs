//! Detection-interpretation core for the cocolisap monitoring dashboard.
//!
//! The surrounding product uploads farm photographs to a remote detection
//! service, persists the results, and renders dashboards. This crate owns the
//! pure transforms those surfaces share: severity classification, bounding-box
//! overlay rendering, record aggregation, and summary/export composition.
//! Network transport, storage, GPS capture, and UI are external collaborators;
//! every function here is synchronous and side-effect-free over in-memory
//! snapshots supplied by the caller.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod overlay;
pub mod record;
pub mod severity;
pub mod summary;

pub use aggregate::{group_by, group_by_day, top_regions, GroupCounts, SeverityGroup};
pub use filter::{DateWindow, RecordFilter};
pub use overlay::{
    render, render_encoded, AbGlyphTypeface, OverlayError, OverlayOptions, OverlayVariant,
    Typeface,
};
pub use record::{
    BoundingBox, DetectionInstance, DetectionRecord, LatLon, RecordId, Region, UnixTimeMs,
};
pub use severity::Severity;
pub use summary::{summarize, SummaryStats};

/// Default number of ranked regions surfaced by dashboards and reports.
pub const DEFAULT_TOP_REGIONS: usize = 5;

/// Milliseconds in one calendar day, used by rolling date windows.
pub const MS_PER_DAY: u64 = 24 * 60 * 60 * 1000;
