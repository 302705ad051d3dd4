//! Bounding-box overlay rendering.
//!
//! The renderer turns a base photograph plus a list of detection instances
//! into an annotated copy: box frames, optional corner accents, confidence
//! labels with collision-aware placement, and optional index markers. Drawing
//! is split into a pure layout stage that emits a display list of primitive
//! ops and a raster stage that applies the list, so the geometry is testable
//! without touching pixels and the pixel work needs no geometry.
//!
//! Output guarantees: same dimensions as the base, deterministic for
//! identical inputs, and the base image is never mutated. Malformed instances
//! are skipped with a warning; only a failed decode of the base image is
//! fatal.

mod layout;
mod raster;

use image::{Rgba, RgbaImage};
use thiserror::Error;
use tracing::debug;

use crate::record::DetectionInstance;

pub use raster::AbGlyphTypeface;

/// Fixed box/label accent. Not semantically meaningful; chosen for contrast
/// over foliage.
pub(crate) const ACCENT_COLOR: Rgba<u8> = Rgba([245, 158, 11, 255]);
pub(crate) const LABEL_TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);
/// Index markers sit directly on the photo, so they carry alpha.
pub(crate) const INDEX_COLOR: Rgba<u8> = Rgba([0, 0, 0, 153]);

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("input bytes empty")]
    EmptyInput,

    #[error("input too large: {size} bytes, max {max}")]
    InputTooLarge { size: usize, max: usize },

    #[error("unsupported image format")]
    UnsupportedFormat,

    #[error("failed to decode base image: {source}")]
    Decode {
        #[from]
        source: image::ImageError,
    },

    #[error("image too large: {width}x{height} pixels, max {max_pixels}")]
    ImageTooLarge {
        width: u32,
        height: u32,
        max_pixels: u64,
    },

    #[error("font parse failed")]
    FontLoad(#[source] ab_glyph::InvalidFont),
}

/// Which surface the overlay is rendered for. The printable report uses
/// slightly smaller geometry and confidence-only labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayVariant {
    #[default]
    Detail,
    Report,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayOptions {
    pub variant: OverlayVariant,
    pub show_index: bool,
    pub show_corner_accents: bool,
}

impl OverlayOptions {
    /// Interactive result view: full labels, indices, and corner accents.
    #[must_use]
    pub const fn detail() -> Self {
        Self {
            variant: OverlayVariant::Detail,
            show_index: true,
            show_corner_accents: true,
        }
    }

    /// Printable report: plain frames with confidence-only labels.
    #[must_use]
    pub const fn report() -> Self {
        Self {
            variant: OverlayVariant::Report,
            show_index: false,
            show_corner_accents: false,
        }
    }
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self::detail()
    }
}

/// Text primitives the renderer needs from a font backend: measure a run and
/// rasterize it. Implementable over any glyph source; the shipped
/// implementation is [`AbGlyphTypeface`].
pub trait Typeface {
    /// Width in pixels of `text` at `size` pixels.
    fn text_width(&self, text: &str, size: f32) -> f32;

    /// Draws `text` with its top-left corner at `(x, y)`.
    fn draw_text(
        &self,
        image: &mut RgbaImage,
        text: &str,
        size: f32,
        x: i32,
        y: i32,
        color: Rgba<u8>,
    );
}

/// Renders the overlay onto a copy of `base`. The base is left untouched;
/// instances with undrawable boxes are skipped. An empty instance list
/// returns an unmodified copy.
#[must_use]
pub fn render(
    base: &RgbaImage,
    instances: &[DetectionInstance],
    options: &OverlayOptions,
    face: &dyn Typeface,
) -> RgbaImage {
    let mut annotated = base.clone();
    let ops = layout::build_ops(base.width(), instances, options, face);
    debug!(
        instances = instances.len(),
        ops = ops.len(),
        width = base.width(),
        height = base.height(),
        "overlay plan built"
    );
    raster::apply_ops(&mut annotated, &ops, face);
    annotated
}

/// Decodes an encoded base image (bounded against decompression bombs) and
/// renders the overlay onto it. Decode failure is fatal: no partial overlay
/// is produced.
///
/// # Errors
///
/// Returns [`OverlayError`] if the bytes are empty, oversized, of an unknown
/// format, or fail to decode.
pub fn render_encoded(
    base_bytes: &[u8],
    instances: &[DetectionInstance],
    options: &OverlayOptions,
    face: &dyn Typeface,
) -> Result<RgbaImage, OverlayError> {
    let mut annotated = raster::decode_base_image(base_bytes)?;
    let ops = layout::build_ops(annotated.width(), instances, options, face);
    raster::apply_ops(&mut annotated, &ops, face);
    Ok(annotated)
}
