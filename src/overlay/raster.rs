//! Raster stage: bounded decoding of the base image and application of the
//! layout display list with `imageproc` primitives. Every op clips to the
//! image bounds, so overflowing geometry degrades to partial drawing rather
//! than a panic.

use std::io::Cursor;

use ab_glyph::{FontArc, PxScale};
use image::{GenericImageView, ImageReader, Limits, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use super::layout::DrawOp;
use super::{OverlayError, Typeface};

/// Maximum encoded size accepted for a base image (50MB).
const MAX_INPUT_BYTES: usize = 50 * 1024 * 1024;

/// Maximum decoded pixel count (100 megapixels) - prevents decompression bombs.
const MAX_PIXELS: u64 = 100_000_000;

/// Maximum decoded edge length.
const MAX_DIMENSION: u32 = 15_000;

/// Maximum decoder allocation.
const MAX_ALLOC_BYTES: u64 = 512 * 1024 * 1024;

/// Decodes an encoded base image under explicit limits. Failure here is the
/// renderer's only fatal error: without known dimensions nothing can be
/// drawn.
pub(crate) fn decode_base_image(bytes: &[u8]) -> Result<RgbaImage, OverlayError> {
    if bytes.is_empty() {
        return Err(OverlayError::EmptyInput);
    }
    if bytes.len() > MAX_INPUT_BYTES {
        return Err(OverlayError::InputTooLarge {
            size: bytes.len(),
            max: MAX_INPUT_BYTES,
        });
    }

    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| OverlayError::Decode { source: e.into() })?;

    if reader.format().is_none() {
        return Err(OverlayError::UnsupportedFormat);
    }

    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_DIMENSION);
    limits.max_image_height = Some(MAX_DIMENSION);
    limits.max_alloc = Some(MAX_ALLOC_BYTES);
    reader.limits(limits);

    let decoded = reader.decode()?;
    let (width, height) = decoded.dimensions();
    let pixels = u64::from(width) * u64::from(height);
    if pixels > MAX_PIXELS {
        return Err(OverlayError::ImageTooLarge {
            width,
            height,
            max_pixels: MAX_PIXELS,
        });
    }

    Ok(decoded.to_rgba8())
}

/// Applies the display list in order; list order is z-order.
pub(crate) fn apply_ops(image: &mut RgbaImage, ops: &[DrawOp], face: &dyn Typeface) {
    for op in ops {
        match op {
            DrawOp::Frame {
                x,
                y,
                width,
                height,
                thickness,
                color,
            } => frame_region(image, *x, *y, *width, *height, *thickness, *color),
            DrawOp::Fill {
                x,
                y,
                width,
                height,
                color,
            } => fill_region(image, *x, *y, *width, *height, *color),
            DrawOp::Text {
                text,
                size,
                x,
                y,
                color,
            } => face.draw_text(image, text, *size, x.round() as i32, y.round() as i32, *color),
        }
    }
}

/// Fills an axis-aligned region, rounded to the pixel grid and clipped to the
/// image. Regions that clip to nothing are ignored.
pub(crate) fn fill_region(image: &mut RgbaImage, x: f32, y: f32, w: f32, h: f32, color: Rgba<u8>) {
    let (iw, ih) = image.dimensions();
    let x0 = (x.round() as i64).clamp(0, i64::from(iw));
    let y0 = (y.round() as i64).clamp(0, i64::from(ih));
    let x1 = ((x + w).round() as i64).clamp(0, i64::from(iw));
    let y1 = ((y + h).round() as i64).clamp(0, i64::from(ih));
    if x1 <= x0 || y1 <= y0 {
        return;
    }
    let rect = Rect::at(x0 as i32, y0 as i32).of_size((x1 - x0) as u32, (y1 - y0) as u32);
    draw_filled_rect_mut(image, rect, color);
}

/// Strokes a rectangle outline of the given thickness as four edge bands.
/// Degenerate outlines (thickness covering the interior) collapse to a fill.
fn frame_region(
    image: &mut RgbaImage,
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    thickness: f32,
    color: Rgba<u8>,
) {
    if w <= 2.0 * thickness || h <= 2.0 * thickness {
        fill_region(image, x, y, w, h, color);
        return;
    }
    fill_region(image, x, y, w, thickness, color);
    fill_region(image, x, y + h - thickness, w, thickness, color);
    fill_region(image, x, y + thickness, thickness, h - 2.0 * thickness, color);
    fill_region(
        image,
        x + w - thickness,
        y + thickness,
        thickness,
        h - 2.0 * thickness,
        color,
    );
}

/// The shipped [`Typeface`]: an `ab_glyph` font with `imageproc` glyph
/// rasterization. Font bytes come from the embedding application.
pub struct AbGlyphTypeface {
    font: FontArc,
}

impl AbGlyphTypeface {
    /// Parses owned font bytes (TTF/OTF).
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::FontLoad`] if the bytes are not a valid font.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, OverlayError> {
        FontArc::try_from_vec(bytes)
            .map(|font| Self { font })
            .map_err(OverlayError::FontLoad)
    }

    /// Parses font bytes embedded in the application binary.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::FontLoad`] if the bytes are not a valid font.
    pub fn from_static(bytes: &'static [u8]) -> Result<Self, OverlayError> {
        FontArc::try_from_slice(bytes)
            .map(|font| Self { font })
            .map_err(OverlayError::FontLoad)
    }
}

impl Typeface for AbGlyphTypeface {
    fn text_width(&self, text: &str, size: f32) -> f32 {
        let (width, _) = text_size(PxScale::from(size), &self.font, text);
        width as f32
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
        draw_text_mut(image, color, x, y, PxScale::from(size), &self.font, text);
    }
}
