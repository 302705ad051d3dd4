//! Pure layout stage: validates instances and turns them into a display list
//! of primitive draw ops. All size-adaptive geometry (stroke widths, font
//! sizes, label boxes, collision handling) is decided here; no pixels are
//! touched.

use image::Rgba;
use tracing::warn;

use super::{OverlayOptions, OverlayVariant, Typeface, ACCENT_COLOR, INDEX_COLOR, LABEL_TEXT_COLOR};
use crate::record::DetectionInstance;

/// One primitive drawing operation. List order is z-order: later ops draw on
/// top of earlier ones.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DrawOp {
    /// Hollow rectangle outline of the given stroke thickness.
    Frame {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        thickness: f32,
        color: Rgba<u8>,
    },
    Fill {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgba<u8>,
    },
    /// Text with its top-left corner at `(x, y)`.
    Text {
        text: String,
        size: f32,
        x: f32,
        y: f32,
        color: Rgba<u8>,
    },
}

/// Size-adaptive geometry for one variant at one image width.
pub(crate) struct VariantMetrics {
    pub stroke_width: f32,
    pub font_size: f32,
    pub label_padding: f32,
    pub label_gap: f32,
    pub index_size: f32,
}

impl OverlayVariant {
    pub(crate) fn metrics(self, image_width: u32) -> VariantMetrics {
        let w = image_width as f32;
        match self {
            Self::Detail => {
                let font_size = (w * 0.02).max(14.0);
                VariantMetrics {
                    stroke_width: (w * 0.005).max(4.0),
                    font_size,
                    label_padding: font_size * 0.4,
                    label_gap: 4.0,
                    index_size: (w * 0.015).max(12.0),
                }
            }
            Self::Report => {
                let font_size = (w * 0.018).max(12.0);
                VariantMetrics {
                    stroke_width: (w * 0.004).max(3.0),
                    font_size,
                    label_padding: font_size * 0.3,
                    label_gap: 2.0,
                    index_size: (w * 0.015).max(12.0),
                }
            }
        }
    }
}

/// Builds the display list for `instances` in input order. Undrawable
/// instances (non-finite or non-positive boxes) are skipped with a warning.
pub(crate) fn build_ops(
    image_width: u32,
    instances: &[DetectionInstance],
    options: &OverlayOptions,
    face: &dyn Typeface,
) -> Vec<DrawOp> {
    let metrics = options.variant.metrics(image_width);
    let mut ops = Vec::new();

    for (index, instance) in instances.iter().enumerate() {
        let bbox = instance.bbox;
        if !bbox.is_drawable() {
            warn!(index, ?bbox, "skipping undrawable detection instance");
            continue;
        }
        let (x, y, w, h) = (bbox.x, bbox.y, bbox.width, bbox.height);

        ops.push(DrawOp::Frame {
            x,
            y,
            width: w,
            height: h,
            thickness: metrics.stroke_width,
            color: ACCENT_COLOR,
        });

        if options.show_corner_accents {
            push_corner_accents(&mut ops, x, y, w, h, metrics.stroke_width);
        }

        let label = label_text(instance, options.variant);
        let label_width = face.text_width(&label, metrics.font_size) + 2.0 * metrics.label_padding;
        let label_height = metrics.font_size + 2.0 * metrics.label_padding;

        // Label sits above the box; if that would cross the top edge, it
        // moves below instead. Right-edge overflow is accepted and clipped
        // at raster time.
        let mut label_y = y - label_height - metrics.label_gap;
        if label_y < 0.0 {
            label_y = y + h + metrics.label_gap;
        }

        ops.push(DrawOp::Fill {
            x,
            y: label_y,
            width: label_width,
            height: label_height,
            color: ACCENT_COLOR,
        });
        ops.push(DrawOp::Text {
            text: label,
            size: metrics.font_size,
            x: x + metrics.label_padding,
            y: label_y + metrics.label_padding,
            color: LABEL_TEXT_COLOR,
        });

        if options.show_index {
            ops.push(DrawOp::Text {
                text: format!("#{}", index + 1),
                size: metrics.index_size,
                x: x + 4.0,
                y: y + h - 4.0 - metrics.index_size,
                color: INDEX_COLOR,
            });
        }
    }

    ops
}

fn label_text(instance: &DetectionInstance, variant: OverlayVariant) -> String {
    let percent = instance.confidence_percent();
    match variant {
        OverlayVariant::Detail => format!("{} {percent}%", instance.display_label()),
        OverlayVariant::Report => format!("{percent}%"),
    }
}

/// Four L-shaped accents, one per corner, legs centered on the box edges.
fn push_corner_accents(ops: &mut Vec<DrawOp>, x: f32, y: f32, w: f32, h: f32, thickness: f32) {
    let leg = w.min(h) * 0.2;
    let half = thickness / 2.0;
    let corners = [
        (x, y, 1.0f32, 1.0f32),
        (x + w, y, -1.0, 1.0),
        (x, y + h, 1.0, -1.0),
        (x + w, y + h, -1.0, -1.0),
    ];
    for (cx, cy, dx, dy) in corners {
        let leg_x = if dx > 0.0 { cx - half } else { cx - leg + half };
        ops.push(DrawOp::Fill {
            x: leg_x,
            y: cy - half,
            width: leg,
            height: thickness,
            color: ACCENT_COLOR,
        });
        let leg_y = if dy > 0.0 { cy - half } else { cy - leg + half };
        ops.push(DrawOp::Fill {
            x: cx - half,
            y: leg_y,
            width: thickness,
            height: leg,
            color: ACCENT_COLOR,
        });
    }
}
