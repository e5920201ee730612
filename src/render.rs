//! Overlay drawing of feature sets.
//!
//! Rendering is a pure function of the feature set and the source image: the source is
//! copied, never modified.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_circle_mut, draw_line_segment_mut};
use imageproc::rect::Rect;

use crate::features::{distance, FeatureKind, FeaturePoint, FeatureSet};
use crate::glyphs::{draw_text_mut, text_size};

#[derive(Clone, Debug)]
pub struct FeatureRenderer {
    /// Colour of segments and circles
    pub feature_color: Rgb<u8>,
    /// Colour of annotation text
    pub text_color: Rgb<u8>,
    /// Stroke width in pixels
    pub thickness: u32,
    pub corner_radius: i32,
    /// Pixels per font cell of annotation text
    pub text_scale: u32,
}

impl FeatureRenderer {
    pub const CORNER_RADIUS: i32 = 20;

    /// Copy of `source` with every group drawn on it: segments for lines, circles for corners.
    pub fn render(&self, features: &FeatureSet, source: &RgbImage) -> RgbImage {
        let mut canvas = source.clone();
        match features.kind() {
            FeatureKind::Line => {
                for (start, end) in features.iter().flat_map(|g| g.segments()) {
                    self.draw_segment(&mut canvas, start, end);
                }
            }
            FeatureKind::Corner => {
                for group in features {
                    if let Some(center) = group.points().first() {
                        self.draw_circle(&mut canvas, *center);
                    }
                }
            }
        }
        canvas
    }

    /// Copy of `canvas` with measurement labels: segment length just above each segment
    /// start, coordinates at each corner.
    pub fn annotate(&self, features: &FeatureSet, canvas: &RgbImage) -> RgbImage {
        let mut out = canvas.clone();
        match features.kind() {
            FeatureKind::Line => {
                for (start, end) in features.iter().flat_map(|g| g.segments()) {
                    let label = segment_label(&start, &end);
                    draw_text_mut(&mut out, &label, (start.x, start.y - 1), self.text_scale, self.text_color);
                }
            }
            FeatureKind::Corner => {
                for group in features {
                    if let Some(p) = group.points().first() {
                        draw_text_mut(&mut out, &corner_label(p), (p.x, p.y), self.text_scale, self.text_color);
                    }
                }
            }
        }
        out
    }

    /// [`render`](Self::render) followed by [`annotate`](Self::annotate).
    pub fn render_annotated(&self, features: &FeatureSet, source: &RgbImage) -> RgbImage {
        self.annotate(features, &self.render(features, source))
    }

    /// Copy of `frame` with `value` printed in the top-left corner on a black box, so a
    /// window shows the control value the detector actually used.
    pub fn stamp_value(&self, frame: &RgbImage, value: i32) -> RgbImage {
        let mut canvas = frame.clone();
        let text = value.to_string();
        let scale = self.text_scale.max(1) * 2;
        let (w, h) = text_size(&text, scale);
        let pad = scale;
        draw_filled_rect_mut(&mut canvas, Rect::at(0, 0).of_size(w + 2 * pad, h + 2 * pad), Rgb([0, 0, 0]));
        draw_text_mut(&mut canvas, &text, (pad as i32, (pad + h) as i32), scale, self.text_color);
        canvas
    }

    fn draw_segment(&self, canvas: &mut RgbImage, start: FeaturePoint, end: FeaturePoint) {
        // thicken across the minor axis of the segment
        let steep = (end.y - start.y).abs() > (end.x - start.x).abs();
        for o in 0..self.thickness.max(1) as i32 {
            let (ox, oy) = if steep { (o as f32, 0.0) } else { (0.0, o as f32) };
            draw_line_segment_mut(
                canvas,
                (start.x as f32 + ox, start.y as f32 + oy),
                (end.x as f32 + ox, end.y as f32 + oy),
                self.feature_color,
            );
        }
    }

    fn draw_circle(&self, canvas: &mut RgbImage, center: FeaturePoint) {
        for o in 0..self.thickness.max(1) as i32 {
            let radius = self.corner_radius + o;
            draw_hollow_circle_mut(canvas, (center.x, center.y), radius, self.feature_color);
        }
    }
}

impl Default for FeatureRenderer {
    fn default() -> Self {
        Self {
            feature_color: Rgb([0, 0, 255]),
            text_color: Rgb([255, 0, 0]),
            thickness: 2,
            corner_radius: Self::CORNER_RADIUS,
            text_scale: 1,
        }
    }
}

/// Segment length rounded to whole pixels, e.g. `"90px"`.
pub fn segment_label(start: &FeaturePoint, end: &FeaturePoint) -> String {
    format!("{}px", distance(start, end).round() as i64)
}

/// Corner coordinates, e.g. `"12,34"`.
pub fn corner_label(p: &FeaturePoint) -> String {
    format!("{},{}", p.x, p.y)
}
