//! Annotation rendering
//!
//! Paints scaled detection boxes and their labels onto a surface that is
//! already sized to the displayed image. Every call is a full redraw.

use image::Rgba;

use crate::overlay::geometry::ScaleFactor;
use crate::overlay::surface::{DrawSurface, SurfaceRect};
use crate::overlay::widgets::OverlayStyle;
use crate::risk::RiskScorer;
use crate::vision::Detection;

/// Label drawn above a detection box
pub fn label_text(detection: &Detection, label_fn: &dyn Fn(&str) -> String) -> String {
    format!(
        "{} ({})",
        label_fn(&detection.class_label),
        detection.confidence_text()
    )
}

/// Draws detections with the configured style and risk scoring
pub struct AnnotationRenderer<'a> {
    style: &'a OverlayStyle,
    scorer: RiskScorer,
}

impl<'a> AnnotationRenderer<'a> {
    pub fn new(style: &'a OverlayStyle, scorer: RiskScorer) -> Self {
        Self { style, scorer }
    }

    /// Clear the surface and draw every boxed detection in input order
    pub fn render<S: DrawSurface + ?Sized>(
        &self,
        surface: &mut S,
        detections: &[Detection],
        scale: ScaleFactor,
        color_fn: &dyn Fn(f64) -> Rgba<u8>,
        label_fn: &dyn Fn(&str) -> String,
    ) {
        surface.clear();

        for detection in detections {
            let Some(bbox) = detection.bbox else {
                continue;
            };

            let scaled = scale.apply(&bbox);
            let x1 = scaled.x1 as f32;
            let y1 = scaled.y1 as f32;
            let color = color_fn(self.scorer.score(&detection.class_label, detection.confidence));

            surface.stroke_rect(
                SurfaceRect::new(x1, y1, scaled.width() as f32, scaled.height() as f32),
                color,
                self.style.line_width,
            );

            let text = label_text(detection, label_fn);
            let text_width = surface.measure_text(&text);

            // Background sits directly above the box, unclamped
            surface.fill_rect(
                SurfaceRect::new(
                    x1,
                    y1 - self.style.label_height,
                    text_width + self.style.label_padding,
                    self.style.label_height,
                ),
                color,
            );
            surface.fill_text(
                &text,
                x1 + self.style.text_inset,
                y1 - self.style.text_baseline_offset,
                self.style.text_rgba(),
            );
        }
    }
}
