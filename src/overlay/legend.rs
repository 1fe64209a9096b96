//! Legend entries listed below the annotated image

use image::Rgba;
use serde::Serialize;

use crate::risk::{RiskLevel, RiskScorer};
use crate::vision::Detection;

/// One legend row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    /// Swatch color (RGBA)
    #[serde(skip)]
    pub swatch: Rgba<u8>,
    /// Swatch color as `#rrggbb`
    pub swatch_hex: String,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub text: String,
    /// Whether the detection is also drawn on the overlay
    pub has_box: bool,
}

/// Project detections onto legend rows, one per detection, in input order
pub fn render_legend(
    detections: &[Detection],
    scorer: &RiskScorer,
    color_fn: &dyn Fn(f64) -> Rgba<u8>,
    label_fn: &dyn Fn(&str) -> String,
) -> Vec<LegendEntry> {
    detections
        .iter()
        .map(|detection| {
            let risk_score = scorer.score(&detection.class_label, detection.confidence);
            let swatch = color_fn(risk_score);
            LegendEntry {
                swatch,
                swatch_hex: format!("#{:02x}{:02x}{:02x}", swatch.0[0], swatch.0[1], swatch.0[2]),
                risk_score,
                risk_level: RiskLevel::from_score(risk_score),
                text: format!(
                    "{} - {}",
                    label_fn(&detection.class_label),
                    detection.confidence_text()
                ),
                has_box: detection.bbox.is_some(),
            }
        })
        .collect()
}
