//! Detection data model
//!
//! Detections arrive from the external analyzer in original-image pixel
//! coordinates and are never mutated afterwards.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Axis-aligned box as two corners in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }
}

/// One object instance reported by the analyzer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Detector class name (e.g. "Fish_net")
    #[serde(rename = "class", alias = "classLabel")]
    pub class_label: String,
    /// Confidence (0.0 - 1.0)
    pub confidence: f64,
    /// Detector class index
    #[serde(rename = "class_id", alias = "classId", default)]
    pub class_id: i64,
    /// Box in original-image pixels; detections without one are legend-only
    #[serde(
        rename = "bbox",
        alias = "box",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub bbox: Option<BoundingBox>,
}

impl Detection {
    pub fn new(class_label: &str, confidence: f64, class_id: i64) -> Self {
        Self {
            class_label: class_label.to_string(),
            confidence,
            class_id,
            bbox: None,
        }
    }

    pub fn with_box(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Confidence as a percentage with one decimal, halves rounded up
    pub fn confidence_text(&self) -> String {
        // `{:.1}` alone rounds 81.25 down to 81.2
        let pct = (self.confidence * 1000.0).round() / 10.0;
        format!("{:.1}%", pct)
    }
}

/// Accepted layouts of a detections file
#[derive(Deserialize)]
#[serde(untagged)]
enum DetectionsFile {
    List(Vec<Detection>),
    Report {
        #[serde(alias = "allDetections", alias = "all_detections", default)]
        detections: Vec<Detection>,
    },
}

/// Parse detections from JSON: a bare array, or an analysis report
/// carrying them under `all_detections` / `allDetections`.
pub fn parse_detections(json: &str) -> Result<Vec<Detection>> {
    let parsed: DetectionsFile =
        serde_json::from_str(json).context("Detections JSON is neither a list nor a report")?;
    Ok(match parsed {
        DetectionsFile::List(list) => list,
        DetectionsFile::Report { detections } => detections,
    })
}

/// Load detections from a JSON file
pub fn load_detections(path: &Path) -> Result<Vec<Detection>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read detections file: {:?}", path))?;
    parse_detections(&content)
}
