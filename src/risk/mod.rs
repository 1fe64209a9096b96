//! Risk Scoring
//!
//! Maps a detected debris class and its confidence to a severity score,
//! and bands scores into display levels with their legend colors.

pub mod labels;

use image::Rgba;
use serde::Serialize;

pub use labels::{localized_label, LabelStyle};

/// Base severity used for classes missing from the table
pub const DEFAULT_BASE_SCORE: f64 = 3.0;

/// Per-class base severity
const BASE_SCORES: &[(&str, f64)] = &[
    ("Fish_net", 4.5),
    ("Fish_trap", 3.0),
    ("Glass", 3.8),
    ("Metal", 3.5),
    ("Plastic", 4.0),
    ("Rope", 3.2),
    ("Rubber_etc", 3.3),
    ("Rubber_tire", 3.4),
    ("Wood", 2.8),
    ("PET_Bottle", 3.1),
    ("Bottle", 3.1),
    ("Can", 3.2),
    ("Bag", 3.8),
    ("Container", 3.0),
];

/// Stateless risk scorer over the fixed severity table
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskScorer;

impl RiskScorer {
    pub fn new() -> Self {
        Self
    }

    /// Base severity for a class label
    pub fn base_score(&self, label: &str) -> f64 {
        BASE_SCORES
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, score)| *score)
            .unwrap_or(DEFAULT_BASE_SCORE)
    }

    /// Confidence-weighted risk score.
    ///
    /// A zero-confidence detection carries half the base severity, a fully
    /// confident one carries all of it. Confidence outside [0, 1] (or NaN)
    /// is clamped so the result stays finite and positive.
    pub fn score(&self, label: &str, confidence: f64) -> f64 {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        self.base_score(label) * (0.5 + 0.5 * confidence)
    }
}

/// Severity band of a risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 4.0 {
            RiskLevel::VeryHigh
        } else if score >= 3.5 {
            RiskLevel::High
        } else if score >= 3.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Hex color used for boxes, swatches and map markers
    pub fn hex(&self) -> &'static str {
        match self {
            RiskLevel::VeryHigh => "#dc3545",
            RiskLevel::High => "#fd7e14",
            RiskLevel::Medium => "#ffc107",
            RiskLevel::Low => "#28a745",
        }
    }

    pub fn color(&self) -> Rgba<u8> {
        match self {
            RiskLevel::VeryHigh => Rgba([0xdc, 0x35, 0x45, 0xff]),
            RiskLevel::High => Rgba([0xfd, 0x7e, 0x14, 0xff]),
            RiskLevel::Medium => Rgba([0xff, 0xc1, 0x07, 0xff]),
            RiskLevel::Low => Rgba([0x28, 0xa7, 0x45, 0xff]),
        }
    }

    /// Localized level name
    pub fn text(&self) -> &'static str {
        match self {
            RiskLevel::VeryHigh => "매우 높음",
            RiskLevel::High => "높음",
            RiskLevel::Medium => "보통",
            RiskLevel::Low => "낮음",
        }
    }

    /// Level name prefixed with its colored marker
    pub fn badge(&self) -> String {
        let marker = match self {
            RiskLevel::VeryHigh => "🔴",
            RiskLevel::High => "🟠",
            RiskLevel::Medium => "🟡",
            RiskLevel::Low => "🟢",
        };
        format!("{} {}", marker, self.text())
    }
}

/// Default score-to-color mapping
pub fn risk_color(score: f64) -> Rgba<u8> {
    RiskLevel::from_score(score).color()
}
