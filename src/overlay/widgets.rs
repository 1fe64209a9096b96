//! Drawing style for annotation boxes and labels

use image::Rgba;
use serde::{Deserialize, Serialize};

/// Style configuration for annotation boxes and their labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// Box stroke width in pixels
    pub line_width: f32,
    /// Height of the label background strip
    pub label_height: f32,
    /// Extra width added to the measured text for the label background
    pub label_padding: f32,
    /// Horizontal inset of the label text from the box edge
    pub text_inset: f32,
    /// Distance from the box top edge to the text baseline
    pub text_baseline_offset: f32,
    /// Label font size in pixels
    pub font_size: f32,
    /// Label text color (RGBA)
    pub text_color: [u8; 4],
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            line_width: 2.0,
            label_height: 16.0,
            label_padding: 8.0,
            text_inset: 4.0,
            text_baseline_offset: 2.0,
            font_size: 12.0,
            text_color: [255, 255, 255, 255],
        }
    }
}

impl OverlayStyle {
    pub fn text_rgba(&self) -> Rgba<u8> {
        Rgba(self.text_color)
    }
}
