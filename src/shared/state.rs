//! Owned state record of an overlay controller

use crate::overlay::geometry::ImageGeometry;
use crate::vision::Detection;

/// Lifecycle phase of the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayPhase {
    /// Waiting for the image to finish loading
    #[default]
    Unloaded,
    /// Natural size known; redraws are allowed
    Loaded,
    /// Torn down; nothing may draw anymore
    Disposed,
}

/// Everything a redraw reads, owned by the controller
#[derive(Debug, Clone)]
pub struct OverlayState {
    pub phase: OverlayPhase,
    /// Natural image size, (0, 0) until loaded
    pub natural_size: (u32, u32),
    /// Latest viewport size
    pub viewport: (u32, u32),
    /// Detections currently shown
    pub detections: Vec<Detection>,
    /// Geometry used by the most recent redraw
    pub geometry: Option<ImageGeometry>,
    /// Number of completed redraws
    pub redraw_count: u64,
}

impl OverlayState {
    pub fn new(viewport: (u32, u32)) -> Self {
        Self {
            phase: OverlayPhase::Unloaded,
            natural_size: (0, 0),
            viewport,
            detections: Vec::new(),
            geometry: None,
            redraw_count: 0,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.phase == OverlayPhase::Loaded
    }

    pub fn is_disposed(&self) -> bool {
        self.phase == OverlayPhase::Disposed
    }
}
