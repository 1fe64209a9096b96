//! Message types sent to the overlay controller

use crate::vision::Detection;

/// Commands delivered to a running overlay controller
#[derive(Debug, Clone)]
pub enum OverlayCommand {
    /// The image finished decoding with this natural size
    ImageLoaded { width: u32, height: u32 },
    /// Replace the detection list
    SetDetections(Vec<Detection>),
    /// Tear the controller down
    Dispose,
}
