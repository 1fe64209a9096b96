//! Vision Layer
//!
//! Detection data model and the bridge to the external YOLO analyzer.
//! Inference itself happens out of process.

pub mod detection;
pub mod yolo;

pub use detection::{load_detections, BoundingBox, Detection};
pub use yolo::{AnalysisReport, ModelKind, YoloAnalyzer};
