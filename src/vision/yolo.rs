//! External YOLO analyzer
//!
//! Detection runs in a separate Python process. Its stdout may carry log
//! noise before the JSON result, so everything from the first line that
//! opens a JSON object is parsed. Failures never propagate as errors to
//! callers: they become a failure report that the UI shows verbatim.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::AnalyzerSettings;
use crate::risk::{RiskScorer, DEFAULT_BASE_SCORE};
use crate::vision::Detection;

/// Reasons an analysis produced no result
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Image not found: {0:?}")]
    MissingImage(PathBuf),
    #[error("YOLO analysis failed: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("Python script execution failed: {0}")]
    ScriptFailed(String),
    #[error("YOLO analysis timed out after {0:?}")]
    Timeout(Duration),
    #[error("Analyzer output is not valid JSON: {0}")]
    InvalidOutput(String),
    #[error("{0}")]
    Reported(String),
}

/// Which trained model to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Debris washed up on the shore
    #[default]
    Coastal,
    /// Debris floating at sea
    Floating,
}

/// Result of one analysis, successful or not
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub success: bool,
    /// Label of the most confident detection
    pub detected_label: String,
    pub confidence: f64,
    pub risk_score: f64,
    #[serde(default)]
    pub all_detections: Vec<Detection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisReport {
    /// Failure report carrying neutral defaults
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            detected_label: "Unknown".to_string(),
            confidence: 0.0,
            risk_score: DEFAULT_BASE_SCORE,
            all_detections: Vec::new(),
            error: Some(message.into()),
        }
    }
}

impl From<&AnalysisError> for AnalysisReport {
    fn from(err: &AnalysisError) -> Self {
        AnalysisReport::failure(err.to_string())
    }
}

/// What the analyzer script prints
#[derive(Debug, Deserialize)]
struct ScriptOutput {
    success: bool,
    #[serde(default)]
    detected_label: Option<String>,
    #[serde(default)]
    confidence: f64,
    #[serde(default)]
    risk_score: Option<f64>,
    #[serde(default)]
    all_detections: Vec<Detection>,
    #[serde(default)]
    error: Option<String>,
}

/// Text from the first line that starts a JSON object
pub fn extract_json(stdout: &str) -> Option<String> {
    let mut lines = stdout.lines().skip_while(|line| !line.trim_start().starts_with('{'));
    let first = lines.next()?;
    Some(std::iter::once(first).chain(lines).collect::<Vec<_>>().join("\n"))
}

/// Parse the analyzer's stdout into a report
pub fn parse_output(stdout: &str) -> Result<AnalysisReport, AnalysisError> {
    let json = extract_json(stdout)
        .ok_or_else(|| AnalysisError::InvalidOutput("no JSON object in output".to_string()))?;
    let output: ScriptOutput =
        serde_json::from_str(&json).map_err(|e| AnalysisError::InvalidOutput(e.to_string()))?;

    if !output.success {
        let message = output
            .error
            .unwrap_or_else(|| "Analyzer reported failure".to_string());
        return Err(AnalysisError::Reported(message));
    }

    let detected_label = output.detected_label.unwrap_or_else(|| "Unknown".to_string());
    let risk_score = output
        .risk_score
        .unwrap_or_else(|| RiskScorer::new().score(&detected_label, output.confidence));

    Ok(AnalysisReport {
        success: true,
        detected_label,
        confidence: output.confidence,
        risk_score,
        all_detections: output.all_detections,
        error: None,
    })
}

/// Availability of the analyzer's pieces
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzerStatus {
    pub coastal_model_available: bool,
    pub floating_model_available: bool,
    pub script_available: bool,
    pub python_available: bool,
    pub coastal_model_path: PathBuf,
    pub floating_model_path: PathBuf,
    pub script_path: PathBuf,
}

/// Runs the external analyzer script
#[derive(Debug, Clone)]
pub struct YoloAnalyzer {
    settings: AnalyzerSettings,
}

impl YoloAnalyzer {
    pub fn new(settings: AnalyzerSettings) -> Self {
        Self { settings }
    }

    fn model_path(&self, model: ModelKind) -> &Path {
        match model {
            ModelKind::Coastal => &self.settings.coastal_model,
            ModelKind::Floating => &self.settings.floating_model,
        }
    }

    /// Analyze an image; failures come back as a failure report
    pub async fn analyze(&self, image: &Path, model: ModelKind) -> AnalysisReport {
        match self.try_analyze(image, model).await {
            Ok(report) => {
                info!(
                    "Analyzed {:?}: {} ({:.1}%), {} detections",
                    image,
                    report.detected_label,
                    report.confidence * 100.0,
                    report.all_detections.len()
                );
                report
            }
            Err(err) => {
                warn!("Analysis of {:?} failed: {}", image, err);
                AnalysisReport::from(&err)
            }
        }
    }

    /// Analyze an image, surfacing the failure reason
    pub async fn try_analyze(&self, image: &Path, model: ModelKind) -> Result<AnalysisReport, AnalysisError> {
        if !image.exists() {
            return Err(AnalysisError::MissingImage(image.to_path_buf()));
        }

        let mut command = Command::new(&self.settings.python);
        command
            .arg(&self.settings.script_path)
            .arg(image)
            .arg(self.model_path(model))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!("Running analyzer: {:?}", command);
        let timeout = self.settings.timeout();
        let output = tokio::time::timeout(timeout, command.output())
            .await
            .map_err(|_| AnalysisError::Timeout(timeout))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(AnalysisError::ScriptFailed(stderr));
        }

        parse_output(&String::from_utf8_lossy(&output.stdout))
    }

    /// Check script, models and interpreter
    pub async fn status(&self) -> AnalyzerStatus {
        let python_available = Command::new(&self.settings.python)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false);

        AnalyzerStatus {
            coastal_model_available: self.settings.coastal_model.exists(),
            floating_model_available: self.settings.floating_model.exists(),
            script_available: self.settings.script_path.exists(),
            python_available,
            coastal_model_path: self.settings.coastal_model.clone(),
            floating_model_path: self.settings.floating_model.clone(),
            script_path: self.settings.script_path.clone(),
        }
    }
}
