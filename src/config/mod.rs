//! Application Configuration
//!
//! User settings stored in TOML format. Every section falls back to its
//! defaults, so partial files are accepted.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::overlay::geometry::LayoutConstraints;
use crate::overlay::widgets::OverlayStyle;
use crate::risk::LabelStyle;

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Upload server settings
    pub server: ServerSettings,
    /// External analyzer settings
    pub analyzer: AnalyzerSettings,
    /// Overlay rendering settings
    pub overlay: OverlaySettings,
    /// Record catalogue settings
    pub records: RecordsSettings,
}

/// Upload server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address
    pub host: String,
    /// Listen port
    pub port: u16,
    /// Directory uploaded images are stored in
    pub upload_dir: PathBuf,
    /// Maximum accepted upload size in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

/// External YOLO analyzer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerSettings {
    /// Python interpreter
    pub python: String,
    /// Analyzer script
    pub script_path: PathBuf,
    /// Model weights for coastal debris
    pub coastal_model: PathBuf,
    /// Model weights for floating debris
    pub floating_model: PathBuf,
    /// Give up on the analyzer after this many seconds
    pub timeout_secs: u64,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            script_path: PathBuf::from("scripts/yolo_analyzer.py"),
            coastal_model: PathBuf::from("models/best.pt"),
            floating_model: PathBuf::from("models/floating_waste_model.pt"),
            timeout_secs: 120,
        }
    }
}

impl AnalyzerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Overlay rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlaySettings {
    /// Delay between load/detections change and the redraw
    pub debounce_ms: u64,
    /// Viewport assumed until the first resize event
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// How class labels are displayed
    pub label_style: LabelStyle,
    /// Label font; system fonts are searched when unset
    pub font_path: Option<PathBuf>,
    /// Image layout constraints
    pub layout: LayoutConstraints,
    /// Box and label style
    pub style: OverlayStyle,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            viewport_width: 1280,
            viewport_height: 800,
            label_style: LabelStyle::Localized,
            font_path: None,
            layout: LayoutConstraints::default(),
            style: OverlayStyle::default(),
        }
    }
}

impl OverlaySettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.viewport_width, self.viewport_height)
    }
}

/// Record catalogue settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordsSettings {
    /// JSON dataset of debris records
    pub dataset_path: Option<PathBuf>,
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Invalid config file: {:?}", path))?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
