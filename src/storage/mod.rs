//! Storage Locations
//!
//! Platform directories for the configuration file and local datasets.

use anyhow::Result;
use std::path::PathBuf;

/// Record dataset looked up in the data directory when none is configured
pub const DEFAULT_DATASET_FILE: &str = "waste_records.json";

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("org", "debris-overlay", "DebrisOverlay")
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
}

/// Get the application data directory
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = project_dirs()?.data_dir().to_path_buf();
    std::fs::create_dir_all(&data_dir)?;

    Ok(data_dir)
}

/// Get the configuration directory
pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = project_dirs()?.config_dir().to_path_buf();
    std::fs::create_dir_all(&config_dir)?;

    Ok(config_dir)
}

/// Default location of `config.toml`
pub fn default_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.toml"))
}

/// Dataset in the data directory, if one has been placed there
pub fn default_dataset_path() -> Option<PathBuf> {
    let path = get_data_dir().ok()?.join(DEFAULT_DATASET_FILE);
    path.is_file().then_some(path)
}
