//! Debris Record Catalogue
//!
//! Read-only set of geotagged debris records used for data browsing,
//! statistics and map markers.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

use crate::risk::{localized_label, RiskLevel};

/// Map center used when there are no records
pub const DEFAULT_MAP_CENTER: (f64, f64) = (35.0, 129.0);

/// Filter value meaning "no filter"
const ALL: &str = "전체";

#[derive(Debug, Error)]
pub enum RecordsError {
    #[error("Failed to read records from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid records file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Unknown risk level '{0}' (expected high, medium or low)")]
    UnknownRiskLevel(String),
}

/// One observed debris item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteRecord {
    pub id: i64,
    #[serde(default)]
    pub file_name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Detector class name
    pub label: String,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub cluster: i32,
    pub risk_score: f64,
    #[serde(default)]
    pub location_name: String,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub image_path: String,
}

impl WasteRecord {
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_score(self.risk_score)
    }

    /// Location name, or the coordinates when none was recorded
    pub fn display_location(&self) -> String {
        if self.location_name.is_empty() {
            format!("{:.4}, {:.4}", self.latitude, self.longitude)
        } else {
            self.location_name.clone()
        }
    }
}

/// Record as served to clients, with derived display fields
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordView<'a> {
    #[serde(flatten)]
    pub record: &'a WasteRecord,
    pub label_korean: &'a str,
    pub risk_level: String,
}

impl<'a> From<&'a WasteRecord> for RecordView<'a> {
    fn from(record: &'a WasteRecord) -> Self {
        Self {
            record,
            label_korean: localized_label(&record.label),
            risk_level: record.risk_level().badge(),
        }
    }
}

/// Coarse risk filter used by the data browser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    /// 3.5 and above
    High,
    /// 3.0 up to 3.5
    Medium,
    /// Below 3.0
    Low,
}

impl RiskBand {
    pub fn contains(&self, score: f64) -> bool {
        match self {
            RiskBand::High => score >= 3.5,
            RiskBand::Medium => (3.0..3.5).contains(&score),
            RiskBand::Low => score < 3.0,
        }
    }

    /// Parse a query value; empty or "전체" means no filter
    pub fn parse_filter(value: Option<&str>) -> Result<Option<RiskBand>, RecordsError> {
        match value.map(str::trim) {
            None | Some("") | Some(ALL) | Some("all") => Ok(None),
            Some(other) => other.parse().map(Some),
        }
    }
}

impl FromStr for RiskBand {
    type Err = RecordsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" => Ok(RiskBand::High),
            "medium" => Ok(RiskBand::Medium),
            "low" => Ok(RiskBand::Low),
            _ => Err(RecordsError::UnknownRiskLevel(s.to_string())),
        }
    }
}

/// Aggregate figures over the catalogue
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordStatistics {
    pub average_risk_score: f64,
    pub max_risk_score: f64,
    /// (label, count), most frequent first
    pub label_counts: Vec<(String, usize)>,
}

/// Marker handed to the map widget
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub risk_score: f64,
    pub color: &'static str,
    pub title: String,
    pub location_name: String,
    pub image_path: String,
    pub popup: String,
}

/// One page of records, shaped like a Spring Data page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPage<'a> {
    pub content: Vec<RecordView<'a>>,
    pub total_elements: usize,
    pub total_pages: usize,
    /// Zero-based page index
    pub number: usize,
    pub size: usize,
    pub first: bool,
    pub last: bool,
    pub number_of_elements: usize,
    pub empty: bool,
}

/// In-memory record catalogue
#[derive(Debug, Clone, Default)]
pub struct RecordCatalogue {
    records: Vec<WasteRecord>,
}

impl RecordCatalogue {
    pub fn new(records: Vec<WasteRecord>) -> Self {
        Self { records }
    }

    /// Load a JSON array of records
    pub fn load(path: &Path) -> Result<Self, RecordsError> {
        let content = std::fs::read_to_string(path).map_err(|source| RecordsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let records: Vec<WasteRecord> =
            serde_json::from_str(&content).map_err(|source| RecordsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        info!("Loaded {} debris records from {:?}", records.len(), path);
        Ok(Self::new(records))
    }

    pub fn all(&self) -> &[WasteRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records matching an optional label and risk band
    pub fn filter(&self, label: Option<&str>, band: Option<RiskBand>) -> Vec<&WasteRecord> {
        let label = label.map(str::trim).filter(|l| !l.is_empty() && *l != ALL);
        self.records
            .iter()
            .filter(|r| label.map_or(true, |l| r.label == l))
            .filter(|r| band.map_or(true, |b| b.contains(r.risk_score)))
            .collect()
    }

    /// Distinct labels in sorted order
    pub fn distinct_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.records.iter().map(|r| r.label.clone()).collect();
        labels.sort();
        labels.dedup();
        labels
    }

    pub fn statistics(&self) -> RecordStatistics {
        if self.is_empty() {
            return RecordStatistics {
                average_risk_score: 0.0,
                max_risk_score: 0.0,
                label_counts: Vec::new(),
            };
        }

        let total: f64 = self.records.iter().map(|r| r.risk_score).sum();
        let max = self
            .records
            .iter()
            .map(|r| r.risk_score)
            .fold(f64::MIN, f64::max);

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.label.as_str()).or_default() += 1;
        }
        let mut label_counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(label, count)| (label.to_string(), count))
            .collect();
        // BTreeMap order keeps ties alphabetical under a stable sort
        label_counts.sort_by(|a, b| b.1.cmp(&a.1));

        RecordStatistics {
            average_risk_score: total / self.records.len() as f64,
            max_risk_score: max,
            label_counts,
        }
    }

    /// Average position of all records
    pub fn map_center(&self) -> (f64, f64) {
        if self.is_empty() {
            return DEFAULT_MAP_CENTER;
        }
        let n = self.records.len() as f64;
        let lat = self.records.iter().map(|r| r.latitude).sum::<f64>() / n;
        let lon = self.records.iter().map(|r| r.longitude).sum::<f64>() / n;
        (lat, lon)
    }

    pub fn markers(&self) -> Vec<MapMarker> {
        self.records.iter().map(marker_for).collect()
    }

    /// Zero-based page of `size` records; a size of 0 is read as 1
    pub fn page(&self, number: usize, size: usize) -> RecordPage<'_> {
        let size = size.max(1);
        let total_elements = self.records.len();
        let total_pages = total_elements.div_ceil(size);
        let content: Vec<RecordView<'_>> = self
            .records
            .iter()
            .skip(number.saturating_mul(size))
            .take(size)
            .map(RecordView::from)
            .collect();

        RecordPage {
            number_of_elements: content.len(),
            empty: content.is_empty(),
            content,
            total_elements,
            total_pages,
            number,
            size,
            first: number == 0,
            last: number + 1 >= total_pages,
        }
    }
}

fn marker_for(record: &WasteRecord) -> MapMarker {
    let level = record.risk_level();
    let title = localized_label(&record.label).to_string();
    let location_name = record.display_location();

    let mut popup = format!(
        "{}\n위도: {:.6}\n경도: {:.6}\n위험도: {:.2} ({})\n위치: {}",
        title,
        record.latitude,
        record.longitude,
        record.risk_score,
        level.text(),
        location_name
    );
    if let Some(created_at) = record.created_at {
        popup.push_str(&format!("\n발견일: {}", created_at.format("%Y-%m-%d")));
    }

    MapMarker {
        id: record.id,
        latitude: record.latitude,
        longitude: record.longitude,
        risk_score: record.risk_score,
        color: level.hex(),
        title,
        location_name,
        image_path: record.image_path.clone(),
        popup,
    }
}
