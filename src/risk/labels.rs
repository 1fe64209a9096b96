//! Display names for detector class labels

use serde::{Deserialize, Serialize};

const KOREAN_LABELS: &[(&str, &str)] = &[
    ("Fish_net", "어망"),
    ("Fish_trap", "어구"),
    ("Glass", "유리"),
    ("Metal", "금속"),
    ("Plastic", "플라스틱"),
    ("Rope", "로프"),
    ("Rubber_etc", "고무류"),
    ("Rubber_tire", "고무타이어"),
    ("Wood", "목재"),
    ("PET_Bottle", "PET 병"),
    ("Bottle", "병"),
    ("Can", "캔"),
    ("Bag", "비닐봉지"),
    ("Container", "컨테이너"),
];

/// How class labels are presented on the overlay and legend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelStyle {
    /// Korean display names, unknown classes pass through
    #[default]
    Localized,
    /// Detector class names as-is
    Raw,
}

impl LabelStyle {
    pub fn apply(&self, label: &str) -> String {
        match self {
            LabelStyle::Localized => localized_label(label).to_string(),
            LabelStyle::Raw => label.to_string(),
        }
    }
}

/// Korean display name for a class label
pub fn localized_label(label: &str) -> &str {
    KOREAN_LABELS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, korean)| *korean)
        .unwrap_or(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_localized_known() {
        assert_eq!(localized_label("Fish_net"), "어망");
        assert_eq!(localized_label("PET_Bottle"), "PET 병");
    }

    #[test]
    fn test_localized_unknown_passthrough() {
        assert_eq!(localized_label("Anchor"), "Anchor");
    }

    #[test]
    fn test_label_style() {
        assert_eq!(LabelStyle::Raw.apply("Rope"), "Rope");
        assert_eq!(LabelStyle::Localized.apply("Rope"), "로프");
    }
}
