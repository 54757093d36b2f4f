use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Script;
use crate::config::Config;
use crate::engine::filter::FilterSet;
use crate::engine::scores::ScoreBook;

pub const SCHEMA_VERSION: u32 = 1;

pub const DEFAULT_MAX_DUPLICATES: usize = 3;
pub const MAX_DUPLICATES_LIMIT: usize = 10;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoresData {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub entries: ScoreBook,
}

impl Default for ScoresData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            entries: ScoreBook::default(),
        }
    }
}

impl ScoresData {
    pub fn new(entries: ScoreBook) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            entries,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreferencesData {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default = "default_max_duplicates")]
    pub max_duplicates: usize,
}

fn default_max_duplicates() -> usize {
    DEFAULT_MAX_DUPLICATES
}

impl Default for PreferencesData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            max_duplicates: DEFAULT_MAX_DUPLICATES,
        }
    }
}

impl PreferencesData {
    pub fn clamp_max_duplicates(value: usize) -> usize {
        value.clamp(1, MAX_DUPLICATES_LIMIT)
    }

    pub fn max_duplicates(&self) -> usize {
        Self::clamp_max_duplicates(self.max_duplicates)
    }
}

/// Saved inclusion sets. A script without an entry means "everything".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterData {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub selections: BTreeMap<Script, FilterSet>,
}

impl Default for FilterData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            selections: BTreeMap::new(),
        }
    }
}

pub const EXPORT_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportData {
    pub kanadrill_export_version: u32,
    pub exported_at: DateTime<Utc>,
    pub config: Config,
    pub scores: ScoresData,
    pub preferences: PreferencesData,
    pub filters: FilterData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferences_clamp() {
        let prefs = PreferencesData {
            schema_version: SCHEMA_VERSION,
            max_duplicates: 0,
        };
        assert_eq!(prefs.max_duplicates(), 1);
        assert_eq!(PreferencesData::clamp_max_duplicates(99), MAX_DUPLICATES_LIMIT);
    }

    #[test]
    fn test_filter_data_keys_by_script_name() {
        let mut data = FilterData::default();
        data.selections
            .insert(Script::Hiragana, FilterSet::new(["a", "ka"]));
        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("\"hiragana\":[\"a\",\"ka\"]"));
        let back: FilterData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_scores_data_tolerates_missing_fields() {
        let data: ScoresData = serde_json::from_str("{}").unwrap();
        assert_eq!(data.schema_version, SCHEMA_VERSION);
        assert!(data.entries.is_empty());
    }
}
