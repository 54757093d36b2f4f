use std::collections::HashSet;
use std::fs;

use rust_embed::Embed;
use tracing::warn;

use crate::catalog::record::{CharacterRecord, Script};

#[derive(Embed)]
#[folder = "assets/catalogs/"]
struct CatalogAssets;

/// Ordered character table for one script.
#[derive(Clone, Debug)]
pub struct Catalog {
    pub script: Script,
    records: Vec<CharacterRecord>,
}

impl Catalog {
    pub fn load(script: Script) -> Self {
        let filename = format!("{}.json", script.to_key());

        // Try user catalogs dir
        if let Some(config_dir) = dirs::config_dir() {
            let user_path = config_dir.join("kanadrill").join("catalogs").join(&filename);
            if let Ok(content) = fs::read_to_string(&user_path) {
                match serde_json::from_str::<Vec<CharacterRecord>>(&content) {
                    Ok(records) => return Self::from_records(script, records),
                    Err(e) => warn!(path = %user_path.display(), "ignoring unreadable catalog: {e}"),
                }
            }
        }

        // Bundled catalogs
        let records = CatalogAssets::get(&filename)
            .and_then(|file| {
                serde_json::from_slice::<Vec<CharacterRecord>>(file.data.as_ref())
                    .map_err(|e| warn!(script = %script, "bundled catalog is invalid: {e}"))
                    .ok()
            })
            .unwrap_or_default();
        Self::from_records(script, records)
    }

    /// Later duplicates of an id are dropped so scoring identities stay unique.
    pub fn from_records(script: Script, records: Vec<CharacterRecord>) -> Self {
        let mut seen = HashSet::new();
        let records = records
            .into_iter()
            .filter(|r| seen.insert(r.id.clone()))
            .collect();
        Self { script, records }
    }

    pub fn records(&self) -> &[CharacterRecord] {
        &self.records
    }

    pub fn ids(&self) -> Vec<String> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&CharacterRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalogs_are_non_empty() {
        for &script in Script::all() {
            let catalog = CatalogAssets::get(&format!("{}.json", script.to_key()))
                .and_then(|f| serde_json::from_slice::<Vec<CharacterRecord>>(f.data.as_ref()).ok())
                .unwrap_or_default();
            assert!(!catalog.is_empty(), "{script} catalog should not be empty");
        }
    }

    #[test]
    fn test_kanji_records_carry_meanings() {
        let file = CatalogAssets::get("kanji.json").unwrap();
        let records: Vec<CharacterRecord> = serde_json::from_slice(file.data.as_ref()).unwrap();
        assert!(records.iter().all(|r| r.meaning.is_some()));
        assert!(records.iter().all(|r| r.id == r.glyph));
    }

    #[test]
    fn test_from_records_drops_duplicate_ids() {
        let catalog = Catalog::from_records(
            Script::Katakana,
            vec![
                CharacterRecord::kana("カ", "ka"),
                CharacterRecord::kana("キ", "ki"),
                CharacterRecord::kana("ヵ", "ka"),
            ],
        );
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("ka").unwrap().glyph, "カ");
        assert_eq!(catalog.ids(), vec!["ka", "ki"]);
    }
}
