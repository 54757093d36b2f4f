use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};

use crate::config::Config;
use crate::store::backend::Backend;
use crate::store::schema::{
    EXPORT_VERSION, ExportData, FilterData, PreferencesData, ScoresData,
};

const SCORES_FILE: &str = "scores.json";
const PREFERENCES_FILE: &str = "preferences.json";
const FILTERS_FILE: &str = "filters.json";

const ALL_FILES: [&str; 3] = [SCORES_FILE, PREFERENCES_FILE, FILTERS_FILE];

#[derive(Clone, Debug)]
pub struct JsonStore {
    base_dir: PathBuf,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kanadrill");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("creating data dir {}", base_dir.display()))?;
        Ok(Self { base_dir })
    }

    fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.file_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let data = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(data))
    }

    /// Whole-file replace: write a sibling .tmp, fsync, then rename over.
    fn save<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let path = self.file_path(name);
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Bundle all persisted data + config into an ExportData struct.
    /// Unreadable files export as their defaults.
    pub fn export_all(&self, config: &Config) -> ExportData {
        ExportData {
            kanadrill_export_version: EXPORT_VERSION,
            exported_at: Utc::now(),
            config: config.clone(),
            scores: self.load_scores().ok().flatten().unwrap_or_default(),
            preferences: self.load_preferences().ok().flatten().unwrap_or_default(),
            filters: self.load_filters().ok().flatten().unwrap_or_default(),
        }
    }

    /// Transactional import: two-phase commit with best-effort .bak rollback.
    ///
    /// Stage phase: write all data to .tmp files. If any fails, clean up and bail.
    /// Commit phase: for each file, rename original to .bak, then .tmp to final.
    /// On commit failure, attempt to restore .bak files and clean up .tmp files.
    /// After success, delete .bak files.
    pub fn import_all(&self, data: &ExportData) -> Result<()> {
        if data.kanadrill_export_version != EXPORT_VERSION {
            bail!(
                "Unsupported export version: {} (expected {})",
                data.kanadrill_export_version,
                EXPORT_VERSION
            );
        }

        let files: Vec<(&str, String)> = vec![
            (SCORES_FILE, serde_json::to_string_pretty(&data.scores)?),
            (
                PREFERENCES_FILE,
                serde_json::to_string_pretty(&data.preferences)?,
            ),
            (FILTERS_FILE, serde_json::to_string_pretty(&data.filters)?),
        ];

        let mut staged: Vec<PathBuf> = Vec::new();
        for (name, json) in &files {
            let tmp_path = self.file_path(name).with_extension("json.tmp");
            match write_synced(&tmp_path, json) {
                Ok(()) => staged.push(tmp_path),
                Err(e) => {
                    remove_all(&staged);
                    bail!("Import failed during staging: {e}");
                }
            }
        }

        // (final_path, bak_path, had_original) so rollback can restore absence
        let mut committed: Vec<(PathBuf, PathBuf, bool)> = Vec::new();
        for (i, (name, _)) in files.iter().enumerate() {
            let final_path = self.file_path(name);
            let bak_path = final_path.with_extension("json.bak");
            let had_original = final_path.exists();

            if had_original && let Err(e) = fs::rename(&final_path, &bak_path) {
                rollback(&committed);
                remove_all(&staged);
                bail!("Import failed during commit (backup): {e}");
            }

            if let Err(e) = fs::rename(&staged[i], &final_path) {
                if had_original && bak_path.exists() {
                    let _ = fs::rename(&bak_path, &final_path);
                }
                rollback(&committed);
                remove_all(&staged[i + 1..]);
                bail!("Import failed during commit (rename): {e}");
            }

            committed.push((final_path, bak_path, had_original));
        }

        for (_, bak_path, had_original) in &committed {
            if *had_original {
                let _ = fs::remove_file(bak_path);
            }
        }

        Ok(())
    }

    /// Check for leftover .bak files from an interrupted import.
    /// Returns true if recovery files were found (and cleaned up).
    pub fn check_interrupted_import(&self) -> bool {
        let mut found = false;
        for name in ALL_FILES {
            let bak_path = self.file_path(name).with_extension("json.bak");
            if bak_path.exists() {
                found = true;
                let _ = fs::remove_file(&bak_path);
            }
        }
        found
    }
}

fn write_synced(path: &Path, content: &str) -> Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

fn remove_all(paths: &[PathBuf]) {
    for path in paths {
        let _ = fs::remove_file(path);
    }
}

fn rollback(committed: &[(PathBuf, PathBuf, bool)]) {
    for (final_path, bak_path, had_original) in committed {
        if *had_original {
            let _ = fs::rename(bak_path, final_path);
        } else {
            let _ = fs::remove_file(final_path);
        }
    }
}

impl Backend for JsonStore {
    fn load_scores(&self) -> Result<Option<ScoresData>> {
        self.load(SCORES_FILE)
    }

    fn save_scores(&self, data: &ScoresData) -> Result<()> {
        self.save(SCORES_FILE, data)
    }

    fn load_preferences(&self) -> Result<Option<PreferencesData>> {
        self.load(PREFERENCES_FILE)
    }

    fn save_preferences(&self, data: &PreferencesData) -> Result<()> {
        self.save(PREFERENCES_FILE, data)
    }

    fn load_filters(&self) -> Result<Option<FilterData>> {
        self.load(FILTERS_FILE)
    }

    fn save_filters(&self, data: &FilterData) -> Result<()> {
        self.save(FILTERS_FILE, data)
    }
}
