use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::catalog::Script;
use crate::engine::outcome::{
    DEFAULT_CORRECT_BETA, DEFAULT_MISTAKE_WEIGHT, DEFAULT_PERFECT_STREAK_RESET, ScoringParams,
};

pub const DEFAULT_DECAY_PER_DAY: f64 = 0.98;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerMode {
    Reading,
    Meaning,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintPolicy {
    OncePerPresentation,
    EveryActivation,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_script")]
    pub script: Script,
    #[serde(default = "default_rows")]
    pub rows: usize,
    #[serde(default = "default_cols")]
    pub cols: usize,
    #[serde(default = "default_answer_mode")]
    pub answer_mode: AnswerMode,
    #[serde(default = "default_lang")]
    pub lang: String,
    #[serde(default = "default_decay_per_day")]
    pub decay_per_day: f64,
    #[serde(default = "default_correct_beta")]
    pub correct_beta: f64,
    #[serde(default = "default_mistake_weight")]
    pub mistake_weight: f64,
    #[serde(default = "default_perfect_streak_reset")]
    pub perfect_streak_reset: u32,
    #[serde(default = "default_hint_policy")]
    pub hint_policy: HintPolicy,
    #[serde(default = "default_empty_filter_selects_all")]
    pub empty_filter_selects_all: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Older configs stored a flat cell count instead of a grid.
    #[serde(default, skip_serializing)]
    pub selection_count: Option<usize>,
}

fn default_script() -> Script {
    Script::Katakana
}
fn default_rows() -> usize {
    2
}
fn default_cols() -> usize {
    5
}
fn default_answer_mode() -> AnswerMode {
    AnswerMode::Reading
}
fn default_lang() -> String {
    "en".to_string()
}
fn default_decay_per_day() -> f64 {
    DEFAULT_DECAY_PER_DAY
}
fn default_correct_beta() -> f64 {
    DEFAULT_CORRECT_BETA
}
fn default_mistake_weight() -> f64 {
    DEFAULT_MISTAKE_WEIGHT
}
fn default_perfect_streak_reset() -> u32 {
    DEFAULT_PERFECT_STREAK_RESET
}
fn default_hint_policy() -> HintPolicy {
    HintPolicy::OncePerPresentation
}
fn default_empty_filter_selects_all() -> bool {
    true
}
fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            script: default_script(),
            rows: default_rows(),
            cols: default_cols(),
            answer_mode: default_answer_mode(),
            lang: default_lang(),
            decay_per_day: default_decay_per_day(),
            correct_beta: default_correct_beta(),
            mistake_weight: default_mistake_weight(),
            perfect_streak_reset: default_perfect_streak_reset(),
            hint_policy: default_hint_policy(),
            empty_filter_selects_all: default_empty_filter_selects_all(),
            log_level: default_log_level(),
            selection_count: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if path.exists() {
            let content = fs::read_to_string(&path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kanadrill")
            .join("config.toml")
    }

    /// Clamp every field into range. Call after deserialization.
    pub fn validate(&mut self) {
        if let Some(count) = self.selection_count.take()
            && self.rows == default_rows()
            && self.cols == default_cols()
        {
            self.rows = 2;
            self.cols = count.div_ceil(2);
        }

        self.rows = self.rows.clamp(1, 5);
        self.cols = self.cols.clamp(1, 12);
        if !(self.decay_per_day > 0.0 && self.decay_per_day <= 1.0) {
            self.decay_per_day = default_decay_per_day();
        }
        if !self.correct_beta.is_finite() || self.correct_beta < 0.0 {
            self.correct_beta = default_correct_beta();
        }
        if !self.mistake_weight.is_finite() || self.mistake_weight < 0.0 {
            self.mistake_weight = default_mistake_weight();
        }
        self.perfect_streak_reset = self.perfect_streak_reset.max(1);
    }

    pub fn cells(&self) -> usize {
        self.rows * self.cols
    }

    /// Meaning answers only make sense for scripts that carry meanings.
    pub fn effective_answer_mode(&self) -> AnswerMode {
        if self.answer_mode == AnswerMode::Meaning && self.script.supports_meaning() {
            AnswerMode::Meaning
        } else {
            AnswerMode::Reading
        }
    }

    pub fn scoring(&self) -> ScoringParams {
        ScoringParams {
            mistake_weight: self.mistake_weight,
            hint_weight: self.mistake_weight,
            correct_beta: self.correct_beta,
            perfect_streak_reset: self.perfect_streak_reset,
        }
    }
}
