use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const DAY_MS: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Per-character difficulty record. `score` never goes below zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub score: f64,
    pub attempts: u32,
    pub mistakes: u32,
    pub hints: u32,
    #[serde(default, with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub perfect_streak: u32,
}

impl ScoreEntry {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            score: 0.0,
            attempts: 0,
            mistakes: 0,
            hints: 0,
            updated_at: now,
            perfect_streak: 0,
        }
    }

    /// Share of attempts that needed neither a retry nor a hint.
    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            return 1.0;
        }
        let troubled = (self.mistakes + self.hints) as f64;
        (1.0 - troubled / self.attempts as f64).clamp(0.0, 1.0)
    }
}

/// In-memory snapshot of every character's score, keyed by character id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreBook {
    entries: BTreeMap<String, ScoreEntry>,
}

impl ScoreBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&ScoreEntry> {
        self.entries.get(id)
    }

    pub fn score(&self, id: &str) -> f64 {
        self.entries.get(id).map(|e| e.score).unwrap_or(0.0)
    }

    /// Entries are created lazily on the first outcome event for an id.
    pub fn entry_mut(&mut self, id: &str, now: DateTime<Utc>) -> &mut ScoreEntry {
        self.entries
            .entry(id.to_string())
            .or_insert_with(|| ScoreEntry::new(now))
    }

    /// Multiply every score by `gamma_per_day ^ elapsed_days` and stamp the
    /// entry with `now`. Entries without a timestamp count as fresh.
    pub fn decay_all(&mut self, gamma_per_day: f64, now: DateTime<Utc>) {
        if !gamma_per_day.is_finite() || gamma_per_day <= 0.0 {
            return;
        }
        let gamma = gamma_per_day.min(1.0);
        for entry in self.entries.values_mut() {
            let stamp = if entry.updated_at.timestamp_millis() == 0 {
                now
            } else {
                entry.updated_at
            };
            let days = ((now - stamp).num_milliseconds() as f64 / DAY_MS).max(0.0);
            entry.score = (entry.score * gamma.powf(days)).max(0.0);
            entry.updated_at = now;
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ScoreEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
