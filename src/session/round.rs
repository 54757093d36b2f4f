use std::collections::BTreeMap;

use crate::catalog::CharacterRecord;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundPhase {
    /// Seeded, nothing answered yet.
    Idle,
    InProgress,
    Finished,
}

/// Flags for the character currently on screen. Dropped, not scored, when
/// the learner moves on or the round is reseeded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Presentation {
    pub had_mistake: bool,
    pub used_hint: bool,
}

impl Presentation {
    pub fn was_unaided(&self) -> bool {
        !self.had_mistake && !self.used_hint
    }
}

/// One practice round over a fixed selection.
#[derive(Clone, Debug)]
pub struct Round {
    selection: Vec<CharacterRecord>,
    index: usize,
    phase: RoundPhase,
    problem_counts: BTreeMap<String, u32>,
    presentation: Presentation,
}

impl Round {
    pub fn new(selection: Vec<CharacterRecord>) -> Self {
        Self {
            selection,
            index: 0,
            phase: RoundPhase::Idle,
            problem_counts: BTreeMap::new(),
            presentation: Presentation::default(),
        }
    }

    pub fn selection(&self) -> &[CharacterRecord] {
        &self.selection
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&CharacterRecord> {
        if self.phase == RoundPhase::Finished {
            return None;
        }
        self.selection.get(self.index)
    }

    pub fn total(&self) -> usize {
        self.selection.len()
    }

    pub fn is_last(&self) -> bool {
        self.index >= self.total().saturating_sub(1)
    }

    pub fn progress(&self) -> f64 {
        if self.selection.is_empty() {
            return 0.0;
        }
        self.index as f64 / self.selection.len() as f64
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == RoundPhase::Finished
    }

    pub fn problem_counts(&self) -> &BTreeMap<String, u32> {
        &self.problem_counts
    }

    pub fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    pub fn presentation_mut(&mut self) -> &mut Presentation {
        &mut self.presentation
    }

    /// Mark the round as started on the first answer-related event.
    pub fn touch(&mut self) {
        if self.phase == RoundPhase::Idle && !self.selection.is_empty() {
            self.phase = RoundPhase::InProgress;
        }
    }

    pub fn note_problem(&mut self, id: &str) {
        *self.problem_counts.entry(id.to_string()).or_insert(0) += 1;
    }

    /// Move to the next cell. Past the last cell the round finishes instead
    /// of wrapping, so the caller can show a summary before reseeding.
    /// Returns true when this call finished the round.
    pub fn advance(&mut self) -> bool {
        if self.selection.is_empty() || self.is_finished() {
            return false;
        }
        self.touch();
        self.presentation = Presentation::default();
        if self.index + 1 < self.selection.len() {
            self.index += 1;
            false
        } else {
            self.phase = RoundPhase::Finished;
            true
        }
    }

    /// Back to the first cell of the same selection. Problem counts stay.
    pub fn restart(&mut self) {
        self.index = 0;
        self.presentation = Presentation::default();
        if !self.selection.is_empty() {
            self.phase = RoundPhase::Idle;
        }
    }

    /// Problem ids ordered by count (highest first), then id.
    pub fn problems_ranked(&self) -> Vec<(String, u32)> {
        let mut ranked: Vec<(String, u32)> = self
            .problem_counts
            .iter()
            .filter(|&(_, &count)| count > 0)
            .map(|(id, &count)| (id.clone(), count))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }
}
