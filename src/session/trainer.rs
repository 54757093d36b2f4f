use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, warn};

use crate::catalog::{Catalog, CharacterRecord, Script};
use crate::config::{Config, HintPolicy};
use crate::engine::filter::FilterSet;
use crate::engine::outcome::OutcomeRecorder;
use crate::engine::pool::build_pool;
use crate::engine::sampler::sample;
use crate::engine::scores::ScoreBook;
use crate::engine::weight::normalized_weights;
use crate::error::DrillError;
use crate::session::answer::{AnswerMatcher, Verdict};
use crate::session::round::{Presentation, Round, RoundPhase};
use crate::store::backend::Backend;
use crate::store::schema::{FilterData, PreferencesData};
use crate::store::score_store::ScoreStore;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrainerEvent {
    /// An incorrect submission. Fired once per submission.
    ErrorFlash { id: String },
    RoundFinished,
    Reseeded,
}

/// What the input adapter saw before reporting a correct answer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CorrectContext {
    pub via_hint: bool,
    pub had_mistake: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatRow {
    pub id: String,
    pub glyph: String,
    pub score: f64,
    pub weight: f64,
    pub accuracy: f64,
    pub in_selection: usize,
    pub problems: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundSummary {
    pub total: usize,
    /// `(id, count)` ordered by count, highest first.
    pub problems: Vec<(String, u32)>,
}

impl RoundSummary {
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Drives practice rounds for one script: seeds selections from the
/// weighted pool, routes learner outcomes to the score store, and decides
/// when a round is finished.
pub struct Trainer<B: Backend> {
    config: Config,
    catalog: Catalog,
    filters: FilterData,
    max_duplicates: usize,
    scores: ScoreStore<B>,
    recorder: OutcomeRecorder,
    matcher: AnswerMatcher,
    round: Round,
    pool: Vec<CharacterRecord>,
    events: Vec<TrainerEvent>,
    /// Physical hint key state. Outlives presentations and reseeds so a key
    /// held across an advance does not fire again.
    hint_held: bool,
    rng: SmallRng,
}

impl<B: Backend> Trainer<B> {
    pub fn new(config: Config, catalog: Catalog, backend: B) -> Self {
        Self::with_rng(config, catalog, backend, SmallRng::from_entropy())
    }

    pub fn with_rng(config: Config, catalog: Catalog, backend: B, rng: SmallRng) -> Self {
        let max_duplicates = match backend.load_preferences() {
            Ok(Some(prefs)) => prefs.max_duplicates(),
            Ok(None) => PreferencesData::default().max_duplicates(),
            Err(e) => {
                warn!("discarding unreadable preferences: {e:#}");
                PreferencesData::default().max_duplicates()
            }
        };
        let filters = match backend.load_filters() {
            Ok(data) => data.unwrap_or_default(),
            Err(e) => {
                warn!("discarding unreadable filters: {e:#}");
                FilterData::default()
            }
        };

        let mut trainer = Self {
            recorder: OutcomeRecorder::new(config.scoring()),
            matcher: AnswerMatcher::new(config.effective_answer_mode(), &config.lang),
            config,
            catalog,
            filters,
            max_duplicates,
            scores: ScoreStore::open(backend),
            round: Round::new(Vec::new()),
            pool: Vec::new(),
            events: Vec::new(),
            hint_held: false,
            rng,
        };
        trainer.reseed();
        trainer
    }

    // --- Accessors ---

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn script(&self) -> Script {
        self.catalog.script
    }

    pub fn pool(&self) -> &[CharacterRecord] {
        &self.pool
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn selection(&self) -> &[CharacterRecord] {
        self.round.selection()
    }

    pub fn index(&self) -> usize {
        self.round.index()
    }

    pub fn current(&self) -> Option<&CharacterRecord> {
        self.round.current()
    }

    pub fn total(&self) -> usize {
        self.round.total()
    }

    pub fn is_last(&self) -> bool {
        self.round.is_last()
    }

    pub fn progress(&self) -> f64 {
        self.round.progress()
    }

    pub fn phase(&self) -> RoundPhase {
        self.round.phase()
    }

    pub fn is_finished(&self) -> bool {
        self.round.is_finished()
    }

    pub fn presentation(&self) -> &Presentation {
        self.round.presentation()
    }

    pub fn hint_visible(&self) -> bool {
        self.hint_held && self.round.current().is_some()
    }

    pub fn max_duplicates(&self) -> usize {
        self.max_duplicates
    }

    pub fn scores(&self) -> &ScoreBook {
        self.scores.snapshot()
    }

    pub fn get_score(&self, id: &str) -> f64 {
        self.scores.get_score(id)
    }

    pub fn store(&self) -> &ScoreStore<B> {
        &self.scores
    }

    pub fn drain_events(&mut self) -> Vec<TrainerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn subscribe_scores<F>(&mut self, listener: F)
    where
        F: FnMut(&ScoreBook) + 'static,
    {
        self.scores.subscribe(listener);
    }

    // --- Round lifecycle ---

    /// Decay stale scores, rebuild the pool and draw a fresh selection.
    /// Any in-flight presentation is abandoned without scoring.
    pub fn reseed(&mut self) {
        self.scores.decay_all(self.config.decay_per_day);
        self.pool = build_pool(self.catalog.records(), &self.effective_filter());
        let selection = sample(
            &self.pool,
            self.config.cells(),
            self.max_duplicates,
            self.scores.snapshot(),
            &mut self.rng,
        );
        debug!(
            script = %self.catalog.script,
            pool = self.pool.len(),
            selected = selection.len(),
            "reseeded round"
        );
        self.round = Round::new(selection);
        self.events.push(TrainerEvent::Reseeded);
    }

    pub fn reshuffle(&mut self) {
        self.reseed();
    }

    /// Back to the first cell of the current selection.
    pub fn restart(&mut self) {
        self.round.restart();
    }

    /// Move on without recording anything for the current cell.
    pub fn skip(&mut self) {
        self.advance();
    }

    pub fn summary(&self) -> RoundSummary {
        RoundSummary {
            total: self.round.total(),
            problems: self.round.problems_ranked(),
        }
    }

    /// Leave the finished state and start the next round.
    pub fn acknowledge(&mut self) {
        if self.round.is_finished() {
            self.reseed();
        }
    }

    fn advance(&mut self) {
        if self.round.advance() {
            debug!(problems = self.round.problem_counts().len(), "round finished");
            self.events.push(TrainerEvent::RoundFinished);
        }
    }

    // --- Answering ---

    /// Judge typed text against the current cell and apply the verdict.
    pub fn submit(&mut self, typed: &str) -> Verdict {
        let Some(record) = self.round.current() else {
            return Verdict::Pending;
        };
        let verdict = self.matcher.judge(record, typed);
        match verdict {
            Verdict::Correct => self.evaluate(true),
            Verdict::Incorrect => self.evaluate(false),
            Verdict::Pending => {}
        }
        verdict
    }

    /// Judge a completed submission, such as a line ended with Enter. An
    /// answer still undecided at that point is a miss. Blank input is ignored.
    pub fn submit_final(&mut self, typed: &str) -> Verdict {
        if typed.trim().is_empty() {
            return Verdict::Pending;
        }
        match self.submit(typed) {
            Verdict::Pending => {
                self.evaluate(false);
                Verdict::Incorrect
            }
            verdict => verdict,
        }
    }

    /// Apply a terminal answer for the current cell. A correct answer only
    /// lowers the score when nothing went wrong during this presentation.
    pub fn evaluate(&mut self, correct: bool) {
        let Some(id) = self.round.current().map(|r| r.id.clone()) else {
            return;
        };
        self.round.touch();

        if correct {
            if self.round.presentation().was_unaided() {
                self.recorder.correct(&mut self.scores, &id);
            }
            self.advance();
        } else {
            self.recorder.mistake(&mut self.scores, &id);
            self.round.note_problem(&id);
            self.round.presentation_mut().had_mistake = true;
            self.events.push(TrainerEvent::ErrorFlash { id });
        }
    }

    /// Key-down for the hint. Repeats while held are ignored. Returns true
    /// when this activation was scored.
    pub fn hint_pressed(&mut self) -> bool {
        if self.hint_held {
            return false;
        }
        self.hint_held = true;
        let Some(id) = self.round.current().map(|r| r.id.clone()) else {
            return false;
        };
        self.round.touch();

        let already_used = self.round.presentation().used_hint;
        if already_used && self.config.hint_policy == HintPolicy::OncePerPresentation {
            return false;
        }
        self.recorder.hint(&mut self.scores, &id);
        self.round.note_problem(&id);
        self.round.presentation_mut().used_hint = true;
        true
    }

    pub fn hint_released(&mut self) {
        self.hint_held = false;
    }

    // --- External triggers ---

    pub fn on_mistake(&mut self, id: &str) -> Result<(), DrillError> {
        self.require_known(id)?;
        self.recorder.mistake(&mut self.scores, id);
        self.round.note_problem(id);
        Ok(())
    }

    pub fn on_hint_used(&mut self, id: &str) -> Result<(), DrillError> {
        self.require_known(id)?;
        self.recorder.hint(&mut self.scores, id);
        self.round.note_problem(id);
        Ok(())
    }

    pub fn on_correct(&mut self, id: &str, ctx: CorrectContext) -> Result<(), DrillError> {
        self.require_known(id)?;
        if !ctx.via_hint && !ctx.had_mistake {
            self.recorder.correct(&mut self.scores, id);
        }
        Ok(())
    }

    fn require_known(&self, id: &str) -> Result<(), DrillError> {
        if self.catalog.contains(id) {
            Ok(())
        } else {
            Err(DrillError::UnknownCharacter(id.to_string()))
        }
    }

    // --- Filter and settings ---

    /// The saved inclusion set for the active script, or every id when
    /// nothing has been saved yet.
    pub fn filter(&self) -> FilterSet {
        self.filters
            .selections
            .get(&self.catalog.script)
            .cloned()
            .unwrap_or_else(|| FilterSet::all(&self.catalog))
    }

    fn effective_filter(&self) -> FilterSet {
        let filter = self.filter();
        if filter.is_empty() && self.config.empty_filter_selects_all {
            FilterSet::all(&self.catalog)
        } else {
            filter
        }
    }

    /// Flip one id in or out of the inclusion set. Returns whether it is
    /// now included.
    pub fn toggle_filter(&mut self, id: &str) -> Result<bool, DrillError> {
        self.require_known(id)?;
        let mut filter = self.filter();
        let included = filter.toggle(id);
        self.store_filter(filter);
        Ok(included)
    }

    pub fn select_all(&mut self) {
        let mut filter = self.filter();
        filter.set_all(self.catalog.ids());
        self.store_filter(filter);
    }

    pub fn clear_filter(&mut self) {
        let mut filter = self.filter();
        filter.clear();
        self.store_filter(filter);
    }

    fn store_filter(&mut self, filter: FilterSet) {
        self.filters.selections.insert(self.catalog.script, filter);
        if let Err(e) = self.scores.backend().save_filters(&self.filters) {
            warn!("could not save filters: {e:#}");
        }
        self.reseed();
    }

    pub fn set_script(&mut self, script: Script) {
        self.set_catalog(Catalog::load(script));
    }

    pub fn set_catalog(&mut self, catalog: Catalog) {
        self.config.script = catalog.script;
        self.catalog = catalog;
        self.matcher = AnswerMatcher::new(self.config.effective_answer_mode(), &self.config.lang);
        self.reseed();
    }

    pub fn set_max_duplicates(&mut self, value: usize) {
        self.max_duplicates = PreferencesData::clamp_max_duplicates(value);
        let prefs = PreferencesData {
            max_duplicates: self.max_duplicates,
            ..PreferencesData::default()
        };
        if let Err(e) = self.scores.backend().save_preferences(&prefs) {
            warn!("could not save preferences: {e:#}");
        }
        self.reseed();
    }

    pub fn reset_scores(&mut self) {
        self.scores.clear();
        self.reseed();
    }

    // --- Statistics ---

    pub fn statistics(&self) -> Vec<StatRow> {
        let book = self.scores.snapshot();
        let problems = self.round.problem_counts();
        let mut rows: Vec<StatRow> = normalized_weights(&self.pool, book)
            .into_iter()
            .map(|w| StatRow {
                id: w.record.id.clone(),
                glyph: w.record.glyph.clone(),
                score: book.score(&w.record.id),
                weight: w.weight,
                accuracy: book.get(&w.record.id).map_or(1.0, |e| e.accuracy()),
                in_selection: self
                    .round
                    .selection()
                    .iter()
                    .filter(|r| r.id == w.record.id)
                    .count(),
                problems: problems.get(&w.record.id).copied().unwrap_or(0),
            })
            .collect();
        rows.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnswerMode;
    use crate::store::backend::MemoryBackend;

    fn kana_catalog(ids: &[&str]) -> Catalog {
        Catalog::from_records(
            Script::Katakana,
            ids.iter().map(|id| CharacterRecord::kana(id, id)).collect(),
        )
    }

    fn trainer_with(config: Config, ids: &[&str]) -> Trainer<MemoryBackend> {
        Trainer::with_rng(
            config,
            kana_catalog(ids),
            MemoryBackend::default(),
            SmallRng::seed_from_u64(7),
        )
    }

    fn ten() -> Vec<&'static str> {
        vec!["a", "i", "u", "e", "o", "ka", "ki", "ku", "ke", "ko"]
    }

    #[test]
    fn test_new_trainer_seeds_full_grid() {
        let mut trainer = trainer_with(Config::default(), &ten());
        assert_eq!(trainer.total(), 10);
        assert_eq!(trainer.phase(), RoundPhase::Idle);
        assert_eq!(trainer.drain_events(), vec![TrainerEvent::Reseeded]);
    }

    #[test]
    fn test_correct_advances_and_lowers_nothing_at_zero() {
        let mut trainer = trainer_with(Config::default(), &ten());
        let id = trainer.current().unwrap().id.clone();
        trainer.evaluate(true);
        assert_eq!(trainer.index(), 1);
        assert_eq!(trainer.phase(), RoundPhase::InProgress);
        assert_eq!(trainer.get_score(&id), 0.0);
        assert_eq!(trainer.scores().get(&id).unwrap().perfect_streak, 1);
    }

    #[test]
    fn test_mistake_stays_on_cell_and_flashes_once() {
        let mut trainer = trainer_with(Config::default(), &ten());
        trainer.drain_events();
        let id = trainer.current().unwrap().id.clone();
        trainer.evaluate(false);
        assert_eq!(trainer.index(), 0);
        assert_eq!(trainer.get_score(&id), 1.0);
        assert_eq!(trainer.drain_events(), vec![TrainerEvent::ErrorFlash { id: id.clone() }]);

        // Correct after a mistake moves on without forgiving.
        trainer.evaluate(true);
        assert_eq!(trainer.index(), 1);
        assert_eq!(trainer.get_score(&id), 1.0);
        assert_eq!(trainer.round().problem_counts().get(&id), Some(&1));
    }

    #[test]
    fn test_hint_debounced_while_held() {
        let mut trainer = trainer_with(Config::default(), &ten());
        let id = trainer.current().unwrap().id.clone();
        assert!(trainer.hint_pressed());
        assert!(trainer.hint_visible());
        assert!(!trainer.hint_pressed());
        assert!(!trainer.hint_pressed());
        trainer.hint_released();
        assert!(!trainer.hint_visible());
        assert_eq!(trainer.get_score(&id), 1.0);
        assert_eq!(trainer.scores().get(&id).unwrap().hints, 1);
    }

    #[test]
    fn test_hint_once_per_presentation() {
        let mut trainer = trainer_with(Config::default(), &ten());
        let id = trainer.current().unwrap().id.clone();
        assert!(trainer.hint_pressed());
        trainer.hint_released();
        assert!(!trainer.hint_pressed());
        trainer.hint_released();
        assert_eq!(trainer.scores().get(&id).unwrap().hints, 1);
    }

    #[test]
    fn test_hint_every_activation_policy() {
        let config = Config {
            hint_policy: HintPolicy::EveryActivation,
            ..Config::default()
        };
        let mut trainer = trainer_with(config, &ten());
        let id = trainer.current().unwrap().id.clone();
        assert!(trainer.hint_pressed());
        trainer.hint_released();
        assert!(trainer.hint_pressed());
        trainer.hint_released();
        assert_eq!(trainer.scores().get(&id).unwrap().hints, 2);
        assert_eq!(trainer.round().problem_counts().get(&id), Some(&2));
    }

    #[test]
    fn test_hinted_correct_is_not_smoothed() {
        let mut trainer = trainer_with(Config::default(), &ten());
        let id = trainer.current().unwrap().id.clone();
        trainer.hint_pressed();
        trainer.hint_released();
        trainer.evaluate(true);
        let entry = trainer.scores().get(&id).unwrap();
        assert_eq!(entry.score, 1.0);
        assert_eq!(entry.perfect_streak, 0);
    }

    #[test]
    fn test_round_finishes_instead_of_reseeding() {
        let mut trainer = trainer_with(Config::default(), &ten());
        trainer.drain_events();
        for _ in 0..10 {
            trainer.skip();
        }
        assert!(trainer.is_finished());
        assert!(trainer.current().is_none());
        assert_eq!(trainer.drain_events(), vec![TrainerEvent::RoundFinished]);

        // Answers after the end are ignored.
        trainer.evaluate(false);
        assert!(trainer.scores().is_empty());

        trainer.acknowledge();
        assert_eq!(trainer.phase(), RoundPhase::Idle);
        assert_eq!(trainer.drain_events(), vec![TrainerEvent::Reseeded]);
    }

    #[test]
    fn test_skip_and_restart_do_not_score() {
        let mut trainer = trainer_with(Config::default(), &ten());
        trainer.skip();
        trainer.skip();
        trainer.restart();
        assert_eq!(trainer.index(), 0);
        assert!(trainer.scores().is_empty());
    }

    #[test]
    fn test_reshuffle_abandons_presentation() {
        let mut trainer = trainer_with(Config::default(), &ten());
        trainer.evaluate(false);
        trainer.hint_pressed();
        trainer.hint_released();
        trainer.reshuffle();
        assert!(trainer.presentation().was_unaided());
        assert!(!trainer.hint_visible());
        assert!(trainer.round().problem_counts().is_empty());
    }

    #[test]
    fn test_held_hint_does_not_fire_on_next_cell() {
        let mut trainer = trainer_with(Config::default(), &ten());
        let first = trainer.current().unwrap().id.clone();
        assert!(trainer.hint_pressed());
        trainer.evaluate(true);
        let second = trainer.current().unwrap().id.clone();
        assert_ne!(first, second);

        // Key repeat while still held.
        assert!(!trainer.hint_pressed());
        assert!(trainer.hint_visible());
        assert!(trainer.scores().get(&second).is_none_or(|e| e.hints == 0));
        assert!(!trainer.presentation().used_hint);

        trainer.hint_released();
        assert!(trainer.hint_pressed());
        assert_eq!(trainer.scores().get(&second).unwrap().hints, 1);
    }

    #[test]
    fn test_held_hint_does_not_fire_after_reshuffle() {
        let mut trainer = trainer_with(Config::default(), &ten());
        assert!(trainer.hint_pressed());
        trainer.reshuffle();
        let id = trainer.current().unwrap().id.clone();
        let hints_before = trainer.scores().get(&id).map_or(0, |e| e.hints);

        assert!(!trainer.hint_pressed());
        assert_eq!(trainer.scores().get(&id).map_or(0, |e| e.hints), hints_before);
        assert!(trainer.round().problem_counts().is_empty());

        trainer.hint_released();
        assert!(!trainer.hint_visible());
    }

    #[test]
    fn test_summary_ranks_problems() {
        let mut trainer = trainer_with(Config::default(), &["a", "i"]);
        trainer.on_mistake("i").unwrap();
        trainer.on_mistake("i").unwrap();
        trainer.on_hint_used("a").unwrap();
        let summary = trainer.summary();
        assert_eq!(summary.problems, vec![("i".to_string(), 2), ("a".to_string(), 1)]);
        assert!(!summary.is_clean());
    }

    #[test]
    fn test_unknown_id_is_rejected() {
        let mut trainer = trainer_with(Config::default(), &ten());
        assert_eq!(
            trainer.on_mistake("zz"),
            Err(DrillError::UnknownCharacter("zz".to_string()))
        );
        assert!(trainer.on_correct("zz", CorrectContext::default()).is_err());
        assert!(trainer.toggle_filter("zz").is_err());
        assert!(trainer.scores().is_empty());
    }

    #[test]
    fn test_on_correct_respects_context() {
        let mut trainer = trainer_with(Config::default(), &ten());
        trainer.on_mistake("ka").unwrap();
        let aided = CorrectContext {
            via_hint: true,
            had_mistake: false,
        };
        trainer.on_correct("ka", aided).unwrap();
        assert_eq!(trainer.get_score("ka"), 1.0);
        trainer.on_correct("ka", CorrectContext::default()).unwrap();
        assert!((trainer.get_score("ka") - 0.85).abs() < 1e-12);
    }

    #[test]
    fn test_submit_reading() {
        let mut trainer = trainer_with(Config::default(), &["ka", "ki"]);
        let answer = trainer.current().unwrap().answer.clone();
        assert_eq!(trainer.submit(&answer[..1]), Verdict::Pending);
        assert_eq!(trainer.submit("zz"), Verdict::Incorrect);
        assert_eq!(trainer.submit(&answer), Verdict::Correct);
        assert_eq!(trainer.index(), 1);
    }

    #[test]
    fn test_submit_final_ignores_blank_and_misses_partial() {
        let mut trainer = trainer_with(Config::default(), &["ka", "ki"]);
        trainer.drain_events();
        let id = trainer.current().unwrap().id.clone();

        assert_eq!(trainer.submit_final(""), Verdict::Pending);
        assert_eq!(trainer.submit_final("   "), Verdict::Pending);
        assert!(trainer.scores().get(&id).is_none());
        assert!(trainer.drain_events().is_empty());

        assert_eq!(trainer.submit_final("k"), Verdict::Incorrect);
        assert_eq!(trainer.get_score(&id), 1.0);
        assert_eq!(trainer.index(), 0);
    }

    #[test]
    fn test_meaning_mode_ignored_for_kana() {
        let config = Config {
            answer_mode: AnswerMode::Meaning,
            ..Config::default()
        };
        let mut trainer = trainer_with(config, &["ka"]);
        assert_eq!(trainer.submit("ka"), Verdict::Correct);
    }

    #[test]
    fn test_toggle_filter_rebuilds_pool() {
        let mut trainer = trainer_with(Config::default(), &["a", "i", "u"]);
        assert_eq!(trainer.pool().len(), 3);
        assert!(!trainer.toggle_filter("i").unwrap());
        assert_eq!(trainer.pool().len(), 2);
        assert!(trainer.selection().iter().all(|r| r.id != "i"));
        assert!(trainer.toggle_filter("i").unwrap());
        assert_eq!(trainer.pool().len(), 3);
    }

    #[test]
    fn test_clear_filter_falls_back_to_all() {
        let mut trainer = trainer_with(Config::default(), &["a", "i", "u"]);
        trainer.clear_filter();
        assert!(trainer.filter().is_empty());
        assert_eq!(trainer.pool().len(), 3);
    }

    #[test]
    fn test_clear_filter_without_fallback_gives_empty_round() {
        let config = Config {
            empty_filter_selects_all: false,
            ..Config::default()
        };
        let mut trainer = trainer_with(config, &["a", "i", "u"]);
        trainer.clear_filter();
        assert!(trainer.pool().is_empty());
        assert_eq!(trainer.total(), 0);
        assert!(trainer.current().is_none());
        trainer.evaluate(false);
        assert!(!trainer.hint_pressed());
        assert!(trainer.scores().is_empty());

        trainer.select_all();
        assert_eq!(trainer.pool().len(), 3);
    }

    #[test]
    fn test_set_max_duplicates_clamps_and_persists() {
        let mut trainer = trainer_with(Config::default(), &ten());
        trainer.set_max_duplicates(0);
        assert_eq!(trainer.max_duplicates(), 1);
        trainer.set_max_duplicates(50);
        assert_eq!(trainer.max_duplicates(), 10);
        let saved = trainer.store().backend().load_preferences().unwrap().unwrap();
        assert_eq!(saved.max_duplicates, 10);
    }

    #[test]
    fn test_under_supply_shortens_round() {
        let mut trainer = trainer_with(Config::default(), &["a", "i"]);
        trainer.set_max_duplicates(1);
        assert_eq!(trainer.total(), 2);
    }

    #[test]
    fn test_reset_scores_clears_store() {
        let mut trainer = trainer_with(Config::default(), &ten());
        trainer.on_mistake("ka").unwrap();
        trainer.reset_scores();
        assert!(trainer.scores().is_empty());
        assert!(trainer.store().load().is_empty());
    }

    #[test]
    fn test_statistics_sorted_by_weight() {
        let mut trainer = trainer_with(Config::default(), &ten());
        trainer.on_mistake("ko").unwrap();
        trainer.on_mistake("ko").unwrap();
        let stats = trainer.statistics();
        assert_eq!(stats.len(), 10);
        assert_eq!(stats[0].id, "ko");
        assert_eq!(stats[0].problems, 2);
        assert!(stats[0].accuracy < 1.0);
        let total: f64 = stats.iter().map(|r| r.weight).sum();
        assert!((total - 10.0).abs() < 1e-9);
        let placed: usize = stats.iter().map(|r| r.in_selection).sum();
        assert_eq!(placed, trainer.total());
    }

    #[test]
    fn test_set_catalog_switches_script() {
        let mut trainer = trainer_with(Config::default(), &ten());
        let kanji = Catalog::from_records(
            Script::Kanji,
            vec![CharacterRecord::with_meaning("木", "moku", "tree / wood")],
        );
        trainer.set_catalog(kanji);
        assert_eq!(trainer.script(), Script::Kanji);
        assert_eq!(trainer.config().script, Script::Kanji);
        assert_eq!(trainer.current().unwrap().id, "木");
    }

    #[test]
    fn test_filters_are_kept_per_script() {
        let mut trainer = trainer_with(Config::default(), &["a", "i"]);
        trainer.toggle_filter("a").unwrap();
        let saved = trainer.store().backend().load_filters().unwrap().unwrap();
        assert_eq!(saved.selections.get(&Script::Katakana).unwrap().len(), 1);
        assert!(!saved.selections.contains_key(&Script::Kanji));
    }

    #[test]
    fn test_listener_sees_outcomes() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut trainer = trainer_with(Config::default(), &ten());
        let seen = Rc::new(Cell::new(0.0));
        let sink = Rc::clone(&seen);
        trainer.subscribe_scores(move |book| sink.set(book.score("ka")));
        trainer.on_mistake("ka").unwrap();
        assert_eq!(seen.get(), 1.0);
    }
}
