use std::cell::RefCell;

use anyhow::Result;

use crate::store::schema::{FilterData, PreferencesData, ScoresData};

/// Durable storage used by the trainer. `Ok(None)` means nothing has been
/// saved yet; `Err` means the data exists but cannot be read or written.
pub trait Backend {
    fn load_scores(&self) -> Result<Option<ScoresData>>;
    fn save_scores(&self, data: &ScoresData) -> Result<()>;

    fn load_preferences(&self) -> Result<Option<PreferencesData>>;
    fn save_preferences(&self, data: &PreferencesData) -> Result<()>;

    fn load_filters(&self) -> Result<Option<FilterData>>;
    fn save_filters(&self, data: &FilterData) -> Result<()>;
}

/// Process-local storage. Used in tests and when no data directory is
/// available, in which case progress simply is not kept across runs.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    scores: RefCell<Option<ScoresData>>,
    preferences: RefCell<Option<PreferencesData>>,
    filters: RefCell<Option<FilterData>>,
}

impl Backend for MemoryBackend {
    fn load_scores(&self) -> Result<Option<ScoresData>> {
        Ok(self.scores.borrow().clone())
    }

    fn save_scores(&self, data: &ScoresData) -> Result<()> {
        *self.scores.borrow_mut() = Some(data.clone());
        Ok(())
    }

    fn load_preferences(&self) -> Result<Option<PreferencesData>> {
        Ok(self.preferences.borrow().clone())
    }

    fn save_preferences(&self, data: &PreferencesData) -> Result<()> {
        *self.preferences.borrow_mut() = Some(data.clone());
        Ok(())
    }

    fn load_filters(&self) -> Result<Option<FilterData>> {
        Ok(self.filters.borrow().clone())
    }

    fn save_filters(&self, data: &FilterData) -> Result<()> {
        *self.filters.borrow_mut() = Some(data.clone());
        Ok(())
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn load_scores(&self) -> Result<Option<ScoresData>> {
        (**self).load_scores()
    }

    fn save_scores(&self, data: &ScoresData) -> Result<()> {
        (**self).save_scores(data)
    }

    fn load_preferences(&self) -> Result<Option<PreferencesData>> {
        (**self).load_preferences()
    }

    fn save_preferences(&self, data: &PreferencesData) -> Result<()> {
        (**self).save_preferences(data)
    }

    fn load_filters(&self) -> Result<Option<FilterData>> {
        (**self).load_filters()
    }

    fn save_filters(&self, data: &FilterData) -> Result<()> {
        (**self).save_filters(data)
    }
}
