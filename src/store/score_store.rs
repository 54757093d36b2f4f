use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::engine::scores::ScoreBook;
use crate::store::backend::Backend;
use crate::store::schema::{SCHEMA_VERSION, ScoresData};

pub type Listener = Box<dyn FnMut(&ScoreBook)>;

/// Current time truncated to the millisecond precision scores are stored with.
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// Persistent per-character score snapshot.
///
/// The in-memory book is authoritative for the running process. Every
/// mutation rewrites the whole snapshot through the backend and then notifies
/// listeners. Storage failures are logged and otherwise ignored, so a broken
/// backend degrades to an in-memory session.
pub struct ScoreStore<B> {
    backend: B,
    book: ScoreBook,
    listeners: Vec<Listener>,
}

impl<B: Backend> ScoreStore<B> {
    pub fn open(backend: B) -> Self {
        let book = read_book(&backend);
        Self {
            backend,
            book,
            listeners: Vec::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Read the persisted snapshot. Absent or unreadable data is empty.
    pub fn load(&self) -> ScoreBook {
        read_book(&self.backend)
    }

    pub fn snapshot(&self) -> &ScoreBook {
        &self.book
    }

    pub fn get_score(&self, id: &str) -> f64 {
        self.book.score(id)
    }

    /// Overwrite the full snapshot.
    pub fn save(&mut self, book: ScoreBook) {
        self.book = book;
        self.persist();
    }

    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&mut ScoreBook, DateTime<Utc>),
    {
        self.update_at(now_millis(), f);
    }

    pub fn update_at<F>(&mut self, now: DateTime<Utc>, f: F)
    where
        F: FnOnce(&mut ScoreBook, DateTime<Utc>),
    {
        f(&mut self.book, now);
        self.persist();
    }

    pub fn decay_all(&mut self, gamma_per_day: f64) {
        self.decay_all_at(gamma_per_day, now_millis());
    }

    pub fn decay_all_at(&mut self, gamma_per_day: f64, now: DateTime<Utc>) {
        self.update_at(now, |book, now| book.decay_all(gamma_per_day, now));
    }

    pub fn clear(&mut self) {
        self.book.clear();
        self.persist();
    }

    /// Register a callback fired after every saved mutation.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&ScoreBook) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    fn persist(&mut self) {
        let data = ScoresData {
            schema_version: SCHEMA_VERSION,
            entries: self.book.clone(),
        };
        if let Err(e) = self.backend.save_scores(&data) {
            warn!("could not save scores, continuing in memory: {e:#}");
        }
        for listener in &mut self.listeners {
            listener(&self.book);
        }
    }
}

fn read_book<B: Backend>(backend: &B) -> ScoreBook {
    match backend.load_scores() {
        Ok(Some(data)) => {
            debug!(entries = data.entries.len(), "loaded scores");
            data.entries
        }
        Ok(None) => ScoreBook::default(),
        Err(e) => {
            warn!("discarding unreadable scores: {e:#}");
            ScoreBook::default()
        }
    }
}
