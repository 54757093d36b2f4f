use thiserror::Error;

use crate::catalog::Script;

/// Caller contract violations. Data-quality problems never surface here;
/// they degrade to empty or default state instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrillError {
    #[error("unknown character id `{0}` for the active script")]
    UnknownCharacter(String),
    #[error("no characters available for {0}")]
    EmptyCatalog(Script),
}
