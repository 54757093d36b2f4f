pub mod answer;
pub mod meaning;
pub mod round;
pub mod trainer;

pub use answer::{AnswerMatcher, Verdict};
pub use round::{Round, RoundPhase};
pub use trainer::{CorrectContext, RoundSummary, StatRow, Trainer, TrainerEvent};
