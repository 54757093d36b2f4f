use crate::catalog::CharacterRecord;
use crate::engine::scores::ScoreBook;

/// Steepness of the score-to-weight curve; higher values let trouble
/// characters dominate a round.
pub const WEIGHT_GAMMA: f64 = 1.6;
/// Floor so characters with a zero score still show up.
pub const WEIGHT_EPSILON: f64 = 0.05;

pub fn weight(score: f64) -> f64 {
    WEIGHT_EPSILON + (1.0 + score.max(0.0)).powf(WEIGHT_GAMMA)
}

#[derive(Clone, Debug)]
pub struct WeightedRecord<'a> {
    pub record: &'a CharacterRecord,
    pub weight: f64,
}

/// Sampling weights rescaled to average 1 across the pool, for display.
pub fn normalized_weights<'a>(
    pool: &'a [CharacterRecord],
    scores: &ScoreBook,
) -> Vec<WeightedRecord<'a>> {
    let raw: Vec<f64> = pool.iter().map(|r| weight(scores.score(&r.id))).collect();
    let sum: f64 = raw.iter().sum();
    let scale = if sum > 0.0 { pool.len() as f64 / sum } else { 0.0 };
    pool.iter()
        .zip(raw)
        .map(|(record, w)| WeightedRecord {
            record,
            weight: w * scale,
        })
        .collect()
}
