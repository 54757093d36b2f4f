use rand::Rng;
use rand::seq::SliceRandom;

use crate::catalog::CharacterRecord;
use crate::engine::scores::ScoreBook;
use crate::engine::weight::weight;

/// Draw a practice sequence of `n` characters from `pool`.
///
/// Each character receives a quota proportional to its weight, rounded with
/// cap-constrained largest-remainder apportionment. Characters with a
/// positive score may repeat up to `max_duplicates` times; the rest are held
/// to an even share of `n`. The result is shuffled and then spread out so
/// the same id does not appear twice in a row unless nothing else is left.
///
/// The sequence is shorter than `n` only when `pool.len() * max_duplicates < n`.
pub fn sample<R: Rng + ?Sized>(
    pool: &[CharacterRecord],
    n: usize,
    max_duplicates: usize,
    scores: &ScoreBook,
    rng: &mut R,
) -> Vec<CharacterRecord> {
    if pool.is_empty() || n == 0 || max_duplicates == 0 {
        return Vec::new();
    }

    let counts = apportion(pool, n, max_duplicates, scores);
    let mut flat: Vec<usize> = counts
        .iter()
        .enumerate()
        .flat_map(|(i, &count)| std::iter::repeat_n(i, count))
        .collect();
    flat.shuffle(rng);

    declump(&flat)
        .into_iter()
        .map(|i| pool[i].clone())
        .collect()
}

/// Occurrence count per pool index.
pub fn apportion(
    pool: &[CharacterRecord],
    n: usize,
    max_duplicates: usize,
    scores: &ScoreBook,
) -> Vec<usize> {
    if pool.is_empty() || n == 0 || max_duplicates == 0 {
        return vec![0; pool.len()];
    }

    let pool_scores: Vec<f64> = pool.iter().map(|r| scores.score(&r.id)).collect();
    let raw: Vec<f64> = pool_scores.iter().map(|&s| weight(s)).collect();
    let sum: f64 = raw.iter().sum();
    let expected: Vec<f64> = raw
        .iter()
        .map(|&w| if sum > 0.0 { n as f64 * w / sum } else { 0.0 })
        .collect();

    let base_cap = max_duplicates.min(n.div_ceil(pool.len())).max(1);
    let caps: Vec<usize> = pool_scores
        .iter()
        .map(|&s| if s > 0.0 { max_duplicates } else { base_cap })
        .collect();

    let mut counts: Vec<usize> = expected
        .iter()
        .zip(&caps)
        .map(|(&e, &cap)| (e.floor() as usize).min(cap))
        .collect();
    let mut used: usize = counts.iter().sum();

    // Stable sort: equal remainders keep pool order.
    let remainder = |i: usize| expected[i] - expected[i].floor();
    let mut order: Vec<usize> = (0..pool.len()).collect();
    order.sort_by(|&a, &b| remainder(b).total_cmp(&remainder(a)));

    for &i in &order {
        if used >= n {
            break;
        }
        if counts[i] < caps[i] {
            counts[i] += 1;
            used += 1;
        }
    }

    // Caps may leave slots over; keep handing them out by remainder rank.
    while used < n {
        let Some(&i) = order.iter().find(|&&i| counts[i] < caps[i]) else {
            break;
        };
        counts[i] += 1;
        used += 1;
    }

    counts
}

/// Rebuild `items` one element at a time, always taking the value with the
/// most copies left that differs from the one just placed. Ties go to the
/// value seen first in `items`.
fn declump(items: &[usize]) -> Vec<usize> {
    let mut remaining: Vec<(usize, usize)> = Vec::new();
    for &item in items {
        match remaining.iter_mut().find(|(value, _)| *value == item) {
            Some((_, count)) => *count += 1,
            None => remaining.push((item, 1)),
        }
    }

    let mut arranged = Vec::with_capacity(items.len());
    let mut prev: Option<usize> = None;
    while arranged.len() < items.len() {
        let mut best: Option<usize> = None;
        let mut best_other: Option<usize> = None;
        for (slot, &(value, count)) in remaining.iter().enumerate() {
            if count == 0 {
                continue;
            }
            if best.is_none_or(|b| count > remaining[b].1) {
                best = Some(slot);
            }
            if Some(value) != prev && best_other.is_none_or(|b| count > remaining[b].1) {
                best_other = Some(slot);
            }
        }
        let Some(slot) = best_other.or(best) else {
            break;
        };
        remaining[slot].1 -= 1;
        let value = remaining[slot].0;
        arranged.push(value);
        prev = Some(value);
    }
    arranged
}
