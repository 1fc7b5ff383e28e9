//! Random selection shared by the spinner and the bingo roller.

use rand::Rng;

/// Cumulative-weight lookup: the first index whose running sum reaches `r`.
///
/// A draw landing exactly on a boundary resolves to the earlier entry.
/// Entries with zero weight never win.
pub fn pick_index(weights: &[f64], r: f64) -> Option<usize> {
    let mut cumulative = 0.0;
    let mut last = None;
    for (i, weight) in weights.iter().enumerate() {
        if *weight <= 0.0 {
            continue;
        }
        cumulative += weight;
        last = Some(i);
        if r <= cumulative {
            return Some(i);
        }
    }
    // float drift past the final boundary
    last
}

pub fn total_weight(weights: &[f64]) -> f64 {
    weights.iter().filter(|w| **w > 0.0).sum()
}

/// Draws `r` uniformly from `[0, total)` and resolves it with [`pick_index`].
pub fn weighted_pick<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    let total = total_weight(weights);
    if total <= 0.0 || !total.is_finite() {
        return None;
    }
    let r = rng.gen_range(0.0..total);
    pick_index(weights, r)
}

/// Removes one uniformly chosen element, `None` when `pool` is empty.
pub fn take_uniform<T, R: Rng + ?Sized>(pool: &mut Vec<T>, rng: &mut R) -> Option<T> {
    if pool.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..pool.len());
    Some(pool.remove(index))
}
