//! Score ordering for beam pruning
//!
//! Higher score = more promising derivation (kept first). A NaN score ranks
//! below every real score so a misbehaving scorer cannot crowd out the beam.

use std::cmp::Ordering;

fn rank_value(score: f64) -> f64 {
    if score.is_nan() {
        f64::NEG_INFINITY
    } else {
        score
    }
}

/// Ordering that puts the higher score first
pub fn best_first(a: f64, b: f64) -> Ordering {
    rank_value(b)
        .partial_cmp(&rank_value(a))
        .unwrap_or(Ordering::Equal)
}

/// Stable sort of scored items, best first
pub fn sort_best_first<T>(scored: &mut [(f64, T)]) {
    scored.sort_by(|a, b| best_first(a.0, b.0));
}
