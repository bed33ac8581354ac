//! Reel template shuffling

use rand::Rng;
use serde::{Deserialize, Serialize};

/// How reel templates are permuted at setup time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShuffleKind {
    /// Fisher–Yates with a uniform draw from `[0, i]`
    #[default]
    Uniform,
    /// Fisher–Yates drawing `round(U[0,1) * i)`
    ///
    /// Reproduces the legacy draw, which picks the endpoints `0` and `i` half
    /// as often as the interior positions.
    LegacyRounded,
}

impl ShuffleKind {
    /// Shuffle a copy of `items` with this mode
    pub fn apply<T: Clone, R: Rng + ?Sized>(self, items: &[T], rng: &mut R) -> Vec<T> {
        match self {
            ShuffleKind::Uniform => shuffle(items, rng),
            ShuffleKind::LegacyRounded => shuffle_legacy_rounded(items, rng),
        }
    }
}

/// Return a uniformly shuffled copy of `items`
///
/// Walks `i` from `len - 1` down to `1`, swapping `i` with a position drawn
/// from `[0, i]`. The input is left untouched.
pub fn shuffle<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    for i in (1..out.len()).rev() {
        let j = rng.random_range(0..=i);
        out.swap(i, j);
    }
    out
}

/// Return a shuffled copy of `items` using the legacy rounded draw
pub fn shuffle_legacy_rounded<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<T> {
    let mut out = items.to_vec();
    for i in (1..out.len()).rev() {
        let j = (rng.random::<f64>() * i as f64).round() as usize;
        out.swap(i, j.min(i));
    }
    out
}
