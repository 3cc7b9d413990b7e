//! Sources of per-side strength variance
//!
//! Battles draw one multiplier per side, attacker first.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub trait VarianceSource: Send {
    /// Uniform draw from `[low, high]`
    fn draw(&mut self, low: f64, high: f64) -> f64;
}

/// Reproducible draws from a seeded ChaCha stream
#[derive(Debug, Clone)]
pub struct SeededVariance {
    rng: ChaCha8Rng,
}

impl SeededVariance {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl VarianceSource for SeededVariance {
    fn draw(&mut self, low: f64, high: f64) -> f64 {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..=high)
    }
}

/// Always returns the same multiplier, ignoring the range
#[derive(Debug, Clone, Copy)]
pub struct FixedVariance(pub f64);

impl VarianceSource for FixedVariance {
    fn draw(&mut self, _low: f64, _high: f64) -> f64 {
        self.0
    }
}

/// Replays a script of draws, then falls back to 1.0
#[derive(Debug, Clone, Default)]
pub struct ScriptedVariance {
    draws: VecDeque<f64>,
}

impl ScriptedVariance {
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }
}

impl VarianceSource for ScriptedVariance {
    fn draw(&mut self, _low: f64, _high: f64) -> f64 {
        self.draws.pop_front().unwrap_or(1.0)
    }
}
