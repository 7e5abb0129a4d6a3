//! Injectable randomness for the producer's bug draw and blame pick.
//!
//! Runs are reproducible from the config seed; tests inject scripted draws
//! to hit the emission boundary exactly.

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub trait RandomSource: Send {
    /// Uniform draw in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick_index(&mut self, len: usize) -> usize;
}

/// Default source, seeded from `StudioConfig::seed`.
pub struct SeededRandom {
    rng: SmallRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn pick_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Replays queued draws and picks; exhausted queues fall back to values
/// that never trigger a bug (draw 1.0) and always blame the first question.
pub struct ScriptedRandom {
    draws: VecDeque<f64>,
    picks: VecDeque<usize>,
}

impl ScriptedRandom {
    pub fn new(draws: impl IntoIterator<Item = f64>, picks: impl IntoIterator<Item = usize>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            picks: picks.into_iter().collect(),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        self.draws.pop_front().unwrap_or(1.0)
    }

    fn pick_index(&mut self, len: usize) -> usize {
        self.picks.pop_front().unwrap_or(0).min(len.saturating_sub(1))
    }
}
