//! Deterministic random sources for testing.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::random::RandomSource;

/// Replays a fixed list of indices, cycling when exhausted.
///
/// Each value is reduced modulo the requested bound so scripts stay valid
/// for any pool size.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<usize>,
    next: usize,
}

impl ScriptedRandom {
    pub fn new(values: Vec<usize>) -> Self {
        Self { values, next: 0 }
    }
}

impl RandomSource for ScriptedRandom {
    fn next_below(&mut self, n: usize) -> usize {
        if self.values.is_empty() {
            return 0;
        }
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value % n
    }
}

/// Seeded pseudo-random source; the same seed gives the same sequence.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_below(&mut self, n: usize) -> usize {
        self.rng.gen_range(0..n)
    }
}
