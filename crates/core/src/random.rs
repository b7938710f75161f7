//! Randomness used to deal a shuffled item pool.

use rand::rngs::OsRng;
use rand::Rng;

/// Source of uniformly distributed indices.
pub trait RandomSource: Send {
    /// Returns an unbiased integer in `[0, n)`. `n` is always at least 1.
    fn next_below(&mut self, n: usize) -> usize;
}

/// Random source backed by the operating system CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn next_below(&mut self, n: usize) -> usize {
        OsRng.gen_range(0..n)
    }
}

/// In-place Fisher–Yates shuffle.
pub fn shuffle<T>(items: &mut [T], rng: &mut dyn RandomSource) {
    for i in (1..items.len()).rev() {
        let j = rng.next_below(i + 1);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedRandom, SeededRandom};

    #[test]
    fn test_os_random_in_range() {
        let mut rng = OsRandom;
        for n in 1..50 {
            assert!(rng.next_below(n) < n);
        }
    }

    #[test]
    fn test_shuffle_follows_random_source() {
        // i=3 -> 0, i=2 -> 2, i=1 -> 0
        let mut rng = ScriptedRandom::new(vec![0, 2, 0]);
        let mut items = vec!['a', 'b', 'c', 'd'];
        shuffle(&mut items, &mut rng);
        assert_eq!(items, vec!['b', 'd', 'c', 'a']);
    }

    #[test]
    fn test_shuffle_empty_and_single() {
        let mut rng = SeededRandom::new(1);
        let mut empty: Vec<u8> = vec![];
        shuffle(&mut empty, &mut rng);
        assert!(empty.is_empty());

        let mut single = vec![9];
        shuffle(&mut single, &mut rng);
        assert_eq!(single, vec![9]);
    }

    #[test]
    fn test_shuffle_is_roughly_uniform() {
        // All 6 orderings of three elements should appear with similar frequency.
        let mut rng = SeededRandom::new(42);
        let mut counts = std::collections::HashMap::new();
        for _ in 0..6000 {
            let mut items = [0u8, 1, 2];
            shuffle(&mut items, &mut rng);
            *counts.entry(items).or_insert(0u32) += 1;
        }
        assert_eq!(counts.len(), 6);
        for count in counts.values() {
            assert!((800..1200).contains(count), "skewed count {}", count);
        }
    }
}
