//! Random source implementations

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ports::RandomSource;

/// Thread-local OS-seeded randomness
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn index(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len.max(1))
    }

    fn chance(&self, probability: f64) -> bool {
        rand::thread_rng().gen_bool(probability.clamp(0.0, 1.0))
    }
}

/// Reproducible randomness from a fixed seed
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn index(&self, len: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_range(0..len.max(1))
    }

    fn chance(&self, probability: f64) -> bool {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_bool(probability.clamp(0.0, 1.0))
    }
}

/// Always returns the same index; `chance(p)` succeeds iff `roll < p`
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom {
    index: usize,
    roll: f64,
}

impl FixedRandom {
    pub fn new(index: usize) -> Self {
        Self { index, roll: 0.0 }
    }

    /// Fixed roll in `0.0..1.0` compared against every probability
    pub fn with_roll(mut self, roll: f64) -> Self {
        self.roll = roll;
        self
    }
}

impl RandomSource for FixedRandom {
    fn index(&self, _len: usize) -> usize {
        self.index
    }

    fn chance(&self, probability: f64) -> bool {
        self.roll < probability
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_is_reproducible() {
        let a = SeededRandom::new(42);
        let b = SeededRandom::new(42);
        let xs: Vec<_> = (0..16).map(|_| a.index(10)).collect();
        let ys: Vec<_> = (0..16).map(|_| b.index(10)).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|&x| x < 10));
    }

    #[test]
    fn test_fixed_roll() {
        let r = FixedRandom::new(0).with_roll(0.9);
        assert!(!r.chance(0.85));
        assert!(r.chance(0.95));
        assert!(!FixedRandom::new(0).chance(0.0));
    }
}
