//! Random Source Port
//!
//! Every random decision (item choice, simulated provider outcomes) goes
//! through this trait so tests can pin outcomes.

/// Injectable randomness
pub trait RandomSource: Send + Sync {
    /// Uniform index in `0..len`. `len` is never zero.
    fn index(&self, len: usize) -> usize;

    /// `true` with the given probability (clamped to 0.0..=1.0)
    fn chance(&self, probability: f64) -> bool;
}
