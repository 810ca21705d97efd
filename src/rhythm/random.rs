//! Random index sources for grammar expansion.
//!
//! Expansion only ever needs "pick one of `len` items". Production code backs
//! this with a seeded `ChaCha8Rng`; tests use [`FixedIndices`] to script every
//! choice.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Picks a uniformly distributed index in `0..len`.
pub trait IndexSource {
    /// Return an index in `0..len`. `len` is never zero when called by the grammar.
    fn pick(&mut self, len: usize) -> usize;
}

impl IndexSource for ChaCha8Rng {
    fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.gen_range(0..len)
    }
}

/// A scripted index source that replays a fixed sequence, cycling when exhausted.
///
/// Each scripted value is reduced modulo `len`, so a script written for one
/// grammar never produces an out-of-range index for another.
#[derive(Debug, Clone)]
pub struct FixedIndices {
    script: Vec<usize>,
    cursor: usize,
}

impl FixedIndices {
    pub fn new(script: impl Into<Vec<usize>>) -> Self {
        Self {
            script: script.into(),
            cursor: 0,
        }
    }

    /// Always picks index 0 (leftmost site, first alternative).
    pub fn zeros() -> Self {
        Self::new(vec![0])
    }

    /// How many picks have been made so far.
    pub fn picks(&self) -> usize {
        self.cursor
    }
}

impl IndexSource for FixedIndices {
    fn pick(&mut self, len: usize) -> usize {
        if len == 0 || self.script.is_empty() {
            self.cursor += 1;
            return 0;
        }
        let value = self.script[self.cursor % self.script.len()];
        self.cursor += 1;
        value % len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn fixed_indices_replay_and_cycle() {
        let mut src = FixedIndices::new(vec![1, 2, 0]);
        assert_eq!(src.pick(5), 1);
        assert_eq!(src.pick(5), 2);
        assert_eq!(src.pick(5), 0);
        assert_eq!(src.pick(5), 1);
        assert_eq!(src.picks(), 4);
    }

    #[test]
    fn fixed_indices_reduce_modulo_len() {
        let mut src = FixedIndices::new(vec![7]);
        assert_eq!(src.pick(3), 1);
        assert_eq!(src.pick(1), 0);
    }

    #[test]
    fn chacha_stays_in_range_and_is_deterministic() {
        let mut a = ChaCha8Rng::seed_from_u64(42);
        let mut b = ChaCha8Rng::seed_from_u64(42);
        for len in 1..50 {
            let x = a.pick(len);
            assert!(x < len);
            assert_eq!(x, b.pick(len));
        }
    }

    #[test]
    fn zero_len_is_harmless() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(rng.pick(0), 0);
        assert_eq!(FixedIndices::zeros().pick(0), 0);
    }
}
