//! Random number generator abstraction for determinism.
//!
//! In production, this wraps a real RNG. In tests a seeded or scripted
//! implementation is injected so secrets, identifiers and scenario picks
//! are repeatable.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Abstraction over random number generation.
pub trait DeterministicRng: Send + Sync {
    /// Generate a random `u32` in the range `[min, max]` inclusive.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;
}

/// Picks an index in `0..len` using the given RNG.
///
/// Returns `None` for an empty range.
pub fn choose_index(rng: &mut dyn DeterministicRng, len: usize) -> Option<usize> {
    let last = u32::try_from(len.checked_sub(1)?).unwrap_or(u32::MAX);
    let picked = rng.next_u32_range(0, last) as usize;
    Some(picked.min(len - 1))
}

/// Production RNG seeded from the operating system.
#[derive(Debug)]
pub struct SystemRng(StdRng);

impl SystemRng {
    /// Creates a new OS-seeded RNG.
    #[must_use]
    pub fn new() -> Self {
        Self(StdRng::from_os_rng())
    }
}

impl Default for SystemRng {
    fn default() -> Self {
        Self::new()
    }
}

impl DeterministicRng for SystemRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        if min >= max {
            return min;
        }
        self.0.random_range(min..=max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose_index_of_empty_range_is_none() {
        let mut rng = SystemRng::new();
        assert_eq!(choose_index(&mut rng, 0), None);
    }

    #[test]
    fn test_choose_index_stays_in_bounds() {
        let mut rng = SystemRng::new();
        for _ in 0..100 {
            let index = choose_index(&mut rng, 3).unwrap();
            assert!(index < 3);
        }
    }

    #[test]
    fn test_system_rng_respects_inclusive_range() {
        let mut rng = SystemRng::new();
        for _ in 0..100 {
            let value = rng.next_u32_range(5, 7);
            assert!((5..=7).contains(&value));
        }
        assert_eq!(rng.next_u32_range(9, 9), 9);
    }
}
