//! Test RNG — deterministic `DeterministicRng` implementations for tests.

use crossroads_core::rng::DeterministicRng;

/// A no-op RNG that always returns `min` from `next_u32_range`. Identifiers start at zero, secrets are all `A`, and the first
/// expedition scenario is always picked.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }
}

/// An RNG that returns values from a predetermined sequence, clamped into the
/// requested range, then falls back to `min` once the sequence is exhausted.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<u32>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, index: 0 }
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        let Some(value) = self.values.get(self.index) else {
            return min;
        };
        self.index += 1;
        (*value).clamp(min, max.max(min))
    }
}
