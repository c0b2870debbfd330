//! Test RNG — deterministic `DeterministicRng` implementations for tests.

use encounter_core::rng::DeterministicRng;

/// Always returns `min` and `0.0`: every pick takes the first option and
/// every probability roll succeeds.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }

    fn next_f64(&mut self) -> f64 {
        0.0
    }
}

/// An RNG that returns values from a predetermined sequence. Panics if the
/// sequence is exhausted. Used in tests that need specific, repeatable
/// choices (e.g., which idle gesture a substitute picks).
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
    fn next_u32_range(&mut self, _min: u32, _max: u32) -> u32 {
        let value = self.values[self.index];
        self.index += 1;
        value
    }

    fn next_f64(&mut self) -> f64 {
        0.0
    }
}

/// An RNG whose `next_f64` cycles through predetermined fractions, for
/// probability rolls. `next_u32_range` always returns `min`.
#[derive(Debug)]
pub struct FractionRng {
    fractions: Vec<f64>,
    index: usize,
}

impl FractionRng {
    /// Create a new `FractionRng` cycling through `fractions`.
    ///
    /// # Panics
    ///
    /// Panics if `fractions` is empty.
    #[must_use]
    pub fn new(fractions: Vec<f64>) -> Self {
        assert!(!fractions.is_empty(), "FractionRng needs at least one value");
        Self {
            fractions,
            index: 0,
        }
    }
}

impl DeterministicRng for FractionRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }

    fn next_f64(&mut self) -> f64 {
        let value = self.fractions[self.index % self.fractions.len()];
        self.index += 1;
        value
    }
}
