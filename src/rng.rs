//! Random sources for graph generation and particle behaviour.
//!
//! Everything random in the network (branch counts, candidate directions,
//! particle speeds, child selection) draws from a [`RandomSource`]. Any `rand`
//! generator is a source; [`SequenceRandom`] replays a fixed list of values so
//! tests can predict exact placements.

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

/// A source of uniform samples in `[0, 1)`.
pub trait RandomSource {
    /// Next uniform sample in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// `base + added * sample`, i.e. uniform in `[base, base + added)`.
    #[inline]
    fn spread(&mut self, base: f64, added: f64) -> f64 {
        base + added * self.next_f64()
    }

    /// Uniform index in `0..len`. Returns 0 when `len` is 0.
    #[inline]
    fn index(&mut self, len: usize) -> usize {
        let i = (len as f64 * self.next_f64()) as usize;
        i.min(len.saturating_sub(1))
    }
}

impl<R: RngCore> RandomSource for R {
    #[inline]
    fn next_f64(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Seeded generator: same seed, same network.
pub fn seeded(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

/// Generator seeded from OS entropy: every run differs.
pub fn from_entropy() -> SmallRng {
    SmallRng::from_entropy()
}

/// Owned source for a scene: seeded when `seed` is given, entropy otherwise.
pub fn boxed(seed: Option<u64>) -> Box<dyn RandomSource> {
    match seed {
        Some(seed) => Box::new(seeded(seed)),
        None => Box::new(from_entropy()),
    }
}

/// Replays a fixed list of samples, cycling when exhausted.
///
/// Values are used as given; keep them in `[0, 1)`.
#[derive(Debug, Clone)]
pub struct SequenceRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl SequenceRandom {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// A source that always yields `value`.
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Number of samples drawn so far.
    pub fn drawn(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for SequenceRandom {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}
