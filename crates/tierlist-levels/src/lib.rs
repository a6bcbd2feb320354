//! Level selection for tierlist.
//!
//! A tiered list asks a [`LevelSource`] for the height of every node it links in.
//! Production code uses [`RandomLevels`], which draws a truncated geometric level
//! from a `rand` generator. Tests use [`FixedLevels`] to script the exact shape of
//! the structure, or [`RandomLevels::seeded`] for reproducible randomness.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::{StdRng, ThreadRng};

/// Supplies node heights to a tiered list.
///
/// Implementations must return a level in `0..=max_level`.
pub trait LevelSource {
    /// Draw the level for the next node.
    fn next_level(&mut self, max_level: usize, probability: f64) -> usize;
}

impl<L: LevelSource + ?Sized> LevelSource for &mut L {
    fn next_level(&mut self, max_level: usize, probability: f64) -> usize {
        (**self).next_level(max_level, probability)
    }
}

impl<L: LevelSource + ?Sized> LevelSource for Box<L> {
    fn next_level(&mut self, max_level: usize, probability: f64) -> usize {
        (**self).next_level(max_level, probability)
    }
}

/// Run Bernoulli trials until one fails or `max_level` is reached.
///
/// `trial` returns a uniform sample in `[0, 1)`; a trial succeeds when the sample
/// is below `probability`. The result follows `P(k) = p^k (1 - p)` for
/// `k < max_level`, with the remaining mass on `max_level`.
pub fn geometric_level(max_level: usize, probability: f64, mut trial: impl FnMut() -> f64) -> usize {
    let mut level = 0;
    while level < max_level && trial() < probability {
        level += 1;
    }
    level
}

/// Random levels backed by a `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomLevels<R = ThreadRng> {
    rng: R,
}

impl RandomLevels<ThreadRng> {
    /// Levels drawn from the thread-local generator.
    pub fn new() -> Self {
        Self { rng: rand::rng() }
    }
}

impl RandomLevels<StdRng> {
    /// Reproducible levels from a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> RandomLevels<R> {
    /// Wrap an existing generator.
    pub fn from_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Consume the source and return the generator.
    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl Default for RandomLevels<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> LevelSource for RandomLevels<R> {
    fn next_level(&mut self, max_level: usize, probability: f64) -> usize {
        geometric_level(max_level, probability, || self.rng.random::<f64>())
    }
}

/// Deterministic levels replayed from a script.
///
/// The script cycles once exhausted. Each scripted level is clamped to the
/// caller's `max_level`; an empty script always yields level 0.
#[derive(Debug, Clone, Default)]
pub struct FixedLevels {
    script: Vec<usize>,
    cursor: usize,
}

impl FixedLevels {
    /// Create a source that replays `script` in order.
    pub fn new(script: impl Into<Vec<usize>>) -> Self {
        Self {
            script: script.into(),
            cursor: 0,
        }
    }

    /// A source that always answers with `level`.
    pub fn constant(level: usize) -> Self {
        Self::new(vec![level])
    }

    /// Number of levels handed out so far.
    pub fn drawn(&self) -> usize {
        self.cursor
    }

    /// Rewind to the start of the script.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

impl LevelSource for FixedLevels {
    fn next_level(&mut self, max_level: usize, _probability: f64) -> usize {
        if self.script.is_empty() {
            return 0;
        }
        let level = self.script[self.cursor % self.script.len()];
        self.cursor += 1;
        level.min(max_level)
    }
}
