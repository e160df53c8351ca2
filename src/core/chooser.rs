//! The randomness boundary. Every random decision goes through a `Chooser`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Picks an index in `0..n`. `n` is always at least one.
pub trait Chooser {
    fn choose(&mut self, n: usize) -> usize;
}

impl<C: Chooser + ?Sized> Chooser for &mut C {
    fn choose(&mut self, n: usize) -> usize {
        (**self).choose(n)
    }
}

/// Uniform draws from any `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomChooser<R> {
    rng: R,
}

impl<R: Rng> RandomChooser<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl RandomChooser<StdRng> {
    /// A reproducible chooser: the same seed yields the same draws.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> Chooser for RandomChooser<R> {
    fn choose(&mut self, n: usize) -> usize {
        self.rng.gen_range(0..n)
    }
}

/// Replays a fixed list of draws, to force particular branches.
///
/// Each scripted value is reduced modulo `n`. When the script runs out it
/// starts over from the beginning; an empty script always picks index 0.
#[derive(Debug, Clone, Default)]
pub struct ScriptedChooser {
    draws: Vec<usize>,
    cursor: usize,
}

impl ScriptedChooser {
    pub fn new(draws: impl Into<Vec<usize>>) -> Self {
        Self {
            draws: draws.into(),
            cursor: 0,
        }
    }

    /// How many draws have been consumed so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl Chooser for ScriptedChooser {
    fn choose(&mut self, n: usize) -> usize {
        if self.draws.is_empty() {
            return 0;
        }
        let draw = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        draw % n
    }
}
