//! Shared source of per-invocation training seeds

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Thread-safe seed generator handed to the pipeline
///
/// Concurrent callers each receive a distinct draw from the same stream.
/// A fixed seed makes the whole sequence reproducible.
#[derive(Debug)]
pub struct SeedSource {
    rng: Mutex<StdRng>,
}

impl SeedSource {
    /// Reproducible stream starting from `seed`
    pub fn fixed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Stream seeded from operating system entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Fixed when a seed is configured, entropy otherwise
    pub fn from_config(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::fixed(seed),
            None => Self::from_entropy(),
        }
    }

    /// Draw the next seed
    pub fn next_seed(&self) -> u64 {
        self.rng.lock().gen()
    }
}
