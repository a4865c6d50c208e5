//! Deterministic utilities for reproducible forest training
//!
//! Provides LCG-based RNG, seed mixing, and tie-breaking logic so that
//! the same seed yields identical forests across platforms and runs.

use std::num::Wrapping;

/// Linear Congruential Generator for deterministic pseudo-randomness
/// Uses constants from Numerical Recipes (glibc)
#[derive(Clone, Debug)]
pub struct LcgRng {
    state: Wrapping<u64>,
}

impl LcgRng {
    // LCG constants (compatible with glibc)
    const MULTIPLIER: u64 = 1103515245;
    const INCREMENT: u64 = 12345;
    const MODULUS: u64 = 1 << 31;

    pub fn new(seed: u64) -> Self {
        Self {
            state: Wrapping(seed % Self::MODULUS),
        }
    }

    /// Generate next random value in range [0, MODULUS)
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state * Wrapping(Self::MULTIPLIER) + Wrapping(Self::INCREMENT);
        self.state.0 & (Self::MODULUS - 1)
    }

    /// Generate random index in range [0, max)
    pub fn next_index(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        (self.next_u64() % max as u64) as usize
    }

    /// Pick `count` distinct values from `0..n`, returned in ascending order
    pub fn sample_without_replacement(&mut self, n: usize, count: usize) -> Vec<usize> {
        let count = count.min(n);
        let mut pool: Vec<usize> = (0..n).collect();
        // Partial Fisher-Yates
        for i in 0..count {
            let j = i + self.next_index(n - i);
            pool.swap(i, j);
        }
        let mut picked = pool[..count].to_vec();
        picked.sort_unstable();
        picked
    }

    /// Draw `n` indices from `0..n` with replacement, in ascending order
    pub fn bootstrap(&mut self, n: usize) -> Vec<usize> {
        let mut sample: Vec<usize> = (0..n).map(|_| self.next_index(n)).collect();
        sample.sort_unstable();
        sample
    }
}

/// Derive an independent per-tree seed from the forest seed
/// Simplified xxhash64 finalizer
pub fn tree_seed(seed: u64, tree_idx: usize) -> u64 {
    const PRIME1: u64 = 0x9E3779B185EBCA87;
    const PRIME2: u64 = 0xC2B2AE3D27D4EB4F;
    const PRIME3: u64 = 0x165667B19E3779F9;
    const PRIME5: u64 = 0x85EBCA77C2B2AE63;

    let mut h = seed.wrapping_add(PRIME5);
    h = h.wrapping_add((tree_idx as u64).wrapping_mul(PRIME3));
    h = h.rotate_left(17).wrapping_mul(PRIME2);

    h ^= h >> 33;
    h = h.wrapping_mul(PRIME1);
    h ^= h >> 29;
    h = h.wrapping_mul(PRIME2);
    h ^= h >> 32;

    h
}

/// Deterministic tie-breaker for split selection
/// Earlier features, then earlier candidates, win equal gains
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SplitTieBreaker {
    pub feature_idx: usize,
    pub candidate_idx: usize,
}

impl SplitTieBreaker {
    pub fn new(feature_idx: usize, candidate_idx: usize) -> Self {
        Self {
            feature_idx,
            candidate_idx,
        }
    }
}
