// ABOUTME: Injectable random source for chance rolls and candidate shuffling
// ABOUTME: ChaCha-backed default with seeded construction for reproducible runs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Mutex;

/// Randomness consumed by the planning engine
///
/// Methods take `&self` so a single source can be shared across tasks.
pub trait RandomSource: Send + Sync {
    /// Whether a roll against `chance_percent` (0-100) succeeds
    fn roll(&self, chance_percent: u8) -> bool;

    /// Uniform index in `0..upper`; `upper` is never zero
    fn next_index(&self, upper: usize) -> usize;
}

/// Fisher-Yates shuffle driven by a [`RandomSource`]
pub fn shuffle<T>(random: &dyn RandomSource, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = random.next_index(i + 1);
        items.swap(i, j);
    }
}

/// Default random source backed by `ChaCha8Rng`
#[derive(Debug)]
pub struct ChaChaRandom {
    rng: Mutex<ChaCha8Rng>,
}

impl ChaChaRandom {
    /// Seed from operating system entropy
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::from_entropy()),
        }
    }

    /// Deterministic source for reproducible runs
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

impl Default for ChaChaRandom {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RandomSource for ChaChaRandom {
    fn roll(&self, chance_percent: u8) -> bool {
        if chance_percent >= 100 {
            return true;
        }
        if chance_percent == 0 {
            return false;
        }
        let Ok(mut rng) = self.rng.lock() else {
            return false;
        };
        rng.gen_range(0..100u8) < chance_percent
    }

    fn next_index(&self, upper: usize) -> usize {
        if upper <= 1 {
            return 0;
        }
        let Ok(mut rng) = self.rng.lock() else {
            return 0;
        };
        rng.gen_range(0..upper)
    }
}
