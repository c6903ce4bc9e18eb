//! Seeded randomness shared by every stochastic decision in a battle.
//!
//! A single generator is owned by the world so that one seed fully
//! determines a run: placement, activation order, occupant shuffles,
//! random walks and hit/heal rolls all draw from it in turn order.

use bevy_ecs::prelude::*;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// World-owned random number generator.
#[derive(Resource, Debug, Clone)]
pub struct SimRng(ChaCha8Rng);

impl SimRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Bernoulli trial. Probabilities outside `[0, 1]` are clamped and a NaN
    /// probability never succeeds, so the roll is defined for any input.
    pub fn roll(&mut self, probability: f64) -> bool {
        if probability.is_nan() {
            return false;
        }
        self.0.gen_bool(probability.clamp(0.0, 1.0))
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.0);
    }

    /// Pick one element uniformly, `None` for an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.0)
    }

    /// Uniform integer in `0..upper`. Returns 0 when `upper <= 0`.
    pub fn below(&mut self, upper: i32) -> i32 {
        if upper <= 0 {
            0
        } else {
            self.0.gen_range(0..upper)
        }
    }

    /// Uniform integer in `0..=max`.
    pub fn up_to(&mut self, max: u32) -> u32 {
        self.0.gen_range(0..=max)
    }
}

impl Default for SimRng {
    fn default() -> Self {
        Self::from_seed(0)
    }
}
