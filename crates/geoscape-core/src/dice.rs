//! Injectable randomness for weighted tables and percentage rolls.
//!
//! Every seeded `rand` generator is a `Dice`; tests can implement the trait on a
//! fixed sequence to force exact choices.

use rand::{Rng, RngCore};

pub trait Dice {
    /// Uniform integer in `0..upper`. Returns 0 when `upper <= 1`.
    fn roll(&mut self, upper: u32) -> u32;

    /// True with `chance` percent probability.
    fn percent(&mut self, chance: u32) -> bool {
        if chance == 0 {
            false
        } else if chance >= 100 {
            true
        } else {
            self.roll(100) < chance
        }
    }

    /// Uniform integer in `min..=max`.
    fn between(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        min + self.roll(max - min + 1)
    }

    /// Uniform float in `[0, 1)`.
    fn unit(&mut self) -> f64 {
        f64::from(self.roll(1_000_000)) / 1_000_000.0
    }
}

impl<R: RngCore> Dice for R {
    fn roll(&mut self, upper: u32) -> u32 {
        if upper <= 1 {
            0
        } else {
            self.gen_range(0..upper)
        }
    }
}
