//! Half-open float ranges used for every randomized scene parameter.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Uniform sampling range `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloatRange {
    pub min: f32,
    pub max: f32,
}

impl FloatRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// A range that always yields `value`.
    pub const fn constant(value: f32) -> Self {
        Self { min: value, max: value }
    }

    /// Draw a value uniformly from `[min, max)`. Degenerate ranges (`max <= min`)
    /// yield `min`; ranges with a non-finite bound or span yield `min` if it is
    /// finite, else 0.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if !self.min.is_finite() {
            0.0
        } else if !(self.max - self.min).is_finite() || self.max <= self.min {
            self.min
        } else {
            rng.gen_range(self.min..self.max)
        }
    }

    /// Finite bounds with `min <= max`.
    pub fn is_valid(&self) -> bool {
        (self.max - self.min).is_finite() && self.min <= self.max
    }

    /// Whether `value` could have been produced by `sample`.
    pub fn contains(&self, value: f32) -> bool {
        if self.max <= self.min {
            value == self.min
        } else {
            value >= self.min && value < self.max
        }
    }

    pub fn span(&self) -> f32 {
        (self.max - self.min).max(0.0)
    }
}
