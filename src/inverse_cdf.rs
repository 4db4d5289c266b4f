//! A discretized inverse cumulative distribution function for drawing event delays.
//!
//! The table holds the inverse CDF evaluated at `RES` equally spaced cumulative probabilities
//! `i / RES` plus one boundary value at index `RES`. Drawing a delay is one uniform draw, one
//! linear interpolation between neighbouring entries and one logarithm, which is much cheaper
//! than inverting a CDF analytically when millions of delays are drawn per run.
//!
//! A table is prepared in two steps, in order:
//!
//! 1. [`InverseCdf::set_neg_log`] fills entry `i` with `-ln(1 - i/RES)` and the boundary entry
//!    with the given start value.
//! 2. [`InverseCdf::assign_exponent`] maps every entry `x` to `exp(-x)`, or
//!    [`InverseCdf::assign_exponent_value`] sets every entry to the same `exp(value)`, which
//!    yields a degenerate table whose draws are all `-mean * value`.
//!
//! After step 2 the entries are survival probabilities, so [`InverseCdf::choose`] returns
//! `-mean * ln(S)`. With the default preparation this is an exponentially distributed delay.

use std::ops::Index;

use rand::Rng;

use crate::population::Timestep;

#[derive(Clone, Debug, PartialEq)]
pub struct InverseCdf {
    values: [f64; InverseCdf::RES + 1],
}

impl InverseCdf {
    /// Number of cumulative-probability steps in the table.
    pub const RES: usize = 20;

    /// An unprepared table; every entry is zero.
    pub fn new() -> Self {
        InverseCdf {
            values: [0.0; Self::RES + 1],
        }
    }

    /// A table for exponentially distributed delays, prepared with a boundary start value of
    /// `1e10`, which exponentiates to zero.
    pub fn exponential() -> Self {
        let mut icdf = Self::new();
        icdf.set_neg_log(1e10);
        icdf.assign_exponent();
        icdf
    }

    /// Seeds the boundary entry with `start_value` and fills the rest with `-ln(1 - i/RES)`.
    #[allow(clippy::cast_precision_loss)]
    pub fn set_neg_log(&mut self, start_value: f64) {
        self.values[Self::RES] = start_value;
        for i in 0..Self::RES {
            self.values[i] = -(1.0 - i as f64 / Self::RES as f64).ln();
        }
    }

    /// Replaces every entry, the boundary included, with `exp(-entry)`.
    pub fn assign_exponent(&mut self) {
        for value in &mut self.values {
            *value = (-*value).exp();
        }
    }

    /// Replaces every entry with `exp(value)`.
    pub fn assign_exponent_value(&mut self, value: f64) {
        self.values = [value.exp(); Self::RES + 1];
    }

    /// Draws a delay and converts it to a whole number of timesteps.
    ///
    /// The uniform draw lies in `[0, RES)`, so the interpolation reads at most entry `RES`. The
    /// delay is rounded to the nearest timestep and never negative.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn choose<R: Rng>(&self, rng: &mut R, mean: f64, timesteps_per_day: f64) -> Timestep {
        let u: f64 = rng.random_range(0.0..Self::RES as f64);
        let i = (u.floor() as usize).min(Self::RES - 1);
        let q = u - i as f64;

        let interpolated = q * self.values[i + 1] + (1.0 - q) * self.values[i];
        let delay = -mean * interpolated.ln();
        let timesteps = (0.5 + delay * timesteps_per_day).floor();
        if timesteps.is_nan() || timesteps <= 0.0 {
            0
        } else if timesteps >= f64::from(Timestep::MAX) {
            Timestep::MAX
        } else {
            timesteps as Timestep
        }
    }

    pub fn values(&self) -> &[f64; InverseCdf::RES + 1] {
        &self.values
    }
}

impl Default for InverseCdf {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<usize> for InverseCdf {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}
