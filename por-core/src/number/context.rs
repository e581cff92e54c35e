// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `double` vs. arbitrary-precision choice is factored behind [`NumericContext`] so the
//! parser and formatter state machines are written once and run unmodified under either mode.

use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::errors::{PorError, Result};

/// Accumulates a sequence of digits (most-significant first) into a magnitude, and later scales
/// that magnitude by `base^scale_exp` to produce the final `double`.
pub trait NumericContext: Default {
    /// Folds one more digit into the accumulator: `acc = acc * base + digit`.
    fn push_digit(&mut self, digit: u32, base: u32) -> Result<()>;

    /// Consumes the accumulator and scales it by `base^scale_exp`.
    fn finish(self, base: u32, scale_exp: i32) -> f64;
}

/// Accumulates directly in `f64`, matching the digit-by-digit multiply-add the format's
/// producers perform, with an overflow guard against the radix's `max_double_mul`.
#[derive(Default)]
pub struct FastContext {
    acc: f64,
}

impl NumericContext for FastContext {
    fn push_digit(&mut self, digit: u32, base: u32) -> Result<()> {
        if self.acc > (i32::MAX as f64) && self.acc > f64::MAX / f64::from(base) {
            return Err(PorError::MantissaSize);
        }
        self.acc = self.acc * f64::from(base) + f64::from(digit);
        Ok(())
    }

    fn finish(self, base: u32, scale_exp: i32) -> f64 {
        self.acc * f64::from(base).powi(scale_exp)
    }
}

/// Accumulates in an arbitrary-precision unsigned integer so that a long run of mantissa digits
/// never loses precision to incremental `f64` rounding before the final scale-by-exponent step.
#[derive(Default)]
pub struct PreciseContext {
    acc: BigUint,
}

impl NumericContext for PreciseContext {
    fn push_digit(&mut self, digit: u32, base: u32) -> Result<()> {
        self.acc = &self.acc * BigUint::from(base) + BigUint::from(digit);
        Ok(())
    }

    fn finish(self, base: u32, scale_exp: i32) -> f64 {
        let mantissa = self.acc.to_f64().unwrap_or(f64::INFINITY);
        mantissa * f64::from(base).powi(scale_exp)
    }
}

/// Selects which [`NumericContext`] implementation backs a number parser or formatter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Precision {
    /// Plain `f64` accumulation. Fast, and sufficient for the vast majority of files.
    #[default]
    Fast,
    /// Arbitrary-precision accumulation via [`PreciseContext`]. Slower, but avoids intermediate
    /// rounding error for mantissas with many significant digits.
    Arbitrary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_and_precise_agree_on_small_values() {
        let mut fast = FastContext::default();
        let mut precise = PreciseContext::default();
        for d in [1u32, 2, 3, 4, 5] {
            fast.push_digit(d, 30).unwrap();
            precise.push_digit(d, 30).unwrap();
        }
        assert_eq!(fast.finish(30, 0), precise.finish(30, 0));
    }
}
