// Symphonia
// Copyright (c) 2019-2022 The Project Symphonia Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The number formatter turns a `double` into a digit string of a configured precision, the
//! mirror image of [`crate::number::parser`], and can reformat an already-formatted digit string
//! down to a lower precision in place.

use num_bigint::BigUint;
use num_traits::ToPrimitive;

use crate::errors::{PorError, Result};
use crate::radix::RadixTable;

/// Formats numbers and re-formats digit strings for one radix system.
pub struct NumberFormatter<'a> {
    radix: &'a RadixTable,
    precision: usize,
    arbitrary_precision: bool,
}

impl<'a> NumberFormatter<'a> {
    pub fn new(radix: &'a RadixTable) -> NumberFormatter<'a> {
        NumberFormatter { radix, precision: radix.default_precision(), arbitrary_precision: false }
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_arbitrary_precision(mut self, enabled: bool) -> Self {
        self.arbitrary_precision = enabled;
        self
    }

    /// Formats `v` as a signed integer: digits extracted LSB-first by repeated modulus, then
    /// emitted reversed, with an optional leading minus.
    pub fn format_int(&self, v: i64, out: &mut Vec<u8>) -> usize {
        out.clear();
        let negative = v < 0;
        let mut mag = v.unsigned_abs();

        let mut digits = Vec::new();
        if mag == 0 {
            digits.push(0u32);
        }
        while mag > 0 {
            digits.push((mag % u64::from(self.radix.base())) as u32);
            mag /= u64::from(self.radix.base());
        }

        if negative {
            out.push(self.radix.minus());
        }
        for &d in digits.iter().rev() {
            out.push(self.radix.digit_byte(d));
        }
        out.len()
    }

    /// Formats `v` as a `double` at the formatter's configured precision, per the
    /// normalise/extract/round/trim/point-or-exponent algorithm.
    pub fn format_double(&self, v: f64) -> Result<Vec<u8>> {
        let negative = v.is_sign_negative() && v != 0.0;
        let magnitude = v.abs();

        if magnitude == 0.0 {
            return Ok(vec![self.radix.digit_byte(0)]);
        }

        let base_f = self.radix.base_f64();
        let mut exp = (magnitude.ln() / base_f.ln()).floor() as i32;

        let mut mantissa = magnitude / base_f.powi(exp);
        if mantissa < 1.0 {
            mantissa *= base_f;
            exp -= 1;
        }
        else if mantissa >= base_f {
            mantissa /= base_f;
            exp += 1;
        }

        let is_integer = magnitude.fract() == 0.0 && magnitude < (i64::MAX as f64);
        let n = if is_integer { (exp + 1).min(self.precision as i32) as usize } else { self.precision };

        let digits = if self.arbitrary_precision {
            self.extract_digits_precise(magnitude, exp, n)
        }
        else {
            self.extract_digits_fast(mantissa, n)
        };

        let (digits, exp) = round_and_trim(digits, exp, self.radix.base());
        Ok(assemble(self.radix, negative, &digits, exp))
    }

    fn extract_digits_fast(&self, mut mantissa: f64, n: usize) -> Vec<u32> {
        let base_f = self.radix.base_f64();
        let mut digits = Vec::with_capacity(n + 1);
        for _ in 0..n {
            let d = mantissa.floor();
            let d = d.clamp(0.0, base_f - 1.0);
            digits.push(d as u32);
            mantissa = (mantissa - d) * base_f;
        }
        // One extra digit drives the round-to-nearest decision in `round_and_trim`.
        let extra = (mantissa.floor() as u32).min(self.radix.base() - 1);
        digits.push(extra);
        digits
    }

    fn extract_digits_precise(&self, magnitude: f64, exp: i32, n: usize) -> Vec<u32> {
        // Scale `magnitude` up so the first `n + 1` significant digits are exact integer
        // arithmetic on an arbitrary-precision accumulator, then peel digits off the top.
        let base = self.radix.base();
        let scale = n as i32 + 1 - (exp + 1);
        let scaled = magnitude * self.radix.base_f64().powi(scale);
        let mut acc = BigUint::from(scaled.round() as u64);
        let base_big = BigUint::from(base);

        let mut digits = vec![0u32; n + 1];
        for slot in digits.iter_mut().rev() {
            *slot = (&acc % &base_big).to_u32().unwrap_or(0);
            acc /= &base_big;
        }
        digits
    }

    /// Re-formats an already-formatted, translated digit buffer `text` to `new_precision`. If the
    /// existing non-zero digit count is already within `new_precision`, returns the buffer
    /// unchanged (by length).
    pub fn reformat(&self, text: &[u8], new_precision: usize) -> Result<Vec<u8>> {
        let parsed = parse_formatted(self.radix, text)?;

        if parsed.digits.len() <= new_precision {
            return Ok(text.to_vec());
        }

        let mut digits = parsed.digits;
        let mut exp = parsed.exp;
        // The first digit being dropped is the rounding decider.
        let decider = digits.get(new_precision).copied().unwrap_or(0);
        digits.truncate(new_precision);
        digits.push(decider);

        let (digits, new_exp) = round_and_trim(digits, exp, self.radix.base());
        exp = new_exp;
        Ok(assemble(self.radix, parsed.negative, &digits, exp))
    }
}

/// Applies half-up rounding using the trailing decider digit, trims trailing zeros, and handles
/// rank overflow (e.g. `"ZZZ"` rounding up to `"100"` with `exp` incremented).
fn round_and_trim(mut digits: Vec<u32>, mut exp: i32, base: u32) -> (Vec<u32>, i32) {
    let decider = digits.pop().unwrap_or(0);
    if decider * 2 >= base {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, 1);
                exp += 1;
                // Inserting a new leading digit means every following digit shifts down one
                // rank; drop the least-significant one to preserve the digit count.
                digits.pop();
                break;
            }
            i -= 1;
            digits[i] += 1;
            if digits[i] < base {
                break;
            }
            digits[i] = 0;
        }
    }

    while digits.len() > 1 && *digits.last().unwrap() == 0 {
        digits.pop();
    }

    (digits, exp)
}

/// Lays out the final digit string: point insertion for small exponents, explicit signed
/// exponent otherwise, leading minus for negative values.
fn assemble(radix: &RadixTable, negative: bool, digits: &[u32], exp: i32) -> Vec<u8> {
    let n = digits.len() as i32;
    let mut out = Vec::with_capacity(digits.len() + 8);

    if negative {
        out.push(radix.minus());
    }

    if digits.len() == 1 && digits[0] == 0 {
        out.push(radix.digit_byte(0));
        return out;
    }

    if exp >= -1 && exp < n - 1 {
        let point_pos = exp + 1;
        if point_pos <= 0 {
            out.push(radix.digit_byte(0));
            out.push(radix.point());
            for &d in digits {
                out.push(radix.digit_byte(d));
            }
        }
        else {
            for &d in &digits[..point_pos as usize] {
                out.push(radix.digit_byte(d));
            }
            out.push(radix.point());
            for &d in &digits[point_pos as usize..] {
                out.push(radix.digit_byte(d));
            }
        }
    }
    else {
        for &d in digits {
            out.push(radix.digit_byte(d));
        }
        let out_exp = exp - (n - 1);
        if out_exp != 0 {
            if out_exp > 0 {
                out.push(radix.plus());
            }
            else {
                out.push(radix.minus());
            }
            let mut fmt = NumberFormatter::new(radix);
            fmt.arbitrary_precision = false;
            let mut exp_digits = Vec::new();
            fmt.format_int(i64::from(out_exp.abs()), &mut exp_digits);
            // `format_int` only emits a sign for negative values; the exponent's sign byte was
            // already emitted above, so strip a duplicate if present.
            let start = if exp_digits.first() == Some(&radix.minus()) { 1 } else { 0 };
            out.extend_from_slice(&exp_digits[start..]);
        }
    }

    out
}

struct ParsedFormatted {
    negative: bool,
    digits: Vec<u32>,
    exp: i32,
}

/// A lightweight re-parse of a buffer already known to be in formatter output shape (sign?,
/// digits, optional point, optional signed exponent), used by `reformat`.
fn parse_formatted(radix: &RadixTable, text: &[u8]) -> Result<ParsedFormatted> {
    let mut i = 0;
    let negative = if text.first() == Some(&radix.minus()) {
        i += 1;
        true
    }
    else {
        if text.first() == Some(&radix.plus()) {
            i += 1;
        }
        false
    };

    let mut int_digits = Vec::new();
    while i < text.len() {
        match radix.digit_of(text[i]) {
            Some(d) => {
                int_digits.push(d);
                i += 1;
            }
            None => break,
        }
    }

    let mut frac_digits = Vec::new();
    if i < text.len() && text[i] == radix.point() {
        i += 1;
        while i < text.len() {
            match radix.digit_of(text[i]) {
                Some(d) => {
                    frac_digits.push(d);
                    i += 1;
                }
                None => break,
            }
        }
    }

    let mut exp_value: i32 = 0;
    let mut exp_negative = false;
    if i < text.len() && (text[i] == radix.plus() || text[i] == radix.minus()) {
        exp_negative = text[i] == radix.minus();
        i += 1;
        while i < text.len() {
            match radix.digit_of(text[i]) {
                Some(d) => {
                    exp_value = exp_value * radix.base() as i32 + d as i32;
                    i += 1;
                }
                None => break,
            }
        }
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return Err(PorError::Syntax { message: "no digits to reformat".into(), position: None });
    }

    let int_len = int_digits.len() as i32;
    let mut digits = int_digits;
    digits.extend(frac_digits);
    // Drop leading zeros (can occur only if int part was exactly "0").
    while digits.len() > 1 && digits[0] == 0 {
        digits.remove(0);
    }

    let out_exp = if exp_negative { -exp_value } else { exp_value };
    let exp = out_exp + int_len - 1;

    Ok(ParsedFormatted { negative, digits, exp })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::radix::POR_BASE;

    fn radix() -> RadixTable {
        RadixTable::new(POR_BASE, None).unwrap()
    }

    #[test]
    fn zero_formats_as_single_zero_digit() {
        let radix = radix();
        let fmt = NumberFormatter::new(&radix);
        assert_eq!(fmt.format_double(0.0).unwrap(), vec![b'0']);
    }

    #[test]
    fn one_formats_as_single_one_digit() {
        let radix = radix();
        let fmt = NumberFormatter::new(&radix).with_precision(11);
        assert_eq!(fmt.format_double(1.0).unwrap(), vec![b'1']);
    }

    #[test]
    fn one_half_formats_with_point() {
        let radix = radix();
        let fmt = NumberFormatter::new(&radix).with_precision(11);
        assert_eq!(fmt.format_double(0.5).unwrap(), b"0.F".to_vec());
    }

    #[test]
    fn format_int_round_trips_sign() {
        let radix = radix();
        let fmt = NumberFormatter::new(&radix);
        let mut out = Vec::new();
        fmt.format_int(-29, &mut out);
        assert_eq!(out[0], radix.minus());
    }

    #[test]
    fn reformat_within_precision_is_unchanged() {
        let radix = radix();
        let fmt = NumberFormatter::new(&radix).with_precision(11);
        let text = b"0.F";
        let out = fmt.reformat(text, 11).unwrap();
        assert_eq!(out, text.to_vec());
    }

    #[test]
    fn reformat_rounds_up_on_truncation() {
        let radix = radix();
        let fmt = NumberFormatter::new(&radix).with_precision(11);
        // "1.T" is digits [1, 29] at exp 0; dropping the trailing 29 (>= base/2) on truncation
        // to one digit must round the kept digit up rather than just chopping it off.
        let out = fmt.reformat(b"1.T", 1).unwrap();
        assert_eq!(out, b"2".to_vec());
    }
}
