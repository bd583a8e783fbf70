//! Fixed-point integer types for token amounts and oracle prices
//!
//! Amounts and prices are unsigned integers already scaled by their
//! respective precision factors. Multiply-then-divide goes through a
//! 256-bit intermediate, so only the final quotient has to fit in `u128`.
//!
//! Rounding: `mul_div_floor` truncates toward zero, `mul_div_ceil` rounds
//! up. Callers pick the direction that keeps their bound exact.

use crate::errors::MathError;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ── 256-bit helpers ──────────────────────────────────────────────────────

const LOW_MASK: u128 = u64::MAX as u128;

/// Full 256-bit product of two `u128` values as `(hi, lo)`.
fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    let (a1, a0) = (a >> 64, a & LOW_MASK);
    let (b1, b0) = (b >> 64, b & LOW_MASK);

    let p00 = a0 * b0;
    let p01 = a0 * b1;
    let p10 = a1 * b0;
    let p11 = a1 * b1;

    // Each term below is < 2^64, so the sum cannot overflow.
    let mid = (p00 >> 64) + (p01 & LOW_MASK) + (p10 & LOW_MASK);
    let lo = (p00 & LOW_MASK) | (mid << 64);
    let hi = p11 + (p01 >> 64) + (p10 >> 64) + (mid >> 64);
    (hi, lo)
}

/// Divide the 256-bit value `(hi, lo)` by `d`, returning `(quotient, remainder)`.
///
/// Requires `hi < d` so the quotient fits in 128 bits.
fn div_wide(hi: u128, lo: u128, d: u128) -> (u128, u128) {
    let mut rem = hi;
    let mut quot: u128 = 0;
    for i in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((lo >> i) & 1);
        quot <<= 1;
        if carry == 1 || rem >= d {
            rem = rem.wrapping_sub(d);
            quot |= 1;
        }
    }
    (quot, rem)
}

fn mul_div_rem(a: u128, b: u128, denom: u128) -> Result<(u128, u128), MathError> {
    if denom == 0 {
        return Err(MathError::DivisionByZero);
    }
    let (hi, lo) = widening_mul(a, b);
    if hi >= denom {
        return Err(MathError::Overflow);
    }
    Ok(div_wide(hi, lo, denom))
}

/// `floor(a * b / denom)` without intermediate overflow.
pub fn mul_div_floor(a: u128, b: u128, denom: u128) -> Result<u128, MathError> {
    mul_div_rem(a, b, denom).map(|(q, _)| q)
}

/// `ceil(a * b / denom)` without intermediate overflow.
pub fn mul_div_ceil(a: u128, b: u128, denom: u128) -> Result<u128, MathError> {
    let (q, r) = mul_div_rem(a, b, denom)?;
    if r == 0 {
        Ok(q)
    } else {
        q.checked_add(1).ok_or(MathError::Overflow)
    }
}

// ── Amount ───────────────────────────────────────────────────────────────

/// Token or USD amount in base units (already scaled by the token's decimals).
///
/// Serialized as a decimal string so values above 2^53 survive JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);
    pub const MAX: Amount = Amount(u128::MAX);

    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u128 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Amount) -> Result<Amount, MathError> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .ok_or(MathError::Overflow)
    }

    pub fn checked_sub(self, other: Amount) -> Result<Amount, MathError> {
        self.0
            .checked_sub(other.0)
            .map(Amount)
            .ok_or(MathError::Underflow)
    }

    pub fn saturating_sub(self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0))
    }

    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }

    /// `floor(self * mul / div)`
    pub fn mul_div_floor(self, mul: u128, div: u128) -> Result<Amount, MathError> {
        mul_div_floor(self.0, mul, div).map(Amount)
    }

    /// `ceil(self * mul / div)`
    pub fn mul_div_ceil(self, mul: u128, div: u128) -> Result<Amount, MathError> {
        mul_div_ceil(self.0, mul, div).map(Amount)
    }

    /// Decimal view with `decimals` fractional digits, for display and
    /// threshold comparisons. Returns None if the value exceeds Decimal's range.
    pub fn to_decimal(self, decimals: u32) -> Option<Decimal> {
        let raw = i128::try_from(self.0).ok()?;
        Decimal::try_from_i128_with_scale(raw, decimals).ok()
    }
}

impl From<u128> for Amount {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}

impl From<u64> for Amount {
    fn from(raw: u64) -> Self {
        Self(raw as u128)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<u128>()
            .map(Amount)
            .map_err(serde::de::Error::custom)
    }
}

// ── Price ────────────────────────────────────────────────────────────────

/// USD price of one whole collateral unit, scaled by the vault's `price_precision`.
///
/// Serialized as a decimal string, like `Amount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(u128);

impl Price {
    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u128 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Price of `whole` units given the scaling factor, e.g.
    /// `Price::from_units(2000, 100_000_000)` for $2000 at 8 decimals.
    pub fn from_units(whole: u128, price_precision: u128) -> Result<Price, MathError> {
        whole
            .checked_mul(price_precision)
            .map(Price)
            .ok_or(MathError::Overflow)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<u128>()
            .map(Price)
            .map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
