//! Exact integer math on WAD-scaled values.
//!
//! All helpers are total: overflow is reported through `Option`/`Result`
//! rather than panicking or wrapping.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::error::TypesError;
use crate::params::BPS_DENOMINATOR;

/// 10^18, the fixed-point scale.
pub const WAD: u128 = 1_000_000_000_000_000_000;

const LOW_MASK: u128 = u64::MAX as u128;

/// Unsigned 256-bit integer as four little-endian `u64` limbs.
///
/// Holds the exact product of any two `u128` values, so squares of WAD
/// amounts never round or overflow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct U256([u64; 4]);

impl U256 {
    pub const ZERO: Self = Self([0; 4]);

    pub const fn from_u128(value: u128) -> Self {
        Self::from_words(0, value)
    }

    const fn from_words(high: u128, low: u128) -> Self {
        Self([
            low as u64,
            (low >> 64) as u64,
            high as u64,
            (high >> 64) as u64,
        ])
    }

    /// `(high, low)` 128-bit halves.
    fn words(self) -> (u128, u128) {
        let [l0, l1, l2, l3] = self.0;
        (
            ((l3 as u128) << 64) | l2 as u128,
            ((l1 as u128) << 64) | l0 as u128,
        )
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 4]
    }

    /// Full 128×128 → 256-bit product.
    pub fn widening_mul(a: u128, b: u128) -> Self {
        let (a1, a0) = (a >> 64, a & LOW_MASK);
        let (b1, b0) = (b >> 64, b & LOW_MASK);

        let p00 = a0 * b0;
        let p01 = a0 * b1;
        let p10 = a1 * b0;
        let p11 = a1 * b1;

        let mid = (p00 >> 64) + (p01 & LOW_MASK) + (p10 & LOW_MASK);
        let low = (p00 & LOW_MASK) | ((mid & LOW_MASK) << 64);
        let high = p11 + (p01 >> 64) + (p10 >> 64) + (mid >> 64);
        Self::from_words(high, low)
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        let (ah, al) = self.words();
        let (bh, bl) = other.words();
        let (low, carry) = al.overflowing_add(bl);
        let high = ah.checked_add(bh)?.checked_add(carry as u128)?;
        Some(Self::from_words(high, low))
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        let (ah, al) = self.words();
        let (bh, bl) = other.words();
        let (low, borrow) = al.overflowing_sub(bl);
        let high = ah.checked_sub(bh)?.checked_sub(borrow as u128)?;
        Some(Self::from_words(high, low))
    }

    fn wrapping_sub(self, other: Self) -> Self {
        let (ah, al) = self.words();
        let (bh, bl) = other.words();
        let (low, borrow) = al.overflowing_sub(bl);
        Self::from_words(ah.wrapping_sub(bh).wrapping_sub(borrow as u128), low)
    }

    /// Shift left by one, shifting `bit` in at the bottom. Returns the bit
    /// shifted out at the top.
    fn shl1_with(self, bit: bool) -> (Self, bool) {
        let (high, low) = self.words();
        let out = high >> 127 == 1;
        let high = (high << 1) | (low >> 127);
        let low = (low << 1) | bit as u128;
        (Self::from_words(high, low), out)
    }

    /// Integer square root, rounded down. Always fits in a `u128`.
    pub fn isqrt(self) -> u128 {
        let mut lo: u128 = 0;
        let mut hi: u128 = u128::MAX;
        while lo < hi {
            let diff = hi - lo;
            let mid = lo + (diff / 2) + (diff % 2);
            if Self::widening_mul(mid, mid) <= self {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        lo
    }

    /// Short division by a non-zero `u64`.
    pub(crate) fn div_rem_u64(self, divisor: u64) -> (Self, u64) {
        let divisor = divisor as u128;
        let mut quot = [0u64; 4];
        let mut rem: u128 = 0;
        for i in (0..4).rev() {
            let cur = (rem << 64) | self.0[i] as u128;
            quot[i] = (cur / divisor) as u64;
            rem = cur % divisor;
        }
        (Self(quot), rem as u64)
    }
}

impl Ord for U256 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.words().cmp(&other.words())
    }
}

impl PartialOrd for U256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const CHUNK: u64 = 10_000_000_000_000_000_000;
        let mut chunks = Vec::new();
        let mut rest = *self;
        loop {
            let (quot, rem) = rest.div_rem_u64(CHUNK);
            chunks.push(rem);
            if quot.is_zero() {
                break;
            }
            rest = quot;
        }
        let mut chunks = chunks.iter().rev();
        if let Some(first) = chunks.next() {
            write!(f, "{first}")?;
        }
        for chunk in chunks {
            write!(f, "{chunk:019}")?;
        }
        Ok(())
    }
}

/// `floor(a · num / denom)` over a 384-bit intermediate.
///
/// Errors if the quotient does not fit in a `u128`; it always fits when
/// `num <= denom`.
pub fn mul_div_wide(a: u128, num: U256, denom: U256) -> Result<u128, TypesError> {
    if denom.is_zero() {
        return Err(TypesError::DivisionByZero);
    }
    // a · num = a · num_high · 2^128 + a · num_low
    let (num_high, num_low) = num.words();
    let (carry, low) = U256::widening_mul(a, num_low).words();
    let high = U256::widening_mul(a, num_high)
        .checked_add(U256::from_u128(carry))
        .ok_or(TypesError::Overflow)?;
    if high >= denom {
        return Err(TypesError::Overflow);
    }
    // Restoring long division of (high, low) by denom, one bit at a time.
    let mut rem = high;
    let mut quot: u128 = 0;
    for i in (0..128).rev() {
        let (shifted, out) = rem.shl1_with((low >> i) & 1 == 1);
        rem = shifted;
        quot <<= 1;
        if out || rem >= denom {
            rem = rem.wrapping_sub(denom);
            quot |= 1;
        }
    }
    Ok(quot)
}

/// `floor(a · b / denom)` with a 256-bit intermediate.
pub fn mul_div_floor(a: u128, b: u128, denom: u128) -> Result<u128, TypesError> {
    mul_div_wide(a, U256::from_u128(b), U256::from_u128(denom))
}

/// `floor(amount · bps / 10_000)`.
pub fn apply_bps(amount: u128, bps: u32) -> Result<u128, TypesError> {
    mul_div_floor(amount, bps as u128, BPS_DENOMINATOR as u128)
}
