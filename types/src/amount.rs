//! Fixed-point amount types.
//!
//! Every monetary and voting quantity is an integer scaled by 10^18 ("WAD") to
//! avoid floating-point errors. `Wad` is unsigned (balances, powers, tallies);
//! `SignedWad` carries the direction of a funding vote; `QuadraticCost` is the
//! exact square of a `Wad`.

use crate::math::{self, U256, WAD};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Unsigned 18-decimal fixed-point amount.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Wad(u128);

impl Wad {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(WAD);

    pub const fn new(raw: u128) -> Self {
        Self(raw)
    }

    /// Whole tokens scaled to WAD. A `u64` token count always fits.
    pub const fn tokens(whole: u64) -> Self {
        Self(whole as u128 * WAD)
    }

    pub fn raw(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// `floor(self * bps / 10_000)`, `None` if that exceeds `u128`.
    pub fn apply_bps(self, bps: u32) -> Option<Self> {
        math::apply_bps(self.0, bps).ok().map(Self)
    }

    /// Convert to a signed amount, `None` if above `i128::MAX`.
    pub fn to_signed(self) -> Option<SignedWad> {
        i128::try_from(self.0).ok().map(SignedWad)
    }
}

impl Add for Wad {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Wad {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for Wad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_scaled(f, false, self.0)
    }
}

/// Signed 18-decimal fixed-point amount.
///
/// Positive values support a proposal, negative values oppose it.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SignedWad(i128);

impl SignedWad {
    pub const ZERO: Self = Self(0);

    pub const fn new(raw: i128) -> Self {
        Self(raw)
    }

    /// Whole tokens scaled to WAD.
    pub const fn tokens(whole: i64) -> Self {
        Self(whole as i128 * WAD as i128)
    }

    pub fn raw(&self) -> i128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// -1, 0 or 1.
    pub fn signum(&self) -> i8 {
        self.0.signum() as i8
    }

    pub fn unsigned_abs(&self) -> Wad {
        Wad(self.0.unsigned_abs())
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl Add for SignedWad {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl fmt::Display for SignedWad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_scaled(f, self.0 < 0, self.0.unsigned_abs())
    }
}

/// Exact square of a WAD amount: a quadratic funding budget or cost.
///
/// Kept at 10^36 scale in 256 bits, so squaring any `Wad` is exact and the
/// budget check `Σ votes² <= power²` involves no rounding.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct QuadraticCost(U256);

impl QuadraticCost {
    pub const ZERO: Self = Self(U256::ZERO);

    /// `amount²`.
    pub fn of(amount: Wad) -> Self {
        Self(U256::widening_mul(amount.0, amount.0))
    }

    /// Whole squared tokens: `tokens(100)` is the cost of 10 votes.
    pub fn tokens(whole: u64) -> Self {
        Self(U256::widening_mul(whole as u128 * WAD, WAD))
    }

    pub fn raw(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn saturating_sub(self, other: Self) -> Self {
        self.checked_sub(other).unwrap_or(Self::ZERO)
    }

    /// Largest amount whose square fits in `self`.
    pub fn sqrt_floor(&self) -> Wad {
        Wad(self.0.isqrt())
    }

    /// Smallest amount whose square covers `self`, saturating at `u128::MAX`.
    pub fn sqrt_ceil(&self) -> Wad {
        let root = self.0.isqrt();
        if U256::widening_mul(root, root) == self.0 {
            Wad(root)
        } else {
            Wad(root.saturating_add(1))
        }
    }
}

impl fmt::Display for QuadraticCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = WAD as u64;
        let (rest, low) = self.0.div_rem_u64(scale);
        let (whole, high) = rest.div_rem_u64(scale);
        let frac = high as u128 * WAD + low as u128;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{frac:036}");
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

fn write_scaled(f: &mut fmt::Formatter<'_>, negative: bool, raw: u128) -> fmt::Result {
    let sign = if negative { "-" } else { "" };
    let whole = raw / WAD;
    let frac = raw % WAD;
    if frac == 0 {
        return write!(f, "{sign}{whole}");
    }
    let digits = format!("{frac:018}");
    write!(f, "{sign}{whole}.{}", digits.trim_end_matches('0'))
}
