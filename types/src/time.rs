//! Tick type used for every stage boundary.
//!
//! A tick is an abstract, monotonically increasing counter supplied by the
//! caller (a block height in an on-chain deployment). The engine never reads
//! a wall clock.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Tick(u64);

impl Tick {
    pub const GENESIS: Self = Self(0);

    pub const fn new(tick: u64) -> Self {
        Self(tick)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn checked_add(self, ticks: u64) -> Option<Self> {
        self.0.checked_add(ticks).map(Self)
    }

    pub fn saturating_sub(self, ticks: u64) -> Self {
        Self(self.0.saturating_sub(ticks))
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
