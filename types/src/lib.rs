//! Fundamental types for the grant fund.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! fixed-point amounts, ticks, accounts, content-addressed ids, tunable parameters
//! and the exact integer math the allocation engine relies on.

pub mod address;
pub mod amount;
pub mod error;
pub mod hash;
pub mod math;
pub mod params;
pub mod time;

pub use address::Account;
pub use amount::{QuadraticCost, SignedWad, Wad};
pub use error::TypesError;
pub use hash::{ProposalId, SlateHash};
pub use params::{FundingParams, BPS_DENOMINATOR};
pub use time::Tick;
