//! Nullable infrastructure for deterministic testing.
//!
//! The engine reaches the outside world through two seams, the voting power
//! oracle and the action executor, and is driven by an external tick source.
//! This crate provides test-friendly implementations of all three that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Record what the engine asked of them
//!
//! Usage: hand these to `GrantFund::new` in tests.

pub mod clock;
pub mod executor;
pub mod voting_power;

pub use clock::NullClock;
pub use executor::NullExecutor;
pub use voting_power::NullVotingPower;
