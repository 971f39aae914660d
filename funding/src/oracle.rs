//! Seams to the collaborators the engine consumes but does not own.

use grantfund_types::{Account, Tick, Wad};

use crate::proposal::ProposalPayload;

/// Read-only voting-power snapshots.
///
/// Implementations must be stable for a fixed tick: repeated queries for the
/// same `(account, tick)` return the same value.
pub trait VotingPowerOracle: Send + Sync {
    /// Voting power of `account` as of `tick`.
    fn voting_power_at(&self, account: &Account, tick: Tick) -> Wad;
}

/// Opaque execution of an approved proposal's payload.
pub trait ActionExecutor: Send + Sync {
    /// Perform every transfer in `payload`. An error leaves the proposal
    /// unexecuted.
    fn execute(&self, payload: &ProposalPayload) -> Result<(), String>;

    /// Human-readable name of this executor.
    fn name(&self) -> &str;
}
