//! Nullable voting power: a checkpoint table instead of a token ledger.

use grantfund_funding::VotingPowerOracle;
use grantfund_types::{Account, Tick, Wad};
use std::collections::HashMap;
use std::sync::Mutex;

/// Table-driven [`VotingPowerOracle`].
///
/// Each account holds a list of `(from_tick, power)` checkpoints; a query
/// returns the latest checkpoint at or before the requested tick, or zero.
pub struct NullVotingPower {
    checkpoints: Mutex<HashMap<Account, Vec<(Tick, Wad)>>>,
}

impl NullVotingPower {
    pub fn new() -> Self {
        Self {
            checkpoints: Mutex::new(HashMap::new()),
        }
    }

    /// Build from `(account, power)` pairs valid from genesis.
    pub fn with_powers<I, A>(powers: I) -> Self
    where
        I: IntoIterator<Item = (A, Wad)>,
        A: Into<Account>,
    {
        let oracle = Self::new();
        for (account, power) in powers {
            oracle.set(account.into(), power);
        }
        oracle
    }

    /// Set an account's power from genesis onwards.
    pub fn set(&self, account: Account, power: Wad) {
        self.set_at(account, Tick::GENESIS, power);
    }

    /// Checkpoint an account's power from `from` onwards.
    pub fn set_at(&self, account: Account, from: Tick, power: Wad) {
        let mut checkpoints = self.checkpoints.lock().unwrap();
        let entries = checkpoints.entry(account).or_default();
        entries.retain(|(tick, _)| *tick != from);
        entries.push((from, power));
        entries.sort_by_key(|(tick, _)| *tick);
    }
}

impl Default for NullVotingPower {
    fn default() -> Self {
        Self::new()
    }
}

impl VotingPowerOracle for NullVotingPower {
    fn voting_power_at(&self, account: &Account, tick: Tick) -> Wad {
        let checkpoints = self.checkpoints.lock().unwrap();
        checkpoints
            .get(account)
            .and_then(|entries| entries.iter().rev().find(|(from, _)| *from <= tick))
            .map(|(_, power)| *power)
            .unwrap_or(Wad::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_account_has_no_power() {
        let oracle = NullVotingPower::new();
        assert_eq!(oracle.voting_power_at(&Account::new("nobody"), Tick::new(5)), Wad::ZERO);
    }

    #[test]
    fn latest_checkpoint_wins() {
        let alice = Account::new("alice");
        let oracle = NullVotingPower::with_powers([("alice", Wad::tokens(10))]);
        oracle.set_at(alice.clone(), Tick::new(100), Wad::tokens(50));

        assert_eq!(oracle.voting_power_at(&alice, Tick::new(0)), Wad::tokens(10));
        assert_eq!(oracle.voting_power_at(&alice, Tick::new(99)), Wad::tokens(10));
        assert_eq!(oracle.voting_power_at(&alice, Tick::new(100)), Wad::tokens(50));
        assert_eq!(oracle.voting_power_at(&alice, Tick::new(1_000)), Wad::tokens(50));
    }

    #[test]
    fn checkpoint_at_same_tick_is_replaced() {
        let alice = Account::new("alice");
        let oracle = NullVotingPower::new();
        oracle.set(alice.clone(), Wad::tokens(1));
        oracle.set(alice.clone(), Wad::tokens(2));
        assert_eq!(oracle.voting_power_at(&alice, Tick::new(0)), Wad::tokens(2));
    }
}
