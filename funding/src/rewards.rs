//! Delegate rewards: a share of the period's reward pool proportional to the
//! quadratic cost each voter spent.
//!
//! `reward = floor(floor(gbc · voter_cost / total_cost) · reward_bps / 10_000)`
//!
//! With the default 10% pool this is `floor(gbc · voter_cost / total_cost / 10)`.
//! Every term rounds down, so the rewards of a period never sum past the pool.
//! Costs are 256-bit squares; the product with the GBC is taken at 384 bits.

use grantfund_types::math::mul_div_wide;
use grantfund_types::{Account, QuadraticCost, Wad};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

use crate::error::FundingError;

/// A voter's claim for one period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateRewardRecord {
    pub voter: Account,
    pub period_id: u32,
    pub claimed: bool,
    pub amount: Wad,
}

/// Reward owed for `voter_cost` out of `total_cost`. Zero when nobody voted.
pub fn compute_reward(
    funds_available: Wad,
    voter_cost: QuadraticCost,
    total_cost: QuadraticCost,
    reward_bps: u32,
) -> Result<Wad, FundingError> {
    if voter_cost.is_zero() || total_cost.is_zero() {
        return Ok(Wad::ZERO);
    }
    let share = mul_div_wide(funds_available.raw(), voter_cost.raw(), total_cost.raw())?;
    Wad::new(share)
        .apply_bps(reward_bps)
        .ok_or(FundingError::Overflow)
}

#[derive(Debug, Default)]
pub struct RewardDistributor {
    records: HashMap<(u32, Account), DelegateRewardRecord>,
    paid: HashMap<u32, Wad>,
}

impl RewardDistributor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, period_id: u32, voter: &Account) -> Option<&DelegateRewardRecord> {
        self.records.get(&(period_id, voter.clone()))
    }

    pub fn has_claimed(&self, period_id: u32, voter: &Account) -> bool {
        self.record(period_id, voter).is_some_and(|r| r.claimed)
    }

    /// Sum of every reward paid for a period.
    pub fn total_paid(&self, period_id: u32) -> Wad {
        self.paid.get(&period_id).copied().unwrap_or(Wad::ZERO)
    }

    /// Pay a voter's reward once. The caller has checked the period is
    /// closed and supplies the voter's screening participation and the
    /// reward computed by [`compute_reward`].
    pub fn claim(
        &mut self,
        period_id: u32,
        voter: &Account,
        screened: bool,
        reward: Wad,
    ) -> Result<Wad, FundingError> {
        if self.has_claimed(period_id, voter) {
            return Err(FundingError::RewardAlreadyClaimed);
        }
        if !screened {
            return Err(FundingError::DelegateRewardInvalid);
        }
        let paid = self
            .total_paid(period_id)
            .checked_add(reward)
            .ok_or(FundingError::Overflow)?;
        self.paid.insert(period_id, paid);
        self.records.insert(
            (period_id, voter.clone()),
            DelegateRewardRecord {
                voter: voter.clone(),
                period_id,
                claimed: true,
                amount: reward,
            },
        );
        info!(voter = %voter, period = period_id, reward = %reward, "delegate reward claimed");
        Ok(reward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reward_is_proportional_tenth() {
        // 15M GBC, voter spent a third of all cost: 15M / 3 / 10 = 500k.
        let reward = compute_reward(
            Wad::tokens(15_000_000),
            QuadraticCost::tokens(100),
            QuadraticCost::tokens(300),
            1_000,
        )
        .unwrap();
        assert_eq!(reward, Wad::tokens(500_000));
    }

    #[test]
    fn zero_cost_earns_nothing() {
        assert_eq!(
            compute_reward(Wad::tokens(1_000), QuadraticCost::ZERO, QuadraticCost::tokens(5), 1_000)
                .unwrap(),
            Wad::ZERO
        );
        assert_eq!(
            compute_reward(Wad::tokens(1_000), QuadraticCost::ZERO, QuadraticCost::ZERO, 1_000)
                .unwrap(),
            Wad::ZERO
        );
    }

    #[test]
    fn large_costs_do_not_overflow() {
        // Four voters at 1e10 tokens of power each spend (1e10)² apiece.
        let cost = QuadraticCost::of(Wad::tokens(10_000_000_000));
        let total = QuadraticCost::of(Wad::tokens(20_000_000_000));
        let reward = compute_reward(Wad::tokens(15_000_000), cost, total, 1_000).unwrap();
        // 15M / 4 / 10
        assert_eq!(reward, Wad::tokens(375_000));

        let whole = compute_reward(Wad::tokens(15_000_000), total, total, 1_000).unwrap();
        assert_eq!(whole, Wad::tokens(1_500_000));
    }

    #[test]
    fn oversized_reward_share_is_an_error() {
        assert_eq!(
            compute_reward(
                Wad::new(u128::MAX),
                QuadraticCost::tokens(1),
                QuadraticCost::tokens(1),
                10_001
            ),
            Err(FundingError::Overflow)
        );
    }

    #[test]
    fn claim_once_only() {
        let mut distributor = RewardDistributor::new();
        let voter = Account::new("alice");
        assert_eq!(
            distributor.claim(1, &voter, true, Wad::tokens(3)).unwrap(),
            Wad::tokens(3)
        );
        assert_eq!(
            distributor.claim(1, &voter, true, Wad::tokens(3)).unwrap_err(),
            FundingError::RewardAlreadyClaimed
        );
        assert!(distributor.has_claimed(1, &voter));
        assert!(!distributor.has_claimed(2, &voter));
        assert_eq!(distributor.total_paid(1), Wad::tokens(3));
    }

    #[test]
    fn non_screener_cannot_claim() {
        let mut distributor = RewardDistributor::new();
        let voter = Account::new("lurker");
        assert_eq!(
            distributor.claim(1, &voter, false, Wad::ZERO).unwrap_err(),
            FundingError::DelegateRewardInvalid
        );
        assert!(distributor.record(1, &voter).is_none());
    }
}
