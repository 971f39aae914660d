//! Quadratic funding votes over a period's frozen top ten.
//!
//! A voter's budget is their screening power squared. Casting `v` votes on a
//! proposal costs `v²`, summed over every proposal the voter touched. Votes on
//! a proposal accumulate across calls and the direction of the first vote is
//! locked: later calls may move the total towards zero but never across it.
//!
//! Budgets and costs are exact 256-bit squares, so `Σ votes_used² <= power²`
//! holds with no rounding for any power a `Wad` can hold.

use grantfund_types::{Account, ProposalId, QuadraticCost, SignedWad, Wad};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::error::FundingError;
use crate::period::DistributionPeriod;
use crate::proposal::ProposalRegistry;

/// One `(proposal, votes)` entry of a funding vote call. Negative votes oppose.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingVoteParams {
    pub proposal_id: ProposalId,
    pub votes_used: SignedWad,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteDirection {
    For,
    Against,
}

impl VoteDirection {
    fn of(votes: SignedWad) -> Option<Self> {
        if votes.is_positive() {
            Some(Self::For)
        } else if votes.is_negative() {
            Some(Self::Against)
        } else {
            None
        }
    }
}

/// Accumulated funding votes of one voter on one proposal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingVote {
    pub proposal_id: ProposalId,
    pub votes_used: SignedWad,
    /// Set by the first non-zero vote and never changed.
    pub direction: VoteDirection,
}

/// Per-voter funding record for one period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundingVoter {
    /// Screening power squared.
    pub budget: QuadraticCost,
    /// Quadratic cost of `votes`.
    pub spent: QuadraticCost,
    pub votes: Vec<FundingVote>,
}

impl FundingVoter {
    pub fn remaining(&self) -> QuadraticCost {
        self.budget.saturating_sub(self.spent)
    }
}

/// Quadratic cost of an accumulated vote.
pub fn quadratic_cost(votes_used: SignedWad) -> QuadraticCost {
    QuadraticCost::of(votes_used.unsigned_abs())
}

/// Funding budget for a given screening power.
pub fn funding_budget(power: Wad) -> QuadraticCost {
    QuadraticCost::of(power)
}

/// How many like-signed votes on a fresh proposal a remaining budget still
/// affords. Rounds down.
pub fn funding_power_votes(budget: QuadraticCost) -> Wad {
    budget.sqrt_floor()
}

#[derive(Debug, Default)]
pub struct FundingLedger {
    voters: HashMap<(u32, Account), FundingVoter>,
}

impl FundingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn voter(&self, period_id: u32, voter: &Account) -> Option<&FundingVoter> {
        self.voters.get(&(period_id, voter.clone()))
    }

    /// Accumulated votes of a voter in a period, in first-cast order.
    pub fn votes_cast(&self, period_id: u32, voter: &Account) -> &[FundingVote] {
        self.voters
            .get(&(period_id, voter.clone()))
            .map(|v| v.votes.as_slice())
            .unwrap_or(&[])
    }

    /// Quadratic cost a voter has spent in a period.
    pub fn voter_cost(&self, period_id: u32, voter: &Account) -> QuadraticCost {
        self.voter(period_id, voter)
            .map(|v| v.spent)
            .unwrap_or(QuadraticCost::ZERO)
    }

    /// Quadratic cost spent by every voter in a period, recomputed.
    pub fn total_cost(&self, period_id: u32) -> Result<QuadraticCost, FundingError> {
        self.voters
            .iter()
            .filter(|((id, _), _)| *id == period_id)
            .try_fold(QuadraticCost::ZERO, |acc, (_, voter)| acc.checked_add(voter.spent))
            .ok_or(FundingError::Overflow)
    }

    /// Record a batch of funding votes. The caller has already checked the
    /// stage; `top_ten` is the frozen screening result and `power` the
    /// voter's screening power. Returns the voter's remaining budget.
    pub fn funding_vote(
        &mut self,
        registry: &mut ProposalRegistry,
        period: &mut DistributionPeriod,
        top_ten: &[ProposalId],
        voter: &Account,
        power: Wad,
        votes: &[FundingVoteParams],
    ) -> Result<QuadraticCost, FundingError> {
        if votes.is_empty() {
            return Err(FundingError::InvalidVote("empty funding vote".into()));
        }
        let key = (period.id, voter.clone());
        let (budget, old_spent, mut working) = match self.voters.get(&key) {
            Some(existing) => (existing.budget, existing.spent, existing.votes.clone()),
            None => (funding_budget(power), QuadraticCost::ZERO, Vec::new()),
        };

        let mut net: HashMap<ProposalId, SignedWad> = HashMap::new();
        for vote in votes {
            let Some(direction) = VoteDirection::of(vote.votes_used) else {
                return Err(FundingError::InvalidVote(format!(
                    "zero funding vote on {}",
                    vote.proposal_id
                )));
            };
            if !top_ten.contains(&vote.proposal_id) {
                return Err(FundingError::InvalidVote(format!(
                    "proposal {} is not in the top ten",
                    vote.proposal_id
                )));
            }

            match working.iter_mut().find(|v| v.proposal_id == vote.proposal_id) {
                Some(existing) => {
                    let updated = existing
                        .votes_used
                        .checked_add(vote.votes_used)
                        .ok_or(FundingError::Overflow)?;
                    if VoteDirection::of(updated) != Some(existing.direction) {
                        return Err(FundingError::FundingVoteWrongDirection(vote.proposal_id));
                    }
                    existing.votes_used = updated;
                }
                None => working.push(FundingVote {
                    proposal_id: vote.proposal_id,
                    votes_used: vote.votes_used,
                    direction,
                }),
            }

            let current = match net.get(&vote.proposal_id) {
                Some(n) => *n,
                None => registry.require(&vote.proposal_id)?.net_funding_votes_received,
            };
            let updated = current
                .checked_add(vote.votes_used)
                .ok_or(FundingError::Overflow)?;
            net.insert(vote.proposal_id, updated);
        }

        // Recomputed from the accumulated values, never delta-summed. A sum
        // past 256 bits is over any budget. Shortfalls are reported as power.
        let total = working.iter().try_fold(QuadraticCost::ZERO, |acc, v| {
            acc.checked_add(quadratic_cost(v.votes_used))
        });
        let spent = match total {
            Some(spent) if spent <= budget => spent,
            over => {
                return Err(FundingError::InsufficientVotingPower {
                    needed: over.map_or(Wad::new(u128::MAX), |cost| cost.sqrt_ceil()),
                    available: budget.sqrt_floor(),
                })
            }
        };
        let cast = period
            .funding_votes_cast
            .checked_sub(old_spent)
            .and_then(|rest| rest.checked_add(spent))
            .ok_or(FundingError::Overflow)?;

        for (proposal_id, updated) in net {
            if let Some(proposal) = registry.get_mut(&proposal_id) {
                proposal.net_funding_votes_received = updated;
            }
        }
        period.funding_votes_cast = cast;
        let record = FundingVoter {
            budget,
            spent,
            votes: working,
        };
        let remaining = record.remaining();
        self.voters.insert(key, record);
        debug!(
            voter = %voter,
            period = period.id,
            spent = %spent,
            remaining = %remaining,
            "funding votes recorded"
        );
        Ok(remaining)
    }
}
