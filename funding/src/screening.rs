//! Plurality screening votes and the online top-ten ranking.
//!
//! Each voter may spread at most their screening voting power (snapshot at
//! period start) across the period's proposals. The ranking is maintained
//! exactly on every accepted vote: proposals sorted by tally descending, ties
//! going to the earlier submission. Tallies only grow, so a proposal outside
//! the list can only enter by overtaking the last entry.

use grantfund_types::{Account, ProposalId, Wad};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::error::FundingError;
use crate::proposal::{Proposal, ProposalRegistry};

/// Number of proposals that advance from screening to funding.
pub const TOP_TEN_SIZE: usize = 10;

/// One `(proposal, amount)` entry of a screening vote call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningVoteParams {
    pub proposal_id: ProposalId,
    pub amount: Wad,
}

/// An accepted screening vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreeningVote {
    pub voter: Account,
    pub proposal_id: ProposalId,
    pub amount: Wad,
}

/// Per-voter screening record for one period.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ScreeningVoter {
    pub votes: Vec<ScreeningVote>,
    pub total: Wad,
}

#[derive(Debug, Default)]
pub struct ScreeningLedger {
    top_ten: HashMap<u32, Vec<ProposalId>>,
    voters: HashMap<(u32, Account), ScreeningVoter>,
}

/// Ranking key: higher tally first, then earlier submission.
fn outranks(a: &Proposal, b: &Proposal) -> bool {
    a.screening_votes_received > b.screening_votes_received
        || (a.screening_votes_received == b.screening_votes_received && a.seq < b.seq)
}

impl ScreeningLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current ranking of a period (at most ten entries).
    pub fn top_ten(&self, period_id: u32) -> &[ProposalId] {
        self.top_ten
            .get(&period_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_top_ten(&self, period_id: u32, proposal_id: &ProposalId) -> bool {
        self.top_ten(period_id).contains(proposal_id)
    }

    /// Total screening power a voter has spent in a period.
    pub fn votes_cast(&self, period_id: u32, voter: &Account) -> Wad {
        self.voters
            .get(&(period_id, voter.clone()))
            .map(|v| v.total)
            .unwrap_or(Wad::ZERO)
    }

    pub fn voter(&self, period_id: u32, voter: &Account) -> Option<&ScreeningVoter> {
        self.voters.get(&(period_id, voter.clone()))
    }

    pub fn has_voted(&self, period_id: u32, voter: &Account) -> bool {
        self.voters.contains_key(&(period_id, voter.clone()))
    }

    /// Record a batch of screening votes. The caller has already checked the
    /// stage; `power` is the voter's snapshot power for the period.
    ///
    /// All entries are validated before anything is written.
    pub fn screening_vote(
        &mut self,
        registry: &mut ProposalRegistry,
        period_id: u32,
        voter: &Account,
        power: Wad,
        votes: &[ScreeningVoteParams],
    ) -> Result<Wad, FundingError> {
        if votes.is_empty() {
            return Err(FundingError::InvalidVote("empty screening vote".into()));
        }
        let mut tallies: HashMap<ProposalId, Wad> = HashMap::new();
        for vote in votes {
            if vote.amount.is_zero() {
                return Err(FundingError::InvalidVote(format!(
                    "zero screening vote on {}",
                    vote.proposal_id
                )));
            }
            if tallies.contains_key(&vote.proposal_id) {
                continue;
            }
            match registry.get(&vote.proposal_id) {
                Some(p) if p.period_id == period_id => {
                    tallies.insert(vote.proposal_id, p.screening_votes_received);
                }
                _ => {
                    return Err(FundingError::InvalidVote(format!(
                        "proposal {} is not in period {period_id}",
                        vote.proposal_id
                    )))
                }
            }
        }

        // Checked before any tally moves, so an oversized vote is a shortfall
        // rather than an overflow.
        let prior = self.votes_cast(period_id, voter);
        let total = votes
            .iter()
            .try_fold(prior, |acc, vote| acc.checked_add(vote.amount));
        let needed = match total {
            Some(needed) if needed <= power => needed,
            over => {
                return Err(FundingError::InsufficientVotingPower {
                    needed: over.unwrap_or(Wad::new(u128::MAX)),
                    available: power,
                })
            }
        };
        for vote in votes {
            let tally = tallies.entry(vote.proposal_id).or_default();
            *tally = tally
                .checked_add(vote.amount)
                .ok_or(FundingError::Overflow)?;
        }
        let batch = needed - prior;

        let record = self
            .voters
            .entry((period_id, voter.clone()))
            .or_default();
        let list = self.top_ten.entry(period_id).or_default();
        for vote in votes {
            if let Some(proposal) = registry.get_mut(&vote.proposal_id) {
                proposal.screening_votes_received = proposal.screening_votes_received + vote.amount;
            }
            Self::rerank(list, registry, vote.proposal_id);
            record.votes.push(ScreeningVote {
                voter: voter.clone(),
                proposal_id: vote.proposal_id,
                amount: vote.amount,
            });
        }
        record.total = needed;
        debug!(
            voter = %voter,
            period = period_id,
            amount = %batch,
            total = %needed,
            "screening votes recorded"
        );
        Ok(needed)
    }

    /// Move `changed` to its place after its tally grew.
    fn rerank(list: &mut Vec<ProposalId>, registry: &ProposalRegistry, changed: ProposalId) {
        let Some(candidate) = registry.get(&changed) else {
            return;
        };
        let mut pos = match list.iter().position(|id| *id == changed) {
            Some(pos) => pos,
            None if list.len() < TOP_TEN_SIZE => {
                list.push(changed);
                list.len() - 1
            }
            None => {
                let last = list.len() - 1;
                match registry.get(&list[last]) {
                    Some(tail) if outranks(candidate, tail) => {
                        list[last] = changed;
                        last
                    }
                    _ => return,
                }
            }
        };
        while pos > 0 {
            match registry.get(&list[pos - 1]) {
                Some(above) if outranks(candidate, above) => {
                    list.swap(pos, pos - 1);
                    pos -= 1;
                }
                _ => break,
            }
        }
    }
}
