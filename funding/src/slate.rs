//! Challenge-window slate arbitration.
//!
//! Anyone may submit a subset of a period's top ten during the challenge
//! window. A feasible slate replaces the incumbent only if its total net
//! funding votes are strictly greater. Totals are always recomputed from the
//! authoritative per-proposal tallies.

use grantfund_types::{ProposalId, SlateHash, Wad};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::info;

use crate::error::FundingError;
use crate::proposal::ProposalRegistry;

/// A winning subset of a period's top ten.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slate {
    pub proposal_ids: Vec<ProposalId>,
    pub hash: SlateHash,
    /// Sum of the members' net funding votes (always positive).
    pub total_votes: Wad,
    /// Sum of the members' requests.
    pub tokens_requested: Wad,
}

/// Totals of a candidate that passed every feasibility check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlateTotals {
    pub total_votes: Wad,
    pub tokens_requested: Wad,
}

/// Whether a candidate total beats the incumbent (any positive total beats
/// no incumbent).
pub fn is_strictly_better(candidate: Wad, incumbent: Option<&Slate>) -> bool {
    match incumbent {
        Some(slate) => candidate > slate.total_votes,
        None => !candidate.is_zero(),
    }
}

/// Check membership, uniqueness, positivity and the budget, in that order.
pub fn validate_slate(
    registry: &ProposalRegistry,
    top_ten: &[ProposalId],
    proposal_ids: &[ProposalId],
    budget: Wad,
) -> Result<SlateTotals, FundingError> {
    if let Some(outsider) = proposal_ids.iter().find(|id| !top_ten.contains(id)) {
        return Err(FundingError::InvalidProposalSlate(format!(
            "{outsider} is not in the top ten"
        )));
    }
    let mut seen = HashSet::with_capacity(proposal_ids.len());
    if let Some(dup) = proposal_ids.iter().find(|id| !seen.insert(**id)) {
        return Err(FundingError::InvalidProposalSlate(format!(
            "{dup} appears more than once"
        )));
    }

    let mut total_votes = Wad::ZERO;
    let mut tokens_requested = Wad::ZERO;
    for id in proposal_ids {
        let proposal = registry.require(id)?;
        let net = proposal.net_funding_votes_received;
        if !net.is_positive() {
            return Err(FundingError::InvalidProposalSlate(format!(
                "{id} has non-positive net funding votes {net}"
            )));
        }
        total_votes = total_votes
            .checked_add(net.unsigned_abs())
            .ok_or(FundingError::Overflow)?;
        tokens_requested = tokens_requested
            .checked_add(proposal.tokens_requested)
            .ok_or(FundingError::Overflow)?;
    }
    if tokens_requested > budget {
        return Err(FundingError::InvalidProposalSlate(format!(
            "requests {tokens_requested} exceed the slate budget {budget}"
        )));
    }
    Ok(SlateTotals {
        total_votes,
        tokens_requested,
    })
}

#[derive(Debug, Default)]
pub struct SlateArbiter {
    slates: HashMap<u32, Slate>,
}

impl SlateArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn winning_slate(&self, period_id: u32) -> Option<&Slate> {
        self.slates.get(&period_id)
    }

    /// Total request of a period's winning slate (zero if none).
    pub fn slate_tokens(&self, period_id: u32) -> Wad {
        self.slates
            .get(&period_id)
            .map(|s| s.tokens_requested)
            .unwrap_or(Wad::ZERO)
    }

    pub fn is_member(&self, period_id: u32, proposal_id: &ProposalId) -> bool {
        self.slates
            .get(&period_id)
            .is_some_and(|s| s.proposal_ids.contains(proposal_id))
    }

    /// Validate a candidate and keep it if strictly better. The caller has
    /// already checked the stage. Returns the new hash when the incumbent
    /// was replaced.
    pub fn update_slate(
        &mut self,
        registry: &ProposalRegistry,
        period_id: u32,
        top_ten: &[ProposalId],
        proposal_ids: &[ProposalId],
        budget: Wad,
    ) -> Result<Option<SlateHash>, FundingError> {
        let totals = validate_slate(registry, top_ten, proposal_ids, budget)?;
        if !is_strictly_better(totals.total_votes, self.slates.get(&period_id)) {
            return Ok(None);
        }
        let hash = grantfund_crypto::hash_slate(proposal_ids);
        info!(
            period = period_id,
            slate = %hash,
            proposals = proposal_ids.len(),
            total_votes = %totals.total_votes,
            tokens = %totals.tokens_requested,
            "winning slate updated"
        );
        self.slates.insert(
            period_id,
            Slate {
                proposal_ids: proposal_ids.to_vec(),
                hash,
                total_votes: totals.total_votes,
                tokens_requested: totals.tokens_requested,
            },
        );
        Ok(Some(hash))
    }
}
