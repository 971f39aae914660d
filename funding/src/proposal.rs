//! Funding proposals and the registry that owns them.

use grantfund_types::{Account, ProposalId, SignedWad, Wad};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::FundingError;

/// A single bounded transfer out of the treasury.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferAction {
    pub recipient: Account,
    pub amount: Wad,
}

/// What a proposal asks for: one or more transfers plus a description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalPayload {
    pub actions: Vec<TransferAction>,
    pub description: String,
}

impl ProposalPayload {
    pub fn new(actions: Vec<TransferAction>, description: impl Into<String>) -> Self {
        Self {
            actions,
            description: description.into(),
        }
    }

    /// Single-transfer convenience constructor.
    pub fn transfer(recipient: Account, amount: Wad, description: impl Into<String>) -> Self {
        Self::new(vec![TransferAction { recipient, amount }], description)
    }

    /// Sum of all transfer amounts, checked.
    pub fn tokens_requested(&self) -> Option<Wad> {
        self.actions
            .iter()
            .try_fold(Wad::ZERO, |acc, action| acc.checked_add(action.amount))
    }

    /// Derive the content-addressed id of this payload.
    pub fn id(&self) -> Result<ProposalId, FundingError> {
        let bytes = bincode::serialize(self)
            .map_err(|e| FundingError::InvalidProposal(format!("unencodable payload: {e}")))?;
        Ok(grantfund_crypto::hash_proposal(&bytes))
    }
}

/// A submitted proposal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub period_id: u32,
    pub payload: ProposalPayload,
    pub tokens_requested: Wad,
    pub screening_votes_received: Wad,
    pub net_funding_votes_received: SignedWad,
    pub executed: bool,
    /// Global submission order; earlier proposals win screening ties.
    pub seq: u64,
}

/// Lifecycle state of a proposal, derived from its period's stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalState {
    /// Collecting screening votes.
    Screening,
    /// Screening closed; collecting funding votes (if ranked) or waiting.
    Funding,
    /// Period ended; slates may be submitted.
    Challenge,
    /// Member of the final winning slate, not yet executed.
    Succeeded,
    /// Not funded.
    Defeated,
    /// Payload executed.
    Executed,
}

/// Owns every proposal ever submitted. Proposals are never removed.
#[derive(Debug, Default)]
pub struct ProposalRegistry {
    proposals: HashMap<ProposalId, Proposal>,
    by_period: HashMap<u32, Vec<ProposalId>>,
    next_seq: u64,
}

impl ProposalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &ProposalId) -> bool {
        self.proposals.contains_key(id)
    }

    pub fn get(&self, id: &ProposalId) -> Option<&Proposal> {
        self.proposals.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &ProposalId) -> Option<&mut Proposal> {
        self.proposals.get_mut(id)
    }

    /// Fetch a proposal or fail with `ProposalNotFound`.
    pub fn require(&self, id: &ProposalId) -> Result<&Proposal, FundingError> {
        self.proposals
            .get(id)
            .ok_or(FundingError::ProposalNotFound(*id))
    }

    /// Proposals of a period in submission order.
    pub fn for_period(&self, period_id: u32) -> &[ProposalId] {
        self.by_period
            .get(&period_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }

    /// Insert a validated proposal; fails if the id is already taken.
    pub(crate) fn insert(
        &mut self,
        id: ProposalId,
        period_id: u32,
        payload: ProposalPayload,
        tokens_requested: Wad,
    ) -> Result<&Proposal, FundingError> {
        if self.proposals.contains_key(&id) {
            return Err(FundingError::ProposalAlreadyExists(id));
        }
        let seq = self.next_seq;
        self.next_seq = self.next_seq.checked_add(1).ok_or(FundingError::Overflow)?;
        self.by_period.entry(period_id).or_default().push(id);
        let proposal = self.proposals.entry(id).or_insert(Proposal {
            id,
            period_id,
            payload,
            tokens_requested,
            screening_votes_received: Wad::ZERO,
            net_funding_votes_received: SignedWad::ZERO,
            executed: false,
            seq,
        });
        Ok(proposal)
    }
}
