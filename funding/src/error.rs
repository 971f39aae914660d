use grantfund_types::{ProposalId, TypesError, Wad};
use thiserror::Error;

use crate::period::Stage;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FundingError {
    // ── Stage errors ─────────────────────────────────────────────────────
    #[error("operation not allowed in the {0:?} stage")]
    WrongStage(Stage),

    #[error("screening stage has ended for the current period")]
    ScreeningPeriodEnded,

    #[error("current distribution period is still active")]
    PeriodStillActive,

    #[error("no distribution period has been started")]
    NoActivePeriod,

    // ── Budget errors ────────────────────────────────────────────────────
    #[error("insufficient voting power: need {needed}, have {available}")]
    InsufficientVotingPower { needed: Wad, available: Wad },

    // ── Integrity errors ─────────────────────────────────────────────────
    #[error("invalid proposal slate: {0}")]
    InvalidProposalSlate(String),

    #[error("invalid proposal: {0}")]
    InvalidProposal(String),

    #[error("proposal {0} already exists")]
    ProposalAlreadyExists(ProposalId),

    #[error("invalid vote: {0}")]
    InvalidVote(String),

    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("distribution period {0} not found")]
    PeriodNotFound(u32),

    // ── Direction errors ─────────────────────────────────────────────────
    #[error("funding vote on {0} would flip its locked direction")]
    FundingVoteWrongDirection(ProposalId),

    // ── Lifecycle errors ─────────────────────────────────────────────────
    #[error("proposal {0} cannot be executed")]
    ExecuteProposalInvalid(ProposalId),

    #[error("proposal {0} is not in the winning slate")]
    ProposalNotSuccessful(ProposalId),

    #[error("delegate reward already claimed")]
    RewardAlreadyClaimed,

    #[error("voter is not eligible for a delegate reward")]
    DelegateRewardInvalid,

    #[error("proposal action failed: {0}")]
    ActionFailed(String),

    // ── Arithmetic / configuration ───────────────────────────────────────
    #[error("arithmetic overflow")]
    Overflow,

    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}

impl From<TypesError> for FundingError {
    fn from(err: TypesError) -> Self {
        match err {
            TypesError::Overflow | TypesError::DivisionByZero => Self::Overflow,
            TypesError::InvalidParams(msg) => Self::InvalidParams(msg),
        }
    }
}
