//! Periodic quadratic participatory budgeting.
//!
//! Every distribution period disburses a slice of a shared treasury:
//! Screening → Funding → Challenge → Closed
//!
//! - **Screening**: plurality votes narrow the period's proposals to a top ten.
//! - **Funding**: voters spread a quadratic budget (power²) over the top ten,
//!   for or against, with each vote's direction locked on first cast.
//! - **Challenge**: anyone submits slates; the best feasible one so far wins.
//! - **Closed**: winning proposals execute once; voters claim a share of the
//!   reward pool proportional to the quadratic cost they spent.
//!
//! Time is an abstract tick supplied by the caller. Voting power and proposal
//! execution are external collaborators behind [`VotingPowerOracle`] and
//! [`ActionExecutor`].

pub mod engine;
pub mod error;
pub mod execution;
pub mod oracle;
pub mod period;
pub mod proposal;
pub mod quadratic;
pub mod rewards;
pub mod screening;
pub mod slate;

pub use engine::GrantFund;
pub use error::FundingError;
pub use oracle::{ActionExecutor, VotingPowerOracle};
pub use period::{DistributionPeriod, DistributionPeriodManager, Stage};
pub use proposal::{Proposal, ProposalPayload, ProposalRegistry, ProposalState, TransferAction};
pub use quadratic::{
    funding_power_votes, FundingLedger, FundingVote, FundingVoteParams, FundingVoter,
    VoteDirection,
};
pub use rewards::{compute_reward, DelegateRewardRecord, RewardDistributor};
pub use screening::{ScreeningLedger, ScreeningVote, ScreeningVoteParams, TOP_TEN_SIZE};
pub use slate::{is_strictly_better, validate_slate, Slate, SlateArbiter};
