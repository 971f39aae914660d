//! Execution of funded proposals after the challenge window.

use grantfund_types::ProposalId;
use tracing::{info, warn};

use crate::error::FundingError;
use crate::oracle::ActionExecutor;
use crate::period::Stage;
use crate::proposal::{ProposalRegistry, ProposalState};
use crate::slate::Slate;

/// Execute a member of the final winning slate exactly once.
///
/// The caller has already checked the period is closed. On executor failure
/// the proposal stays unexecuted and may be retried.
pub fn execute_proposal(
    registry: &mut ProposalRegistry,
    slate: Option<&Slate>,
    proposal_id: &ProposalId,
    executor: &dyn ActionExecutor,
) -> Result<(), FundingError> {
    let proposal = registry.require(proposal_id)?;
    let slate = match slate {
        Some(slate) if !slate.proposal_ids.is_empty() => slate,
        _ => return Err(FundingError::ExecuteProposalInvalid(*proposal_id)),
    };
    if !slate.proposal_ids.contains(proposal_id) {
        return Err(FundingError::ProposalNotSuccessful(*proposal_id));
    }
    if proposal.executed {
        return Err(FundingError::ExecuteProposalInvalid(*proposal_id));
    }

    if let Err(reason) = executor.execute(&proposal.payload) {
        warn!(
            proposal = %proposal_id,
            executor = executor.name(),
            %reason,
            "proposal action failed"
        );
        return Err(FundingError::ActionFailed(reason));
    }
    let tokens = proposal.tokens_requested;
    if let Some(proposal) = registry.get_mut(proposal_id) {
        proposal.executed = true;
    }
    info!(proposal = %proposal_id, tokens = %tokens, "proposal executed");
    Ok(())
}

/// Lifecycle state of a proposal given its period's stage and final slate.
pub fn proposal_state(executed: bool, stage: Stage, in_slate: bool) -> ProposalState {
    if executed {
        return ProposalState::Executed;
    }
    match stage {
        Stage::Pending | Stage::Screening => ProposalState::Screening,
        Stage::Funding | Stage::Ended => ProposalState::Funding,
        Stage::Challenge => ProposalState::Challenge,
        Stage::Closed if in_slate => ProposalState::Succeeded,
        Stage::Closed => ProposalState::Defeated,
    }
}
