//! The grant fund aggregate: one authoritative state machine owning every
//! ledger, driven by caller-supplied ticks.
//!
//! Each public mutating method validates completely before writing, so a
//! rejected call leaves all ledgers, rankings and budgets untouched.

use grantfund_types::{Account, FundingParams, ProposalId, QuadraticCost, Tick, Wad};
use tracing::info;

use crate::error::FundingError;
use crate::execution::{execute_proposal, proposal_state};
use crate::oracle::{ActionExecutor, VotingPowerOracle};
use crate::period::{DistributionPeriod, DistributionPeriodManager, Stage};
use crate::proposal::{Proposal, ProposalPayload, ProposalRegistry, ProposalState};
use crate::quadratic::{funding_power_votes, FundingLedger, FundingVote, FundingVoteParams, FundingVoter};
use crate::rewards::{compute_reward, DelegateRewardRecord, RewardDistributor};
use crate::screening::{ScreeningLedger, ScreeningVoteParams};
use crate::slate::{Slate, SlateArbiter};

pub struct GrantFund<O, X> {
    periods: DistributionPeriodManager,
    proposals: ProposalRegistry,
    screening: ScreeningLedger,
    funding: FundingLedger,
    slates: SlateArbiter,
    rewards: RewardDistributor,
    oracle: O,
    executor: X,
}

impl<O: VotingPowerOracle, X: ActionExecutor> GrantFund<O, X> {
    pub fn new(params: FundingParams, oracle: O, executor: X) -> Result<Self, FundingError> {
        Ok(Self {
            periods: DistributionPeriodManager::new(params)?,
            proposals: ProposalRegistry::new(),
            screening: ScreeningLedger::new(),
            funding: FundingLedger::new(),
            slates: SlateArbiter::new(),
            rewards: RewardDistributor::new(),
            oracle,
            executor,
        })
    }

    // ── Treasury & periods ───────────────────────────────────────────────

    /// Add funds to the treasury. Never changes an open period's GBC.
    pub fn fund_treasury(&mut self, amount: Wad) -> Result<Wad, FundingError> {
        self.periods.fund_treasury(amount)
    }

    /// Start the next distribution period at `now`, folding back outstanding
    /// surplus of finished periods first. Returns the new period id.
    pub fn start_new_distribution_period(&mut self, now: Tick) -> Result<u32, FundingError> {
        let slates = &self.slates;
        let period = self
            .periods
            .start_new_period(now, |id| slates.slate_tokens(id))?;
        Ok(period.id)
    }

    // ── Proposals ────────────────────────────────────────────────────────

    /// Submit a proposal to the current period's screening stage.
    pub fn propose(&mut self, now: Tick, payload: ProposalPayload) -> Result<ProposalId, FundingError> {
        let period = self.periods.require_current()?;
        match period.stage_at(now) {
            Stage::Screening => {}
            Stage::Pending => return Err(FundingError::WrongStage(Stage::Pending)),
            _ => return Err(FundingError::ScreeningPeriodEnded),
        }

        if payload.actions.is_empty() {
            return Err(FundingError::InvalidProposal("no transfer actions".into()));
        }
        if let Some(action) = payload.actions.iter().find(|a| a.amount.is_zero()) {
            return Err(FundingError::InvalidProposal(format!(
                "zero transfer to {}",
                action.recipient
            )));
        }
        if let Some(action) = payload.actions.iter().find(|a| !a.recipient.is_valid()) {
            return Err(FundingError::InvalidProposal(format!(
                "invalid recipient {:?}",
                action.recipient.as_str()
            )));
        }
        let tokens_requested = payload
            .tokens_requested()
            .ok_or_else(|| FundingError::InvalidProposal("request overflows".into()))?;
        let params = self.periods.params();
        let treasury_cap = self
            .periods
            .treasury()
            .apply_bps(params.max_request_bps)
            .ok_or(FundingError::Overflow)?;
        if tokens_requested > treasury_cap {
            return Err(FundingError::InvalidProposal(format!(
                "request {tokens_requested} exceeds treasury cap {treasury_cap}"
            )));
        }
        let slate_cap = period
            .funds_available
            .apply_bps(params.slate_budget_bps)
            .ok_or(FundingError::Overflow)?;
        if tokens_requested > slate_cap {
            return Err(FundingError::InvalidProposal(format!(
                "request {tokens_requested} exceeds slate budget {slate_cap}"
            )));
        }

        let period_id = period.id;
        let id = payload.id()?;
        self.proposals
            .insert(id, period_id, payload, tokens_requested)?;
        info!(proposal = %id, period = period_id, tokens = %tokens_requested, "proposal submitted");
        Ok(id)
    }

    // ── Voting ───────────────────────────────────────────────────────────

    /// Cast plurality screening votes in the current period.
    pub fn screening_vote(
        &mut self,
        now: Tick,
        voter: &Account,
        votes: &[ScreeningVoteParams],
    ) -> Result<Wad, FundingError> {
        let period = self.periods.require_current()?;
        let stage = period.stage_at(now);
        if stage != Stage::Screening {
            return Err(FundingError::InvalidVote(format!(
                "screening votes are closed ({stage:?})"
            )));
        }
        let power = self.oracle.voting_power_at(voter, period.start);
        let period_id = period.id;
        self.screening
            .screening_vote(&mut self.proposals, period_id, voter, power, votes)
    }

    /// Cast quadratic funding votes on the current period's top ten. Returns
    /// the voter's remaining budget.
    pub fn funding_vote(
        &mut self,
        now: Tick,
        voter: &Account,
        votes: &[FundingVoteParams],
    ) -> Result<QuadraticCost, FundingError> {
        let current = self.periods.require_current()?;
        let period_id = current.id;
        let start = current.start;
        self.periods.require_stage(period_id, now, Stage::Funding)?;
        let power = self.oracle.voting_power_at(voter, start);
        let period = self.periods.get_mut(period_id)?;
        let top_ten = self.screening.top_ten(period_id);
        self.funding
            .funding_vote(&mut self.proposals, period, top_ten, voter, power, votes)
    }

    // ── Challenge ────────────────────────────────────────────────────────

    /// Submit a candidate slate for a period in its challenge window.
    /// Returns `true` if it replaced the incumbent.
    pub fn update_slate(
        &mut self,
        now: Tick,
        period_id: u32,
        proposal_ids: &[ProposalId],
    ) -> Result<bool, FundingError> {
        let period = self.periods.require_stage(period_id, now, Stage::Challenge)?;
        let budget = period
            .funds_available
            .apply_bps(self.periods.params().slate_budget_bps)
            .ok_or(FundingError::Overflow)?;
        let top_ten = self.screening.top_ten(period_id);
        let replaced =
            self.slates
                .update_slate(&self.proposals, period_id, top_ten, proposal_ids, budget)?;
        match replaced {
            Some(hash) => {
                self.periods.get_mut(period_id)?.winning_slate_hash = Some(hash);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ── Finalization ─────────────────────────────────────────────────────

    /// Execute a funded proposal once its period has closed.
    pub fn execute(&mut self, now: Tick, proposal_id: &ProposalId) -> Result<(), FundingError> {
        let period_id = self.proposals.require(proposal_id)?.period_id;
        self.periods.require_stage(period_id, now, Stage::Closed)?;
        execute_proposal(
            &mut self.proposals,
            self.slates.winning_slate(period_id),
            proposal_id,
            &self.executor,
        )
    }

    /// Claim a voter's delegate reward for a closed period.
    pub fn claim_delegate_reward(
        &mut self,
        now: Tick,
        voter: &Account,
        period_id: u32,
    ) -> Result<Wad, FundingError> {
        self.periods.require_stage(period_id, now, Stage::Closed)?;
        let screened = self.screening.has_voted(period_id, voter);
        let reward = self.delegate_reward(period_id, voter)?;
        self.rewards.claim(period_id, voter, screened, reward)
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn params(&self) -> &FundingParams {
        self.periods.params()
    }

    pub fn treasury(&self) -> Wad {
        self.periods.treasury()
    }

    pub fn current_period(&self) -> Option<&DistributionPeriod> {
        self.periods.current()
    }

    pub fn period(&self, period_id: u32) -> Option<&DistributionPeriod> {
        self.periods.get(period_id)
    }

    pub fn stage(&self, period_id: u32, now: Tick) -> Result<Stage, FundingError> {
        self.periods.stage(period_id, now)
    }

    pub fn proposal(&self, proposal_id: &ProposalId) -> Option<&Proposal> {
        self.proposals.get(proposal_id)
    }

    /// Proposals of a period in submission order.
    pub fn proposals_for(&self, period_id: u32) -> &[ProposalId] {
        self.proposals.for_period(period_id)
    }

    pub fn proposal_state(&self, proposal_id: &ProposalId, now: Tick) -> Result<ProposalState, FundingError> {
        let proposal = self.proposals.require(proposal_id)?;
        let stage = self.periods.stage(proposal.period_id, now)?;
        let in_slate = self.slates.is_member(proposal.period_id, proposal_id);
        Ok(proposal_state(proposal.executed, stage, in_slate))
    }

    pub fn top_ten(&self, period_id: u32) -> &[ProposalId] {
        self.screening.top_ten(period_id)
    }

    pub fn screening_votes_cast(&self, period_id: u32, voter: &Account) -> Wad {
        self.screening.votes_cast(period_id, voter)
    }

    pub fn funding_votes_cast(&self, period_id: u32, voter: &Account) -> &[FundingVote] {
        self.funding.votes_cast(period_id, voter)
    }

    pub fn funding_voter(&self, period_id: u32, voter: &Account) -> Option<&FundingVoter> {
        self.funding.voter(period_id, voter)
    }

    /// Remaining like-signed votes a budget affords, rounded down.
    pub fn funding_power_votes(&self, budget: QuadraticCost) -> Wad {
        funding_power_votes(budget)
    }

    pub fn winning_slate(&self, period_id: u32) -> Option<&Slate> {
        self.slates.winning_slate(period_id)
    }

    /// Reward a claim would pay now, without claiming.
    pub fn delegate_reward(&self, period_id: u32, voter: &Account) -> Result<Wad, FundingError> {
        let period = self.periods.require(period_id)?;
        compute_reward(
            period.funds_available,
            self.funding.voter_cost(period_id, voter),
            period.funding_votes_cast,
            self.periods.params().delegate_reward_bps,
        )
    }

    pub fn reward_record(&self, period_id: u32, voter: &Account) -> Option<&DelegateRewardRecord> {
        self.rewards.record(period_id, voter)
    }

    pub fn has_claimed_reward(&self, period_id: u32, voter: &Account) -> bool {
        self.rewards.has_claimed(period_id, voter)
    }

    pub fn rewards_paid(&self, period_id: u32) -> Wad {
        self.rewards.total_paid(period_id)
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn executor(&self) -> &X {
        &self.executor
    }
}
