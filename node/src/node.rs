//! The grant fund service: one engine behind one async mutex.
//!
//! Every mutating call takes the lock once, runs a single engine operation
//! and releases it, so all mutations are linearized in lock order. Queries
//! take the same lock and return owned snapshots.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use grantfund_funding::{
    ActionExecutor, DistributionPeriod, FundingError, FundingVoteParams, FundingVoter, GrantFund,
    Proposal, ProposalPayload, ProposalState, ScreeningVoteParams, Slate, Stage,
    VotingPowerOracle,
};
use grantfund_types::{Account, ProposalId, QuadraticCost, Tick, Wad};

use crate::config::NodeConfig;
use crate::metrics::NodeMetrics;
use crate::NodeError;

pub struct FundingNode<O, X> {
    fund: Arc<Mutex<GrantFund<O, X>>>,
    metrics: Option<Arc<NodeMetrics>>,
}

impl<O, X> Clone for FundingNode<O, X> {
    fn clone(&self) -> Self {
        Self {
            fund: Arc::clone(&self.fund),
            metrics: self.metrics.clone(),
        }
    }
}

impl<O: VotingPowerOracle, X: ActionExecutor> FundingNode<O, X> {
    /// Build the engine from a validated config and deposit the initial
    /// treasury.
    pub fn new(config: &NodeConfig, oracle: O, executor: X) -> Result<Self, NodeError> {
        config.validate()?;
        let mut fund = GrantFund::new(config.params.clone(), oracle, executor)?;
        if config.initial_treasury > 0 {
            fund.fund_treasury(config.initial_treasury())?;
        }
        let metrics = if config.enable_metrics {
            let metrics = NodeMetrics::new()?;
            metrics.set_treasury(fund.treasury());
            Some(Arc::new(metrics))
        } else {
            None
        };
        info!(
            treasury = %fund.treasury(),
            executor = fund.executor().name(),
            metrics = config.enable_metrics,
            "funding node ready"
        );
        Ok(Self {
            fund: Arc::new(Mutex::new(fund)),
            metrics,
        })
    }

    pub fn metrics(&self) -> Option<&NodeMetrics> {
        self.metrics.as_deref()
    }

    /// Count an outcome: `accepted` picks the counter bumped on success.
    fn record<T>(
        &self,
        result: Result<T, FundingError>,
        accepted: fn(&NodeMetrics) -> &prometheus::IntCounter,
    ) -> Result<T, NodeError> {
        if let Some(metrics) = &self.metrics {
            match &result {
                Ok(_) => accepted(metrics).inc(),
                Err(_) => metrics.rejected_calls.inc(),
            }
        }
        if let Err(e) = &result {
            debug!(error = %e, "call rejected");
        }
        Ok(result?)
    }

    fn rejected<T>(&self, result: Result<T, FundingError>) -> Result<T, NodeError> {
        if let (Some(metrics), Err(_)) = (&self.metrics, &result) {
            metrics.rejected_calls.inc();
        }
        Ok(result?)
    }

    // ── Treasury & periods ───────────────────────────────────────────────

    pub async fn fund_treasury(&self, amount: Wad) -> Result<Wad, NodeError> {
        let mut fund = self.fund.lock().await;
        let result = fund.fund_treasury(amount);
        if let Some(metrics) = &self.metrics {
            metrics.set_treasury(fund.treasury());
        }
        self.rejected(result)
    }

    pub async fn start_new_distribution_period(&self, now: Tick) -> Result<u32, NodeError> {
        let mut fund = self.fund.lock().await;
        let result = fund.start_new_distribution_period(now);
        if let Some(metrics) = &self.metrics {
            metrics.set_treasury(fund.treasury());
            if let Ok(id) = &result {
                metrics.current_period.set(i64::from(*id));
            }
        }
        self.rejected(result)
    }

    // ── Mutations ────────────────────────────────────────────────────────

    pub async fn propose(&self, now: Tick, payload: ProposalPayload) -> Result<ProposalId, NodeError> {
        let result = self.fund.lock().await.propose(now, payload);
        self.record(result, |m| &m.proposals_submitted)
    }

    pub async fn screening_vote(
        &self,
        now: Tick,
        voter: &Account,
        votes: &[ScreeningVoteParams],
    ) -> Result<Wad, NodeError> {
        let result = self.fund.lock().await.screening_vote(now, voter, votes);
        self.record(result, |m| &m.screening_votes)
    }

    pub async fn funding_vote(
        &self,
        now: Tick,
        voter: &Account,
        votes: &[FundingVoteParams],
    ) -> Result<QuadraticCost, NodeError> {
        let result = self.fund.lock().await.funding_vote(now, voter, votes);
        self.record(result, |m| &m.funding_votes)
    }

    /// Returns `true` if the candidate became the winning slate.
    pub async fn update_slate(
        &self,
        now: Tick,
        period_id: u32,
        proposal_ids: &[ProposalId],
    ) -> Result<bool, NodeError> {
        let result = self
            .fund
            .lock()
            .await
            .update_slate(now, period_id, proposal_ids);
        if let (Some(metrics), Ok(true)) = (&self.metrics, &result) {
            metrics.slate_updates.inc();
        }
        self.rejected(result)
    }

    pub async fn execute(&self, now: Tick, proposal_id: &ProposalId) -> Result<(), NodeError> {
        let result = self.fund.lock().await.execute(now, proposal_id);
        self.record(result, |m| &m.proposals_executed)
    }

    pub async fn claim_delegate_reward(
        &self,
        now: Tick,
        voter: &Account,
        period_id: u32,
    ) -> Result<Wad, NodeError> {
        let result = self
            .fund
            .lock()
            .await
            .claim_delegate_reward(now, voter, period_id);
        self.record(result, |m| &m.rewards_claimed)
    }

    // ── Queries ──────────────────────────────────────────────────────────

    /// Run a read-only closure against the engine under the lock.
    pub async fn read<R>(&self, f: impl FnOnce(&GrantFund<O, X>) -> R) -> R {
        f(&*self.fund.lock().await)
    }

    pub async fn treasury(&self) -> Wad {
        self.read(|fund| fund.treasury()).await
    }

    pub async fn current_period(&self) -> Option<DistributionPeriod> {
        self.read(|fund| fund.current_period().cloned()).await
    }

    pub async fn period(&self, period_id: u32) -> Option<DistributionPeriod> {
        self.read(|fund| fund.period(period_id).cloned()).await
    }

    pub async fn stage(&self, period_id: u32, now: Tick) -> Result<Stage, NodeError> {
        Ok(self.read(|fund| fund.stage(period_id, now)).await?)
    }

    pub async fn proposal(&self, proposal_id: &ProposalId) -> Option<Proposal> {
        self.read(|fund| fund.proposal(proposal_id).cloned()).await
    }

    pub async fn proposal_state(
        &self,
        proposal_id: &ProposalId,
        now: Tick,
    ) -> Result<ProposalState, NodeError> {
        Ok(self.read(|fund| fund.proposal_state(proposal_id, now)).await?)
    }

    pub async fn top_ten(&self, period_id: u32) -> Vec<ProposalId> {
        self.read(|fund| fund.top_ten(period_id).to_vec()).await
    }

    pub async fn screening_votes_cast(&self, period_id: u32, voter: &Account) -> Wad {
        self.read(|fund| fund.screening_votes_cast(period_id, voter))
            .await
    }

    pub async fn funding_voter(&self, period_id: u32, voter: &Account) -> Option<FundingVoter> {
        self.read(|fund| fund.funding_voter(period_id, voter).cloned())
            .await
    }

    pub async fn winning_slate(&self, period_id: u32) -> Option<Slate> {
        self.read(|fund| fund.winning_slate(period_id).cloned()).await
    }

    pub async fn delegate_reward(&self, period_id: u32, voter: &Account) -> Result<Wad, NodeError> {
        Ok(self
            .read(|fund| fund.delegate_reward(period_id, voter))
            .await?)
    }
}
