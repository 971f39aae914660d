//! Distribution period lifecycle and treasury bookkeeping.
//!
//! Stage boundaries of a period with `start`, `end = start + period_length`:
//!
//! ```text
//! screening  [start, end - funding_length)
//! funding    [end - funding_length, end)
//! ended      end
//! challenge  (end, end + challenge_length]
//! closed     after end + challenge_length
//! ```

use grantfund_types::{FundingParams, QuadraticCost, SlateHash, Tick, Wad};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::FundingError;

/// Where a period is in its lifecycle at a given tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// The tick precedes the period start.
    Pending,
    /// Plurality screening votes and new proposals are accepted.
    Screening,
    /// Quadratic funding votes on the top ten are accepted.
    Funding,
    /// The end tick itself: voting is over, the challenge window opens next tick.
    Ended,
    /// Anyone may submit a better slate.
    Challenge,
    /// Final: execution and reward claims are open.
    Closed,
}

/// One distribution period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionPeriod {
    pub id: u32,
    pub start: Tick,
    pub end: Tick,
    /// First tick of the funding stage.
    pub funding_start: Tick,
    /// Last tick of the challenge window.
    pub challenge_end: Tick,
    /// Grant Budget Cap: the funds this period may distribute.
    pub funds_available: Wad,
    /// Total quadratic cost spent by all funding voters.
    pub funding_votes_cast: QuadraticCost,
    pub winning_slate_hash: Option<SlateHash>,
    /// Whether this period's surplus has been folded back into the treasury.
    pub surplus_folded: bool,
}

impl DistributionPeriod {
    pub fn stage_at(&self, now: Tick) -> Stage {
        if now < self.start {
            Stage::Pending
        } else if now < self.funding_start {
            Stage::Screening
        } else if now < self.end {
            Stage::Funding
        } else if now == self.end {
            Stage::Ended
        } else if now <= self.challenge_end {
            Stage::Challenge
        } else {
            Stage::Closed
        }
    }

    /// Whether the period is still open for proposals or votes.
    pub fn is_active(&self, now: Tick) -> bool {
        now < self.end
    }
}

/// Owns the treasury and every period ever started.
#[derive(Debug)]
pub struct DistributionPeriodManager {
    params: FundingParams,
    treasury: Wad,
    /// Index `i` holds period id `i + 1`.
    periods: Vec<DistributionPeriod>,
}

impl DistributionPeriodManager {
    pub fn new(params: FundingParams) -> Result<Self, FundingError> {
        params.validate()?;
        Ok(Self {
            params,
            treasury: Wad::ZERO,
            periods: Vec::new(),
        })
    }

    pub fn params(&self) -> &FundingParams {
        &self.params
    }

    pub fn treasury(&self) -> Wad {
        self.treasury
    }

    /// Add funds to the treasury. Open periods keep their GBC.
    pub fn fund_treasury(&mut self, amount: Wad) -> Result<Wad, FundingError> {
        self.treasury = self
            .treasury
            .checked_add(amount)
            .ok_or(FundingError::Overflow)?;
        info!(amount = %amount, treasury = %self.treasury, "treasury funded");
        Ok(self.treasury)
    }

    pub fn current(&self) -> Option<&DistributionPeriod> {
        self.periods.last()
    }

    /// The current period or `NoActivePeriod`.
    pub fn require_current(&self) -> Result<&DistributionPeriod, FundingError> {
        self.current().ok_or(FundingError::NoActivePeriod)
    }

    pub fn get(&self, period_id: u32) -> Option<&DistributionPeriod> {
        let index = period_id.checked_sub(1)? as usize;
        self.periods.get(index)
    }

    /// Fetch a period or fail with `PeriodNotFound`.
    pub fn require(&self, period_id: u32) -> Result<&DistributionPeriod, FundingError> {
        self.get(period_id)
            .ok_or(FundingError::PeriodNotFound(period_id))
    }

    pub(crate) fn get_mut(&mut self, period_id: u32) -> Result<&mut DistributionPeriod, FundingError> {
        let index = period_id
            .checked_sub(1)
            .ok_or(FundingError::PeriodNotFound(period_id))? as usize;
        self.periods
            .get_mut(index)
            .ok_or(FundingError::PeriodNotFound(period_id))
    }

    pub fn periods(&self) -> &[DistributionPeriod] {
        &self.periods
    }

    /// Stage of a period at `now`.
    pub fn stage(&self, period_id: u32, now: Tick) -> Result<Stage, FundingError> {
        Ok(self.require(period_id)?.stage_at(now))
    }

    /// Fetch a period and check it is in `expected` at `now`.
    pub fn require_stage(
        &self,
        period_id: u32,
        now: Tick,
        expected: Stage,
    ) -> Result<&DistributionPeriod, FundingError> {
        let period = self.require(period_id)?;
        let stage = period.stage_at(now);
        if stage != expected {
            return Err(FundingError::WrongStage(stage));
        }
        Ok(period)
    }

    /// Surplus a finished period returns to the treasury: its GBC minus the
    /// winning slate's request minus the delegate reward pool.
    pub fn surplus_of(&self, period: &DistributionPeriod, slate_tokens: Wad) -> Result<Wad, FundingError> {
        let reward_pool = period
            .funds_available
            .apply_bps(self.params.delegate_reward_bps)
            .ok_or(FundingError::Overflow)?;
        period
            .funds_available
            .checked_sub(slate_tokens)
            .and_then(|rest| rest.checked_sub(reward_pool))
            .ok_or(FundingError::Overflow)
    }

    /// Open a new period at `now`.
    ///
    /// Every earlier period whose challenge window has closed and whose surplus
    /// is still outstanding is folded back first; `slate_tokens` reports the
    /// winning slate's total request per period id. The new GBC is taken from
    /// the updated treasury. Fails without side effects if the current period
    /// has not reached its end tick.
    pub fn start_new_period<F>(
        &mut self,
        now: Tick,
        slate_tokens: F,
    ) -> Result<&DistributionPeriod, FundingError>
    where
        F: Fn(u32) -> Wad,
    {
        if let Some(current) = self.current() {
            if current.is_active(now) {
                return Err(FundingError::PeriodStillActive);
            }
        }

        let mut treasury = self.treasury;
        let mut folds = Vec::new();
        for (index, period) in self.periods.iter().enumerate() {
            if period.surplus_folded || now <= period.challenge_end {
                continue;
            }
            let surplus = self.surplus_of(period, slate_tokens(period.id))?;
            treasury = treasury.checked_add(surplus).ok_or(FundingError::Overflow)?;
            folds.push((index, surplus));
        }

        let funds_available = treasury
            .apply_bps(self.params.gbc_bps)
            .ok_or(FundingError::Overflow)?;
        let remaining = treasury
            .checked_sub(funds_available)
            .ok_or(FundingError::Overflow)?;
        let id = u32::try_from(self.periods.len() + 1).map_err(|_| FundingError::Overflow)?;
        let end = now
            .checked_add(self.params.period_length)
            .ok_or(FundingError::Overflow)?;
        let period = DistributionPeriod {
            id,
            start: now,
            end,
            funding_start: end.saturating_sub(self.params.funding_length),
            challenge_end: end
                .checked_add(self.params.challenge_length)
                .ok_or(FundingError::Overflow)?,
            funds_available,
            funding_votes_cast: QuadraticCost::ZERO,
            winning_slate_hash: None,
            surplus_folded: false,
        };

        for (index, surplus) in folds {
            let folded = &mut self.periods[index];
            folded.surplus_folded = true;
            info!(period = folded.id, surplus = %surplus, "surplus folded back into treasury");
        }
        self.treasury = remaining;
        self.periods.push(period);
        info!(
            period = id,
            start = %now,
            end = %end,
            gbc = %funds_available,
            treasury = %self.treasury,
            "distribution period started"
        );
        Ok(&self.periods[self.periods.len() - 1])
    }
}
