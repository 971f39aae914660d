//! Tunable parameters of the distribution mechanism.
//!
//! Lengths are counted in ticks; fractions are basis points. The defaults
//! match a block-height clock with ~12 second blocks: a 90 day period, a 10 day
//! funding stage and a 7 day challenge window.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};

/// Basis-point denominator (10_000 = 100%).
pub const BPS_DENOMINATOR: u32 = 10_000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundingParams {
    // ── Stage lengths ────────────────────────────────────────────────────
    /// Ticks from a period's start to its end.
    pub period_length: u64,

    /// Ticks of the funding stage, taken from the end of the period.
    pub funding_length: u64,

    /// Ticks of the challenge window following the period end.
    pub challenge_length: u64,

    // ── Budget fractions ─────────────────────────────────────────────────
    /// Grant Budget Cap as a fraction of treasury at period start.
    pub gbc_bps: u32,

    /// Upper bound on a slate's total request, as a fraction of the GBC.
    pub slate_budget_bps: u32,

    /// Delegate reward pool, as a fraction of the GBC.
    pub delegate_reward_bps: u32,

    /// Upper bound on a single proposal's request, as a fraction of treasury.
    pub max_request_bps: u32,
}

impl FundingParams {
    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), TypesError> {
        if self.period_length == 0 || self.funding_length == 0 || self.challenge_length == 0 {
            return Err(TypesError::InvalidParams(
                "stage lengths must be non-zero".into(),
            ));
        }
        if self.funding_length >= self.period_length {
            return Err(TypesError::InvalidParams(format!(
                "funding_length {} must be shorter than period_length {}",
                self.funding_length, self.period_length
            )));
        }
        for (name, bps) in [
            ("gbc_bps", self.gbc_bps),
            ("slate_budget_bps", self.slate_budget_bps),
            ("delegate_reward_bps", self.delegate_reward_bps),
            ("max_request_bps", self.max_request_bps),
        ] {
            if bps > BPS_DENOMINATOR {
                return Err(TypesError::InvalidParams(format!(
                    "{name} = {bps} exceeds {BPS_DENOMINATOR}"
                )));
            }
        }
        if self.slate_budget_bps + self.delegate_reward_bps > BPS_DENOMINATOR {
            return Err(TypesError::InvalidParams(
                "slate budget and delegate rewards together exceed the GBC".into(),
            ));
        }
        Ok(())
    }
}

impl Default for FundingParams {
    fn default() -> Self {
        Self {
            period_length: 648_000,
            funding_length: 72_000,
            challenge_length: 50_400,
            gbc_bps: 300,
            slate_budget_bps: 9_000,
            delegate_reward_bps: 1_000,
            max_request_bps: 9_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let params = FundingParams::default();
        assert!(params.validate().is_ok());
    }

    #[test]
    fn funding_longer_than_period_rejected() {
        let params = FundingParams {
            funding_length: 648_000,
            ..FundingParams::default()
        };
        assert!(matches!(params.validate(), Err(TypesError::InvalidParams(_))));
    }

    #[test]
    fn overcommitted_gbc_rejected() {
        let params = FundingParams {
            slate_budget_bps: 9_500,
            ..FundingParams::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn zero_challenge_rejected() {
        let params = FundingParams {
            challenge_length: 0,
            ..FundingParams::default()
        };
        assert!(params.validate().is_err());
    }
}
