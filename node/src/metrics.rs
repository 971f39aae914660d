//! Prometheus metrics for the grant fund node.
//!
//! The [`NodeMetrics`] struct owns a dedicated [`Registry`] that an exporter
//! can encode into the Prometheus text exposition format via
//! [`NodeMetrics::encode`].

use prometheus::{
    register_int_counter_with_registry, register_int_gauge_with_registry, IntCounter,
    IntGauge, Opts, Registry, TextEncoder,
};

use grantfund_types::{math::WAD, Wad};

use crate::NodeError;

/// Central collection of all node-level Prometheus metrics.
pub struct NodeMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Proposals accepted into a screening stage.
    pub proposals_submitted: IntCounter,
    /// Accepted screening vote calls.
    pub screening_votes: IntCounter,
    /// Accepted funding vote calls.
    pub funding_votes: IntCounter,
    /// Slate submissions that replaced the incumbent.
    pub slate_updates: IntCounter,
    /// Proposals whose actions were executed.
    pub proposals_executed: IntCounter,
    /// Delegate reward claims paid.
    pub rewards_claimed: IntCounter,
    /// Calls rejected with an error.
    pub rejected_calls: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Treasury balance in whole tokens.
    pub treasury_tokens: IntGauge,
    /// Id of the most recently started period.
    pub current_period: IntGauge,
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, NodeError> {
    Ok(register_int_counter_with_registry!(Opts::new(name, help), registry)?)
}

fn gauge(registry: &Registry, name: &str, help: &str) -> Result<IntGauge, NodeError> {
    Ok(register_int_gauge_with_registry!(Opts::new(name, help), registry)?)
}

impl NodeMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Result<Self, NodeError> {
        let registry = Registry::new();

        // Counters
        let proposals_submitted = counter(
            &registry,
            "grantfund_proposals_submitted_total",
            "Total proposals submitted",
        )?;
        let screening_votes = counter(
            &registry,
            "grantfund_screening_votes_total",
            "Total accepted screening vote calls",
        )?;
        let funding_votes = counter(
            &registry,
            "grantfund_funding_votes_total",
            "Total accepted funding vote calls",
        )?;
        let slate_updates = counter(
            &registry,
            "grantfund_slate_updates_total",
            "Total slate submissions that replaced the winning slate",
        )?;
        let proposals_executed = counter(
            &registry,
            "grantfund_proposals_executed_total",
            "Total proposals executed",
        )?;
        let rewards_claimed = counter(
            &registry,
            "grantfund_rewards_claimed_total",
            "Total delegate rewards claimed",
        )?;
        let rejected_calls = counter(
            &registry,
            "grantfund_rejected_calls_total",
            "Total calls rejected with an error",
        )?;

        // Gauges
        let treasury_tokens = gauge(
            &registry,
            "grantfund_treasury_tokens",
            "Treasury balance in whole tokens",
        )?;
        let current_period = gauge(
            &registry,
            "grantfund_current_period",
            "Id of the current distribution period",
        )?;

        Ok(Self {
            registry,
            proposals_submitted,
            screening_votes,
            funding_votes,
            slate_updates,
            proposals_executed,
            rewards_claimed,
            rejected_calls,
            treasury_tokens,
            current_period,
        })
    }

    /// Set the treasury gauge, truncating to whole tokens.
    pub fn set_treasury(&self, treasury: Wad) {
        let tokens = i64::try_from(treasury.raw() / WAD).unwrap_or(i64::MAX);
        self.treasury_tokens.set(tokens);
    }

    /// Encode every metric in the Prometheus text format.
    pub fn encode(&self) -> Result<String, NodeError> {
        Ok(TextEncoder::new().encode_to_string(&self.registry.gather())?)
    }
}
