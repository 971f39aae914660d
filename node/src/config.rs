//! Node configuration with TOML file support.

use serde::{Deserialize, Serialize};

use grantfund_types::{FundingParams, Wad};

use crate::logging::LogFormat;
use crate::NodeError;

/// Configuration for a grant fund node.
///
/// Can be loaded from a TOML file via [`NodeConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Period schedule and budget fractions.
    #[serde(default)]
    pub params: FundingParams,

    /// Whole tokens deposited into the treasury at startup.
    #[serde(default)]
    pub initial_treasury: u64,

    /// Log output format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter (overridden by RUST_LOG if set).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Register Prometheus metrics.
    #[serde(default = "default_true")]
    pub enable_metrics: bool,
}

// ── Defaults ───────────────────────────────────────────────────────────

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

// ── Impl ───────────────────────────────────────────────────────────────

impl NodeConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string. The funding parameters are
    /// validated as part of parsing.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        let config: Self = toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), NodeError> {
        self.params
            .validate()
            .map_err(|e| NodeError::Config(e.to_string()))?;
        self.log_format()?;
        Ok(())
    }

    pub fn log_format(&self) -> Result<LogFormat, NodeError> {
        self.log_format.parse()
    }

    pub fn initial_treasury(&self) -> Wad {
        Wad::tokens(self.initial_treasury)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            params: FundingParams::default(),
            initial_treasury: 0,
            log_format: default_log_format(),
            log_level: default_log_level(),
            enable_metrics: default_true(),
        }
    }
}
