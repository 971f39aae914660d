//! Grant fund node: serves the funding engine to concurrent callers.
//!
//! The node wraps the engine in a single async lock and adds the ambient
//! pieces a deployment needs:
//! - TOML configuration
//! - Structured logging
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod node;

pub use config::NodeConfig;
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use metrics::NodeMetrics;
pub use node::FundingNode;
