use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("funding error: {0}")]
    Funding(#[from] grantfund_funding::FundingError),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
