//! Error types for the executor.

use std::path::PathBuf;

use alphaflex::PlanError;
use alphaflex_broker::BrokerError;

/// Message used whenever a session is missing or expired.
pub const AUTH_REQUIRED: &str = "Authentication required or has expired";

/// All errors that can end a command before it produces a report.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid holdings JSON: {0}")]
    HoldingsParse(#[from] serde_json::Error),

    #[error("invalid holdings: {0}")]
    Holdings(String),

    #[error("invalid arguments: {0}")]
    Arguments(String),

    #[error("{0}")]
    MarketClosed(String),

    #[error("{}", AUTH_REQUIRED)]
    SessionInvalid,

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("{0}")]
    Broker(#[from] BrokerError),
}

/// The batch or lookup a top-level error ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Place,
    Sell,
    Verify,
}

impl Error {
    /// The `error_type` tag reported for this error when it ends `operation`.
    pub fn error_type(&self, operation: Operation) -> &'static str {
        if self.is_auth() {
            return "authentication_error";
        }
        match operation {
            Operation::Place | Operation::Verify => "order_error",
            Operation::Sell => "sell_error",
        }
    }

    /// Whether the failure comes down to a missing or expired session.
    pub fn is_auth(&self) -> bool {
        match self {
            Error::SessionInvalid => true,
            Error::Broker(e) => e.is_auth(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
