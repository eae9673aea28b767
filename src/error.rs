//! Planning and validation errors.

/// Errors raised before any per-symbol work starts.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error("holdings list is empty")]
    EmptyHoldings,

    #[error("empty symbol")]
    EmptySymbol,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("missing allocation weight for {0}")]
    MissingWeight(String),

    #[error("allocation weight for {symbol} is not a finite number ({weight})")]
    InvalidWeight { symbol: String, weight: f64 },

    #[error("total amount must be a positive number, got {0}")]
    InvalidAmount(f64),

    #[error("Insufficient buying power. Available: ${available}, Required: ${required}")]
    InsufficientBuyingPower { available: f64, required: f64 },
}
