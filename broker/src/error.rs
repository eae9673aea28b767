//! Broker error types.

/// Errors that can occur during broker operations.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("order error: {0}")]
    Order(String),

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("MFA challenge required: {0}")]
    ChallengeRequired(String),

    #[error("rate limit exceeded")]
    RateLimit,

    #[error("session storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl BrokerError {
    /// Whether this error means the session is missing or expired.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            BrokerError::NotAuthenticated | BrokerError::Auth(_) | BrokerError::ChallengeRequired(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_classification() {
        assert!(BrokerError::NotAuthenticated.is_auth());
        assert!(BrokerError::Auth("expired".into()).is_auth());
        assert!(!BrokerError::Order("rejected".into()).is_auth());
    }
}
