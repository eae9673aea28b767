//! Shared broker types: accounts, positions, orders, credentials.

use alphaflex::Side;

/// Account profile from the broker.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub account_number: String,
    pub buying_power: f64,
    pub cash: f64,
}

/// Broker-level position.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub symbol: String,
    pub quantity: f64,
}

/// Fractional-share market order to submit.
#[derive(Debug, Clone, PartialEq)]
pub struct FractionalOrder {
    pub symbol: String,
    pub side: Side,
    pub quantity: f64,
}

/// Broker acknowledgement of a submitted order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderAck {
    pub order_id: String,
    pub state: String,
}

/// Current state of a previously submitted order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderSnapshot {
    pub order_id: String,
    pub state: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub side: Option<String>,
    pub quantity: Option<f64>,
    pub symbol: Option<String>,
}

/// Login credentials. The password and MFA code are wiped on drop when the
/// `robinhood` feature is enabled.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub mfa_code: Option<String>,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            mfa_code: None,
        }
    }

    pub fn with_mfa_code(mut self, code: &str) -> Self {
        self.mfa_code = Some(code.to_string());
        self
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("mfa_code", &self.mfa_code.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(feature = "robinhood")]
impl Drop for Credentials {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.password.zeroize();
        if let Some(code) = self.mfa_code.as_mut() {
            code.zeroize();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_debug_redacts_secrets() {
        let creds = Credentials::new("me@example.com", "hunter2").with_mfa_code("123456");
        let dbg = format!("{creds:?}");
        assert!(dbg.contains("me@example.com"));
        assert!(!dbg.contains("hunter2"));
        assert!(!dbg.contains("123456"));
    }
}
