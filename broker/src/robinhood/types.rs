//! Robinhood-specific API request and response types.
//!
//! Numeric fields arrive as decimal strings.

use serde::{Deserialize, Serialize};

/// One page of a paginated listing.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
}

/// Brokerage account profile.
#[derive(Debug, Deserialize)]
pub struct AccountInfo {
    pub url: String,
    pub account_number: String,
    #[serde(default)]
    pub buying_power: Option<String>,
    #[serde(default)]
    pub cash: Option<String>,
}

/// Equity quote.
#[derive(Debug, Deserialize)]
pub struct QuoteInfo {
    pub symbol: String,
    #[serde(default)]
    pub last_trade_price: Option<String>,
    #[serde(default)]
    pub last_extended_hours_trade_price: Option<String>,
}

impl QuoteInfo {
    /// Latest price, preferring the extended-hours print when there is one.
    pub fn latest_price(&self) -> Option<f64> {
        self.last_extended_hours_trade_price
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.last_trade_price.as_deref())
            .and_then(|s| s.parse::<f64>().ok())
    }
}

/// Tradable instrument.
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentInfo {
    pub url: String,
    pub id: String,
    pub symbol: String,
}

/// Held position.
#[derive(Debug, Deserialize)]
pub struct PositionInfo {
    pub instrument: String,
    pub quantity: String,
    #[serde(default)]
    pub symbol: Option<String>,
}

/// Order as returned by submission and lookup.
#[derive(Debug, Deserialize)]
pub struct OrderResponse {
    pub id: String,
    pub state: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub instrument: Option<String>,
}

/// Order submission body.
#[derive(Debug, Serialize)]
pub struct OrderRequest<'a> {
    pub account: &'a str,
    pub instrument: &'a str,
    pub symbol: &'a str,
    pub price: String,
    pub quantity: String,
    pub ref_id: String,
    #[serde(rename = "type")]
    pub order_type: &'static str,
    pub time_in_force: &'static str,
    pub trigger: &'static str,
    pub side: &'static str,
    pub extended_hours: bool,
}

/// OAuth password-grant request.
#[derive(Debug, Serialize)]
pub struct TokenRequest<'a> {
    pub client_id: &'static str,
    pub expires_in: i64,
    pub grant_type: &'static str,
    pub scope: &'static str,
    pub username: &'a str,
    pub password: &'a str,
    pub device_token: &'a str,
    pub challenge_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mfa_code: Option<&'a str>,
}

/// OAuth token response. Either a token, or an indication that a second
/// factor is needed, or an error detail.
#[derive(Debug, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub mfa_required: Option<bool>,
    #[serde(default)]
    pub mfa_type: Option<String>,
    #[serde(default)]
    pub challenge: Option<serde_json::Value>,
    #[serde(default)]
    pub detail: Option<String>,
}
