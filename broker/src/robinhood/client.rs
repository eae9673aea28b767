//! Robinhood REST API client.

use std::time::Duration;

use log::debug;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::types::{
    AccountInfo, InstrumentInfo, OrderRequest, OrderResponse, Page, PositionInfo, QuoteInfo,
    TokenRequest, TokenResponse,
};
use crate::error::BrokerError;

pub const DEFAULT_BASE_URL: &str = "https://api.robinhood.com";

/// Public OAuth client id used by the Robinhood web and mobile apps.
pub const CLIENT_ID: &str = "c82SH0WZOsabOXGP2sxqcj34FxkvfnWRZBKlBjFS";

/// Upper bound on pages followed for a single listing.
const MAX_PAGES: usize = 50;

/// Blocking Robinhood REST client.
pub struct RobinhoodClient {
    client: Client,
    base_url: String,
    access_token: Option<String>,
}

impl RobinhoodClient {
    /// Create an unauthenticated client. Per-request timeouts are enforced by
    /// the underlying HTTP client.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BrokerError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BrokerError::Connection(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: None,
        })
    }

    /// Attach a bearer token to every subsequent request.
    pub fn with_access_token(mut self, token: &str) -> Self {
        self.access_token = Some(token.to_string());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T, BrokerError> {
        if self.access_token.is_none() {
            return Err(BrokerError::NotAuthenticated);
        }
        let resp = self
            .authorized(self.client.get(url))
            .send()
            .map_err(|e| BrokerError::Connection(format!("{what} request failed: {e}")))?;
        read_json(resp, what, BrokerError::Connection)
    }

    /// Request an OAuth token (POST /oauth2/token/).
    ///
    /// MFA challenges come back as a 4xx with a body describing the
    /// challenge, so the body is parsed regardless of status.
    pub fn oauth_token(&self, request: &TokenRequest<'_>) -> Result<TokenResponse, BrokerError> {
        let resp = self
            .client
            .post(self.url("/oauth2/token/"))
            .json(request)
            .send()
            .map_err(|e| BrokerError::Connection(format!("login request failed: {e}")))?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(BrokerError::RateLimit);
        }
        let body = resp.text().unwrap_or_default();
        serde_json::from_str::<TokenResponse>(&body).map_err(|_| {
            BrokerError::Auth(format!("login returned {status}: {body}"))
        })
    }

    /// Revoke a token (POST /oauth2/revoke_token/).
    pub fn revoke_token(&self, token: &str) -> Result<(), BrokerError> {
        let resp = self
            .client
            .post(self.url("/oauth2/revoke_token/"))
            .form(&[("client_id", CLIENT_ID), ("token", token)])
            .send()
            .map_err(|e| BrokerError::Connection(format!("revoke request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(BrokerError::Auth(format!(
                "revoke returned {}",
                resp.status()
            )));
        }
        Ok(())
    }

    /// List accounts (GET /accounts/).
    pub fn accounts(&self) -> Result<Vec<AccountInfo>, BrokerError> {
        let page: Page<AccountInfo> = self.get_json(&self.url("/accounts/"), "accounts")?;
        Ok(page.results)
    }

    /// Latest quote for one symbol (GET /quotes/?symbols=).
    pub fn quote(&self, symbol: &str) -> Result<QuoteInfo, BrokerError> {
        let url = self.url(&format!("/quotes/?symbols={symbol}"));
        let page: Page<Option<QuoteInfo>> = self.get_json(&url, "quote")?;
        page.results
            .into_iter()
            .flatten()
            .next()
            .ok_or_else(|| BrokerError::InvalidSymbol(symbol.to_string()))
    }

    /// Instrument for a ticker (GET /instruments/?symbol=).
    pub fn instrument_by_symbol(&self, symbol: &str) -> Result<InstrumentInfo, BrokerError> {
        let url = self.url(&format!("/instruments/?symbol={symbol}"));
        let page: Page<InstrumentInfo> = self.get_json(&url, "instrument")?;
        page.results
            .into_iter()
            .next()
            .ok_or_else(|| BrokerError::InvalidSymbol(symbol.to_string()))
    }

    /// Instrument by its API URL.
    pub fn instrument(&self, url: &str) -> Result<InstrumentInfo, BrokerError> {
        self.get_json(url, "instrument")
    }

    /// Submit an order (POST /orders/).
    pub fn place_order(&self, request: &OrderRequest<'_>) -> Result<OrderResponse, BrokerError> {
        if self.access_token.is_none() {
            return Err(BrokerError::NotAuthenticated);
        }
        debug!(
            "Submitting Robinhood order: {} {} {}",
            request.side, request.quantity, request.symbol
        );

        let resp = self
            .authorized(self.client.post(self.url("/orders/")))
            .json(request)
            .send()
            .map_err(|e| BrokerError::Order(format!("order request failed: {e}")))?;
        read_json(resp, "order", BrokerError::Order)
    }

    /// Look up an order (GET /orders/{id}/). `None` on 404.
    pub fn order(&self, order_id: &str) -> Result<Option<OrderResponse>, BrokerError> {
        if self.access_token.is_none() {
            return Err(BrokerError::NotAuthenticated);
        }
        let resp = self
            .authorized(self.client.get(self.url(&format!("/orders/{order_id}/"))))
            .send()
            .map_err(|e| BrokerError::Order(format!("order status request failed: {e}")))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_json(resp, "order status", BrokerError::Order).map(Some)
    }

    /// All non-zero positions (GET /positions/?nonzero=true), following
    /// pagination.
    pub fn positions(&self) -> Result<Vec<PositionInfo>, BrokerError> {
        let mut url = Some(self.url("/positions/?nonzero=true"));
        let mut all = Vec::new();
        let mut pages = 0;

        while let Some(next) = url.take() {
            let page: Page<PositionInfo> = self.get_json(&next, "positions")?;
            all.extend(page.results);
            pages += 1;
            if pages >= MAX_PAGES {
                break;
            }
            url = page.next;
        }

        Ok(all)
    }
}

/// Map an HTTP response to a parsed body or a broker error.
fn read_json<T: DeserializeOwned>(
    resp: Response,
    what: &str,
    wrap: fn(String) -> BrokerError,
) -> Result<T, BrokerError> {
    let status = resp.status();
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(BrokerError::Auth(format!("{what} returned {status}")));
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(BrokerError::RateLimit);
    }
    if !status.is_success() {
        let body = resp.text().unwrap_or_default();
        return Err(wrap(format!("{what} returned {status}: {body}")));
    }
    resp.json::<T>()
        .map_err(|e| wrap(format!("failed to parse {what}: {e}")))
}
