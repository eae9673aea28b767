//! Live brokerage wiring from config.

use alphaflex_broker::Brokerage;
use alphaflex_broker::robinhood::client::RobinhoodClient;
use alphaflex_broker::robinhood::{RobinhoodBroker, TokenSession};

use crate::config::Config;
use crate::error::Result;

fn client(config: &Config) -> Result<RobinhoodClient> {
    Ok(RobinhoodClient::new(
        &config.broker.base_url,
        config.broker_timeout(),
    )?)
}

/// Load the token session from the configured token file.
pub fn open_session(config: &Config) -> Result<TokenSession> {
    Ok(TokenSession::open(&config.token_path(), client(config)?))
}

/// A brokerage authenticated with whatever token `session` currently holds.
pub fn connect(config: &Config, session: &TokenSession) -> Result<Box<dyn Brokerage>> {
    let mut client = client(config)?;
    if let Some(token) = session.access_token() {
        client = client.with_access_token(token);
    }
    Ok(Box::new(RobinhoodBroker::new(client)))
}
