//! Precondition gate: market window and session checks.
//!
//! Runs before any capital is queried or any order is attempted. A blocked
//! gate is reported as an [`Error`]; a ready gate hands back the account the
//! session probe returned so callers can check buying power without a second
//! round trip.

use alphaflex::MarketHours;
use alphaflex_broker::{Account, Brokerage, Session};
use log::{error, warn};

use crate::clock::Clock;
use crate::error::{Error, Result};

/// Check market hours, then the session.
pub fn check_preconditions(
    session: &dyn Session,
    broker: &dyn Brokerage,
    clock: &dyn Clock,
    hours: &MarketHours,
) -> Result<Account> {
    let now = clock.now();
    if !hours.is_open(now) {
        warn!("Market closed at {now}");
        return Err(Error::MarketClosed(hours.closed_reason()));
    }
    authenticated_account(session, broker)
}

/// Session check alone. Any failure collapses to [`Error::SessionInvalid`].
pub fn authenticated_account(session: &dyn Session, broker: &dyn Brokerage) -> Result<Account> {
    if !session.is_valid() {
        warn!("No valid session");
        return Err(Error::SessionInvalid);
    }
    match broker.account() {
        Ok(account) if !account.account_number.is_empty() => Ok(account),
        Ok(_) => {
            error!("Authentication verification failed: account profile has no account number");
            Err(Error::SessionInvalid)
        }
        Err(e) => {
            error!("Authentication verification failed: {e}");
            Err(Error::SessionInvalid)
        }
    }
}
