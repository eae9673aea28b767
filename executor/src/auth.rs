//! Login and logout flows.

use std::io::IsTerminal;

use alphaflex_broker::{BrokerError, Brokerage, Credentials, Session};
use log::{info, warn};
use serde::Serialize;

use crate::error::{Error, Result};

/// Environment variable checked for the password before prompting.
pub const PASSWORD_ENV: &str = "ALPHAFLEX_PASSWORD";

const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    LoggedIn,
    /// The brokerage wants an MFA code and none could be obtained.
    MfaRequired,
    /// The brokerage refused the credentials.
    Rejected(String),
}

/// Account details reported after a successful login.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSummary {
    pub account_number: String,
    pub buying_power: f64,
    pub cash: f64,
}

/// Build credentials, taking the password from [`PASSWORD_ENV`] or a hidden
/// terminal prompt.
pub fn credentials(username: &str, mfa_code: Option<String>) -> Result<Credentials> {
    let password = match std::env::var(PASSWORD_ENV) {
        Ok(p) if !p.is_empty() => p,
        _ if std::io::stdin().is_terminal() => dialoguer::Password::new()
            .with_prompt(format!("Password for {username}"))
            .interact()
            .map_err(|e| Error::Arguments(format!("password prompt failed: {e}")))?,
        _ => {
            return Err(Error::Arguments(format!(
                "no password: set {PASSWORD_ENV} or run from a terminal"
            )));
        }
    };
    Ok(Credentials {
        username: username.to_string(),
        password,
        mfa_code,
    })
}

/// Ask for an MFA code on the terminal. `None` when there is no terminal or
/// the prompt fails.
pub fn prompt_mfa_code() -> Option<String> {
    if !std::io::stdin().is_terminal() {
        return None;
    }
    dialoguer::Input::<String>::new()
        .with_prompt("MFA code")
        .interact_text()
        .map_err(|e| warn!("MFA prompt failed: {e}"))
        .ok()
        .filter(|code| !code.trim().is_empty())
}

/// Log in, asking `prompt_mfa` for a code if the brokerage issues a
/// challenge and none was supplied.
pub fn login<S, F>(session: &mut S, mut credentials: Credentials, prompt_mfa: F) -> Result<LoginOutcome>
where
    S: Session + ?Sized,
    F: FnOnce() -> Option<String>,
{
    let first = session.login(&credentials);
    let result = match first {
        Err(BrokerError::ChallengeRequired(kind)) if credentials.mfa_code.is_none() => {
            info!("MFA challenge ({kind}) issued");
            match prompt_mfa() {
                Some(code) => {
                    credentials.mfa_code = Some(code);
                    session.login(&credentials)
                }
                None => return Ok(LoginOutcome::MfaRequired),
            }
        }
        other => other,
    };

    match result {
        Ok(()) => Ok(LoginOutcome::LoggedIn),
        Err(BrokerError::ChallengeRequired(_)) => Ok(LoginOutcome::MfaRequired),
        Err(BrokerError::Auth(msg)) => {
            warn!("Login rejected: {msg}");
            if msg.to_lowercase().contains("invalid") {
                Ok(LoginOutcome::Rejected(INVALID_CREDENTIALS.into()))
            } else {
                Ok(LoginOutcome::Rejected(msg))
            }
        }
        Err(e) => Err(e.into()),
    }
}

/// Read the account behind a fresh session.
pub fn account_summary(broker: &dyn Brokerage) -> Result<AccountSummary> {
    let account = broker.account()?;
    Ok(AccountSummary {
        account_number: account.account_number,
        buying_power: account.buying_power,
        cash: account.cash,
    })
}

/// Log out. Local session state is always cleared.
pub fn logout<S: Session + ?Sized>(session: &mut S) -> Result<()> {
    session.logout()?;
    info!("Logged out");
    Ok(())
}
