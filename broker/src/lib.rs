//! Brokerage and session traits for alphaflex.
//!
//! The executor only ever talks to a brokerage through [`Brokerage`] and to
//! credential state through [`Session`]. Implementations:
//!
//! - **Mock** ([`mock`]): scriptable in-memory brokerage and session for tests
//! - **Robinhood** (feature `robinhood`): blocking REST client and token session

pub mod error;
pub mod mock;
pub mod types;

#[cfg(feature = "robinhood")]
pub mod robinhood;

pub use error::BrokerError;
pub use types::*;

/// The brokerage operations the executor needs.
pub trait Brokerage {
    /// Account profile: account number and buying power.
    fn account(&self) -> Result<Account, BrokerError>;

    /// Latest tradable price for a symbol.
    fn latest_price(&self, symbol: &str) -> Result<f64, BrokerError>;

    /// Submit a fractional-share market order.
    fn submit_order(&self, order: &FractionalOrder) -> Result<OrderAck, BrokerError>;

    /// Look up a previously submitted order. `None` when the brokerage has no
    /// such order.
    fn order(&self, order_id: &str) -> Result<Option<OrderSnapshot>, BrokerError>;

    /// All currently held positions.
    fn positions(&self) -> Result<Vec<Position>, BrokerError>;
}

/// Authenticated session state.
///
/// The executor never touches token storage; it only asks whether a session is
/// currently valid, and the CLI triggers login and logout.
pub trait Session {
    /// Establish a session. Fails with [`BrokerError::ChallengeRequired`] when
    /// the brokerage wants an MFA code that was not supplied.
    fn login(&mut self, credentials: &Credentials) -> Result<(), BrokerError>;

    /// Tear down the session. Local state is cleared even if the remote side
    /// could not be reached.
    fn logout(&mut self) -> Result<(), BrokerError>;

    /// Whether a usable session is present right now.
    fn is_valid(&self) -> bool;
}
