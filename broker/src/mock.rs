//! Mock brokerage for testing. Implements `Brokerage` and `Session` with
//! scriptable behavior.
//!
//! Use this in integration tests to simulate broker responses without network
//! calls.
//!
//! ```
//! use alphaflex_broker::mock::MockBrokerage;
//! use alphaflex_broker::Brokerage;
//!
//! let broker = MockBrokerage::builder()
//!     .with_account("5QR12345", 10_000.0)
//!     .with_price("AAPL", 187.5)
//!     .with_position("MSFT", 3.25)
//!     .fail_submissions("AAPL", 2)
//!     .build();
//!
//! assert_eq!(broker.latest_price("AAPL").unwrap(), 187.5);
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use alphaflex::Side;

use crate::error::BrokerError;
use crate::types::*;
use crate::{Brokerage, Session};

/// A recorded submission attempt for assertion in tests.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedOrder {
    pub symbol: String,
    pub side: Side,
    pub quantity: f64,
    pub accepted: bool,
}

/// How submissions for one symbol behave.
#[derive(Clone, Debug)]
enum SubmitScript {
    /// Fail this many attempts, then accept.
    FailFirst(u32),
    /// Fail this many attempts as an unknown symbol, then accept.
    LookupFailFirst(u32),
    /// Never accept.
    AlwaysReject,
}

/// Builder for `MockBrokerage`.
pub struct MockBrokerageBuilder {
    account: Option<Account>,
    prices: Vec<(String, Result<f64, String>)>,
    positions: Vec<Position>,
    positions_error: Option<String>,
    orders: Vec<OrderSnapshot>,
    submit_scripts: HashMap<String, SubmitScript>,
    order_state: String,
}

impl MockBrokerageBuilder {
    pub fn with_account(mut self, account_number: &str, buying_power: f64) -> Self {
        self.account = Some(Account {
            account_number: account_number.to_string(),
            buying_power,
            cash: buying_power,
        });
        self
    }

    /// Make every account lookup fail with an auth error.
    pub fn without_account(mut self) -> Self {
        self.account = None;
        self
    }

    pub fn with_price(mut self, symbol: &str, price: f64) -> Self {
        self.prices.push((symbol.to_string(), Ok(price)));
        self
    }

    pub fn with_price_error(mut self, symbol: &str, message: &str) -> Self {
        self.prices.push((symbol.to_string(), Err(message.to_string())));
        self
    }

    pub fn with_position(mut self, symbol: &str, quantity: f64) -> Self {
        self.positions.push(Position {
            symbol: symbol.to_string(),
            quantity,
        });
        self
    }

    pub fn with_positions_error(mut self, message: &str) -> Self {
        self.positions_error = Some(message.to_string());
        self
    }

    pub fn with_order(mut self, snapshot: OrderSnapshot) -> Self {
        self.orders.push(snapshot);
        self
    }

    /// Fail the first `attempts` submissions for `symbol` with an order error.
    pub fn fail_submissions(mut self, symbol: &str, attempts: u32) -> Self {
        self.submit_scripts
            .insert(symbol.to_string(), SubmitScript::FailFirst(attempts));
        self
    }

    /// Fail the first `attempts` submissions for `symbol` as if the
    /// instrument lookup had come back empty.
    pub fn fail_lookups(mut self, symbol: &str, attempts: u32) -> Self {
        self.submit_scripts
            .insert(symbol.to_string(), SubmitScript::LookupFailFirst(attempts));
        self
    }

    /// Reject every submission for `symbol`.
    pub fn reject_submissions(mut self, symbol: &str) -> Self {
        self.submit_scripts
            .insert(symbol.to_string(), SubmitScript::AlwaysReject);
        self
    }

    /// State string reported for accepted orders (default `"queued"`).
    pub fn order_state(mut self, state: &str) -> Self {
        self.order_state = state.to_string();
        self
    }

    pub fn build(self) -> MockBrokerage {
        MockBrokerage {
            account: self.account,
            prices: self.prices,
            positions: self.positions,
            positions_error: self.positions_error,
            orders: self.orders,
            submit_scripts: self.submit_scripts,
            order_state: self.order_state,
            next_order_id: Mutex::new(1),
            submitted: Mutex::new(Vec::new()),
            price_requests: Mutex::new(Vec::new()),
            account_requests: Mutex::new(0),
        }
    }
}

/// A mock brokerage that records calls and returns configured responses.
pub struct MockBrokerage {
    account: Option<Account>,
    prices: Vec<(String, Result<f64, String>)>,
    positions: Vec<Position>,
    positions_error: Option<String>,
    orders: Vec<OrderSnapshot>,
    submit_scripts: HashMap<String, SubmitScript>,
    order_state: String,
    next_order_id: Mutex<u64>,
    submitted: Mutex<Vec<RecordedOrder>>,
    price_requests: Mutex<Vec<String>>,
    account_requests: Mutex<usize>,
}

impl MockBrokerage {
    pub fn builder() -> MockBrokerageBuilder {
        MockBrokerageBuilder {
            account: Some(Account {
                account_number: "MOCK0001".into(),
                buying_power: 100_000.0,
                cash: 100_000.0,
            }),
            prices: Vec::new(),
            positions: Vec::new(),
            positions_error: None,
            orders: Vec::new(),
            submit_scripts: HashMap::new(),
            order_state: "queued".into(),
        }
    }

    /// Every submission attempt, accepted or not, in order.
    pub fn submitted_orders(&self) -> Vec<RecordedOrder> {
        self.submitted.lock().unwrap().clone()
    }

    /// Accepted submissions only.
    pub fn accepted_orders(&self) -> Vec<RecordedOrder> {
        self.submitted_orders()
            .into_iter()
            .filter(|o| o.accepted)
            .collect()
    }

    /// Symbols whose price was requested, in order.
    pub fn price_requests(&self) -> Vec<String> {
        self.price_requests.lock().unwrap().clone()
    }

    pub fn account_requests(&self) -> usize {
        *self.account_requests.lock().unwrap()
    }

    fn attempts_for(&self, symbol: &str) -> u32 {
        self.submitted
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.symbol == symbol)
            .count() as u32
    }
}

impl Brokerage for MockBrokerage {
    fn account(&self) -> Result<Account, BrokerError> {
        *self.account_requests.lock().unwrap() += 1;
        self.account
            .clone()
            .ok_or_else(|| BrokerError::Auth("mock: no account profile".into()))
    }

    fn latest_price(&self, symbol: &str) -> Result<f64, BrokerError> {
        self.price_requests.lock().unwrap().push(symbol.to_string());
        match self.prices.iter().find(|(s, _)| s == symbol) {
            Some((_, Ok(price))) => Ok(*price),
            Some((_, Err(msg))) => Err(BrokerError::Connection(msg.clone())),
            None => Err(BrokerError::InvalidSymbol(symbol.to_string())),
        }
    }

    fn submit_order(&self, order: &FractionalOrder) -> Result<OrderAck, BrokerError> {
        let prior_attempts = self.attempts_for(&order.symbol);
        let script = self.submit_scripts.get(&order.symbol);
        let accepted = match script {
            None => true,
            Some(SubmitScript::FailFirst(n) | SubmitScript::LookupFailFirst(n)) => {
                prior_attempts >= *n
            }
            Some(SubmitScript::AlwaysReject) => false,
        };

        self.submitted.lock().unwrap().push(RecordedOrder {
            symbol: order.symbol.clone(),
            side: order.side,
            quantity: order.quantity,
            accepted,
        });

        if !accepted {
            if let Some(SubmitScript::LookupFailFirst(_)) = script {
                return Err(BrokerError::InvalidSymbol(order.symbol.clone()));
            }
            return Err(BrokerError::Order(format!(
                "mock: {} order for {} rejected (attempt {})",
                order.side.as_str(),
                order.symbol,
                prior_attempts + 1
            )));
        }

        let mut next = self.next_order_id.lock().unwrap();
        let order_id = format!("mock-order-{}", *next);
        *next += 1;

        Ok(OrderAck {
            order_id,
            state: self.order_state.clone(),
        })
    }

    fn order(&self, order_id: &str) -> Result<Option<OrderSnapshot>, BrokerError> {
        Ok(self
            .orders
            .iter()
            .find(|o| o.order_id == order_id)
            .cloned())
    }

    fn positions(&self) -> Result<Vec<Position>, BrokerError> {
        match &self.positions_error {
            Some(msg) => Err(BrokerError::Connection(msg.clone())),
            None => Ok(self.positions.clone()),
        }
    }
}

/// A mock session with a settable validity flag.
#[derive(Debug, Default)]
pub struct MockSession {
    valid: bool,
    require_mfa: bool,
    logins: Vec<String>,
    logouts: usize,
}

impl MockSession {
    /// A session that is already logged in.
    pub fn valid() -> Self {
        Self {
            valid: true,
            ..Self::default()
        }
    }

    /// A session with no login.
    pub fn expired() -> Self {
        Self::default()
    }

    /// Demand an MFA code on login.
    pub fn requiring_mfa(mut self) -> Self {
        self.require_mfa = true;
        self
    }

    /// Usernames that logged in successfully.
    pub fn logins(&self) -> &[String] {
        &self.logins
    }

    pub fn logouts(&self) -> usize {
        self.logouts
    }
}

impl Session for MockSession {
    fn login(&mut self, credentials: &Credentials) -> Result<(), BrokerError> {
        if credentials.password.is_empty() {
            return Err(BrokerError::Auth("invalid username or password".into()));
        }
        if self.require_mfa && credentials.mfa_code.is_none() {
            return Err(BrokerError::ChallengeRequired("sms".into()));
        }
        self.valid = true;
        self.logins.push(credentials.username.clone());
        Ok(())
    }

    fn logout(&mut self) -> Result<(), BrokerError> {
        self.valid = false;
        self.logouts += 1;
        Ok(())
    }

    fn is_valid(&self) -> bool {
        self.valid
    }
}
