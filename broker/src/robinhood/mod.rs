//! Robinhood broker implementation.

pub mod client;
pub mod session;
pub mod types;

use std::sync::Mutex;

use rustc_hash::FxHashMap;

use crate::Brokerage;
use crate::error::BrokerError;
use crate::types::*;
use client::RobinhoodClient;
use types::{AccountInfo, InstrumentInfo, OrderRequest};

pub use session::TokenSession;

/// Robinhood equities broker implementing the generic Brokerage trait.
///
/// Uses the REST API for all operations. Blocking (sync) via reqwest::blocking.
/// Instrument lookups are cached for the life of the process.
pub struct RobinhoodBroker {
    client: RobinhoodClient,
    instruments: Mutex<FxHashMap<String, InstrumentInfo>>,
    symbols_by_url: Mutex<FxHashMap<String, String>>,
}

impl RobinhoodBroker {
    pub fn new(client: RobinhoodClient) -> Self {
        Self {
            client,
            instruments: Mutex::new(FxHashMap::default()),
            symbols_by_url: Mutex::new(FxHashMap::default()),
        }
    }

    /// Parse a decimal string (e.g., "185.50"), treating garbage as zero.
    fn parse_amount(s: &str) -> f64 {
        s.parse().unwrap_or(0.0)
    }

    fn primary_account(&self) -> Result<AccountInfo, BrokerError> {
        self.client
            .accounts()?
            .into_iter()
            .next()
            .ok_or_else(|| BrokerError::Auth("no brokerage account on this login".into()))
    }

    fn instrument_for(&self, symbol: &str) -> Result<InstrumentInfo, BrokerError> {
        if let Some(found) = lock(&self.instruments)?.get(symbol) {
            return Ok(found.clone());
        }
        let info = self.client.instrument_by_symbol(symbol)?;
        lock(&self.symbols_by_url)?.insert(info.url.clone(), info.symbol.clone());
        lock(&self.instruments)?.insert(symbol.to_string(), info.clone());
        Ok(info)
    }

    fn symbol_for(&self, instrument_url: &str) -> Result<String, BrokerError> {
        if let Some(found) = lock(&self.symbols_by_url)?.get(instrument_url) {
            return Ok(found.clone());
        }
        let info = self.client.instrument(instrument_url)?;
        lock(&self.symbols_by_url)?.insert(info.url.clone(), info.symbol.clone());
        Ok(info.symbol)
    }
}

fn lock<T>(m: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>, BrokerError> {
    m.lock()
        .map_err(|_| BrokerError::Other("instrument cache poisoned".into()))
}

impl Brokerage for RobinhoodBroker {
    fn account(&self) -> Result<Account, BrokerError> {
        let info = self.primary_account()?;
        Ok(Account {
            account_number: info.account_number,
            buying_power: info.buying_power.as_deref().map_or(0.0, Self::parse_amount),
            cash: info.cash.as_deref().map_or(0.0, Self::parse_amount),
        })
    }

    fn latest_price(&self, symbol: &str) -> Result<f64, BrokerError> {
        let quote = self.client.quote(symbol)?;
        quote
            .latest_price()
            .ok_or_else(|| BrokerError::Connection(format!("no trade price for {symbol}")))
    }

    fn submit_order(&self, order: &FractionalOrder) -> Result<OrderAck, BrokerError> {
        let account = self.primary_account()?;
        let instrument = self.instrument_for(&order.symbol)?;
        let price = self.latest_price(&order.symbol)?;

        let request = OrderRequest {
            account: &account.url,
            instrument: &instrument.url,
            symbol: &instrument.symbol,
            price: format!("{price:.2}"),
            quantity: format!("{:.6}", order.quantity),
            ref_id: uuid::Uuid::new_v4().to_string(),
            order_type: "market",
            time_in_force: "gfd",
            trigger: "immediate",
            side: order.side.as_str(),
            extended_hours: false,
        };

        let resp = self.client.place_order(&request)?;
        Ok(OrderAck {
            order_id: resp.id,
            state: resp.state,
        })
    }

    fn order(&self, order_id: &str) -> Result<Option<OrderSnapshot>, BrokerError> {
        let Some(resp) = self.client.order(order_id)? else {
            return Ok(None);
        };

        let symbol = match resp.instrument.as_deref() {
            Some(url) => Some(self.symbol_for(url)?),
            None => None,
        };

        Ok(Some(OrderSnapshot {
            order_id: resp.id,
            state: resp.state,
            created_at: resp.created_at,
            updated_at: resp.updated_at,
            side: resp.side,
            quantity: resp.quantity.as_deref().map(Self::parse_amount),
            symbol,
        }))
    }

    fn positions(&self) -> Result<Vec<Position>, BrokerError> {
        self.client
            .positions()?
            .into_iter()
            .map(|p| {
                let symbol = match p.symbol {
                    Some(s) => s,
                    None => self.symbol_for(&p.instrument)?,
                };
                Ok(Position {
                    symbol,
                    quantity: Self::parse_amount(&p.quantity),
                })
            })
            .collect()
    }
}
