//! Execution aggregator: batch ledgers and the reports built from them.
//!
//! A [`Ledger`] is the batch-local accumulator. Every symbol is recorded in
//! exactly one of its three buckets; the report constructors only classify
//! what was recorded and never fail.

use chrono::{DateTime, Utc};

/// A buy order the brokerage accepted.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BuyOrder {
    pub symbol: String,
    pub shares: f64,
    pub amount: f64,
    pub price: f64,
    pub order_id: String,
    pub status: String,
}

/// A sell order the brokerage accepted.
///
/// Price and value come from a quote fetched after submission; they are
/// absent when that quote could not be fetched.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SellOrder {
    pub symbol: String,
    pub shares: f64,
    pub estimated_value: Option<f64>,
    pub price_per_share: Option<f64>,
    pub order_id: String,
    pub status: String,
}

/// A symbol that could not be priced or submitted.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FailedOrder {
    pub symbol: String,
    pub error: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub allocation_amount: Option<f64>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub quantity: Option<f64>,
}

impl FailedOrder {
    pub fn new(symbol: &str, error: impl Into<String>) -> Self {
        Self {
            symbol: symbol.to_string(),
            error: error.into(),
            allocation_amount: None,
            quantity: None,
        }
    }

    pub fn with_allocation_amount(mut self, amount: f64) -> Self {
        self.allocation_amount = Some(amount);
        self
    }

    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = Some(quantity);
        self
    }
}

/// A symbol deliberately not traded. Not an error.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SkippedStock {
    pub symbol: String,
    pub reason: String,
}

impl SkippedStock {
    pub fn new(symbol: &str, reason: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Batch-local outcome accumulator.
#[derive(Clone, Debug)]
pub struct Ledger<O> {
    pub orders: Vec<O>,
    pub failed: Vec<FailedOrder>,
    pub skipped: Vec<SkippedStock>,
}

impl<O> Default for Ledger<O> {
    fn default() -> Self {
        Self {
            orders: Vec::new(),
            failed: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

impl<O> Ledger<O> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_order(&mut self, order: O) {
        self.orders.push(order);
    }

    pub fn record_failure(&mut self, failure: FailedOrder) {
        self.failed.push(failure);
    }

    pub fn record_skip(&mut self, skip: SkippedStock) {
        self.skipped.push(skip);
    }

    /// Some orders went through and some failed.
    pub fn partial_success(&self) -> bool {
        !self.orders.is_empty() && !self.failed.is_empty()
    }

    /// Nothing went through and at least one symbol failed.
    pub fn all_failed(&self) -> bool {
        self.orders.is_empty() && !self.failed.is_empty()
    }
}

/// Result of a buy batch.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BuyReport {
    pub orders: Vec<BuyOrder>,
    pub failed_orders: Vec<FailedOrder>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    pub skipped_stocks: Vec<SkippedStock>,
    pub total_amount: f64,
    pub total_allocated: f64,
    pub timestamp: DateTime<Utc>,
    pub partial_success: bool,
    pub all_failed: bool,
}

impl BuyReport {
    pub fn aggregate(
        ledger: Ledger<BuyOrder>,
        total_amount: f64,
        total_allocated: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let partial_success = ledger.partial_success();
        let all_failed = ledger.all_failed();
        Self {
            orders: ledger.orders,
            failed_orders: ledger.failed,
            skipped_stocks: ledger.skipped,
            total_amount,
            total_allocated,
            timestamp,
            partial_success,
            all_failed,
        }
    }
}

/// Result of a sell batch.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SellReport {
    pub orders: Vec<SellOrder>,
    pub failed_orders: Vec<FailedOrder>,
    pub skipped_stocks: Vec<SkippedStock>,
    pub timestamp: DateTime<Utc>,
    pub total_estimated_value: f64,
    pub stocks_sold: usize,
    pub stocks_failed: usize,
    pub stocks_skipped: usize,
    pub partial_success: bool,
    pub all_failed: bool,
}

impl SellReport {
    pub fn aggregate(ledger: Ledger<SellOrder>, timestamp: DateTime<Utc>) -> Self {
        let partial_success = ledger.partial_success();
        let all_failed = ledger.all_failed();
        let total_estimated_value = ledger
            .orders
            .iter()
            .filter_map(|o| o.estimated_value)
            .sum();
        Self {
            stocks_sold: ledger.orders.len(),
            stocks_failed: ledger.failed.len(),
            stocks_skipped: ledger.skipped.len(),
            orders: ledger.orders,
            failed_orders: ledger.failed,
            skipped_stocks: ledger.skipped,
            timestamp,
            total_estimated_value,
            partial_success,
            all_failed,
        }
    }
}
