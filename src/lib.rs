//! # alphaflex
//!
//! Turns a weighted portfolio into concrete fractional-share orders and
//! classifies how a batch of those orders went.
//!
//! This crate is pure: it never talks to a brokerage, sleeps, or reads the
//! clock. The `alphaflex-executor` crate wires it to a live broker.
//!
//! ## Buy planning
//!
//! ```
//! use alphaflex::{plan_buys, Holding, PriceQuote};
//!
//! let holdings = vec![Holding::new("AAPL", 60.0), Holding::new("MSFT", 40.0)];
//! let quotes = vec![PriceQuote::new("AAPL", 100.0), PriceQuote::new("MSFT", 50.0)];
//!
//! let plan = plan_buys(10_000.0, &holdings, &quotes);
//! assert_eq!(plan.allocations[0].intent.quantity, 60.0);
//! assert_eq!(plan.allocations[1].intent.quantity, 80.0);
//! assert_eq!(plan.total_allocated, 10_000.0);
//! ```
//!
//! ## Liquidation planning
//!
//! Sells always liquidate the full live position. Symbols with nothing held
//! are skipped, not failed:
//!
//! ```
//! use alphaflex::{plan_sells, HeldPosition, Holding};
//!
//! let holdings = vec![Holding::symbol_only("AAPL"), Holding::symbol_only("MSFT")];
//! let positions = vec![HeldPosition::new("AAPL", 2.5)];
//!
//! let plan = plan_sells(&holdings, &positions);
//! assert_eq!(plan.intents.len(), 1);
//! assert_eq!(plan.intents[0].quantity, 2.5);
//! assert_eq!(plan.skipped[0].symbol, "MSFT");
//! ```
//!
//! ## Market window
//!
//! ```
//! use alphaflex::MarketHours;
//! use chrono::{TimeZone, Utc};
//!
//! let hours = MarketHours::default(); // 09:00-14:30 America/Chicago, Mon-Fri
//! let monday_morning = Utc.with_ymd_and_hms(2024, 2, 26, 15, 0, 0).unwrap();
//! let saturday = Utc.with_ymd_and_hms(2024, 2, 24, 15, 0, 0).unwrap();
//! assert!(hours.is_open(monday_morning));
//! assert!(!hours.is_open(saturday));
//! ```

mod error;
mod holding;
mod market_hours;
pub mod plan;
pub mod policy;
pub mod report;
mod side;

pub use error::PlanError;
pub use holding::{validate_holdings, HeldPosition, Holding, PriceQuote};
pub use market_hours::MarketHours;
pub use plan::{
    check_buying_power, plan_buys, plan_sells, round_quantity, BuyAllocation, BuyPlan, SellPlan,
    TradeIntent,
};
pub use policy::{Backoff, PacingPolicy, RetryPolicy};
pub use report::{
    BuyOrder, BuyReport, FailedOrder, Ledger, SellOrder, SellReport, SkippedStock,
};
pub use side::Side;
