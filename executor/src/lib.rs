//! alphaflex-executor: weighted portfolio orders against a live brokerage.
//!
//! Gates each batch on market hours and a valid session, resolves prices,
//! plans fractional-share quantities, submits orders sequentially with retry
//! and pacing, and folds the outcomes into a single JSON-ready report.

pub mod auth;
pub mod broker;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod execution;
pub mod gate;
pub mod holdings;
pub mod output;
pub mod prices;
pub mod verify;
