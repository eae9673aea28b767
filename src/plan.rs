//! Allocation planner: weights and live positions to trade intents.
//!
//! Buys split a total dollar amount across holdings by weight and convert each
//! slice into a fractional share count at the batch quote. Sells liquidate the
//! full live position of every requested symbol.

use rustc_hash::FxHashMap;

use crate::error::PlanError;
use crate::holding::{HeldPosition, Holding, PriceQuote};
use crate::report::SkippedStock;
use crate::side::Side;

/// Fractional-share precision accepted by the brokerage.
pub const QUANTITY_DECIMALS: i32 = 6;

/// Skip reason for a requested sell with no live position.
pub const NO_POSITION_REASON: &str = "No position found";

/// Skip reason for a buy whose allocation rounds to nothing.
pub const ZERO_QUANTITY_REASON: &str = "Allocation rounds to zero shares";

/// A single order to submit. Immutable once planned.
#[derive(Clone, Debug, PartialEq)]
pub struct TradeIntent {
    pub symbol: String,
    pub side: Side,
    pub quantity: f64,
}

/// A buy intent together with the dollar slice and quote it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct BuyAllocation {
    pub intent: TradeIntent,
    pub amount: f64,
    pub price: f64,
}

/// Output of buy planning.
#[derive(Clone, Debug, Default)]
pub struct BuyPlan {
    pub allocations: Vec<BuyAllocation>,
    pub skipped: Vec<SkippedStock>,
    /// Sum of the dollar slices of every priced holding, whether or not it
    /// produced an intent. Not reconciled against the requested total.
    pub total_allocated: f64,
}

/// Output of sell planning.
#[derive(Clone, Debug, Default)]
pub struct SellPlan {
    pub intents: Vec<TradeIntent>,
    pub skipped: Vec<SkippedStock>,
}

/// Round a share quantity to the brokerage's fractional precision.
pub fn round_quantity(quantity: f64) -> f64 {
    let scale = 10f64.powi(QUANTITY_DECIMALS);
    (quantity * scale).round() / scale
}

/// Fail fast when the account cannot cover the requested total.
///
/// Also rejects a total that is not a positive finite amount.
pub fn check_buying_power(buying_power: f64, total_amount: f64) -> Result<(), PlanError> {
    if !total_amount.is_finite() || total_amount <= 0.0 {
        return Err(PlanError::InvalidAmount(total_amount));
    }
    if buying_power < total_amount {
        return Err(PlanError::InsufficientBuyingPower {
            available: buying_power,
            required: total_amount,
        });
    }
    Ok(())
}

/// Plan buy intents for `total_amount` dollars split by holding weight.
///
/// Holdings without a quote are left out entirely: the price resolver has
/// already recorded them as failures. A priced holding whose quantity rounds
/// to zero or below is skipped rather than failed.
pub fn plan_buys(total_amount: f64, holdings: &[Holding], quotes: &[PriceQuote]) -> BuyPlan {
    let price_map: FxHashMap<&str, f64> = quotes
        .iter()
        .map(|q| (q.symbol.as_str(), q.price))
        .collect();

    let mut plan = BuyPlan::default();

    for holding in holdings {
        let price = match price_map.get(holding.symbol.as_str()) {
            Some(&p) => p,
            None => continue,
        };

        let weight = holding.weight_percent.unwrap_or(0.0);
        let amount = (weight / 100.0) * total_amount;
        plan.total_allocated += amount;

        let quantity = if price > 0.0 {
            round_quantity(amount / price)
        } else {
            0.0
        };

        if quantity > 0.0 {
            plan.allocations.push(BuyAllocation {
                intent: TradeIntent {
                    symbol: holding.symbol.clone(),
                    side: Side::Buy,
                    quantity,
                },
                amount,
                price,
            });
        } else {
            plan.skipped.push(SkippedStock::new(&holding.symbol, ZERO_QUANTITY_REASON));
        }
    }

    plan
}

/// Plan full-liquidation sell intents for the requested symbols.
///
/// Only positive live positions count. Requested symbols with no such
/// position are skipped.
pub fn plan_sells(holdings: &[Holding], positions: &[HeldPosition]) -> SellPlan {
    let requested: FxHashMap<&str, ()> = holdings
        .iter()
        .map(|h| (h.symbol.as_str(), ()))
        .collect();
    let position_map: FxHashMap<&str, f64> = positions
        .iter()
        .filter(|p| p.quantity > 0.0 && requested.contains_key(p.symbol.as_str()))
        .map(|p| (p.symbol.as_str(), p.quantity))
        .collect();

    let mut plan = SellPlan::default();

    for holding in holdings {
        match position_map.get(holding.symbol.as_str()) {
            Some(&quantity) => plan.intents.push(TradeIntent {
                symbol: holding.symbol.clone(),
                side: Side::Sell,
                quantity,
            }),
            None => plan
                .skipped
                .push(SkippedStock::new(&holding.symbol, NO_POSITION_REASON)),
        }
    }

    plan
}
