//! Batch orchestration: gate → prices → plan → dispatch → aggregate.
//!
//! This is the main workflow that ties together all components.

use alphaflex::{
    check_buying_power, plan_buys, plan_sells, validate_holdings, BuyOrder, BuyReport,
    FailedOrder, HeldPosition, Holding, Ledger, MarketHours, PacingPolicy, RetryPolicy,
    SellOrder, SellReport,
};
use alphaflex_broker::{Brokerage, Position, Session};
use log::{error, info, warn};

use crate::clock::Clock;
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::gate;
use crate::prices;

/// Runs buy and sell batches against one brokerage and session.
pub struct Executor<'a> {
    broker: &'a dyn Brokerage,
    session: &'a dyn Session,
    clock: &'a dyn Clock,
    hours: MarketHours,
    dispatcher: Dispatcher<'a>,
}

impl<'a> Executor<'a> {
    pub fn new(broker: &'a dyn Brokerage, session: &'a dyn Session, clock: &'a dyn Clock) -> Self {
        Self {
            broker,
            session,
            clock,
            hours: MarketHours::default(),
            dispatcher: Dispatcher::new(broker, clock),
        }
    }

    /// Apply market window, retry and pacing settings from config.
    pub fn configured(mut self, config: &Config) -> Result<Self> {
        self.hours = config.market_hours()?;
        Ok(self
            .with_retry_policy(config.retry_policy())
            .with_pacing_policy(config.pacing_policy()))
    }

    pub fn with_market_hours(mut self, hours: MarketHours) -> Self {
        self.hours = hours;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.dispatcher = self.dispatcher.with_retry_policy(retry);
        self
    }

    pub fn with_pacing_policy(mut self, pacing: PacingPolicy) -> Self {
        self.dispatcher = self.dispatcher.with_pacing_policy(pacing);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.dispatcher = self.dispatcher.with_seed(seed);
        self
    }

    /// Spend `total_amount` across `holdings` by weight.
    ///
    /// Fails as a whole only on bad input, a blocked gate, or insufficient
    /// buying power. Everything after that is recorded per symbol.
    pub fn place(&mut self, total_amount: f64, holdings: &[Holding]) -> Result<BuyReport> {
        validate_holdings(holdings, true)?;
        let account = gate::check_preconditions(self.session, self.broker, self.clock, &self.hours)?;
        check_buying_power(account.buying_power, total_amount)?;

        info!(
            "Placing ${total_amount:.2} across {} holdings for account {}",
            holdings.len(),
            account.account_number
        );

        let mut ledger = Ledger::new();

        let resolved = prices::resolve_prices(self.broker, holdings.iter().map(|h| h.symbol.as_str()));
        for failure in resolved.failures {
            ledger.record_failure(failure);
        }

        let plan = plan_buys(total_amount, holdings, &resolved.quotes);
        for skip in plan.skipped {
            warn!("Skipping {}: {}", skip.symbol, skip.reason);
            ledger.record_skip(skip);
        }

        self.dispatcher.begin_batch();
        for allocation in &plan.allocations {
            let intent = &allocation.intent;
            match self.dispatcher.submit(intent) {
                Ok(ack) => {
                    info!("Placed order for {} shares of {}", intent.quantity, intent.symbol);
                    ledger.record_order(BuyOrder {
                        symbol: intent.symbol.clone(),
                        shares: intent.quantity,
                        amount: allocation.amount,
                        price: allocation.price,
                        order_id: ack.order_id,
                        status: ack.state,
                    });
                }
                Err(e) => {
                    error!("Error placing order for {}: {e}", intent.symbol);
                    ledger.record_failure(
                        FailedOrder::new(&intent.symbol, e.to_string())
                            .with_allocation_amount(allocation.amount),
                    );
                }
            }
        }

        let report = BuyReport::aggregate(ledger, total_amount, plan.total_allocated, self.clock.now());
        info!(
            "Buy batch done: {} placed, {} failed, {} skipped",
            report.orders.len(),
            report.failed_orders.len(),
            report.skipped_stocks.len()
        );
        Ok(report)
    }

    /// Liquidate the full live position in each requested symbol.
    pub fn sell(&mut self, holdings: &[Holding]) -> Result<SellReport> {
        validate_holdings(holdings, false)?;
        gate::check_preconditions(self.session, self.broker, self.clock, &self.hours)?;

        let positions = to_held_positions(&self.broker.positions()?);
        let plan = plan_sells(holdings, &positions);

        let mut ledger = Ledger::new();
        for skip in plan.skipped {
            warn!("No position found for {}", skip.symbol);
            ledger.record_skip(skip);
        }

        self.dispatcher.begin_batch();
        for intent in &plan.intents {
            match self.dispatcher.submit(intent) {
                Ok(ack) => {
                    let price = match self.broker.latest_price(&intent.symbol) {
                        Ok(p) => Some(p),
                        Err(e) => {
                            warn!("Sold {} but could not price it afterwards: {e}", intent.symbol);
                            None
                        }
                    };
                    info!("Placed sell order for {} shares of {}", intent.quantity, intent.symbol);
                    ledger.record_order(SellOrder {
                        symbol: intent.symbol.clone(),
                        shares: intent.quantity,
                        estimated_value: price.map(|p| p * intent.quantity),
                        price_per_share: price,
                        order_id: ack.order_id,
                        status: ack.state,
                    });
                }
                Err(e) => {
                    error!("Error selling {}: {e}", intent.symbol);
                    ledger.record_failure(
                        FailedOrder::new(&intent.symbol, e.to_string()).with_quantity(intent.quantity),
                    );
                }
            }
        }

        let report = SellReport::aggregate(ledger, self.clock.now());
        info!(
            "Sell batch done: {} sold, {} failed, {} skipped, ~${:.2}",
            report.stocks_sold, report.stocks_failed, report.stocks_skipped, report.total_estimated_value
        );
        Ok(report)
    }
}

/// Convert broker positions to planner positions.
fn to_held_positions(positions: &[Position]) -> Vec<HeldPosition> {
    positions
        .iter()
        .map(|p| HeldPosition::new(&p.symbol, p.quantity))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_convert_one_to_one() {
        let held = to_held_positions(&[
            Position {
                symbol: "AAPL".into(),
                quantity: 1.25,
            },
            Position {
                symbol: "MSFT".into(),
                quantity: 0.0,
            },
        ]);
        assert_eq!(
            held,
            vec![HeldPosition::new("AAPL", 1.25), HeldPosition::new("MSFT", 0.0)]
        );
    }
}
