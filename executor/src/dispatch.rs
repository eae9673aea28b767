//! Sequential order dispatcher with retry and pacing.
//!
//! Each intent is submitted with up to `max_attempts` tries and the policy's
//! backoff between failures. After a successful submission the dispatcher
//! owes a randomized pause, which it pays only when the next intent comes
//! along; the last order of a batch is never followed by a sleep.

use alphaflex::{PacingPolicy, RetryPolicy, TradeIntent};
use alphaflex_broker::{BrokerError, Brokerage, FractionalOrder, OrderAck};
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::clock::Clock;

pub struct Dispatcher<'a> {
    broker: &'a dyn Brokerage,
    clock: &'a dyn Clock,
    retry: RetryPolicy,
    pacing: PacingPolicy,
    rng: StdRng,
    pause_owed: bool,
}

impl<'a> Dispatcher<'a> {
    pub fn new(broker: &'a dyn Brokerage, clock: &'a dyn Clock) -> Self {
        Self {
            broker,
            clock,
            retry: RetryPolicy::default(),
            pacing: PacingPolicy::default(),
            rng: StdRng::from_entropy(),
            pause_owed: false,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_pacing_policy(mut self, pacing: PacingPolicy) -> Self {
        self.pacing = pacing;
        self
    }

    /// Fix the pacing RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Forget any pause owed from a previous batch.
    pub fn begin_batch(&mut self) {
        self.pause_owed = false;
    }

    /// Submit one intent, retrying any failure until the attempt budget is
    /// spent. The error from the final attempt is returned.
    pub fn submit(&mut self, intent: &TradeIntent) -> Result<OrderAck, BrokerError> {
        self.pay_pause();

        let order = FractionalOrder {
            symbol: intent.symbol.clone(),
            side: intent.side,
            quantity: intent.quantity,
        };

        let mut attempt = 1;
        loop {
            match self.broker.submit_order(&order) {
                Ok(ack) => {
                    self.pause_owed = true;
                    return Ok(ack);
                }
                Err(e) => match self.retry.delay_after(attempt) {
                    Some(delay) => {
                        warn!(
                            "{} {} attempt {attempt}/{} failed: {e}; retrying in {:.1}s",
                            order.side,
                            order.symbol,
                            self.retry.max_attempts,
                            delay.as_secs_f64()
                        );
                        self.clock.sleep(delay);
                        attempt += 1;
                    }
                    None => return Err(e),
                },
            }
        }
    }

    fn pay_pause(&mut self) {
        if !std::mem::take(&mut self.pause_owed) {
            return;
        }
        let delay = self.pacing.sample(&mut self.rng);
        if delay.is_zero() {
            return;
        }
        info!(
            "Waiting {:.2} seconds before placing next order...",
            delay.as_secs_f64()
        );
        self.clock.sleep(delay);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::clock::ManualClock;
    use alphaflex::Side;
    use alphaflex_broker::mock::MockBrokerage;
    use chrono::{TimeZone, Utc};

    fn clock() -> ManualClock {
        ManualClock::at(Utc.with_ymd_and_hms(2024, 2, 26, 16, 0, 0).unwrap())
    }

    fn buy(symbol: &str, quantity: f64) -> TradeIntent {
        TradeIntent {
            symbol: symbol.into(),
            side: Side::Buy,
            quantity,
        }
    }

    #[test]
    fn succeeds_on_third_attempt_with_linear_backoff() {
        let broker = MockBrokerage::builder().fail_submissions("AAPL", 2).build();
        let clock = clock();
        let mut dispatcher = Dispatcher::new(&broker, &clock).with_seed(7);

        let ack = dispatcher.submit(&buy("AAPL", 1.5)).unwrap();

        assert_eq!(ack.order_id, "mock-order-1");
        assert_eq!(broker.submitted_orders().len(), 3);
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[test]
    fn gives_up_after_three_attempts() {
        let broker = MockBrokerage::builder().reject_submissions("AAPL").build();
        let clock = clock();
        let mut dispatcher = Dispatcher::new(&broker, &clock);

        let err = dispatcher.submit(&buy("AAPL", 1.0)).unwrap_err();

        assert!(err.to_string().contains("attempt 3"));
        assert_eq!(broker.submitted_orders().len(), 3);
        assert_eq!(clock.total_slept(), Duration::from_secs(3));
    }

    /// Rejects the first `failures` submissions with an unknown-symbol
    /// error, then accepts.
    struct FlakyLookup {
        failures: u32,
        calls: AtomicU32,
    }

    impl Brokerage for FlakyLookup {
        fn account(&self) -> Result<alphaflex_broker::Account, BrokerError> {
            Err(BrokerError::NotAuthenticated)
        }
        fn latest_price(&self, _: &str) -> Result<f64, BrokerError> {
            Err(BrokerError::NotAuthenticated)
        }
        fn submit_order(&self, order: &FractionalOrder) -> Result<OrderAck, BrokerError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                return Err(BrokerError::InvalidSymbol(order.symbol.clone()));
            }
            Ok(OrderAck {
                order_id: format!("flaky-{call}"),
                state: "queued".into(),
            })
        }
        fn order(&self, _: &str) -> Result<Option<alphaflex_broker::OrderSnapshot>, BrokerError> {
            Ok(None)
        }
        fn positions(&self) -> Result<Vec<alphaflex_broker::Position>, BrokerError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn every_error_kind_is_retried() {
        let broker = FlakyLookup {
            failures: 2,
            calls: AtomicU32::new(0),
        };
        let clock = clock();
        let mut dispatcher = Dispatcher::new(&broker, &clock);

        let ack = dispatcher.submit(&buy("AAPL", 1.0)).unwrap();

        assert_eq!(ack.order_id, "flaky-3");
        assert_eq!(broker.calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            clock.sleeps(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[test]
    fn unknown_symbol_uses_the_full_budget() {
        let broker = FlakyLookup {
            failures: u32::MAX,
            calls: AtomicU32::new(0),
        };
        let clock = clock();
        let mut dispatcher = Dispatcher::new(&broker, &clock);

        assert!(matches!(
            dispatcher.submit(&buy("ZZZZ", 1.0)),
            Err(BrokerError::InvalidSymbol(_))
        ));
        assert_eq!(broker.calls.load(Ordering::SeqCst), 3);
        assert_eq!(clock.total_slept(), Duration::from_secs(3));
    }

    #[test]
    fn pacing_between_successes_but_not_after_last() {
        let broker = MockBrokerage::builder().build();
        let clock = clock();
        let mut dispatcher = Dispatcher::new(&broker, &clock).with_seed(42);

        for symbol in ["A", "B", "C"] {
            dispatcher.submit(&buy(symbol, 1.0)).unwrap();
        }

        let sleeps = clock.sleeps();
        assert_eq!(sleeps.len(), 2);
        for s in sleeps {
            assert!(s >= Duration::from_secs(5) && s <= Duration::from_secs(10));
        }
    }

    #[test]
    fn no_pause_after_a_failed_submission() {
        let broker = MockBrokerage::builder().reject_submissions("A").build();
        let clock = clock();
        let mut dispatcher = Dispatcher::new(&broker, &clock)
            .with_retry_policy(RetryPolicy::new(1, alphaflex::Backoff::None));

        assert!(dispatcher.submit(&buy("A", 1.0)).is_err());
        assert!(dispatcher.submit(&buy("B", 1.0)).is_ok());

        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn begin_batch_drops_owed_pause() {
        let broker = MockBrokerage::builder().build();
        let clock = clock();
        let mut dispatcher = Dispatcher::new(&broker, &clock);

        dispatcher.submit(&buy("A", 1.0)).unwrap();
        dispatcher.begin_batch();
        dispatcher.submit(&buy("B", 1.0)).unwrap();

        assert!(clock.sleeps().is_empty());
    }
}
