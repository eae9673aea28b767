//! Order status lookup.

use alphaflex_broker::{Brokerage, OrderSnapshot, Session};
use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;

use crate::clock::Clock;
use crate::error::Result;
use crate::gate;

/// What the brokerage reports about one order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderStatus {
    pub order_id: String,
    pub status: String,
    pub created_at: Option<String>,
    pub last_updated: Option<String>,
    pub side: Option<String>,
    pub quantity: Option<f64>,
    pub symbol: Option<String>,
    /// When the lookup was made.
    pub timestamp: DateTime<Utc>,
}

impl OrderStatus {
    fn from_snapshot(order_id: &str, snapshot: OrderSnapshot, timestamp: DateTime<Utc>) -> Self {
        let status = if snapshot.state.is_empty() {
            "unknown".to_string()
        } else {
            snapshot.state
        };
        Self {
            order_id: order_id.to_string(),
            status,
            created_at: snapshot.created_at,
            last_updated: snapshot.updated_at,
            side: snapshot.side,
            quantity: snapshot.quantity,
            symbol: snapshot.symbol,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    Found(OrderStatus),
    NotFound(String),
}

/// Look up `order_id` after checking the session. No market-hours check:
/// orders can be inspected at any time.
pub fn verify_order(
    session: &dyn Session,
    broker: &dyn Brokerage,
    clock: &dyn Clock,
    order_id: &str,
) -> Result<Verification> {
    gate::authenticated_account(session, broker)?;

    match broker.order(order_id)? {
        Some(snapshot) => {
            let status = OrderStatus::from_snapshot(order_id, snapshot, clock.now());
            info!("Order {order_id} is {}", status.status);
            Ok(Verification::Found(status))
        }
        None => {
            info!("Order {order_id} not found");
            Ok(Verification::NotFound(order_id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::clock::ManualClock;
    use alphaflex_broker::mock::{MockBrokerage, MockSession};
    use chrono::TimeZone;

    fn clock() -> ManualClock {
        ManualClock::at(Utc.with_ymd_and_hms(2024, 2, 26, 16, 0, 0).unwrap())
    }

    #[test]
    fn missing_state_reads_unknown() {
        let status = OrderStatus::from_snapshot("x", OrderSnapshot::default(), Utc::now());
        assert_eq!(status.status, "unknown");
        assert_eq!(status.order_id, "x");
    }

    #[test]
    fn blocked_without_session() {
        let broker = MockBrokerage::builder().build();
        let err = verify_order(&MockSession::expired(), &broker, &clock(), "abc").unwrap_err();
        assert!(matches!(err, Error::SessionInvalid));
    }

    #[test]
    fn unknown_order_is_not_found() {
        let broker = MockBrokerage::builder().build();
        let result = verify_order(&MockSession::valid(), &broker, &clock(), "nope").unwrap();
        assert_eq!(result, Verification::NotFound("nope".into()));
    }
}
