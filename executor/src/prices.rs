//! Per-symbol price resolution.

use alphaflex::{FailedOrder, PriceQuote};
use alphaflex_broker::Brokerage;
use log::{debug, error};

/// Quotes that resolved, and one failure per symbol that did not.
#[derive(Debug, Default)]
pub struct PriceResolution {
    pub quotes: Vec<PriceQuote>,
    pub failures: Vec<FailedOrder>,
}

/// Fetch one price per symbol. Failures are recorded, never retried, and do
/// not stop the remaining lookups.
pub fn resolve_prices<'s, I>(broker: &dyn Brokerage, symbols: I) -> PriceResolution
where
    I: IntoIterator<Item = &'s str>,
{
    let mut resolution = PriceResolution::default();
    for symbol in symbols {
        match broker.latest_price(symbol) {
            Ok(price) => {
                debug!("{symbol} @ ${price:.2}");
                resolution.quotes.push(PriceQuote::new(symbol, price));
            }
            Err(e) => {
                error!("Error getting price for {symbol}: {e}");
                resolution.failures.push(FailedOrder::new(
                    symbol,
                    format!("Failed to get current price: {e}"),
                ));
            }
        }
    }
    resolution
}
