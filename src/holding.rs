//! Batch inputs: requested holdings, live positions, and price quotes.

use rustc_hash::FxHashSet;

use crate::error::PlanError;

/// A requested holding: symbol plus its allocation weight in percent.
///
/// The JSON field names follow the strategy engine's output
/// (`"Stock"`, `"Stock Allocation Weight (%)"`). Weights may arrive as numbers
/// or numeric strings. Sell batches only need the symbol.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Holding {
    #[cfg_attr(feature = "serde", serde(rename = "Stock", alias = "symbol"))]
    pub symbol: String,
    #[cfg_attr(
        feature = "serde",
        serde(
            rename = "Stock Allocation Weight (%)",
            alias = "weight",
            default,
            deserialize_with = "weight_serde::deserialize",
            skip_serializing_if = "Option::is_none"
        )
    )]
    pub weight_percent: Option<f64>,
}

impl Holding {
    pub fn new(symbol: &str, weight_percent: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            weight_percent: Some(weight_percent),
        }
    }

    /// A holding with no weight, as used for liquidation requests.
    pub fn symbol_only(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            weight_percent: None,
        }
    }
}

/// A live position held at the brokerage.
#[derive(Clone, Debug, PartialEq)]
pub struct HeldPosition {
    pub symbol: String,
    pub quantity: f64,
}

impl HeldPosition {
    pub fn new(symbol: &str, quantity: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            quantity,
        }
    }
}

/// A price resolved once per batch.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceQuote {
    pub symbol: String,
    pub price: f64,
}

impl PriceQuote {
    pub fn new(symbol: &str, price: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            price,
        }
    }
}

/// Validate a batch of holdings.
///
/// Symbols must be non-empty and unique so that each one lands in exactly one
/// report bucket. With `require_weights`, every holding needs a finite weight;
/// negative or zero weights are allowed and simply plan to nothing.
pub fn validate_holdings(holdings: &[Holding], require_weights: bool) -> Result<(), PlanError> {
    if holdings.is_empty() {
        return Err(PlanError::EmptyHoldings);
    }

    let mut seen = FxHashSet::default();
    for h in holdings {
        if h.symbol.trim().is_empty() {
            return Err(PlanError::EmptySymbol);
        }
        if !seen.insert(h.symbol.as_str()) {
            return Err(PlanError::DuplicateSymbol(h.symbol.clone()));
        }
        if require_weights {
            match h.weight_percent {
                None => return Err(PlanError::MissingWeight(h.symbol.clone())),
                Some(w) if !w.is_finite() => {
                    return Err(PlanError::InvalidWeight {
                        symbol: h.symbol.clone(),
                        weight: w,
                    });
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}

#[cfg(feature = "serde")]
mod weight_serde {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<NumberOrString>::deserialize(deserializer)? {
            None => Ok(None),
            Some(NumberOrString::Number(n)) => Ok(Some(n)),
            Some(NumberOrString::Text(s)) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("invalid weight '{s}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_weighted_batch() {
        let holdings = vec![Holding::new("AAPL", 60.0), Holding::new("MSFT", 40.0)];
        assert!(validate_holdings(&holdings, true).is_ok());
    }

    #[test]
    fn reject_empty_batch() {
        assert_eq!(
            validate_holdings(&[], false),
            Err(PlanError::EmptyHoldings)
        );
    }

    #[test]
    fn reject_duplicate_symbols() {
        let holdings = vec![Holding::new("AAPL", 50.0), Holding::new("AAPL", 30.0)];
        assert_eq!(
            validate_holdings(&holdings, true),
            Err(PlanError::DuplicateSymbol("AAPL".into()))
        );
    }

    #[test]
    fn reject_blank_symbol() {
        let holdings = vec![Holding::new("  ", 50.0)];
        assert_eq!(validate_holdings(&holdings, true), Err(PlanError::EmptySymbol));
    }

    #[test]
    fn weights_required_only_for_buys() {
        let holdings = vec![Holding::symbol_only("AAPL")];
        assert!(validate_holdings(&holdings, false).is_ok());
        assert_eq!(
            validate_holdings(&holdings, true),
            Err(PlanError::MissingWeight("AAPL".into()))
        );
    }

    #[test]
    fn reject_nan_weight() {
        let holdings = vec![Holding::new("AAPL", f64::NAN)];
        assert!(matches!(
            validate_holdings(&holdings, true),
            Err(PlanError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn negative_weight_is_not_a_validation_error() {
        let holdings = vec![Holding::new("AAPL", -5.0)];
        assert!(validate_holdings(&holdings, true).is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn parse_strategy_engine_json() {
        let json = r#"[
            { "Stock": "AAPL", "Stock Allocation Weight (%)": 60 },
            { "Stock": "MSFT", "Stock Allocation Weight (%)": "40.5" },
            { "symbol": "SPY", "weight": 1.5 },
            { "Stock": "QQQ" }
        ]"#;
        let holdings: Vec<Holding> = serde_json::from_str(json).unwrap();
        assert_eq!(holdings[0], Holding::new("AAPL", 60.0));
        assert_eq!(holdings[1], Holding::new("MSFT", 40.5));
        assert_eq!(holdings[2], Holding::new("SPY", 1.5));
        assert_eq!(holdings[3], Holding::symbol_only("QQQ"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn reject_non_numeric_weight_string() {
        let json = r#"[{ "Stock": "AAPL", "Stock Allocation Weight (%)": "lots" }]"#;
        assert!(serde_json::from_str::<Vec<Holding>>(json).is_err());
    }
}
