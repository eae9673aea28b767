//! Holdings JSON parsing and validation.
//!
//! The holdings argument is a JSON array of objects keyed by `"Stock"` and
//! `"Stock Allocation Weight (%)"`; `"symbol"` and `"weight"` are accepted as
//! shorter aliases.

use std::path::Path;

use alphaflex::{validate_holdings, Holding};

use crate::error::{Error, Result};

/// Parse a command-line holdings argument: inline JSON, or `@path` to read
/// the JSON from a file.
pub fn from_argument(arg: &str, require_weights: bool) -> Result<Vec<Holding>> {
    match arg.strip_prefix('@') {
        Some(path) => load(Path::new(path), require_weights),
        None => parse(arg, require_weights),
    }
}

/// Read a holdings document from a file instead of the command line.
pub fn load(path: &Path, require_weights: bool) -> Result<Vec<Holding>> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        Error::Holdings(format!("failed to read {}: {e}", path.display()))
    })?;
    parse(&contents, require_weights)
}

fn parse(json: &str, require_weights: bool) -> Result<Vec<Holding>> {
    let holdings: Vec<Holding> = serde_json::from_str(json)?;
    validate_holdings(&holdings, require_weights)
        .map_err(|e| Error::Holdings(e.to_string()))?;
    Ok(holdings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_buy_holdings(json: &str) -> Result<Vec<Holding>> {
        parse(json, true)
    }

    fn parse_sell_holdings(json: &str) -> Result<Vec<Holding>> {
        parse(json, false)
    }

    #[test]
    fn parse_full_keys() {
        let json = r#"[
            {"Stock": "AAPL", "Stock Allocation Weight (%)": 60},
            {"Stock": "MSFT", "Stock Allocation Weight (%)": "40.5"}
        ]"#;
        let holdings = parse_buy_holdings(json).unwrap();
        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].symbol, "AAPL");
        assert_eq!(holdings[0].weight_percent, Some(60.0));
        assert_eq!(holdings[1].weight_percent, Some(40.5));
    }

    #[test]
    fn parse_short_aliases() {
        let json = r#"[{"symbol": "AAPL", "weight": 100}]"#;
        let holdings = parse_buy_holdings(json).unwrap();
        assert_eq!(holdings[0].symbol, "AAPL");
        assert_eq!(holdings[0].weight_percent, Some(100.0));
    }

    #[test]
    fn sell_holdings_need_no_weight() {
        let holdings = parse_sell_holdings(r#"[{"Stock": "AAPL"}, {"Stock": "MSFT"}]"#).unwrap();
        assert_eq!(holdings.len(), 2);
        assert!(holdings.iter().all(|h| h.weight_percent.is_none()));
    }

    #[test]
    fn buy_holdings_require_weight() {
        let err = parse_buy_holdings(r#"[{"Stock": "AAPL"}]"#).unwrap_err();
        assert!(matches!(err, Error::Holdings(_)));
        assert!(err.to_string().contains("AAPL"));
    }

    #[test]
    fn reject_malformed_json() {
        assert!(matches!(
            parse_buy_holdings("[{\"Stock\": "),
            Err(Error::HoldingsParse(_))
        ));
        assert!(matches!(
            parse_buy_holdings(r#"{"Stock": "AAPL"}"#),
            Err(Error::HoldingsParse(_))
        ));
    }

    #[test]
    fn reject_empty_and_duplicates() {
        assert!(parse_sell_holdings("[]").is_err());
        let dup = r#"[{"Stock": "AAPL"}, {"Stock": "AAPL"}]"#;
        assert!(matches!(parse_sell_holdings(dup), Err(Error::Holdings(_))));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holdings.json");
        std::fs::write(&path, r#"[{"Stock": "VTI", "Stock Allocation Weight (%)": 100}]"#)
            .unwrap();

        let holdings = load(&path, true).unwrap();
        assert_eq!(holdings[0].symbol, "VTI");

        let arg = format!("@{}", path.display());
        assert_eq!(from_argument(&arg, true).unwrap(), holdings);
        assert!(load(&dir.path().join("missing.json"), true).is_err());
    }
}
