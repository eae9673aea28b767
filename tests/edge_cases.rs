//! Edge cases for planning and aggregation that cut across modules.

use alphaflex::{
    check_buying_power, plan_buys, plan_sells, validate_holdings, BuyReport, HeldPosition,
    Holding, Ledger, PlanError, PriceQuote, SellReport,
};
use chrono::Utc;

// ============================================================================
// Input validation
// ============================================================================

#[test]
fn empty_holdings_rejected() {
    assert_eq!(validate_holdings(&[], false), Err(PlanError::EmptyHoldings));
}

#[test]
fn blank_symbol_rejected() {
    let holdings = vec![Holding::new("  ", 50.0)];
    assert_eq!(validate_holdings(&holdings, true), Err(PlanError::EmptySymbol));
}

#[test]
fn duplicate_symbol_rejected() {
    let holdings = vec![Holding::new("AAPL", 50.0), Holding::new("AAPL", 50.0)];
    assert_eq!(
        validate_holdings(&holdings, true),
        Err(PlanError::DuplicateSymbol("AAPL".into()))
    );
}

#[test]
fn nan_weight_rejected() {
    let holdings = vec![Holding::new("AAPL", f64::NAN)];
    assert!(matches!(
        validate_holdings(&holdings, true),
        Err(PlanError::InvalidWeight { .. })
    ));
}

#[test]
fn nonpositive_totals_rejected() {
    assert_eq!(check_buying_power(1_000.0, 0.0), Err(PlanError::InvalidAmount(0.0)));
    assert_eq!(check_buying_power(1_000.0, -5.0), Err(PlanError::InvalidAmount(-5.0)));
    assert!(check_buying_power(1_000.0, f64::INFINITY).is_err());
}

#[test]
fn exact_buying_power_is_enough() {
    assert_eq!(check_buying_power(10_000.0, 10_000.0), Ok(()));
}

// ============================================================================
// Planning
// ============================================================================

#[test]
fn weights_over_100_percent_are_passed_through() {
    let holdings = vec![Holding::new("A", 80.0), Holding::new("B", 80.0)];
    let quotes = vec![PriceQuote::new("A", 10.0), PriceQuote::new("B", 10.0)];

    let plan = plan_buys(1_000.0, &holdings, &quotes);

    assert_eq!(plan.total_allocated, 1_600.0);
    assert_eq!(plan.allocations[0].intent.quantity, 80.0);
}

#[test]
fn holding_order_is_preserved() {
    let symbols = ["ZZZ", "AAA", "MMM"];
    let holdings: Vec<Holding> = symbols.iter().map(|s| Holding::new(s, 10.0)).collect();
    let quotes: Vec<PriceQuote> = symbols.iter().map(|s| PriceQuote::new(s, 1.0)).collect();

    let plan = plan_buys(100.0, &holdings, &quotes);
    let planned: Vec<&str> = plan
        .allocations
        .iter()
        .map(|a| a.intent.symbol.as_str())
        .collect();
    assert_eq!(planned, symbols);
}

#[test]
fn zero_price_quote_skips() {
    let plan = plan_buys(
        100.0,
        &[Holding::new("A", 100.0)],
        &[PriceQuote::new("A", 0.0)],
    );
    assert!(plan.allocations.is_empty());
    assert_eq!(plan.skipped.len(), 1);
}

#[test]
fn negative_position_is_not_sold() {
    let plan = plan_sells(
        &[Holding::symbol_only("A")],
        &[HeldPosition::new("A", -2.0)],
    );
    assert!(plan.intents.is_empty());
    assert_eq!(plan.skipped[0].reason, "No position found");
}

// ============================================================================
// Aggregation
// ============================================================================

#[test]
fn empty_ledger_is_neither_partial_nor_failed() {
    let buy = BuyReport::aggregate(Ledger::new(), 100.0, 0.0, Utc::now());
    assert!(!buy.partial_success);
    assert!(!buy.all_failed);

    let sell = SellReport::aggregate(Ledger::new(), Utc::now());
    assert_eq!(sell.stocks_sold, 0);
    assert_eq!(sell.total_estimated_value, 0.0);
    assert!(!sell.all_failed);
}
