//! Portfolio valuation over prefetched quote results.

use crate::core::ledger::Holding;
use crate::core::quote::Quote;
use anyhow::Result;
use std::collections::HashMap;
use tracing::debug;

/// Fixed placeholder risk figures; real computation is out of scope.
pub const PORTFOLIO_BETA: f64 = 1.0;
pub const PORTFOLIO_SHARPE_RATIO: f64 = 1.5;

/// Valuation of a single holding. Quote-derived fields are `None` when the
/// symbol's quote failed; `invested` is always computable from the ledger.
#[derive(Debug, Clone)]
pub struct HoldingValue {
    pub symbol: String,
    pub name: Option<String>,
    pub quantity: i64,
    pub avg_price: f64,
    pub invested: f64,
    pub current_price: Option<f64>,
    pub current_value: Option<f64>,
    pub pnl: Option<f64>,
    pub pnl_percent: Option<f64>,
    pub change_percent: Option<f64>,
    pub error: Option<String>,
}

/// Portfolio-level valuation summary. Aggregates cover fully-resolved
/// holdings only; symbols whose quotes failed are listed separately.
#[derive(Debug)]
pub struct PortfolioOverview {
    pub holdings: Vec<HoldingValue>,
    pub total_value: f64,
    pub total_invested: f64,
    pub total_pnl: f64,
    pub total_pnl_percent: Option<f64>,
    pub beta: f64,
    pub sharpe_ratio: f64,
    pub failed_symbols: Vec<String>,
}

/// Values each holding against the prefetched quotes. A failed quote leaves
/// that row's market fields unset and keeps it out of the aggregates; it
/// never fails the whole overview.
pub fn overview(
    holdings: &HashMap<String, Holding>,
    quotes: &HashMap<String, Result<Quote>>,
) -> PortfolioOverview {
    let mut rows = Vec::with_capacity(holdings.len());
    let mut total_value = 0.0;
    let mut total_invested = 0.0;
    let mut failed_symbols = Vec::new();

    let mut symbols: Vec<&String> = holdings.keys().collect();
    symbols.sort();

    for symbol in symbols {
        let holding = &holdings[symbol];
        let invested = holding.avg_price * holding.quantity as f64;
        let mut row = HoldingValue {
            symbol: symbol.clone(),
            name: None,
            quantity: holding.quantity,
            avg_price: holding.avg_price,
            invested,
            current_price: None,
            current_value: None,
            pnl: None,
            pnl_percent: None,
            change_percent: None,
            error: None,
        };

        match quotes.get(symbol) {
            Some(Ok(quote)) => {
                let current_value = quote.price * holding.quantity as f64;
                let pnl = current_value - invested;
                row.name = quote.short_name.clone();
                row.current_price = Some(quote.price);
                row.current_value = Some(current_value);
                row.pnl = Some(pnl);
                row.pnl_percent = (invested != 0.0).then(|| pnl / invested * 100.0);
                row.change_percent = Some(quote.change_percent);

                total_value += current_value;
                total_invested += invested;
            }
            Some(Err(e)) => {
                row.error = Some(e.to_string());
                failed_symbols.push(symbol.clone());
                debug!("Quote error for {}: {}", symbol, e);
            }
            None => {
                row.error = Some(format!("Quote not available for {symbol}"));
                failed_symbols.push(symbol.clone());
                debug!("Quote for {} missing from pre-fetched results map", symbol);
            }
        }

        rows.push(row);
    }

    let total_pnl = total_value - total_invested;
    let total_pnl_percent = (total_invested != 0.0).then(|| total_pnl / total_invested * 100.0);

    PortfolioOverview {
        holdings: rows,
        total_value,
        total_invested,
        total_pnl,
        total_pnl_percent,
        beta: PORTFOLIO_BETA,
        sharpe_ratio: PORTFOLIO_SHARPE_RATIO,
        failed_symbols,
    }
}
