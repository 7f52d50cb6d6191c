//! Daily portfolio value history reconstructed from the transaction log.

use crate::core::ledger::Transaction;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A symbol's contribution to one day's portfolio value.
#[derive(Debug, Clone, PartialEq)]
pub struct DayHolding {
    pub quantity: i64,
    pub price: f64,
    pub value: f64,
}

/// Portfolio value on one calendar day.
#[derive(Debug, Clone)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub holdings: BTreeMap<String, DayHolding>,
}

#[derive(Debug)]
pub struct PerformanceHistory {
    pub points: Vec<HistoryPoint>,
    /// Symbols that had open positions on some day but no usable price.
    pub missing_symbols: Vec<String>,
}

/// Replays the transaction log day by day from the earliest trade through
/// `today`. A day's price for a symbol is the first trade price recorded on
/// that day, falling back to the live quote; symbols with neither are left
/// out of that day's value and reported in `missing_symbols`.
pub fn performance_history(
    transactions: &[Transaction],
    current_prices: &HashMap<String, f64>,
    today: NaiveDate,
) -> PerformanceHistory {
    if transactions.is_empty() {
        return PerformanceHistory {
            points: Vec::new(),
            missing_symbols: Vec::new(),
        };
    }

    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by_key(|tx| tx.date);

    let mut counts: BTreeMap<String, i64> = BTreeMap::new();
    let mut points = Vec::new();
    let mut missing = BTreeSet::new();

    let mut next_tx = 0;
    let mut day = ordered[0].date;
    while day <= today {
        // Prices traded on the day override the live quote for that day.
        let mut day_prices: HashMap<&str, f64> = HashMap::new();
        while next_tx < ordered.len() && ordered[next_tx].date == day {
            let tx = ordered[next_tx];
            *counts.entry(tx.symbol.clone()).or_insert(0) += tx.quantity;
            day_prices.entry(tx.symbol.as_str()).or_insert(tx.price);
            next_tx += 1;
        }
        counts.retain(|_, count| *count > 0);

        let mut value = 0.0;
        let mut day_holdings = BTreeMap::new();
        for (symbol, &quantity) in &counts {
            let price = day_prices
                .get(symbol.as_str())
                .copied()
                .or_else(|| current_prices.get(symbol).copied());
            let Some(price) = price else {
                missing.insert(symbol.clone());
                continue;
            };
            let holding_value = price * quantity as f64;
            value += holding_value;
            day_holdings.insert(
                symbol.clone(),
                DayHolding {
                    quantity,
                    price,
                    value: holding_value,
                },
            );
        }

        points.push(HistoryPoint {
            date: day,
            value,
            holdings: day_holdings,
        });

        let Some(next) = day.succ_opt() else { break };
        day = next;
    }

    PerformanceHistory {
        points,
        missing_symbols: missing.into_iter().collect(),
    }
}
