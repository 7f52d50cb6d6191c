//! Portfolio allocation breakdowns by symbol and by sector.

use crate::core::ledger::Holding;
use crate::core::quote::Quote;
use anyhow::Result;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationEntry {
    pub label: String,
    pub value: f64,
    pub percentage: f64,
}

#[derive(Debug)]
pub struct AssetAllocation {
    /// Entries sorted by value, largest first.
    pub entries: Vec<AllocationEntry>,
    pub total_value: f64,
    pub warning: Option<String>,
}

/// Allocation per symbol. Symbols without a usable price stay in the
/// breakdown at zero value and are named in the warning.
pub fn allocation_by_symbol(
    holdings: &HashMap<String, Holding>,
    prices: &HashMap<String, f64>,
) -> AssetAllocation {
    let mut unpriced = Vec::new();
    let entries = holdings
        .iter()
        .map(|(symbol, holding)| {
            let value = match prices.get(symbol) {
                Some(price) => price * holding.quantity as f64,
                None => {
                    unpriced.push(symbol.clone());
                    0.0
                }
            };
            AllocationEntry {
                label: symbol.clone(),
                value,
                percentage: 0.0,
            }
        })
        .collect();

    finish(entries, unpriced)
}

/// Allocation per sector as reported by the quote source. Quotes without a
/// sector, and symbols whose quote failed, land in an "Unknown" bucket.
pub fn allocation_by_sector(
    holdings: &HashMap<String, Holding>,
    quotes: &HashMap<String, Result<Quote>>,
) -> AssetAllocation {
    let mut buckets: BTreeMap<String, f64> = BTreeMap::new();
    let mut unpriced = Vec::new();

    for (symbol, holding) in holdings {
        match quotes.get(symbol) {
            Some(Ok(quote)) => {
                let sector = quote.sector.clone().unwrap_or_else(|| "Unknown".to_string());
                *buckets.entry(sector).or_insert(0.0) += quote.price * holding.quantity as f64;
            }
            _ => {
                buckets.entry("Unknown".to_string()).or_insert(0.0);
                unpriced.push(symbol.clone());
            }
        }
    }

    let entries = buckets
        .into_iter()
        .map(|(label, value)| AllocationEntry {
            label,
            value,
            percentage: 0.0,
        })
        .collect();

    finish(entries, unpriced)
}

fn finish(mut entries: Vec<AllocationEntry>, mut unpriced: Vec<String>) -> AssetAllocation {
    let total_value: f64 = entries.iter().map(|e| e.value).sum();
    for entry in &mut entries {
        entry.percentage = if total_value > 0.0 {
            entry.value / total_value * 100.0
        } else {
            0.0
        };
    }
    entries.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.label.cmp(&b.label))
    });

    unpriced.sort();
    let warning = (!unpriced.is_empty())
        .then(|| format!("Price unavailable for: {}", unpriced.join(", ")));

    AssetAllocation {
        entries,
        total_value,
        warning,
    }
}
