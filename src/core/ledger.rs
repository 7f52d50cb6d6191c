//! Transaction ledger types and the holdings fold.

use crate::core::error::PortfolioError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Buy,
    Sell,
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TransactionKind::Buy => "BUY",
                TransactionKind::Sell => "SELL",
            }
        )
    }
}

/// An immutable record of one buy or sell event.
///
/// `quantity` keeps the wire sign convention: positive for a buy, negative
/// for a sell. `timestamp` is the record-creation instant in epoch
/// milliseconds, for audit ordering only; replay order is driven by `date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub symbol: String,
    pub quantity: i64,
    pub price: f64,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub notes: String,
    pub timestamp: i64,
}

impl Transaction {
    /// Unsigned share count of this transaction.
    pub fn shares(&self) -> i64 {
        self.quantity.abs()
    }
}

/// Raw user input for a transaction, before validation.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub symbol: String,
    pub quantity: i64,
    pub price: f64,
    pub date: String,
    pub kind: TransactionKind,
    pub notes: Option<String>,
}

impl NewTransaction {
    /// Validates the input and builds the signed transaction record.
    pub fn build(
        self,
        exchange_suffix: &str,
        timestamp: i64,
    ) -> Result<Transaction, PortfolioError> {
        let symbol = self.symbol.trim();
        if symbol.is_empty() {
            return Err(PortfolioError::Validation {
                reason: "symbol is required".to_string(),
            });
        }
        if self.quantity <= 0 {
            return Err(PortfolioError::Validation {
                reason: "quantity must be a positive share count".to_string(),
            });
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(PortfolioError::Validation {
                reason: "price must be a positive number".to_string(),
            });
        }
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").map_err(|e| {
            PortfolioError::Validation {
                reason: format!("date must be an ISO date (YYYY-MM-DD): {e}"),
            }
        })?;

        let quantity = match self.kind {
            TransactionKind::Buy => self.quantity,
            TransactionKind::Sell => -self.quantity,
        };

        Ok(Transaction {
            symbol: normalize_symbol(symbol, exchange_suffix),
            quantity,
            price: self.price,
            date,
            kind: self.kind,
            notes: self.notes.unwrap_or_default(),
            timestamp,
        })
    }
}

/// Current net position in one symbol, derived from transactions.
/// Never authored directly; `quantity` is always positive while present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub quantity: i64,
    #[serde(rename = "avgPrice")]
    pub avg_price: f64,
}

/// The persisted root document. `goals` and `notes` are opaque to the core
/// and round-trip untouched through every load/save cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerDocument {
    pub transactions: Vec<Transaction>,
    pub holdings: HashMap<String, Holding>,
    pub goals: Vec<serde_json::Value>,
    pub notes: serde_json::Map<String, serde_json::Value>,
}

/// Normalizes a raw ticker for the configured exchange. Any existing suffix
/// is stripped before appending, so "reliance", "RELIANCE" and "RELIANCE.NS"
/// all map to "RELIANCE.NS".
pub fn normalize_symbol(symbol: &str, suffix: &str) -> String {
    let trimmed = symbol.trim().to_uppercase();
    let base = trimmed.strip_suffix(suffix).unwrap_or(&trimmed);
    format!("{base}{suffix}")
}

/// Applies a single transaction to the holdings map. This is the one fold
/// step shared by the append path and the full replay path.
///
/// A buy against an existing holding moves its average price to the
/// volume-weighted mean; a sell leaves the average untouched. A position
/// driven to exactly zero is removed rather than retained.
pub fn apply_transaction(
    holdings: &mut HashMap<String, Holding>,
    tx: &Transaction,
) -> Result<(), PortfolioError> {
    let shares = tx.shares();
    match holdings.get_mut(&tx.symbol) {
        Some(holding) => {
            let new_quantity = holding.quantity + tx.quantity;
            if new_quantity < 0 {
                return Err(PortfolioError::InsufficientHoldings {
                    symbol: tx.symbol.clone(),
                    requested: shares,
                    held: holding.quantity,
                });
            }
            if new_quantity == 0 {
                holdings.remove(&tx.symbol);
                return Ok(());
            }
            if tx.kind == TransactionKind::Buy {
                holding.avg_price = (holding.avg_price * holding.quantity as f64
                    + tx.price * shares as f64)
                    / new_quantity as f64;
            }
            holding.quantity = new_quantity;
            Ok(())
        }
        None => {
            if tx.kind == TransactionKind::Sell {
                return Err(PortfolioError::UnknownHolding {
                    symbol: tx.symbol.clone(),
                });
            }
            holdings.insert(
                tx.symbol.clone(),
                Holding {
                    quantity: shares,
                    avg_price: tx.price,
                },
            );
            Ok(())
        }
    }
}

/// Recomputes holdings by replaying transactions in ascending date order.
/// The sort is stable, so insertion order is preserved within a date.
pub fn rebuild_holdings(
    transactions: &[Transaction],
) -> Result<HashMap<String, Holding>, PortfolioError> {
    let mut ordered: Vec<&Transaction> = transactions.iter().collect();
    ordered.sort_by_key(|tx| tx.date);

    let mut holdings = HashMap::new();
    for tx in ordered {
        apply_transaction(&mut holdings, tx)?;
    }
    Ok(holdings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_tx(symbol: &str, kind: TransactionKind, shares: i64, price: f64, date: &str) -> Transaction {
        let quantity = match kind {
            TransactionKind::Buy => shares,
            TransactionKind::Sell => -shares,
        };
        Transaction {
            symbol: symbol.to_string(),
            quantity,
            price,
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            kind,
            notes: String::new(),
            timestamp: 0,
        }
    }

    #[test]
    fn buy_then_buy_volume_weights_average() {
        let mut holdings = HashMap::new();
        apply_transaction(
            &mut holdings,
            &make_tx("TCS.NS", TransactionKind::Buy, 10, 100.0, "2024-01-01"),
        )
        .unwrap();
        apply_transaction(
            &mut holdings,
            &make_tx("TCS.NS", TransactionKind::Buy, 10, 200.0, "2024-01-02"),
        )
        .unwrap();

        let holding = &holdings["TCS.NS"];
        assert_eq!(holding.quantity, 20);
        assert_eq!(holding.avg_price, 150.0);
    }

    #[test]
    fn sell_leaves_average_unchanged() {
        let mut holdings = HashMap::new();
        apply_transaction(
            &mut holdings,
            &make_tx("TCS.NS", TransactionKind::Buy, 10, 100.0, "2024-01-01"),
        )
        .unwrap();
        apply_transaction(
            &mut holdings,
            &make_tx("TCS.NS", TransactionKind::Buy, 10, 200.0, "2024-01-02"),
        )
        .unwrap();
        apply_transaction(
            &mut holdings,
            &make_tx("TCS.NS", TransactionKind::Sell, 5, 300.0, "2024-01-03"),
        )
        .unwrap();

        let holding = &holdings["TCS.NS"];
        assert_eq!(holding.quantity, 15);
        assert_eq!(holding.avg_price, 150.0);
    }

    #[test]
    fn sell_to_zero_removes_holding() {
        let mut holdings = HashMap::new();
        apply_transaction(
            &mut holdings,
            &make_tx("INFY.NS", TransactionKind::Buy, 8, 50.0, "2024-01-01"),
        )
        .unwrap();
        apply_transaction(
            &mut holdings,
            &make_tx("INFY.NS", TransactionKind::Sell, 8, 60.0, "2024-01-02"),
        )
        .unwrap();

        assert!(holdings.is_empty());
    }

    #[test]
    fn oversell_is_rejected() {
        let mut holdings = HashMap::new();
        apply_transaction(
            &mut holdings,
            &make_tx("TCS.NS", TransactionKind::Buy, 10, 100.0, "2024-01-01"),
        )
        .unwrap();

        let err = apply_transaction(
            &mut holdings,
            &make_tx("TCS.NS", TransactionKind::Sell, 15, 100.0, "2024-01-02"),
        )
        .unwrap_err();

        match err {
            PortfolioError::InsufficientHoldings {
                symbol,
                requested,
                held,
            } => {
                assert_eq!(symbol, "TCS.NS");
                assert_eq!(requested, 15);
                assert_eq!(held, 10);
            }
            other => panic!("expected InsufficientHoldings, got {other:?}"),
        }
        assert_eq!(holdings["TCS.NS"].quantity, 10);
    }

    #[test]
    fn sell_without_holding_is_rejected() {
        let mut holdings = HashMap::new();
        let err = apply_transaction(
            &mut holdings,
            &make_tx("TCS.NS", TransactionKind::Sell, 5, 100.0, "2024-01-01"),
        )
        .unwrap_err();

        assert!(matches!(err, PortfolioError::UnknownHolding { .. }));
        assert!(holdings.is_empty());
    }

    #[test]
    fn rebuild_matches_incremental_application() {
        let txs = vec![
            make_tx("TCS.NS", TransactionKind::Buy, 10, 100.0, "2024-01-01"),
            make_tx("INFY.NS", TransactionKind::Buy, 4, 250.0, "2024-01-02"),
            make_tx("TCS.NS", TransactionKind::Buy, 10, 200.0, "2024-01-03"),
            make_tx("TCS.NS", TransactionKind::Sell, 5, 300.0, "2024-01-04"),
        ];

        let mut incremental = HashMap::new();
        for tx in &txs {
            apply_transaction(&mut incremental, tx).unwrap();
        }
        let replayed = rebuild_holdings(&txs).unwrap();

        assert_eq!(incremental, replayed);
    }

    #[test]
    fn rebuild_orders_by_date() {
        // Stored out of order: the sell predates the buy in the vec but not
        // on the calendar, so a date-ordered replay must succeed.
        let txs = vec![
            make_tx("TCS.NS", TransactionKind::Sell, 5, 120.0, "2024-03-01"),
            make_tx("TCS.NS", TransactionKind::Buy, 10, 100.0, "2024-01-01"),
        ];

        let holdings = rebuild_holdings(&txs).unwrap();
        assert_eq!(holdings["TCS.NS"].quantity, 5);
        assert_eq!(holdings["TCS.NS"].avg_price, 100.0);
    }

    #[test]
    fn rebuild_rejects_uncovered_sell() {
        let txs = vec![make_tx("TCS.NS", TransactionKind::Sell, 5, 120.0, "2024-01-01")];
        assert!(matches!(
            rebuild_holdings(&txs),
            Err(PortfolioError::UnknownHolding { .. })
        ));
    }

    #[test]
    fn build_applies_sign_convention_and_defaults() {
        let tx = NewTransaction {
            symbol: "tcs".to_string(),
            quantity: 5,
            price: 100.0,
            date: "2024-01-15".to_string(),
            kind: TransactionKind::Sell,
            notes: None,
        }
        .build(".NS", 1_700_000_000_000)
        .unwrap();

        assert_eq!(tx.symbol, "TCS.NS");
        assert_eq!(tx.quantity, -5);
        assert_eq!(tx.shares(), 5);
        assert_eq!(tx.notes, "");
        assert_eq!(tx.timestamp, 1_700_000_000_000);
    }

    #[test]
    fn build_rejects_missing_or_invalid_fields() {
        let base = NewTransaction {
            symbol: "TCS".to_string(),
            quantity: 5,
            price: 100.0,
            date: "2024-01-15".to_string(),
            kind: TransactionKind::Buy,
            notes: None,
        };

        let blank_symbol = NewTransaction {
            symbol: "  ".to_string(),
            ..base.clone()
        };
        assert!(matches!(
            blank_symbol.build(".NS", 0),
            Err(PortfolioError::Validation { .. })
        ));

        let zero_quantity = NewTransaction {
            quantity: 0,
            ..base.clone()
        };
        assert!(matches!(
            zero_quantity.build(".NS", 0),
            Err(PortfolioError::Validation { .. })
        ));

        let negative_price = NewTransaction {
            price: -1.0,
            ..base.clone()
        };
        assert!(matches!(
            negative_price.build(".NS", 0),
            Err(PortfolioError::Validation { .. })
        ));

        let bad_date = NewTransaction {
            date: "15/01/2024".to_string(),
            ..base
        };
        assert!(matches!(
            bad_date.build(".NS", 0),
            Err(PortfolioError::Validation { .. })
        ));
    }

    #[test]
    fn normalize_symbol_strips_then_appends_suffix() {
        assert_eq!(normalize_symbol("reliance", ".NS"), "RELIANCE.NS");
        assert_eq!(normalize_symbol("RELIANCE.NS", ".NS"), "RELIANCE.NS");
        assert_eq!(normalize_symbol("  tcs ", ".NS"), "TCS.NS");
    }

    #[test]
    fn wire_format_uses_type_and_avg_price_keys() {
        let tx = make_tx("TCS.NS", TransactionKind::Buy, 10, 100.0, "2024-01-15");
        let json = serde_json::to_string(&tx).unwrap();
        assert!(json.contains(r#""type":"BUY""#));
        assert!(json.contains(r#""date":"2024-01-15""#));

        let holding = Holding {
            quantity: 10,
            avg_price: 100.0,
        };
        let json = serde_json::to_string(&holding).unwrap();
        assert!(json.contains(r#""avgPrice":100.0"#));
    }

    #[test]
    fn document_tolerates_missing_keys() {
        let doc: LedgerDocument = serde_json::from_str(r#"{"transactions": []}"#).unwrap();
        assert!(doc.transactions.is_empty());
        assert!(doc.holdings.is_empty());
        assert!(doc.goals.is_empty());
        assert!(doc.notes.is_empty());
    }
}
