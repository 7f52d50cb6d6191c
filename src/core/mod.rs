//! Core business logic abstractions

pub mod allocation;
pub mod cache;
pub mod config;
pub mod error;
pub mod indicators;
pub mod ledger;
pub mod log;
pub mod performance;
pub mod quote;
pub mod sentiment;
pub mod valuation;

// Re-export main types for cleaner imports
pub use error::PortfolioError;
pub use ledger::{Holding, LedgerDocument, NewTransaction, Transaction, TransactionKind};
pub use quote::{HistoricalQuotesProvider, NewsProvider, Quote, QuoteProvider};
