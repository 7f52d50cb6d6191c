//! Error taxonomy for ledger and valuation operations.

/// Top-level error type for folio.
///
/// Validation and business-rule failures are raised before any mutation is
/// persisted. Quote failures are terminal only for single-symbol operations;
/// multi-symbol operations capture them per symbol instead.
#[derive(Debug, thiserror::Error)]
pub enum PortfolioError {
    #[error("invalid transaction: {reason}")]
    Validation { reason: String },

    #[error("cannot sell {requested} shares of {symbol}: only {held} held")]
    InsufficientHoldings {
        symbol: String,
        requested: i64,
        held: i64,
    },

    #[error("cannot sell {symbol}: no shares held")]
    UnknownHolding { symbol: String },

    #[error("no transaction at index {index}")]
    NotFound { index: usize },

    #[error("quote fetch failed for {symbol}: {reason}")]
    UpstreamQuote { symbol: String, reason: String },

    #[error("failed to load ledger from {path}: {reason}")]
    Load { path: String, reason: String },

    #[error("failed to persist ledger to {path}: {reason}")]
    Persistence { path: String, reason: String },
}
