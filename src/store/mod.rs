//! Persistence for the portfolio ledger: one pretty-printed JSON document,
//! rewritten whole on every mutation.

use crate::core::error::PortfolioError;
use crate::core::ledger::{
    LedgerDocument, NewTransaction, Transaction, apply_transaction, rebuild_holdings,
};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What to do when the ledger file exists but cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Log and start over from an empty ledger.
    #[default]
    ResetOnError,
    /// Fail the operation.
    Strict,
}

pub struct LedgerStore {
    path: PathBuf,
    policy: LoadPolicy,
}

impl LedgerStore {
    pub fn new(path: PathBuf, policy: LoadPolicy) -> Self {
        Self { path, policy }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Seeds an empty ledger document unless one already exists.
    pub fn init(&self) -> Result<(), PortfolioError> {
        if self.path.exists() {
            return Ok(());
        }
        self.save(&LedgerDocument::default())?;
        debug!("Seeded empty ledger at {}", self.path.display());
        Ok(())
    }

    /// Loads the ledger. A missing file is an empty ledger under either
    /// policy; an unparseable one is handled per [`LoadPolicy`].
    pub fn load(&self) -> Result<LedgerDocument, PortfolioError> {
        if !self.path.exists() {
            return Ok(LedgerDocument::default());
        }
        match self.read_document() {
            Ok(doc) => Ok(doc),
            Err(e) => match self.policy {
                LoadPolicy::Strict => Err(e),
                LoadPolicy::ResetOnError => {
                    warn!("Resetting unreadable ledger at {}: {}", self.path.display(), e);
                    Ok(LedgerDocument::default())
                }
            },
        }
    }

    pub fn save(&self, doc: &LedgerDocument) -> Result<(), PortfolioError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.persistence_error(e))?;
        }
        let raw = serde_json::to_string_pretty(doc).map_err(|e| self.persistence_error(e))?;
        fs::write(&self.path, raw).map_err(|e| self.persistence_error(e))?;
        debug!("Saved ledger to {}", self.path.display());
        Ok(())
    }

    /// Validates, applies and persists one new transaction. Nothing is
    /// written when validation or the holdings update fails.
    pub fn append_transaction(
        &self,
        input: NewTransaction,
        exchange_suffix: &str,
    ) -> Result<Transaction, PortfolioError> {
        let tx = input.build(exchange_suffix, Utc::now().timestamp_millis())?;

        let mut doc = self.load()?;
        apply_transaction(&mut doc.holdings, &tx)?;
        doc.transactions.push(tx.clone());
        self.save(&doc)?;

        debug!("Recorded {} {} x {}", tx.kind, tx.shares(), tx.symbol);
        Ok(tx)
    }

    /// Deletes the transaction at `index` and rebuilds holdings from the
    /// remaining history. A history that no longer covers its sells rejects
    /// the removal and leaves the file untouched.
    pub fn remove_transaction(&self, index: usize) -> Result<Transaction, PortfolioError> {
        let mut doc = self.load()?;
        if index >= doc.transactions.len() {
            return Err(PortfolioError::NotFound { index });
        }

        let removed = doc.transactions.remove(index);
        doc.holdings = rebuild_holdings(&doc.transactions)?;
        self.save(&doc)?;

        debug!(
            "Removed transaction {} ({} {} x {})",
            index,
            removed.kind,
            removed.shares(),
            removed.symbol
        );
        Ok(removed)
    }

    fn read_document(&self) -> Result<LedgerDocument, PortfolioError> {
        let raw = fs::read_to_string(&self.path).map_err(|e| PortfolioError::Load {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| PortfolioError::Load {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }

    fn persistence_error(&self, e: impl std::fmt::Display) -> PortfolioError {
        PortfolioError::Persistence {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        }
    }
}
