pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::ledger::{NewTransaction, TransactionKind};
use crate::core::quote::Quote;
use crate::store::{LedgerStore, LoadPolicy};
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Commands the application can run, decoupled from the CLI parser.
pub enum AppCommand {
    Buy {
        symbol: String,
        quantity: i64,
        price: f64,
        date: Option<String>,
        notes: Option<String>,
    },
    Sell {
        symbol: String,
        quantity: i64,
        price: f64,
        date: Option<String>,
        notes: Option<String>,
    },
    Remove {
        index: usize,
    },
    Transactions,
    Overview,
    Performance,
    Allocation,
    Technical {
        symbol: String,
    },
    Sentiment {
        symbol: String,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("folio starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let quote_cache = Arc::new(Cache::<String, Quote>::new(
        Duration::from_secs(config.quotes.cache_ttl_secs),
        config.quotes.cache_capacity,
    ));
    let base_url = config
        .providers
        .yahoo
        .as_ref()
        .map_or("https://query1.finance.yahoo.com", |p| &p.base_url);
    let provider =
        providers::yahoo_finance::YahooFinanceProvider::new(base_url, Arc::clone(&quote_cache));

    let store = LedgerStore::new(config.default_ledger_path()?, LoadPolicy::ResetOnError);
    store.init()?;

    match command {
        AppCommand::Buy {
            symbol,
            quantity,
            price,
            date,
            notes,
        } => cli::transaction::record(
            &store,
            new_transaction(symbol, quantity, price, date, notes, TransactionKind::Buy),
            &config.exchange_suffix,
        ),
        AppCommand::Sell {
            symbol,
            quantity,
            price,
            date,
            notes,
        } => cli::transaction::record(
            &store,
            new_transaction(symbol, quantity, price, date, notes, TransactionKind::Sell),
            &config.exchange_suffix,
        ),
        AppCommand::Remove { index } => cli::transaction::remove(&store, index),
        AppCommand::Transactions => cli::transaction::list(&store),
        AppCommand::Overview => {
            cli::overview::run(&store, &provider, config.quotes.concurrency).await
        }
        AppCommand::Performance => {
            cli::performance::run(&store, &provider, config.quotes.concurrency).await
        }
        AppCommand::Allocation => {
            cli::allocation::run(&store, &provider, config.quotes.concurrency).await
        }
        AppCommand::Technical { symbol } => {
            cli::technical::run(&provider, &provider, &symbol, &config.exchange_suffix).await
        }
        AppCommand::Sentiment { symbol } => {
            cli::sentiment::run(&provider, &symbol, &config.exchange_suffix).await
        }
    }
}

fn new_transaction(
    symbol: String,
    quantity: i64,
    price: f64,
    date: Option<String>,
    notes: Option<String>,
    kind: TransactionKind,
) -> NewTransaction {
    NewTransaction {
        symbol,
        quantity,
        price,
        date: date.unwrap_or_else(|| Utc::now().date_naive().format("%Y-%m-%d").to_string()),
        kind,
        notes,
    }
}
