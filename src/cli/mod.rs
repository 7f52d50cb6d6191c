//! Command implementations and terminal rendering.

pub mod allocation;
pub mod overview;
pub mod performance;
pub mod sentiment;
pub mod setup;
pub mod technical;
pub mod transaction;
pub mod ui;

use crate::core::quote::{Quote, QuoteProvider};
use anyhow::Result;
use futures::StreamExt;
use std::collections::HashMap;

/// Fetches quotes for all symbols with a progress bar, keeping at most
/// `concurrency` requests in flight. Per-symbol failures stay in the result
/// map; they never abort the batch.
pub async fn fetch_quotes_with_progress(
    provider: &dyn QuoteProvider,
    symbols: Vec<String>,
    concurrency: usize,
) -> HashMap<String, Result<Quote>> {
    let pb = ui::new_progress_bar(symbols.len() as u64, true);
    pb.set_message("Fetching quotes...");

    let results: HashMap<String, Result<Quote>> = futures::stream::iter(symbols)
        .map(|symbol| {
            let pb = pb.clone();
            async move {
                let res = provider.fetch_quote(&symbol).await;
                pb.inc(1);
                (symbol, res)
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    pb.finish_and_clear();
    results
}
