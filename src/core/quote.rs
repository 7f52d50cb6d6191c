//! Market data abstractions and provider traits.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Point-in-time market snapshot for one symbol.
///
/// Numeric fields the upstream omits are substituted with zero at the
/// provider edge; a missing market price is an error, never a zero quote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub open: f64,
    pub day_high: f64,
    pub day_low: f64,
    pub volume: u64,
    pub previous_close: f64,
    pub change_percent: f64,
    pub short_name: Option<String>,
    pub sector: Option<String>,
}

/// One bar of a daily history series. Close prices may be null per bar and
/// are filtered by consumers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HistoricalBar {
    pub timestamp: i64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub summary: String,
    pub published_at: Option<i64>,
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote>;
}

#[async_trait]
pub trait HistoricalQuotesProvider: Send + Sync {
    async fn fetch_history(
        &self,
        symbol: &str,
        interval: &str,
        range: &str,
    ) -> Result<Vec<HistoricalBar>>;
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn fetch_news(&self, symbol: &str, count: usize) -> Result<Vec<NewsArticle>>;
}
