use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::core::cache::Cache;
use crate::core::quote::{
    HistoricalBar, HistoricalQuotesProvider, NewsArticle, NewsProvider, Quote, QuoteProvider,
};

fn series_value<T: Copy>(series: Option<&Vec<Option<T>>>, index: usize) -> Option<T> {
    series.and_then(|values| values.get(index).copied().flatten())
}

// YahooFinanceProvider implements quote, history and news lookups against
// the chart and search endpoints.
pub struct YahooFinanceProvider {
    base_url: String,
    cache: Arc<Cache<String, Quote>>,
}

impl YahooFinanceProvider {
    pub fn new(base_url: &str, cache: Arc<Cache<String, Quote>>) -> Self {
        YahooFinanceProvider {
            base_url: base_url.to_string(),
            cache,
        }
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Vec<ChartItem>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
struct ChartMeta {
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    #[serde(alias = "chartPreviousClose", alias = "previousClose")]
    previous_close: Option<f64>,
    #[serde(alias = "regularMarketOpen")]
    regular_market_open: Option<f64>,
    #[serde(alias = "regularMarketDayHigh")]
    regular_market_day_high: Option<f64>,
    #[serde(alias = "regularMarketDayLow")]
    regular_market_day_low: Option<f64>,
    #[serde(alias = "regularMarketVolume")]
    regular_market_volume: Option<u64>,
    #[serde(alias = "shortName")]
    short_name: Option<String>,
    sector: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    quote: Vec<QuoteSeries>,
}

#[derive(Deserialize, Debug)]
struct QuoteSeries {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

#[async_trait]
impl QuoteProvider for YahooFinanceProvider {
    #[instrument(
        name = "YahooQuoteFetch",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        if let Some(cached) = self.cache.get(&symbol.to_string()).await {
            return Ok(cached);
        }

        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&range=1d",
            self.base_url, symbol
        );
        debug!("Requesting quote data from {}", url);

        let client = reqwest::Client::builder().user_agent("folio/1.0").build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {} URL: {}", e, symbol, url))?;

        let data = response.json::<YahooChartResponse>().await?;
        let item = data
            .chart
            .result
            .first()
            .ok_or_else(|| anyhow!("No quote data found for symbol: {}", symbol))?;

        let price = item
            .meta
            .regular_market_price
            .ok_or_else(|| anyhow!("No price in quote response for symbol: {}", symbol))?;

        let previous_close = item.meta.previous_close.unwrap_or(0.0);
        let change_percent = if previous_close > 0.0 {
            (price - previous_close) / previous_close * 100.0
        } else {
            0.0
        };

        let quote = Quote {
            symbol: symbol.to_string(),
            price,
            open: item.meta.regular_market_open.unwrap_or(0.0),
            day_high: item.meta.regular_market_day_high.unwrap_or(0.0),
            day_low: item.meta.regular_market_day_low.unwrap_or(0.0),
            volume: item.meta.regular_market_volume.unwrap_or(0),
            previous_close,
            change_percent,
            short_name: item.meta.short_name.clone(),
            sector: item.meta.sector.clone(),
        };

        self.cache.put(symbol.to_string(), quote.clone()).await;

        Ok(quote)
    }
}

#[async_trait]
impl HistoricalQuotesProvider for YahooFinanceProvider {
    #[instrument(
        name = "YahooHistoryFetch",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn fetch_history(
        &self,
        symbol: &str,
        interval: &str,
        range: &str,
    ) -> Result<Vec<HistoricalBar>> {
        let url = format!(
            "{}/v8/finance/chart/{}?interval={}&range={}",
            self.base_url, symbol, interval, range
        );
        debug!("Requesting historical data from {}", url);

        let client = reqwest::Client::builder().user_agent("folio/1.0").build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {} URL: {}", e, symbol, url))?;

        let data = response.json::<YahooChartResponse>().await?;
        let item = data
            .chart
            .result
            .first()
            .ok_or_else(|| anyhow!("No historical data found for symbol: {}", symbol))?;

        let timestamps = item.timestamp.as_deref().unwrap_or(&[]);
        let series = item
            .indicators
            .as_ref()
            .and_then(|indicators| indicators.quote.first());

        let bars = timestamps
            .iter()
            .enumerate()
            .map(|(i, &ts)| HistoricalBar {
                timestamp: ts,
                open: series_value(series.and_then(|s| s.open.as_ref()), i),
                high: series_value(series.and_then(|s| s.high.as_ref()), i),
                low: series_value(series.and_then(|s| s.low.as_ref()), i),
                close: series_value(series.and_then(|s| s.close.as_ref()), i),
                volume: series_value(series.and_then(|s| s.volume.as_ref()), i),
            })
            .collect();

        Ok(bars)
    }
}

#[derive(Deserialize, Debug)]
struct YahooSearchResponse {
    #[serde(default)]
    news: Vec<SearchNewsItem>,
}

#[derive(Deserialize, Debug)]
struct SearchNewsItem {
    title: Option<String>,
    summary: Option<String>,
    #[serde(alias = "providerPublishTime")]
    provider_publish_time: Option<i64>,
}

#[async_trait]
impl NewsProvider for YahooFinanceProvider {
    #[instrument(
        name = "YahooNewsFetch",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn fetch_news(&self, symbol: &str, count: usize) -> Result<Vec<NewsArticle>> {
        let url = format!(
            "{}/v1/finance/search?q={}&newsCount={}",
            self.base_url, symbol, count
        );
        debug!("Requesting news from {}", url);

        let client = reqwest::Client::builder().user_agent("folio/1.0").build()?;
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {} URL: {}", e, symbol, url))?;

        let data = response.json::<YahooSearchResponse>().await?;
        let articles = data
            .news
            .into_iter()
            .map(|item| NewsArticle {
                title: item.title.unwrap_or_default(),
                summary: item.summary.unwrap_or_default(),
                published_at: item.provider_publish_time,
            })
            .collect();

        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_mock_server(symbol: &str, mock_response: &str) -> wiremock::MockServer {
        let mock_server = wiremock::MockServer::start().await;
        let request_path = format!("/v8/finance/chart/{symbol}");

        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_quote_fetch() {
        let mock_response = r#"{
            "chart": {
                "result": [{
                    "meta": {
                        "regularMarketPrice": 150.0,
                        "chartPreviousClose": 120.0,
                        "regularMarketOpen": 121.0,
                        "regularMarketDayHigh": 151.0,
                        "regularMarketDayLow": 119.5,
                        "regularMarketVolume": 123456,
                        "shortName": "Tata Consultancy Services"
                    }
                }]
            }
        }"#;

        let mock_server = create_mock_server("TCS.NS", mock_response).await;
        let cache = Arc::new(Cache::default());

        let provider = YahooFinanceProvider::new(&mock_server.uri(), cache);
        let quote = provider.fetch_quote("TCS.NS").await.unwrap();
        assert_eq!(quote.price, 150.0);
        assert_eq!(quote.previous_close, 120.0);
        assert_eq!(quote.change_percent, 25.0);
        assert_eq!(quote.volume, 123456);
        assert_eq!(quote.short_name.as_deref(), Some("Tata Consultancy Services"));
        assert!(quote.sector.is_none());
    }

    #[tokio::test]
    async fn test_quote_is_served_from_cache() {
        let mock_response = r#"{
            "chart": {
                "result": [{
                    "meta": { "regularMarketPrice": 150.0 }
                }]
            }
        }"#;

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/TCS.NS"))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .expect(1)
            .mount(&mock_server)
            .await;

        let cache = Arc::new(Cache::default());
        let provider = YahooFinanceProvider::new(&mock_server.uri(), cache);

        let first = provider.fetch_quote("TCS.NS").await.unwrap();
        let second = provider.fetch_quote("TCS.NS").await.unwrap();
        assert_eq!(first.price, second.price);
    }

    #[tokio::test]
    async fn test_quote_without_price_is_error() {
        let mock_response = r#"{
            "chart": {
                "result": [{ "meta": {} }]
            }
        }"#;

        let mock_server = create_mock_server("TCS.NS", mock_response).await;
        let provider = YahooFinanceProvider::new(&mock_server.uri(), Arc::new(Cache::default()));

        let result = provider.fetch_quote("TCS.NS").await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "No price in quote response for symbol: TCS.NS"
        );
    }

    #[tokio::test]
    async fn test_no_quote_result_data() {
        let mock_response = r#"{"chart": {"result": []}}"#;
        let mock_server = create_mock_server("INVALID", mock_response).await;
        let provider = YahooFinanceProvider::new(&mock_server.uri(), Arc::new(Cache::default()));

        let result = provider.fetch_quote("INVALID").await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "No quote data found for symbol: INVALID"
        );
    }

    #[tokio::test]
    async fn test_history_fetch_keeps_null_bars() {
        let mock_response = r#"{
            "chart": {
                "result": [{
                    "meta": { "regularMarketPrice": 102.0 },
                    "timestamp": [1700000000, 1700086400, 1700172800],
                    "indicators": {
                        "quote": [{
                            "close": [100.5, null, 102.0],
                            "volume": [1000, null, 3000]
                        }]
                    }
                }]
            }
        }"#;

        let mock_server = create_mock_server("TCS.NS", mock_response).await;
        let provider = YahooFinanceProvider::new(&mock_server.uri(), Arc::new(Cache::default()));

        let bars = provider.fetch_history("TCS.NS", "1d", "1y").await.unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].close, Some(100.5));
        assert!(bars[1].close.is_none());
        assert!(bars[1].volume.is_none());
        assert_eq!(bars[2].close, Some(102.0));
        assert_eq!(bars[2].volume, Some(3000));
        // Series absent from the response stay unset.
        assert!(bars[0].open.is_none());
    }

    #[tokio::test]
    async fn test_news_fetch() {
        let mock_response = r#"{
            "news": [
                {
                    "title": "Profits rise at TCS",
                    "summary": "Strong quarter",
                    "providerPublishTime": 1700000000
                },
                { "title": "Untagged item" }
            ]
        }"#;

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/finance/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        let provider = YahooFinanceProvider::new(&mock_server.uri(), Arc::new(Cache::default()));
        let news = provider.fetch_news("TCS.NS", 10).await.unwrap();

        assert_eq!(news.len(), 2);
        assert_eq!(news[0].title, "Profits rise at TCS");
        assert_eq!(news[0].published_at, Some(1700000000));
        assert_eq!(news[1].summary, "");
    }

    #[tokio::test]
    async fn test_news_absent_from_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/finance/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&mock_server)
            .await;

        let provider = YahooFinanceProvider::new(&mock_server.uri(), Arc::new(Cache::default()));
        let news = provider.fetch_news("TCS.NS", 10).await.unwrap();
        assert!(news.is_empty());
    }
}
