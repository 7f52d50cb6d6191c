use super::ui;
use crate::core::error::PortfolioError;
use crate::core::indicators::{self, BollingerBands, MacdOutput};
use crate::core::ledger::normalize_symbol;
use crate::core::quote::{HistoricalQuotesProvider, QuoteProvider};
use anyhow::{Result, bail};
use comfy_table::Cell;

/// Indicator snapshot computed over one year of daily closes.
pub struct TechnicalReport {
    pub symbol: String,
    pub price: f64,
    pub rsi: Option<f64>,
    pub macd: MacdOutput,
    pub sma_20: Option<f64>,
    pub bollinger: BollingerBands,
}

impl TechnicalReport {
    pub fn compute(symbol: &str, price: f64, closes: &[f64]) -> Self {
        let rsi = indicators::rsi(closes, 14).last().copied().flatten();
        let macd = indicators::macd(closes, 12, 26, 9);
        let sma_20 = indicators::sma(closes, 20).last().copied();
        let bollinger = indicators::bollinger(closes, 20, 2.0);

        TechnicalReport {
            symbol: symbol.to_string(),
            price,
            rsi,
            macd,
            sma_20,
            bollinger,
        }
    }

    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![ui::header_cell("Indicator"), ui::header_cell("Value")]);

        table.add_row(vec![Cell::new("Price"), ui::money_cell(self.price)]);
        table.add_row(vec![
            Cell::new("RSI (14)"),
            ui::format_optional_cell(self.rsi, |v| format!("{v:.2}")),
        ]);
        table.add_row(vec![Cell::new("MACD"), ui::money_cell(self.macd.macd)]);
        table.add_row(vec![
            Cell::new("MACD Signal"),
            ui::money_cell(self.macd.signal),
        ]);
        table.add_row(vec![
            Cell::new("MACD Histogram"),
            ui::money_cell(self.macd.histogram),
        ]);
        table.add_row(vec![
            Cell::new("SMA (20)"),
            ui::format_optional_cell(self.sma_20, |v| format!("{v:.2}")),
        ]);
        table.add_row(vec![
            Cell::new("Bollinger Upper"),
            ui::money_cell(self.bollinger.upper),
        ]);
        table.add_row(vec![
            Cell::new("Bollinger Middle"),
            ui::money_cell(self.bollinger.middle),
        ]);
        table.add_row(vec![
            Cell::new("Bollinger Lower"),
            ui::money_cell(self.bollinger.lower),
        ]);

        let mut output = format!(
            "{}\n\n",
            ui::style_text(
                &format!("Technical Indicators: {}", self.symbol),
                ui::StyleType::Title
            )
        );
        output.push_str(&table.to_string());
        output
    }
}

pub async fn run(
    quote_provider: &dyn QuoteProvider,
    history_provider: &dyn HistoricalQuotesProvider,
    symbol: &str,
    exchange_suffix: &str,
) -> Result<()> {
    let symbol = normalize_symbol(symbol, exchange_suffix);

    let quote = quote_provider
        .fetch_quote(&symbol)
        .await
        .map_err(|e| PortfolioError::UpstreamQuote {
            symbol: symbol.clone(),
            reason: e.to_string(),
        })?;
    let bars = history_provider
        .fetch_history(&symbol, "1d", "1y")
        .await
        .map_err(|e| PortfolioError::UpstreamQuote {
            symbol: symbol.clone(),
            reason: e.to_string(),
        })?;

    let closes: Vec<f64> = bars.iter().filter_map(|bar| bar.close).collect();
    if closes.is_empty() {
        bail!("No usable close prices for symbol: {}", symbol);
    }

    let report = TechnicalReport::compute(&symbol, quote.price, &closes);
    println!("{}", report.display_as_table());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_computes_all_indicators() {
        let closes: Vec<f64> = (1..=60).map(f64::from).collect();
        let report = TechnicalReport::compute("TCS.NS", 60.0, &closes);

        // Steady gains pin RSI at its ceiling.
        assert_eq!(report.rsi, Some(100.0));
        assert!(report.macd.macd > 0.0);
        // SMA of the last 20 closes 41..=60.
        assert_eq!(report.sma_20, Some(50.5));
        assert!(report.bollinger.upper > report.bollinger.middle);
        assert!(report.bollinger.lower < report.bollinger.middle);

        let rendered = report.display_as_table();
        assert!(rendered.contains("Technical Indicators: TCS.NS"));
        assert!(rendered.contains("RSI (14)"));
        assert!(rendered.contains("50.50"));
    }

    #[test]
    fn short_series_degrades_without_panicking() {
        let closes = vec![100.0, 101.0, 99.5];
        let report = TechnicalReport::compute("TCS.NS", 99.5, &closes);

        assert_eq!(report.rsi, Some(50.0));
        assert_eq!(report.macd.macd, 0.0);
        assert_eq!(report.macd.signal, 0.0);
        assert!(report.sma_20.is_none());
        assert_eq!(report.bollinger.middle, 0.0);

        let rendered = report.display_as_table();
        assert!(rendered.contains("N/A"));
    }
}
