use super::ui;
use crate::core::error::PortfolioError;
use crate::core::ledger::normalize_symbol;
use crate::core::quote::NewsProvider;
use crate::core::sentiment::{self, Outlook, SentimentSummary, Tone};
use anyhow::Result;
use comfy_table::{Cell, Color};
use console::style;

/// Articles pulled per sentiment check.
const NEWS_COUNT: usize = 10;

impl SentimentSummary {
    pub fn display_as_table(&self, symbol: &str) -> String {
        let mut output = format!(
            "{}\n\n",
            ui::style_text(
                &format!("News Sentiment: {symbol}"),
                ui::StyleType::Title
            )
        );

        if self.total_articles == 0 {
            output.push_str(&ui::style_text(
                "No recent news found.",
                ui::StyleType::Subtle
            ));
            return output;
        }

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Tone"),
            ui::header_cell("Score"),
            ui::header_cell("Headline"),
        ]);
        for article in &self.articles {
            let tone_cell = match article.tone {
                Tone::Positive => Cell::new("Positive").fg(Color::Green),
                Tone::Negative => Cell::new("Negative").fg(Color::Red),
                Tone::Neutral => Cell::new("Neutral").fg(Color::DarkGrey),
            };
            table.add_row(vec![
                tone_cell,
                Cell::new(format!("{:.3}", article.score)),
                Cell::new(&article.title),
            ]);
        }
        output.push_str(&table.to_string());

        let overall = match self.overall {
            Outlook::Bullish => style(self.overall.to_string()).green().bold(),
            Outlook::Bearish => style(self.overall.to_string()).red().bold(),
            Outlook::Neutral => style(self.overall.to_string()).dim(),
        };
        output.push_str(&format!(
            "\n\n{} {} | {} {}",
            ui::style_text("Overall:", ui::StyleType::TotalLabel),
            overall,
            ui::style_text("Signal:", ui::StyleType::TotalLabel),
            self.signal_strength
        ));
        output.push_str(&format!(
            "\n{} {:.2} | {} {}%",
            ui::style_text("Sentiment Score:", ui::StyleType::TotalLabel),
            self.sentiment_score,
            ui::style_text("Confidence:", ui::StyleType::TotalLabel),
            self.confidence
        ));
        output.push_str(&format!(
            "\n{}",
            ui::style_text(
                &format!(
                    "{} articles: {:.1}% positive, {:.1}% neutral, {:.1}% negative",
                    self.total_articles, self.positive_pct, self.neutral_pct, self.negative_pct
                ),
                ui::StyleType::Subtle
            )
        ));

        output
    }
}

pub async fn run(provider: &dyn NewsProvider, symbol: &str, exchange_suffix: &str) -> Result<()> {
    let symbol = normalize_symbol(symbol, exchange_suffix);

    let news = provider
        .fetch_news(&symbol, NEWS_COUNT)
        .await
        .map_err(|e| PortfolioError::UpstreamQuote {
            symbol: symbol.clone(),
            reason: e.to_string(),
        })?;

    let summary = sentiment::summarize(&news);
    println!("{}", summary.display_as_table(&symbol));

    Ok(())
}
