use super::ui;
use crate::core::quote::QuoteProvider;
use crate::core::valuation::{self, PortfolioOverview};
use crate::store::LedgerStore;
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};
use console::style;

impl PortfolioOverview {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Symbol"),
            ui::header_cell("Name"),
            ui::header_cell("Qty"),
            ui::header_cell("Avg Price"),
            ui::header_cell("Invested"),
            ui::header_cell("Price"),
            ui::header_cell("Value"),
            ui::header_cell("P&L"),
            ui::header_cell("P&L %"),
            ui::header_cell("Day %"),
        ]);

        for row in &self.holdings {
            let day_change = match row.change_percent {
                Some(change) => ui::change_cell(change),
                None => ui::na_cell(row.error.is_some()),
            };
            table.add_row(vec![
                Cell::new(&row.symbol),
                Cell::new(row.name.as_deref().unwrap_or("-")),
                Cell::new(row.quantity).set_alignment(CellAlignment::Right),
                ui::money_cell(row.avg_price),
                ui::money_cell(row.invested),
                ui::format_optional_cell(row.current_price, |p| format!("{p:.2}")),
                ui::format_optional_cell(row.current_value, |v| format!("{v:.2}")),
                ui::format_optional_cell(row.pnl, |p| format!("{p:+.2}")),
                ui::format_optional_cell(row.pnl_percent, |p| format!("{p:+.2}%")),
                day_change,
            ]);
        }

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Portfolio Overview", ui::StyleType::Title)
        );
        output.push_str(&table.to_string());

        let pnl_pct = self
            .total_pnl_percent
            .map_or(String::new(), |p| format!(" ({p:+.2}%)"));
        let pnl_text = format!("{:+.2}{}", self.total_pnl, pnl_pct);
        let pnl_styled = if self.total_pnl >= 0.0 {
            style(pnl_text).green().bold()
        } else {
            style(pnl_text).red().bold()
        };

        output.push_str(&format!(
            "\n\n{} {:.2}",
            ui::style_text("Total Invested:", ui::StyleType::TotalLabel),
            self.total_invested
        ));
        output.push_str(&format!(
            "\n{} {}",
            ui::style_text("Total Value:", ui::StyleType::TotalLabel),
            ui::style_text(&format!("{:.2}", self.total_value), ui::StyleType::TotalValue)
        ));
        output.push_str(&format!(
            "\n{} {}",
            ui::style_text("Total P&L:", ui::StyleType::TotalLabel),
            pnl_styled
        ));
        output.push_str(&format!(
            "\n{}",
            ui::style_text(
                &format!("Beta: {:.2} | Sharpe Ratio: {:.2}", self.beta, self.sharpe_ratio),
                ui::StyleType::Subtle
            )
        ));

        if !self.failed_symbols.is_empty() {
            output.push_str(&format!(
                "\n{}",
                ui::style_text(
                    &format!("Quotes failed for: {}", self.failed_symbols.join(", ")),
                    ui::StyleType::Error
                )
            ));
        }

        output
    }
}

pub async fn run(
    store: &LedgerStore,
    provider: &dyn QuoteProvider,
    concurrency: usize,
) -> Result<()> {
    let doc = store.load()?;
    if doc.holdings.is_empty() {
        println!(
            "{}",
            ui::style_text(
                "No holdings yet. Record a buy to get started.",
                ui::StyleType::Subtle
            )
        );
        return Ok(());
    }

    let symbols: Vec<String> = doc.holdings.keys().cloned().collect();
    let quotes = super::fetch_quotes_with_progress(provider, symbols, concurrency).await;
    let summary = valuation::overview(&doc.holdings, &quotes);
    println!("{}", summary.display_as_table());

    Ok(())
}
