use super::ui;
use crate::core::performance::{self, PerformanceHistory};
use crate::core::quote::QuoteProvider;
use crate::store::LedgerStore;
use anyhow::Result;
use chrono::Utc;
use comfy_table::Cell;
use std::collections::{BTreeSet, HashMap};

/// Days of history shown by the table.
const SHOWN_DAYS: usize = 30;

impl PerformanceHistory {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Date"),
            ui::header_cell("Value"),
            ui::header_cell("Day Change"),
        ]);

        let start = self.points.len().saturating_sub(SHOWN_DAYS);
        for (i, point) in self.points.iter().enumerate().skip(start) {
            // First point of the series has nothing to change against.
            let change = if i > 0 {
                let prev = self.points[i - 1].value;
                (prev > 0.0).then(|| (point.value - prev) / prev * 100.0)
            } else {
                None
            };
            let change_cell = match change {
                Some(c) => ui::change_cell(c),
                None => ui::na_cell(false),
            };
            table.add_row(vec![
                Cell::new(point.date),
                ui::money_cell(point.value),
                change_cell,
            ]);
        }

        let mut output = format!(
            "{}\n\n",
            ui::style_text(
                &format!("Portfolio Performance (last {SHOWN_DAYS} days)"),
                ui::StyleType::Title
            )
        );
        output.push_str(&table.to_string());

        if let Some(latest) = self.points.last() {
            output.push_str(&format!(
                "\n\n{} {}",
                ui::style_text("Current Value:", ui::StyleType::TotalLabel),
                ui::style_text(&format!("{:.2}", latest.value), ui::StyleType::TotalValue)
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
    if doc.transactions.is_empty() {
        println!(
            "{}",
            ui::style_text("No transactions recorded yet.", ui::StyleType::Subtle)
        );
        return Ok(());
    }

    // Every symbol ever traded, not just the open ones; closed positions
    // still shape past days.
    let symbols: Vec<String> = doc
        .transactions
        .iter()
        .map(|tx| tx.symbol.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let quotes = super::fetch_quotes_with_progress(provider, symbols, concurrency).await;
    let current_prices: HashMap<String, f64> = quotes
        .iter()
        .filter_map(|(symbol, result)| {
            result.as_ref().ok().map(|quote| (symbol.clone(), quote.price))
        })
        .collect();

    let history = performance::performance_history(
        &doc.transactions,
        &current_prices,
        Utc::now().date_naive(),
    );
    println!("{}", history.display_as_table());

    if !history.missing_symbols.is_empty() {
        println!(
            "{}",
            ui::style_text(
                &format!(
                    "Price unavailable for: {}",
                    history.missing_symbols.join(", ")
                ),
                ui::StyleType::Error
            )
        );
    }

    Ok(())
}
