use super::ui;
use crate::core::allocation::{self, AssetAllocation};
use crate::core::quote::QuoteProvider;
use crate::store::LedgerStore;
use anyhow::Result;
use comfy_table::Cell;
use std::collections::HashMap;

impl AssetAllocation {
    pub fn display_as_table(&self, title: &str, label_header: &str) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell(label_header),
            ui::header_cell("Value"),
            ui::header_cell("Allocation"),
        ]);

        for entry in &self.entries {
            table.add_row(vec![
                Cell::new(&entry.label),
                ui::money_cell(entry.value),
                ui::format_percentage_cell(entry.percentage, |p| format!("{p:.2}%")),
            ]);
        }

        let mut output = format!("{}\n\n", ui::style_text(title, ui::StyleType::Title));
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n\n{} {}",
            ui::style_text("Total Value:", ui::StyleType::TotalLabel),
            ui::style_text(&format!("{:.2}", self.total_value), ui::StyleType::TotalValue)
        ));

        if let Some(warning) = &self.warning {
            output.push_str(&format!(
                "\n{}",
                ui::style_text(warning, ui::StyleType::Error)
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
    let prices: HashMap<String, f64> = quotes
        .iter()
        .filter_map(|(symbol, result)| {
            result.as_ref().ok().map(|quote| (symbol.clone(), quote.price))
        })
        .collect();

    let by_symbol = allocation::allocation_by_symbol(&doc.holdings, &prices);
    let by_sector = allocation::allocation_by_sector(&doc.holdings, &quotes);

    println!("{}", by_symbol.display_as_table("Allocation by Symbol", "Symbol"));
    ui::print_separator();
    println!("{}", by_sector.display_as_table("Allocation by Sector", "Sector"));

    Ok(())
}
