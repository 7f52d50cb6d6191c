use super::ui;
use crate::core::ledger::{NewTransaction, Transaction, TransactionKind};
use crate::store::LedgerStore;
use anyhow::Result;
use comfy_table::{Cell, CellAlignment, Color};

/// Validates and persists one buy or sell.
pub fn record(store: &LedgerStore, input: NewTransaction, exchange_suffix: &str) -> Result<()> {
    let tx = store.append_transaction(input, exchange_suffix)?;
    println!(
        "Recorded {} {} x {} @ {:.2} on {}",
        tx.kind,
        tx.shares(),
        ui::style_text(&tx.symbol, ui::StyleType::TotalLabel),
        tx.price,
        tx.date
    );
    Ok(())
}

/// Deletes the transaction at `index` (as shown by the transactions list).
pub fn remove(store: &LedgerStore, index: usize) -> Result<()> {
    let removed = store.remove_transaction(index)?;
    println!(
        "Removed transaction #{}: {} {} x {} @ {:.2} on {}",
        index,
        removed.kind,
        removed.shares(),
        removed.symbol,
        removed.price,
        removed.date
    );
    Ok(())
}

pub fn list(store: &LedgerStore) -> Result<()> {
    let doc = store.load()?;
    if doc.transactions.is_empty() {
        println!(
            "{}",
            ui::style_text("No transactions recorded yet.", ui::StyleType::Subtle)
        );
        return Ok(());
    }
    println!("{}", transactions_table(&doc.transactions));
    Ok(())
}

/// Rows keep ledger order; the index column is what `remove` takes.
pub fn transactions_table(transactions: &[Transaction]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Date"),
        ui::header_cell("Type"),
        ui::header_cell("Symbol"),
        ui::header_cell("Shares"),
        ui::header_cell("Price"),
        ui::header_cell("Notes"),
    ]);

    for (index, tx) in transactions.iter().enumerate() {
        let kind_cell = match tx.kind {
            TransactionKind::Buy => Cell::new("BUY").fg(Color::Green),
            TransactionKind::Sell => Cell::new("SELL").fg(Color::Red),
        };
        table.add_row(vec![
            Cell::new(index).set_alignment(CellAlignment::Right),
            Cell::new(tx.date),
            kind_cell,
            Cell::new(&tx.symbol),
            Cell::new(tx.shares()).set_alignment(CellAlignment::Right),
            ui::money_cell(tx.price),
            Cell::new(&tx.notes),
        ]);
    }

    table.to_string()
}
