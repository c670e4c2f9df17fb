use super::ui;
use crate::core::{PriceTable, Side, TradeAssistant};
use anyhow::{Result, anyhow};
use comfy_table::{Cell, CellAlignment};

/// Price list for one commodity, best prices first on each side.
pub fn render_prices(table: &PriceTable, commodity: &str) -> Result<String> {
    let entry = table
        .prices
        .find(commodity)
        .ok_or_else(|| anyhow!("Unknown commodity: {commodity}"))?;

    let mut output = ui::new_styled_table();
    output.set_header(vec![
        ui::header_cell("Side"),
        ui::header_cell("Price"),
        ui::header_cell("Locations"),
    ]);

    let buys = entry.prices.side(Side::Buy).iter().map(|b| (Side::Buy, b));
    let sells = entry
        .prices
        .side(Side::Sell)
        .iter()
        .rev()
        .map(|b| (Side::Sell, b));
    for (side, (price, locations)) in buys.chain(sells) {
        let places = locations
            .iter()
            .map(|l| format!("{l} ({})", table.region_of(l).unwrap_or("?")))
            .collect::<Vec<_>>()
            .join("\n");
        output.add_row(vec![
            Cell::new(side),
            Cell::new(price).set_alignment(CellAlignment::Right),
            Cell::new(places),
        ]);
    }

    Ok(format!(
        "{}\n\n{}",
        ui::style_text(&entry.name, ui::StyleType::Title),
        output
    ))
}

pub async fn run(assistant: &TradeAssistant, commodity: &str) -> Result<()> {
    let snapshot = assistant.initialize().await?;
    println!("{}", render_prices(&snapshot.table, commodity)?);
    Ok(())
}
