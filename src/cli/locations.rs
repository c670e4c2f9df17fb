use super::ui;
use crate::core::{PriceTable, TradeAssistant};
use anyhow::Result;
use comfy_table::Cell;

pub fn render_locations(table: &PriceTable) -> String {
    let mut output = ui::new_styled_table();
    output.set_header(vec![
        ui::header_cell("Region"),
        ui::header_cell("Locations"),
    ]);
    for (region, locations) in table.regions() {
        output.add_row(vec![Cell::new(region), Cell::new(locations.join("\n"))]);
    }
    output.to_string()
}

pub async fn run(assistant: &TradeAssistant) -> Result<()> {
    let snapshot = assistant.initialize().await?;
    println!("{}\n", ui::style_text("Trading locations", ui::StyleType::Title));
    println!("{}", render_locations(&snapshot.table));
    Ok(())
}
