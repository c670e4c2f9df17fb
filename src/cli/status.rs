use super::ui;
use crate::core::{Snapshot, TradeAssistant};
use anyhow::Result;

pub fn render_status(snapshot: &Snapshot) -> String {
    let table = &snapshot.table;
    format!(
        "Built at:    {} ({} ago)\nRegions:     {}\nLocations:   {}\nCommodities: {}",
        snapshot.built_at.format("%Y-%m-%d %H:%M:%S UTC"),
        snapshot.age_string(),
        table.regions().len(),
        table.locations.len(),
        table.prices.len()
    )
}

pub async fn run(assistant: &TradeAssistant) -> Result<()> {
    let snapshot = assistant.initialize().await?;
    println!("{}\n", ui::style_text("Price table", ui::StyleType::Title));
    println!("{}", render_status(&snapshot));
    Ok(())
}
