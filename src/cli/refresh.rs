use super::ui;
use crate::core::{Refresh, TradeAssistant};
use anyhow::Result;

pub async fn run(assistant: &TradeAssistant) -> Result<()> {
    let spinner = ui::new_spinner("Downloading price table...");
    let outcome = assistant.refresh().await;
    spinner.finish_and_clear();

    match outcome? {
        Refresh::Rebuilt(snapshot) => println!(
            "{}",
            ui::style_text(
                &format!(
                    "Price table rebuilt: {} commodities across {} locations.",
                    snapshot.table.prices.len(),
                    snapshot.table.locations.len()
                ),
                ui::StyleType::TotalValue
            )
        ),
        Refresh::Kept { snapshot, reason } => {
            println!(
                "{}",
                ui::style_text(&format!("Refresh failed: {reason:#}"), ui::StyleType::Error)
            );
            println!(
                "{}",
                ui::style_text(
                    &format!("Keeping price table from {} ago.", snapshot.age_string()),
                    ui::StyleType::Subtle
                )
            );
        }
    }
    Ok(())
}
