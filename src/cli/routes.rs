use super::ui;
use crate::core::config::RoutesConfig;
use crate::core::{RouteQuery, RouteStop, TradeAssistant, TradeRoute};
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};
use tracing::info;

/// Cargo and budget used when the caller gives none, large enough to never bind.
const UNLIMITED: f64 = 1_000_000_000.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteOptions {
    pub cargo: Option<f64>,
    pub budget: Option<f64>,
    pub avoid: Vec<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    /// Skip locations listed as illegal in the config.
    pub legal: bool,
    pub top: Option<usize>,
    pub all: bool,
}

impl RouteOptions {
    pub fn to_query(&self, config: &RoutesConfig) -> RouteQuery {
        let mut query = RouteQuery::new(
            self.cargo.unwrap_or(UNLIMITED),
            self.budget.unwrap_or(UNLIMITED),
        )
        .excluding(self.avoid.iter().cloned())
        .starting_from(self.start.as_deref())
        .ending_at(self.end.as_deref())
        .with_units_per_cargo_space(config.units_per_cargo_space);
        if self.legal {
            query = query.excluding(config.illegal_locations.iter().cloned());
        }
        query
    }

    /// Number of routes to show; `None` shows all.
    pub fn limit(&self, config: &RoutesConfig) -> Option<usize> {
        if self.all {
            None
        } else {
            Some(self.top.unwrap_or(config.top))
        }
    }
}

fn stops_text(stops: &[RouteStop]) -> String {
    stops
        .iter()
        .map(|stop| format!("{} ({})", stop.name, stop.region))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_routes(routes: &[TradeRoute]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("#"),
        ui::header_cell("Commodity"),
        ui::header_cell("Buy at"),
        ui::header_cell("Buy price"),
        ui::header_cell("Sell at"),
        ui::header_cell("Sell price"),
        ui::header_cell("Units"),
        ui::header_cell("Invested"),
        ui::header_cell("Income"),
    ]);

    for (rank, route) in routes.iter().enumerate() {
        table.add_row(vec![
            Cell::new(rank + 1),
            Cell::new(&route.commodity),
            Cell::new(stops_text(&route.buy_locations)),
            Cell::new(route.buy_price).set_alignment(CellAlignment::Right),
            Cell::new(stops_text(&route.sell_locations)),
            Cell::new(route.sell_price).set_alignment(CellAlignment::Right),
            ui::amount_cell(route.bought_units),
            ui::amount_cell(route.invested),
            ui::income_cell(route.income),
        ]);
    }
    table.to_string()
}

pub async fn run(
    assistant: &TradeAssistant,
    options: &RouteOptions,
    config: &RoutesConfig,
) -> Result<()> {
    let snapshot = assistant.initialize().await?;
    let query = options.to_query(config);
    info!(?query, "Computing trade routes");

    let mut routes = assistant.routes(&query)?;
    let found = routes.len();
    if let Some(limit) = options.limit(config) {
        routes.truncate(limit);
    }

    if routes.is_empty() {
        println!(
            "{}",
            ui::style_text("No trade route matches these constraints.", ui::StyleType::Error)
        );
        return Ok(());
    }

    println!("{}\n", ui::style_text("Trade routes", ui::StyleType::Title));
    println!("{}", render_routes(&routes));
    println!(
        "\n{}",
        ui::style_text(
            &format!(
                "Showing {} of {} routes. Prices as of {} ago.",
                routes.len(),
                found,
                snapshot.age_string()
            ),
            ui::StyleType::Subtle
        )
    );
    Ok(())
}
