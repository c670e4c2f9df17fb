//! Single-hop trade route ranking over a built [`PriceTable`]

use crate::core::table::{Commodity, PriceTable, Side};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Tradeable commodity units held by one unit of cargo space.
pub const DEFAULT_UNITS_PER_CARGO_SPACE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RouteQuery {
    pub cargo_capacity: f64,
    pub budget: f64,
    /// Locations never used for buying or selling.
    pub exclude: BTreeSet<String>,
    /// Case-insensitive substring of a buy location's name or region.
    pub start_locations: Option<String>,
    /// Case-insensitive substring of a sell location's name or region.
    pub end_locations: Option<String>,
    pub units_per_cargo_space: f64,
}

impl RouteQuery {
    pub fn new(cargo_capacity: f64, budget: f64) -> Self {
        Self {
            cargo_capacity,
            budget,
            exclude: BTreeSet::new(),
            start_locations: None,
            end_locations: None,
            units_per_cargo_space: DEFAULT_UNITS_PER_CARGO_SPACE,
        }
    }

    pub fn excluding<I, S>(mut self, locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(locations.into_iter().map(Into::into));
        self
    }

    pub fn starting_from(mut self, filter: Option<&str>) -> Self {
        self.start_locations = normalize_filter(filter);
        self
    }

    pub fn ending_at(mut self, filter: Option<&str>) -> Self {
        self.end_locations = normalize_filter(filter);
        self
    }

    pub fn with_units_per_cargo_space(mut self, units: f64) -> Self {
        self.units_per_cargo_space = units;
        self
    }
}

fn normalize_filter(filter: Option<&str>) -> Option<String> {
    filter
        .map(|f| f.trim().to_lowercase())
        .filter(|f| !f.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteStop {
    pub name: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRoute {
    pub commodity: String,
    pub buy_price: Decimal,
    pub buy_locations: Vec<RouteStop>,
    pub sell_price: Decimal,
    pub sell_locations: Vec<RouteStop>,
    pub bought_units: f64,
    pub invested: f64,
    /// Profit after selling everything bought. May be negative.
    pub income: f64,
}

/// Why a commodity produced no route. Only surfaced in debug logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skip {
    MissingSide(Side),
    FilteredOut(Side),
    Excluded(Side),
}

/// Best route per commodity, highest income first.
///
/// Commodities with equal income keep their index order. The result is not
/// truncated.
pub fn compute_routes(table: &PriceTable, query: &RouteQuery) -> Vec<TradeRoute> {
    let cargo_capacity = at_least_one(query.cargo_capacity);
    let budget = at_least_one(query.budget);

    let mut routes: Vec<TradeRoute> = table
        .prices
        .iter()
        .filter_map(
            |commodity| match plan_route(table, commodity, query, cargo_capacity, budget) {
                Ok(route) => Some(route),
                Err(reason) => {
                    debug!(commodity = %commodity.name, ?reason, "No route");
                    None
                }
            },
        )
        .collect();

    // Stable, so ties stay in index order.
    routes.sort_by(|a, b| b.income.total_cmp(&a.income));
    debug!(routes = routes.len(), "Computed trade routes");
    routes
}

fn plan_route(
    table: &PriceTable,
    commodity: &Commodity,
    query: &RouteQuery,
    cargo_capacity: f64,
    budget: f64,
) -> Result<TradeRoute, Skip> {
    let (buy_price, buy_locations) = commodity
        .prices
        .lowest_buy()
        .ok_or(Skip::MissingSide(Side::Buy))?;
    let (sell_price, sell_locations) = commodity
        .prices
        .highest_sell()
        .ok_or(Skip::MissingSide(Side::Sell))?;

    let buy_locations = candidates(
        table,
        buy_locations,
        query.start_locations.as_deref(),
        query,
        Side::Buy,
    )?;
    let sell_locations = candidates(
        table,
        sell_locations,
        query.end_locations.as_deref(),
        query,
        Side::Sell,
    )?;

    let buy = as_f64(buy_price);
    let sell = as_f64(sell_price);

    let capacity_units = cargo_capacity * units_per_cargo_space(query.units_per_cargo_space);
    let affordable_units = budget / buy;
    let bought_units = capacity_units.min(affordable_units);
    let invested = (bought_units * buy).min(budget);
    let income = round_cents(bought_units * sell - invested);

    Ok(TradeRoute {
        commodity: commodity.name.clone(),
        buy_price,
        buy_locations,
        sell_price,
        sell_locations,
        bought_units,
        invested,
        income,
    })
}

/// Locations left after the area filter and exclusions, paired with regions.
fn candidates(
    table: &PriceTable,
    locations: &[String],
    area: Option<&str>,
    query: &RouteQuery,
    side: Side,
) -> Result<Vec<RouteStop>, Skip> {
    let nearby: Vec<&String> = locations
        .iter()
        .filter(|location| area.is_none_or(|needle| in_area(table, location, needle)))
        .collect();
    if nearby.is_empty() {
        return Err(Skip::FilteredOut(side));
    }

    let stops: Vec<RouteStop> = nearby
        .into_iter()
        .filter(|location| !query.exclude.contains(*location))
        .map(|location| RouteStop {
            name: location.clone(),
            region: table.region_of(location).unwrap_or_default().to_string(),
        })
        .collect();
    if stops.is_empty() {
        return Err(Skip::Excluded(side));
    }
    Ok(stops)
}

fn in_area(table: &PriceTable, location: &str, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    location.to_lowercase().contains(&needle)
        || table
            .region_of(location)
            .is_some_and(|region| region.to_lowercase().contains(&needle))
}

fn at_least_one(value: f64) -> f64 {
    if value > 0.0 { value } else { 1.0 }
}

/// Non-positive or non-finite units fall back to the default.
fn units_per_cargo_space(units: f64) -> f64 {
    if units.is_finite() && units > 0.0 {
        units
    } else {
        DEFAULT_UNITS_PER_CARGO_SPACE
    }
}

fn as_f64(price: Decimal) -> f64 {
    price.to_f64().unwrap_or(f64::NAN)
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
