//! Normalized price table: locations, commodities and their price buckets

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

/// Location name to region (celestial body or system) name.
pub type LocationMap = BTreeMap<String, String>;

/// Price to the locations offering exactly that price, in grid encounter order.
pub type PriceBuckets = BTreeMap<Decimal, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Price columns alternate starting with `Buy` at column 1.
    pub fn from_column(column: usize) -> Self {
        if column % 2 == 1 { Side::Buy } else { Side::Sell }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Side::Buy => "Buy",
                Side::Sell => "Sell",
            }
        )
    }
}

impl FromStr for Side {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            _ => Err(anyhow::anyhow!("Invalid transaction side: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommodityPrices {
    #[serde(rename = "Buy", default)]
    pub buy: PriceBuckets,
    #[serde(rename = "Sell", default)]
    pub sell: PriceBuckets,
}

impl CommodityPrices {
    pub fn side(&self, side: Side) -> &PriceBuckets {
        match side {
            Side::Buy => &self.buy,
            Side::Sell => &self.sell,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut PriceBuckets {
        match side {
            Side::Buy => &mut self.buy,
            Side::Sell => &mut self.sell,
        }
    }

    /// Appends `location` to the bucket for `price`, creating the bucket if absent.
    pub fn add(&mut self, side: Side, price: Decimal, location: &str) {
        self.side_mut(side)
            .entry(price.normalize())
            .or_default()
            .push(location.to_string());
    }

    /// Price already recorded for `location` on `side`, if any.
    pub fn price_at(&self, side: Side, location: &str) -> Option<Decimal> {
        self.side(side)
            .iter()
            .find(|(_, locations)| locations.iter().any(|l| l == location))
            .map(|(price, _)| *price)
    }

    pub fn lowest_buy(&self) -> Option<(Decimal, &[String])> {
        self.buy
            .iter()
            .next()
            .map(|(price, locations)| (*price, locations.as_slice()))
    }

    pub fn highest_sell(&self) -> Option<(Decimal, &[String])> {
        self.sell
            .iter()
            .next_back()
            .map(|(price, locations)| (*price, locations.as_slice()))
    }

    /// Every location named in any bucket on either side.
    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.buy
            .values()
            .chain(self.sell.values())
            .flatten()
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commodity {
    pub name: String,
    pub prices: CommodityPrices,
}

/// Commodities in the order they were first seen in the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceIndex {
    commodities: Vec<Commodity>,
}

impl PriceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a commodity. A repeated name replaces the earlier record but
    /// keeps its position.
    pub fn insert(&mut self, name: &str, prices: CommodityPrices) {
        match self.commodities.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.prices = prices,
            None => self.commodities.push(Commodity {
                name: name.to_string(),
                prices,
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommodityPrices> {
        self.commodities
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.prices)
    }

    /// Case-insensitive lookup returning the stored name alongside the prices.
    pub fn find(&self, name: &str) -> Option<&Commodity> {
        let needle = name.trim().to_lowercase();
        self.commodities
            .iter()
            .find(|c| c.name.to_lowercase() == needle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Commodity> {
        self.commodities.iter()
    }

    pub fn len(&self) -> usize {
        self.commodities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commodities.is_empty()
    }
}

/// Location map and price index built together from one grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTable {
    pub locations: LocationMap,
    pub prices: PriceIndex,
}

impl PriceTable {
    pub fn region_of(&self, location: &str) -> Option<&str> {
        self.locations.get(location).map(String::as_str)
    }

    /// `(commodity, location)` pairs whose location is missing from the
    /// location map. Empty for any table produced by the builder.
    pub fn dangling_locations(&self) -> Vec<(&str, &str)> {
        let known = &self.locations;
        self.prices
            .iter()
            .flat_map(move |c| {
                c.prices
                    .locations()
                    .filter(move |l| !known.contains_key(*l))
                    .map(move |l| (c.name.as_str(), l))
            })
            .collect()
    }

    pub fn is_consistent(&self) -> bool {
        self.dangling_locations().is_empty()
    }

    /// Locations grouped by region, both sorted by name.
    pub fn regions(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut regions: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (location, region) in &self.locations {
            regions
                .entry(region.as_str())
                .or_default()
                .push(location.as_str());
        }
        regions
    }
}
