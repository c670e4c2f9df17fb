//! Terminal front end: one module per command plus shared table styling.

pub mod locations;
pub mod prices;
pub mod refresh;
pub mod routes;
pub mod setup;
pub mod status;
pub mod ui;
