//! Manufacturing analytics dashboard
//!
//! Loads simulation output (daily production, workstation, plant, product
//! and KPI data), aggregates it, renders six SVG charts with short insight
//! texts, and serves the result over HTTP.

pub mod aggregate;
pub mod api;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod insights;
pub mod logging;
pub mod models;
pub mod render;
pub mod state;
pub mod stats;

pub use error::{DashboardError, Result};
