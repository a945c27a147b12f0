//! Loading, page state and the refresh flow
//!
//! `Idle -> Loading -> Ready | ReadyWithError`, and on refresh
//! `Ready -> SimulationRunning -> Loading -> Ready | ReadyWithError`.

pub mod controller;
pub mod loader;
pub mod page;
pub mod source;
#[cfg(test)]
pub(crate) mod testing;

pub use controller::{ControllerConfig, DashboardController};
pub use page::{DashboardPage, FreshnessReport, Level, Notification, Phase, Slot, SlotContent};
pub use source::{DataSource, DirSource, HttpSource, Resource};
