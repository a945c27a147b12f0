//! UI selection state and the control events that mutate it

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::aggregate::Granularity;
use crate::error::DashboardError;
use crate::render::ChartId;

/// Workstation ids are dense and 1-based.
pub const WORKSTATION_COUNT: u8 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WsMetric {
    #[default]
    Downtime,
    Waiting,
    Active,
}

impl WsMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            WsMetric::Downtime => "downtime",
            WsMetric::Waiting => "waiting",
            WsMetric::Active => "active",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WsMetric::Downtime => "Downtime",
            WsMetric::Waiting => "Waiting Time",
            WsMetric::Active => "Active Time",
        }
    }
}

impl fmt::Display for WsMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WsMetric {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "downtime" => Ok(WsMetric::Downtime),
            "waiting" => Ok(WsMetric::Waiting),
            "active" => Ok(WsMetric::Active),
            other => Err(DashboardError::InvalidControl(format!("metric '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductionView {
    #[default]
    Production,
    Quality,
}

impl ProductionView {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductionView::Production => "production",
            ProductionView::Quality => "quality",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ProductionView::Production => ProductionView::Quality,
            ProductionView::Quality => ProductionView::Production,
        }
    }
}

impl FromStr for ProductionView {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "production" => Ok(ProductionView::Production),
            "quality" => Ok(ProductionView::Quality),
            other => Err(DashboardError::InvalidControl(format!("view '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiState {
    pub time_range: Granularity,
    pub ws_metric: WsMetric,
    pub selected_workstation: u8,
    pub production_view: ProductionView,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            time_range: Granularity::Day,
            ws_metric: WsMetric::Downtime,
            selected_workstation: 1,
            production_view: ProductionView::Production,
        }
    }
}

/// A change made through one of the dashboard controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "control", content = "value", rename_all = "snake_case")]
pub enum ControlEvent {
    TimeRange(Granularity),
    WsMetric(WsMetric),
    Workstation(u8),
    ProductionView(ProductionView),
}

impl ControlEvent {
    /// Charts that must be redrawn after this event
    pub fn affected(&self) -> &'static [ChartId] {
        match self {
            ControlEvent::TimeRange(_) | ControlEvent::ProductionView(_) => {
                &[ChartId::ProductionTrend]
            }
            ControlEvent::WsMetric(_) => &[ChartId::WorkstationMetric],
            ControlEvent::Workstation(_) => &[ChartId::WorkstationUtilization],
        }
    }
}

impl UiState {
    /// Apply a control event; out-of-range workstation ids are rejected.
    pub fn apply(&mut self, event: ControlEvent) -> Result<(), DashboardError> {
        match event {
            ControlEvent::TimeRange(g) => self.time_range = g,
            ControlEvent::WsMetric(m) => self.ws_metric = m,
            ControlEvent::Workstation(ws) => {
                if ws == 0 || ws > WORKSTATION_COUNT {
                    return Err(DashboardError::InvalidControl(format!(
                        "workstation {} (expected 1..={})",
                        ws, WORKSTATION_COUNT
                    )));
                }
                self.selected_workstation = ws;
            }
            ControlEvent::ProductionView(v) => self.production_view = v,
        }
        Ok(())
    }
}
