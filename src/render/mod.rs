//! Chart rendering
//!
//! Every chart is a [`ChartRenderer`]: a pure function of the current
//! [`Snapshot`] and [`UiState`] that redraws a [`Surface`] from scratch.
//! Renderers that find nothing to draw return [`RenderOutcome::Skipped`]
//! and leave the surface untouched.

pub mod axis;
pub mod scale;
pub mod surface;

mod plant_scatter;
mod product_mix;
mod product_quality;
mod production_trend;
mod workstation_metric;
mod workstation_utilization;

pub use plant_scatter::PlantScatterChart;
pub use product_mix::ProductMixChart;
pub use product_quality::ProductQualityChart;
pub use production_trend::ProductionTrendChart;
pub use workstation_metric::WorkstationMetricChart;
pub use workstation_utilization::WorkstationUtilizationChart;

pub(crate) use product_mix::production_by_type;
pub(crate) use workstation_metric::metric_value;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DashboardError;
use crate::models::Snapshot;
use crate::state::UiState;
use surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartId {
    ProductionTrend,
    WorkstationMetric,
    WorkstationUtilization,
    PlantScatter,
    ProductMix,
    ProductQuality,
}

impl ChartId {
    pub const ALL: [ChartId; 6] = [
        ChartId::ProductionTrend,
        ChartId::WorkstationMetric,
        ChartId::WorkstationUtilization,
        ChartId::PlantScatter,
        ChartId::ProductMix,
        ChartId::ProductQuality,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChartId::ProductionTrend => "production_trend",
            ChartId::WorkstationMetric => "workstation_metric",
            ChartId::WorkstationUtilization => "workstation_utilization",
            ChartId::PlantScatter => "plant_scatter",
            ChartId::ProductMix => "product_mix",
            ChartId::ProductQuality => "product_quality",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartId::ProductionTrend => "Production Trend",
            ChartId::WorkstationMetric => "Workstation Performance",
            ChartId::WorkstationUtilization => "Workstation Utilization",
            ChartId::PlantScatter => "Supplier Occupancy vs Bottleneck Delay",
            ChartId::ProductMix => "Production by Product Type",
            ChartId::ProductQuality => "Quality by Product Type",
        }
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartId {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_suffix(".svg").unwrap_or(s);
        ChartId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| DashboardError::InvalidControl(format!("chart '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Drawn,
    Skipped,
}

pub trait ChartRenderer: Send + Sync {
    fn id(&self) -> ChartId;

    fn render(
        &self,
        snapshot: &Snapshot,
        state: &UiState,
        surface: &mut dyn Surface,
    ) -> RenderOutcome;
}

/// The six dashboard charts, in page order.
pub fn default_renderers() -> Vec<Box<dyn ChartRenderer>> {
    vec![
        Box::new(ProductionTrendChart),
        Box::new(WorkstationMetricChart),
        Box::new(WorkstationUtilizationChart),
        Box::new(PlantScatterChart),
        Box::new(ProductMixChart),
        Box::new(ProductQualityChart),
    ]
}

// ============================================================================
// Number formatting shared by tooltips and insights
// ============================================================================

/// Whole number with thousands separators: `12345.6` -> `"12,346"`
pub fn format_count(value: f64) -> String {
    let rounded = value.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if negative {
        out.insert(0, '-');
    }
    out
}

pub fn format_pct(value: f64) -> String {
    format!("{:.1}%", value)
}

pub fn format_hours(value: f64) -> String {
    format!("{:.1} h", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_get_separators() {
        assert_eq!(format_count(0.0), "0");
        assert_eq!(format_count(999.4), "999");
        assert_eq!(format_count(1200.0), "1,200");
        assert_eq!(format_count(1234567.8), "1,234,568");
        assert_eq!(format_count(-4200.0), "-4,200");
    }

    #[test]
    fn chart_ids_parse_with_or_without_extension() {
        for id in ChartId::ALL {
            assert_eq!(id.as_str().parse::<ChartId>().unwrap(), id);
        }
        assert_eq!("product_mix.svg".parse::<ChartId>().unwrap(), ChartId::ProductMix);
        assert!("pie".parse::<ChartId>().is_err());
    }

    #[test]
    fn default_renderers_cover_every_chart_once() {
        let ids: Vec<ChartId> = default_renderers().iter().map(|r| r.id()).collect();
        assert_eq!(ids, ChartId::ALL.to_vec());
    }
}
