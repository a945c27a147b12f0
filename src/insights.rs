//! One-sentence observations shown under each chart
//!
//! Every generator reads the same snapshot and UI state the matching chart
//! does and returns `None` when there is not enough data to say anything.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::aggregate::{aggregate, Granularity};
use crate::models::{AggregatedPeriod, Snapshot, WorkstationRecord};
use crate::render::{
    format_count, format_hours, format_pct, metric_value, production_by_type, ChartId,
};
use crate::state::{ProductionView, UiState, WsMetric};
use crate::stats::{linear_regression, mean, mean_by_key, pearson_correlation};

pub const PRODUCTION_TARGET_PER_DAY: f64 = 1200.0;
pub const QUALITY_TARGET_PCT: f64 = 95.0;
pub const DOWNTIME_TARGET_HOURS: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationStrength {
    Strong,
    Moderate,
    Weak,
}

impl CorrelationStrength {
    pub fn from_r(r: f64) -> Self {
        let magnitude = r.abs();
        if magnitude > 0.7 {
            CorrelationStrength::Strong
        } else if magnitude > 0.3 {
            CorrelationStrength::Moderate
        } else {
            CorrelationStrength::Weak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CorrelationStrength::Strong => "strong",
            CorrelationStrength::Moderate => "moderate",
            CorrelationStrength::Weak => "weak",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Rising,
    Falling,
    Flat,
}

impl TrendDirection {
    /// Direction of the least-squares slope over `values` taken in order.
    /// Flat when the slope is under 1% of the mean per step.
    pub fn of_series(values: &[f64]) -> Option<Self> {
        let xs: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
        let fit = linear_regression(&xs, values).ok()?;
        let m = mean(values).ok()?;
        if !fit.slope.is_finite() {
            return None;
        }
        Some(if fit.slope.abs() < 0.01 * m.abs() {
            TrendDirection::Flat
        } else if fit.slope > 0.0 {
            TrendDirection::Rising
        } else {
            TrendDirection::Falling
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Rising => "rising",
            TrendDirection::Falling => "falling",
            TrendDirection::Flat => "flat",
        }
    }
}

pub fn insight_for(chart: ChartId, snapshot: &Snapshot, state: &UiState) -> Option<String> {
    match chart {
        ChartId::ProductionTrend => production_trend(snapshot, state),
        ChartId::WorkstationMetric => workstation_metric(snapshot, state),
        ChartId::WorkstationUtilization => workstation_utilization(snapshot, state),
        ChartId::PlantScatter => plant_scatter(snapshot),
        ChartId::ProductMix => product_mix(snapshot),
        ChartId::ProductQuality => product_quality(snapshot),
    }
}

fn period_noun(granularity: Granularity) -> &'static str {
    match granularity {
        Granularity::Day => "days",
        Granularity::Week => "weeks",
        Granularity::Month => "months",
        Granularity::Quarter => "quarters",
        Granularity::Year => "years",
    }
}

pub fn production_trend(snapshot: &Snapshot, state: &UiState) -> Option<String> {
    let periods = aggregate(&snapshot.daily.records, state.time_range);
    if periods.is_empty() {
        return None;
    }
    let noun = period_noun(state.time_range);

    match state.production_view {
        ProductionView::Production => {
            let output: Vec<f64> = periods.iter().map(|p| p.production).collect();
            let trend = TrendDirection::of_series(&output)
                .map(|t| format!("; output is {} across {} {}", t.as_str(), periods.len(), noun))
                .unwrap_or_default();

            if state.time_range == Granularity::Day {
                let avg = mean(&output).ok()?;
                let gap = (avg - PRODUCTION_TARGET_PER_DAY) / PRODUCTION_TARGET_PER_DAY * 100.0;
                let relation = if gap >= 0.0 { "above" } else { "below" };
                Some(format!(
                    "Average daily production is {} units, {} {} the {} unit target{}.",
                    format_count(avg),
                    format_pct(gap.abs()),
                    relation,
                    format_count(PRODUCTION_TARGET_PER_DAY),
                    trend
                ))
            } else {
                let best = periods.iter().max_by(|a, b| a.production.total_cmp(&b.production))?;
                Some(format!(
                    "Best period was {} with {} units{}.",
                    best.period,
                    format_count(best.production),
                    trend
                ))
            }
        }
        ProductionView::Quality => {
            let quality: Vec<f64> = periods
                .iter()
                .filter_map(AggregatedPeriod::quality_percentage)
                .collect();
            let avg = mean(&quality).ok()?;
            let short = quality.iter().filter(|q| **q < QUALITY_TARGET_PCT).count();
            Some(format!(
                "Quality averaged {} against the {} target; {} of {} {} fell short.",
                format_pct(avg),
                format_pct(QUALITY_TARGET_PCT),
                short,
                quality.len(),
                noun
            ))
        }
    }
}

pub fn workstation_metric(snapshot: &Snapshot, state: &UiState) -> Option<String> {
    let metric = state.ws_metric;
    let means = mean_by_key(
        &snapshot.workstations.records,
        |r| r.workstation,
        |r| metric_value(r, metric),
    );
    let (top_ws, top) = means.iter().max_by(|a, b| a.1.total_cmp(b.1))?;
    let (low_ws, low) = means.iter().min_by(|a, b| a.1.total_cmp(b.1))?;

    Some(match metric {
        WsMetric::Downtime => {
            let over = means.values().filter(|v| **v > DOWNTIME_TARGET_HOURS).count();
            format!(
                "Workstation {} has the highest average downtime at {}; {} of {} workstations exceed the {} target.",
                top_ws,
                format_hours(*top),
                over,
                means.len(),
                format_hours(DOWNTIME_TARGET_HOURS)
            )
        }
        WsMetric::Waiting => format!(
            "Workstation {} waits longest at {} on average, Workstation {} the least at {}.",
            top_ws,
            format_hours(*top),
            low_ws,
            format_hours(*low)
        ),
        WsMetric::Active => format!(
            "Workstation {} is busiest with {} of active time, Workstation {} the least at {}.",
            top_ws,
            format_hours(*top),
            low_ws,
            format_hours(*low)
        ),
    })
}

pub fn workstation_utilization(snapshot: &Snapshot, state: &UiState) -> Option<String> {
    let ws = state.selected_workstation;
    let rows: Vec<_> = snapshot
        .workstations
        .records
        .iter()
        .filter(|r| r.workstation == ws)
        .collect();
    if rows.is_empty() {
        return None;
    }
    let share = |f: fn(&WorkstationRecord) -> f64| {
        let values: Vec<f64> = rows.iter().map(|r| f(r)).collect();
        mean(&values).unwrap_or(0.0)
    };
    let active = share(|r| r.active_percentage);
    let waiting = share(|r| r.waiting_percentage);
    let down = share(|r| r.downtime_percentage);

    let index = usize::from(ws).checked_sub(1)?;
    let daily: Vec<f64> = snapshot
        .daily
        .records
        .iter()
        .filter_map(|d| d.workstation_downtime.get(index).copied())
        .collect();
    let daily_clause = mean(&daily)
        .map(|h| format!("; it averaged {} of downtime per day", format_hours(h)))
        .unwrap_or_default();

    Some(format!(
        "Workstation {} is active {} of the time, waiting {} and down {}{}.",
        ws,
        format_pct(active),
        format_pct(waiting),
        format_pct(down),
        daily_clause
    ))
}

pub fn plant_scatter(snapshot: &Snapshot) -> Option<String> {
    let runs = &snapshot.plant.records;
    let xs: Vec<f64> = runs.iter().map(|r| r.supplier_occupancy).collect();
    let ys: Vec<f64> = runs.iter().map(|r| r.bottleneck_delay).collect();
    let r = pearson_correlation(&xs, &ys).ok()?;
    if r.is_nan() {
        return None;
    }
    let direction = if r >= 0.0 { "positive" } else { "negative" };
    Some(format!(
        "Supplier occupancy and bottleneck delay show a {} {} correlation (r = {:.2}) across {} runs.",
        CorrelationStrength::from_r(r).as_str(),
        direction,
        r,
        runs.len()
    ))
}

pub fn product_mix(snapshot: &Snapshot) -> Option<String> {
    let totals = production_by_type(snapshot);
    let total: f64 = totals.values().sum();
    if total <= 0.0 {
        return None;
    }
    let (name, leader) = totals.iter().max_by(|a, b| a.1.total_cmp(b.1))?;
    Some(format!(
        "{} leads production with {} of {} units across {} product types.",
        name,
        format_pct(leader / total * 100.0),
        format_count(total),
        totals.len()
    ))
}

pub fn product_quality(snapshot: &Snapshot) -> Option<String> {
    let mut produced: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for p in &snapshot.products.records {
        let entry = produced.entry(p.product_type.as_str()).or_insert((0.0, 0.0));
        entry.0 += p.production_count;
        entry.1 += p.faulty_count;
    }
    let quality: Vec<(&str, f64)> = produced
        .into_iter()
        .filter(|(_, (made, _))| *made > 0.0)
        .map(|(name, (made, faulty))| (name, (made - faulty) / made * 100.0))
        .collect();
    let (worst, worst_q) = quality.iter().min_by(|a, b| a.1.total_cmp(&b.1))?;
    let (best, best_q) = quality.iter().max_by(|a, b| a.1.total_cmp(&b.1))?;
    let relation = if *worst_q < QUALITY_TARGET_PCT { "below" } else { "meeting" };

    if quality.len() == 1 {
        return Some(format!(
            "{} runs at {} quality, {} the {} target.",
            worst,
            format_pct(*worst_q),
            relation,
            format_pct(QUALITY_TARGET_PCT)
        ));
    }
    Some(format!(
        "{} has the lowest quality at {}, {} the {} target; {} is best at {}.",
        worst,
        format_pct(*worst_q),
        relation,
        format_pct(QUALITY_TARGET_PCT),
        best,
        format_pct(*best_q)
    ))
}

/// Headline sentence over the KPI summary.
pub fn kpi_headline(snapshot: &Snapshot) -> Option<String> {
    let kpi = snapshot.kpi()?;
    Some(format!(
        "Average daily production of {} units ({} of target), {} quality and {} of downtime; Workstation {} is the bottleneck.",
        format_count(kpi.avg_daily_production),
        format_pct(kpi.avg_daily_production / PRODUCTION_TARGET_PER_DAY * 100.0),
        format_pct(kpi.avg_quality_percentage),
        format_hours(kpi.avg_downtime_hours),
        kpi.bottleneck_workstation
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DailyRecord, Dataset, KpiSummary, PlantRecord, ProductRecord};

    fn daily(date: &str, production: f64, faulty: f64, downtime: Vec<f64>) -> DailyRecord {
        DailyRecord {
            date: date.to_string(),
            production,
            faulty,
            workstation_downtime: downtime,
            total_downtime: None,
            trend_type: None,
        }
    }

    fn station(workstation: u8, downtime: f64) -> WorkstationRecord {
        WorkstationRecord {
            workstation,
            downtime,
            waiting_time: downtime / 2.0,
            active_time: 20.0 - downtime,
            active_percentage: 60.0,
            waiting_percentage: 25.0,
            downtime_percentage: 15.0,
            failure_probability: 0.05,
            run: None,
            is_bottleneck: false,
            is_star_performer: false,
        }
    }

    fn plant(run: u32, x: f64, y: f64) -> PlantRecord {
        PlantRecord {
            run,
            supplier_occupancy: x,
            bottleneck_delay: y,
            total_production: 1000.0,
            quality_percentage: 95.0,
            faulty_products: None,
            avg_downtime: None,
        }
    }

    fn dataset<T>(records: Vec<T>) -> Dataset<T> {
        Dataset { records, skipped: 0, timestamp: None }
    }

    #[test]
    fn correlation_strength_thresholds() {
        assert_eq!(CorrelationStrength::from_r(0.75), CorrelationStrength::Strong);
        assert_eq!(CorrelationStrength::from_r(0.5), CorrelationStrength::Moderate);
        assert_eq!(CorrelationStrength::from_r(0.1), CorrelationStrength::Weak);
        assert_eq!(CorrelationStrength::from_r(-0.9), CorrelationStrength::Strong);
        assert_eq!(CorrelationStrength::from_r(0.7), CorrelationStrength::Moderate);
    }

    #[test]
    fn trend_direction_uses_relative_slope() {
        assert_eq!(TrendDirection::of_series(&[1.0, 2.0, 3.0]), Some(TrendDirection::Rising));
        assert_eq!(TrendDirection::of_series(&[3.0, 2.0, 1.0]), Some(TrendDirection::Falling));
        assert_eq!(
            TrendDirection::of_series(&[1000.0, 1001.0, 1000.5]),
            Some(TrendDirection::Flat)
        );
        assert_eq!(TrendDirection::of_series(&[5.0]), None);
    }

    #[test]
    fn daily_production_against_target() {
        let snap = Snapshot {
            daily: dataset(vec![
                daily("2025-01-01", 1000.0, 50.0, vec![]),
                daily("2025-01-02", 1100.0, 50.0, vec![]),
                daily("2025-01-03", 1200.0, 50.0, vec![]),
            ]),
            ..Snapshot::default()
        };
        let text = production_trend(&snap, &UiState::default()).unwrap();
        assert_eq!(
            text,
            "Average daily production is 1,100 units, 8.3% below the 1,200 unit target; output is rising across 3 days."
        );
    }

    #[test]
    fn quality_view_counts_periods_under_target() {
        let snap = Snapshot {
            daily: dataset(vec![
                daily("2025-01-01", 100.0, 10.0, vec![]),
                daily("2025-02-01", 100.0, 2.0, vec![]),
            ]),
            ..Snapshot::default()
        };
        let state = UiState {
            time_range: Granularity::Month,
            production_view: ProductionView::Quality,
            ..UiState::default()
        };
        let text = production_trend(&snap, &state).unwrap();
        assert_eq!(
            text,
            "Quality averaged 94.0% against the 95.0% target; 1 of 2 months fell short."
        );
    }

    #[test]
    fn downtime_insight_names_worst_station() {
        let snap = Snapshot {
            workstations: dataset(vec![station(1, 4.0), station(2, 9.5), station(3, 6.0)]),
            ..Snapshot::default()
        };
        let text = workstation_metric(&snap, &UiState::default()).unwrap();
        assert_eq!(
            text,
            "Workstation 2 has the highest average downtime at 9.5 h; 1 of 3 workstations exceed the 8.0 h target."
        );
    }

    #[test]
    fn utilization_includes_daily_downtime_for_selection() {
        let snap = Snapshot {
            daily: dataset(vec![
                daily("2025-01-01", 1.0, 0.0, vec![1.0, 2.0]),
                daily("2025-01-02", 1.0, 0.0, vec![1.0, 3.0]),
            ]),
            workstations: dataset(vec![station(1, 4.0), station(2, 5.0)]),
            ..Snapshot::default()
        };
        let state = UiState { selected_workstation: 2, ..UiState::default() };
        let text = workstation_utilization(&snap, &state).unwrap();
        assert_eq!(
            text,
            "Workstation 2 is active 60.0% of the time, waiting 25.0% and down 15.0%; it averaged 2.5 h of downtime per day."
        );
        let state = UiState { selected_workstation: 5, ..UiState::default() };
        assert_eq!(workstation_utilization(&snap, &state), None);
    }

    #[test]
    fn scatter_reports_strength_and_direction() {
        let snap = Snapshot {
            plant: dataset(vec![plant(1, 0.1, 5.0), plant(2, 0.2, 4.0), plant(3, 0.3, 3.1)]),
            ..Snapshot::default()
        };
        let text = plant_scatter(&snap).unwrap();
        assert!(text.starts_with(
            "Supplier occupancy and bottleneck delay show a strong negative correlation"
        ));
        assert!(text.ends_with("across 3 runs."));

        let flat = Snapshot {
            plant: dataset(vec![plant(1, 0.1, 2.0), plant(2, 0.2, 2.0)]),
            ..Snapshot::default()
        };
        assert_eq!(plant_scatter(&flat), None);
    }

    #[test]
    fn product_insights() {
        let snap = Snapshot {
            products: dataset(vec![
                ProductRecord {
                    product_type: "Type A".into(),
                    production_count: 600.0,
                    faulty_count: 12.0,
                    quality_rate: 98.0,
                    run: None,
                },
                ProductRecord {
                    product_type: "Type B".into(),
                    production_count: 400.0,
                    faulty_count: 40.0,
                    quality_rate: 90.0,
                    run: None,
                },
            ]),
            ..Snapshot::default()
        };
        assert_eq!(
            product_mix(&snap).unwrap(),
            "Type A leads production with 60.0% of 1,000 units across 2 product types."
        );
        assert_eq!(
            product_quality(&snap).unwrap(),
            "Type B has the lowest quality at 90.0%, below the 95.0% target; Type A is best at 98.0%."
        );
    }

    #[test]
    fn headline_names_bottleneck() {
        let snap = Snapshot {
            kpi: dataset(vec![KpiSummary {
                avg_daily_production: 1140.0,
                avg_quality_percentage: 93.2,
                avg_downtime_hours: 7.5,
                bottleneck_workstation: 4,
                performance_scenario: None,
            }]),
            ..Snapshot::default()
        };
        assert_eq!(
            kpi_headline(&snap).unwrap(),
            "Average daily production of 1,140 units (95.0% of target), 93.2% quality and 7.5 h of downtime; Workstation 4 is the bottleneck."
        );
    }

    #[test]
    fn empty_snapshot_is_silent() {
        let snap = Snapshot::default();
        let state = UiState::default();
        for chart in ChartId::ALL {
            assert_eq!(insight_for(chart, &snap, &state), None);
        }
        assert_eq!(kpi_headline(&snap), None);
    }
}
