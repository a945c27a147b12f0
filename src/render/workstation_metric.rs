use std::collections::BTreeMap;

use super::axis::{self, PlotArea};
use super::scale::{palette, BandScale, LinearScale, HIGHLIGHT, TARGET};
use super::surface::{Paint, Rect, Surface, Tooltip};
use super::{format_hours, format_pct, ChartId, ChartRenderer, RenderOutcome};
use crate::insights::DOWNTIME_TARGET_HOURS;
use crate::models::{Snapshot, WorkstationRecord};
use crate::state::{UiState, WsMetric};
use crate::stats::mean_by_key;

/// Mean hours of the selected metric per workstation.
pub struct WorkstationMetricChart;

pub(crate) fn metric_value(record: &WorkstationRecord, metric: WsMetric) -> f64 {
    match metric {
        WsMetric::Downtime => record.downtime,
        WsMetric::Waiting => record.waiting_time,
        WsMetric::Active => record.active_time,
    }
}

/// Bottleneck workstation: from the KPI summary when present, otherwise the
/// one with the highest mean downtime.
fn bottleneck(snapshot: &Snapshot) -> Option<u8> {
    if let Some(kpi) = snapshot.kpi() {
        return Some(kpi.bottleneck_workstation);
    }
    mean_by_key(&snapshot.workstations.records, |r| r.workstation, |r| r.downtime)
        .into_iter()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(ws, _)| ws)
}

impl ChartRenderer for WorkstationMetricChart {
    fn id(&self) -> ChartId {
        ChartId::WorkstationMetric
    }

    fn render(
        &self,
        snapshot: &Snapshot,
        state: &UiState,
        surface: &mut dyn Surface,
    ) -> RenderOutcome {
        let records = &snapshot.workstations.records;
        if records.is_empty() {
            return RenderOutcome::Skipped;
        }
        let metric = state.ws_metric;
        let means: BTreeMap<u8, f64> =
            mean_by_key(records, |r| r.workstation, |r| metric_value(r, metric));
        let failure: BTreeMap<u8, f64> =
            mean_by_key(records, |r| r.workstation, |r| r.failure_probability);
        let bottleneck = bottleneck(snapshot);

        surface.clear();
        let area = PlotArea::for_surface(surface);
        axis::title(surface, &format!("Average {} by Workstation", metric.label()));

        let mut max = means.values().copied().fold(0.0, f64::max);
        if metric == WsMetric::Downtime {
            max = max.max(DOWNTIME_TARGET_HOURS);
        }
        let y = LinearScale::new((0.0, max.max(1.0)), area.y_range()).nice(5);
        let bands = BandScale::new(means.len(), area.x_range(), 0.25);
        axis::y_axis(surface, &area, &y, "Hours", axis::hours);

        for (i, (ws, value)) in means.iter().enumerate() {
            let is_bottleneck = bottleneck == Some(*ws);
            let color = if is_bottleneck { HIGHLIGHT } else { palette(0) };
            let top = y.map(*value);
            let mut lines = vec![
                format!("Workstation {}", ws),
                format!("{}: {}", metric.label(), format_hours(*value)),
            ];
            if let Some(p) = failure.get(ws) {
                lines.push(format!("Failure probability: {}", format_pct(p * 100.0)));
            }
            if is_bottleneck {
                lines.push("Bottleneck".to_string());
            }
            surface.rect(
                Rect {
                    x: bands.position(i),
                    y: top,
                    width: bands.bandwidth(),
                    height: area.bottom - top,
                },
                &Paint::fill(color),
                Some(&Tooltip::new(lines)),
            );
        }

        if metric == WsMetric::Downtime {
            axis::target_line(
                surface,
                &area,
                y.map(DOWNTIME_TARGET_HOURS),
                &format!("Target {}", format_hours(DOWNTIME_TARGET_HOURS)),
                TARGET,
            );
        }

        let labels: Vec<String> = means.keys().map(|ws| format!("WS {}", ws)).collect();
        axis::x_band_axis(surface, &area, &bands, &labels);
        axis::legend(surface, &[(metric.label(), palette(0)), ("Bottleneck", HIGHLIGHT)]);
        RenderOutcome::Drawn
    }
}
