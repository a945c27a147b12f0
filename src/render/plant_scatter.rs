use super::axis::{self, PlotArea};
use super::scale::{interpolate_color, LinearScale, BAD, GOOD, TARGET};
use super::surface::{Paint, Surface, Tooltip};
use super::{format_count, format_pct, ChartId, ChartRenderer, RenderOutcome};
use crate::models::Snapshot;
use crate::state::UiState;
use crate::stats::linear_regression;

/// Supplier occupancy against bottleneck delay, one point per run.
pub struct PlantScatterChart;

impl ChartRenderer for PlantScatterChart {
    fn id(&self) -> ChartId {
        ChartId::PlantScatter
    }

    fn render(
        &self,
        snapshot: &Snapshot,
        _state: &UiState,
        surface: &mut dyn Surface,
    ) -> RenderOutcome {
        let runs = &snapshot.plant.records;
        if runs.is_empty() {
            return RenderOutcome::Skipped;
        }

        let xs: Vec<f64> = runs.iter().map(|r| r.supplier_occupancy).collect();
        let ys: Vec<f64> = runs.iter().map(|r| r.bottleneck_delay).collect();
        let (q_lo, q_hi) = runs
            .iter()
            .map(|r| r.quality_percentage)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), q| (lo.min(q), hi.max(q)));

        surface.clear();
        let area = PlotArea::for_surface(surface);
        axis::title(surface, "Supplier Occupancy vs Bottleneck Delay");

        let x = LinearScale::new(extent(&xs), area.x_range()).nice(6);
        let y = LinearScale::new(extent(&ys), area.y_range()).nice(5);
        axis::y_axis(surface, &area, &y, "Bottleneck delay", axis::decimal);
        axis::x_linear_axis(surface, &area, &x, "Supplier occupancy", axis::decimal);

        if let Ok(fit) = linear_regression(&xs, &ys) {
            let (x0, x1) = x.domain();
            let (y0, y1) = (fit.predict(x0), fit.predict(x1));
            if y0.is_finite() && y1.is_finite() {
                surface.line(
                    (x.map(x0), y.map(y0)),
                    (x.map(x1), y.map(y1)),
                    &Paint::stroke(TARGET, 1.5).dashed(),
                );
            }
        }

        for run in runs {
            let t = if q_hi > q_lo {
                (run.quality_percentage - q_lo) / (q_hi - q_lo)
            } else {
                1.0
            };
            let color = interpolate_color(BAD, GOOD, t);
            let tooltip = Tooltip::new([
                format!("Run {}", run.run),
                format!("Supplier occupancy: {:.2}", run.supplier_occupancy),
                format!("Bottleneck delay: {:.2}", run.bottleneck_delay),
                format!("Production: {}", format_count(run.total_production)),
                format!("Quality: {}", format_pct(run.quality_percentage)),
            ]);
            surface.circle(
                (x.map(run.supplier_occupancy), y.map(run.bottleneck_delay)),
                5.0,
                &Paint::fill(&color).with_opacity(0.85),
                Some(&tooltip),
            );
        }

        axis::legend(surface, &[("Low quality", BAD), ("High quality", GOOD), ("Trend", TARGET)]);
        RenderOutcome::Drawn
    }
}

fn extent(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Dataset, PlantRecord};
    use crate::render::surface::{DrawOp, RecordingSurface};

    fn run(run: u32, occupancy: f64, delay: f64, quality: f64) -> PlantRecord {
        PlantRecord {
            run,
            supplier_occupancy: occupancy,
            bottleneck_delay: delay,
            total_production: 1000.0,
            quality_percentage: quality,
            faulty_products: None,
            avg_downtime: None,
        }
    }

    fn snapshot(records: Vec<PlantRecord>) -> Snapshot {
        Snapshot {
            plant: Dataset { records, skipped: 0, timestamp: None },
            ..Snapshot::default()
        }
    }

    #[test]
    fn points_coloured_from_worst_to_best_quality() {
        let snap = snapshot(vec![
            run(1, 0.2, 1.0, 90.0),
            run(2, 0.5, 2.0, 95.0),
            run(3, 0.8, 3.0, 100.0),
        ]);
        let mut surface = RecordingSurface::new(640.0, 320.0);
        assert_eq!(
            PlantScatterChart.render(&snap, &UiState::default(), &mut surface),
            RenderOutcome::Drawn
        );
        let fills: Vec<Option<String>> = surface
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Circle { fill, tooltip: Some(_), .. } => Some(fill.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(fills.len(), 3);
        assert_eq!(fills[0].as_deref(), Some(BAD));
        assert_eq!(fills[2].as_deref(), Some(GOOD));
        assert_eq!(surface.tooltips()[1].lines[0], "Run 2");
    }

    #[test]
    fn single_run_draws_point_without_trend() {
        let snap = snapshot(vec![run(1, 0.4, 2.0, 96.0)]);
        let mut surface = RecordingSurface::new(640.0, 320.0);
        assert_eq!(
            PlantScatterChart.render(&snap, &UiState::default(), &mut surface),
            RenderOutcome::Drawn
        );
        assert_eq!(surface.tooltips().len(), 1);
    }

    #[test]
    fn no_runs_is_skipped() {
        let mut surface = RecordingSurface::new(640.0, 320.0);
        assert_eq!(
            PlantScatterChart.render(&Snapshot::default(), &UiState::default(), &mut surface),
            RenderOutcome::Skipped
        );
    }
}
