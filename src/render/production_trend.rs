use super::axis::{self, PlotArea};
use super::scale::{palette, BandScale, LinearScale, BAD, GOOD, TARGET};
use super::surface::{Paint, Rect, Surface, Tooltip};
use super::{format_count, format_pct, ChartId, ChartRenderer, RenderOutcome};
use crate::aggregate::{aggregate, Granularity};
use crate::insights::QUALITY_TARGET_PCT;
use crate::models::{AggregatedPeriod, Snapshot};
use crate::state::{ProductionView, UiState};

/// Aggregated output over time: production bars with a faulty line, or the
/// quality percentage against its target.
pub struct ProductionTrendChart;

impl ChartRenderer for ProductionTrendChart {
    fn id(&self) -> ChartId {
        ChartId::ProductionTrend
    }

    fn render(
        &self,
        snapshot: &Snapshot,
        state: &UiState,
        surface: &mut dyn Surface,
    ) -> RenderOutcome {
        let periods = aggregate(&snapshot.daily.records, state.time_range);
        if periods.is_empty() {
            return RenderOutcome::Skipped;
        }

        match state.production_view {
            ProductionView::Production => draw_production(&periods, state.time_range, surface),
            ProductionView::Quality => draw_quality(&periods, state.time_range, surface),
        }
    }
}

fn heading(view: &str, granularity: Granularity) -> String {
    let unit = match granularity {
        Granularity::Day => "Day",
        Granularity::Week => "Week",
        Granularity::Month => "Month",
        Granularity::Quarter => "Quarter",
        Granularity::Year => "Year",
    };
    format!("{} by {}", view, unit)
}

fn period_tooltip(p: &AggregatedPeriod) -> Tooltip {
    let quality = p
        .quality_percentage()
        .map(format_pct)
        .unwrap_or_else(|| "n/a".to_string());
    Tooltip::new([
        p.period.clone(),
        format!("Production: {}", format_count(p.production)),
        format!("Faulty: {}", format_count(p.faulty)),
        format!("Quality: {}", quality),
    ])
}

fn draw_production(
    periods: &[AggregatedPeriod],
    granularity: Granularity,
    surface: &mut dyn Surface,
) -> RenderOutcome {
    surface.clear();
    let area = PlotArea::for_surface(surface);
    axis::title(surface, &heading("Production", granularity));

    let max = periods
        .iter()
        .map(|p| p.production.max(p.faulty))
        .fold(0.0, f64::max);
    let y = LinearScale::new((0.0, max.max(1.0)), area.y_range()).nice(5);
    let bands = BandScale::new(periods.len(), area.x_range(), 0.2);

    axis::y_axis(surface, &area, &y, "Units", axis::plain_number);

    let bar_paint = Paint::fill(palette(0)).with_opacity(0.85);
    for (i, p) in periods.iter().enumerate() {
        let top = y.map(p.production);
        surface.rect(
            Rect {
                x: bands.position(i),
                y: top,
                width: bands.bandwidth(),
                height: area.bottom - top,
            },
            &bar_paint,
            Some(&period_tooltip(p)),
        );
    }

    let faulty: Vec<(f64, f64)> = periods
        .iter()
        .enumerate()
        .map(|(i, p)| (bands.center(i), y.map(p.faulty)))
        .collect();
    surface.polyline(&faulty, &Paint::stroke(BAD, 2.0));
    for (point, p) in faulty.iter().zip(periods) {
        surface.circle(*point, 3.5, &Paint::fill(BAD), Some(&period_tooltip(p)));
    }

    let labels: Vec<String> = periods.iter().map(|p| p.period.clone()).collect();
    axis::x_band_axis(surface, &area, &bands, &labels);
    axis::legend(surface, &[("Production", palette(0)), ("Faulty", BAD)]);
    RenderOutcome::Drawn
}

fn draw_quality(
    periods: &[AggregatedPeriod],
    granularity: Granularity,
    surface: &mut dyn Surface,
) -> RenderOutcome {
    let quality: Vec<Option<f64>> = periods
        .iter()
        .map(AggregatedPeriod::quality_percentage)
        .collect();
    let Some(lowest) = quality.iter().flatten().copied().reduce(f64::min) else {
        return RenderOutcome::Skipped;
    };

    surface.clear();
    let area = PlotArea::for_surface(surface);
    axis::title(surface, &heading("Quality", granularity));

    let floor = (lowest.min(QUALITY_TARGET_PCT) - 5.0).max(0.0);
    let y = LinearScale::new((floor, 100.0), area.y_range()).nice(5);
    let bands = BandScale::new(periods.len(), area.x_range(), 0.2);

    axis::y_axis(surface, &area, &y, "Quality %", axis::percent);
    axis::target_line(
        surface,
        &area,
        y.map(QUALITY_TARGET_PCT),
        &format!("Target {}", format_pct(QUALITY_TARGET_PCT)),
        TARGET,
    );

    let points: Vec<((f64, f64), &AggregatedPeriod, f64)> = periods
        .iter()
        .zip(&quality)
        .enumerate()
        .filter_map(|(i, (p, q))| q.map(|q| ((bands.center(i), y.map(q)), p, q)))
        .collect();
    let line: Vec<(f64, f64)> = points.iter().map(|(pt, _, _)| *pt).collect();
    surface.polyline(&line, &Paint::stroke(GOOD, 2.0));
    for (pt, p, q) in &points {
        let color = if *q >= QUALITY_TARGET_PCT { GOOD } else { BAD };
        surface.circle(*pt, 4.0, &Paint::fill(color), Some(&period_tooltip(p)));
    }

    let labels: Vec<String> = periods.iter().map(|p| p.period.clone()).collect();
    axis::x_band_axis(surface, &area, &bands, &labels);
    axis::legend(surface, &[("Quality %", GOOD), ("Target", TARGET)]);
    RenderOutcome::Drawn
}
