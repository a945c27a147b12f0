use std::collections::BTreeMap;

use super::axis::{self, PlotArea};
use super::scale::{BandScale, LinearScale, BAD, GOOD};
use super::surface::{Paint, Rect, Surface, Tooltip};
use super::{format_count, format_pct, ChartId, ChartRenderer, RenderOutcome};
use crate::models::Snapshot;
use crate::state::UiState;
use crate::stats::mean_by_key;

/// Good against faulty units per product type.
pub struct ProductQualityChart;

#[derive(Default)]
struct Counts {
    produced: f64,
    faulty: f64,
}

impl ChartRenderer for ProductQualityChart {
    fn id(&self) -> ChartId {
        ChartId::ProductQuality
    }

    fn render(
        &self,
        snapshot: &Snapshot,
        _state: &UiState,
        surface: &mut dyn Surface,
    ) -> RenderOutcome {
        let records = &snapshot.products.records;
        if records.is_empty() {
            return RenderOutcome::Skipped;
        }

        let mut counts: BTreeMap<&str, Counts> = BTreeMap::new();
        for p in records {
            let c = counts.entry(p.product_type.as_str()).or_default();
            c.produced += p.production_count;
            c.faulty += p.faulty_count;
        }
        let rates = mean_by_key(records, |p| p.product_type.clone(), |p| p.quality_rate);

        surface.clear();
        let area = PlotArea::for_surface(surface);
        axis::title(surface, "Quality by Product Type");

        let max = counts.values().map(|c| c.produced.max(c.faulty)).fold(0.0, f64::max);
        let y = LinearScale::new((0.0, max.max(1.0)), area.y_range()).nice(5);
        let bands = BandScale::new(counts.len(), area.x_range(), 0.3);
        axis::y_axis(surface, &area, &y, "Units", axis::plain_number);

        for (i, (name, c)) in counts.iter().enumerate() {
            let good = (c.produced - c.faulty).max(0.0);
            let mut lines = vec![
                name.to_string(),
                format!("Good: {}", format_count(good)),
                format!("Faulty: {}", format_count(c.faulty)),
            ];
            if let Some(rate) = rates.get(*name) {
                lines.push(format!("Quality rate: {}", format_pct(*rate)));
            }
            let tooltip = Tooltip::new(lines);

            let good_top = y.map(good);
            let faulty_top = y.map(good + c.faulty);
            surface.rect(
                Rect {
                    x: bands.position(i),
                    y: good_top,
                    width: bands.bandwidth(),
                    height: area.bottom - good_top,
                },
                &Paint::fill(GOOD),
                Some(&tooltip),
            );
            surface.rect(
                Rect {
                    x: bands.position(i),
                    y: faulty_top,
                    width: bands.bandwidth(),
                    height: good_top - faulty_top,
                },
                &Paint::fill(BAD),
                Some(&tooltip),
            );
        }

        let labels: Vec<String> = counts.keys().map(|name| name.to_string()).collect();
        axis::x_band_axis(surface, &area, &bands, &labels);
        axis::legend(surface, &[("Good", GOOD), ("Faulty", BAD)]);
        RenderOutcome::Drawn
    }
}
