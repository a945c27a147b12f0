use std::collections::BTreeMap;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

use super::axis;
use super::scale::palette;
use super::surface::{Anchor, Paint, Rect, Surface, TextStyle, Tooltip};
use super::{format_count, format_pct, ChartId, ChartRenderer, RenderOutcome};
use crate::models::Snapshot;
use crate::state::UiState;

/// Share of total production per product type.
pub struct ProductMixChart;

/// Summed production count by product type, in name order
pub(crate) fn production_by_type(snapshot: &Snapshot) -> BTreeMap<&str, f64> {
    let mut totals = BTreeMap::new();
    for p in &snapshot.products.records {
        *totals.entry(p.product_type.as_str()).or_insert(0.0) += p.production_count;
    }
    totals
}

impl ChartRenderer for ProductMixChart {
    fn id(&self) -> ChartId {
        ChartId::ProductMix
    }

    fn render(
        &self,
        snapshot: &Snapshot,
        _state: &UiState,
        surface: &mut dyn Surface,
    ) -> RenderOutcome {
        let totals = production_by_type(snapshot);
        let total: f64 = totals.values().sum();
        if totals.is_empty() || total <= 0.0 {
            return RenderOutcome::Skipped;
        }

        surface.clear();
        axis::title(surface, "Production by Product Type");

        let (width, height) = surface.size();
        let center = (width * 0.4, height / 2.0 + 12.0);
        let radius = ((height - 72.0) / 2.0).min(width * 0.3).max(10.0);

        let slices: Vec<(&str, f64)> = totals.into_iter().filter(|(_, v)| *v > 0.0).collect();
        let mut angle = -FRAC_PI_2;
        for (i, (name, value)) in slices.iter().enumerate() {
            let share = value / total;
            let tooltip = Tooltip::new([
                name.to_string(),
                format!("Production: {}", format_count(*value)),
                format!("Share: {}", format_pct(share * 100.0)),
            ]);
            let paint = Paint::fill(palette(i)).with_stroke("#ffffff", 1.0);

            if slices.len() == 1 {
                surface.circle(center, radius, &paint, Some(&tooltip));
            } else {
                let end = angle + share * TAU;
                surface.path(&arc_path(center, radius, angle, end), &paint, Some(&tooltip));
                angle = end;
            }
        }

        // Legend column to the right of the pie
        let x = center.0 + radius + 24.0;
        for (i, (name, value)) in slices.iter().enumerate() {
            let y = 64.0 + i as f64 * 20.0;
            surface.rect(
                Rect { x, y: y - 9.0, width: 11.0, height: 11.0 },
                &Paint::fill(palette(i)),
                None,
            );
            surface.text(
                (x + 16.0, y),
                &format!("{} ({})", name, format_pct(value / total * 100.0)),
                &TextStyle::label().anchored(Anchor::Start),
            );
        }
        RenderOutcome::Drawn
    }
}

/// Closed wedge from `start` to `end` radians, clockwise on screen.
fn arc_path(center: (f64, f64), radius: f64, start: f64, end: f64) -> String {
    let (cx, cy) = center;
    let (x0, y0) = (cx + radius * start.cos(), cy + radius * start.sin());
    let (x1, y1) = (cx + radius * end.cos(), cy + radius * end.sin());
    let large = if end - start > PI { 1 } else { 0 };
    format!(
        "M {:.2} {:.2} L {:.2} {:.2} A {:.2} {:.2} 0 {} 1 {:.2} {:.2} Z",
        cx, cy, x0, y0, radius, radius, large, x1, y1
    )
}
