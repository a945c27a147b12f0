use super::axis::{self, PlotArea};
use super::scale::{BandScale, LinearScale, BAD, GOOD, LABEL, PALETTE};
use super::surface::{Paint, Rect, Surface, Tooltip};
use super::{format_pct, ChartId, ChartRenderer, RenderOutcome};
use crate::models::Snapshot;
use crate::state::UiState;
use crate::stats::mean_by_key;

const WAITING: &str = PALETTE[1];
const DIMMED: f64 = 0.55;

/// Mean share of active, waiting and down time per workstation.
pub struct WorkstationUtilizationChart;

struct Shares {
    workstation: u8,
    active: f64,
    waiting: f64,
    downtime: f64,
}

impl ChartRenderer for WorkstationUtilizationChart {
    fn id(&self) -> ChartId {
        ChartId::WorkstationUtilization
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

        let active = mean_by_key(records, |r| r.workstation, |r| r.active_percentage);
        let waiting = mean_by_key(records, |r| r.workstation, |r| r.waiting_percentage);
        let downtime = mean_by_key(records, |r| r.workstation, |r| r.downtime_percentage);
        let rows: Vec<Shares> = active
            .iter()
            .map(|(ws, a)| Shares {
                workstation: *ws,
                active: *a,
                waiting: waiting.get(ws).copied().unwrap_or(0.0),
                downtime: downtime.get(ws).copied().unwrap_or(0.0),
            })
            .collect();

        surface.clear();
        let area = PlotArea::for_surface(surface);
        axis::title(surface, "Time Allocation by Workstation");

        let y = LinearScale::new((0.0, 100.0), area.y_range());
        let bands = BandScale::new(rows.len(), area.x_range(), 0.25);
        axis::y_axis(surface, &area, &y, "Share of time", axis::percent);

        for (i, row) in rows.iter().enumerate() {
            let selected = row.workstation == state.selected_workstation;
            let tooltip = Tooltip::new([
                format!("Workstation {}", row.workstation),
                format!("Active: {}", format_pct(row.active)),
                format!("Waiting: {}", format_pct(row.waiting)),
                format!("Downtime: {}", format_pct(row.downtime)),
            ]);

            let mut base = 0.0;
            let segments = [(row.active, GOOD), (row.waiting, WAITING), (row.downtime, BAD)];
            for (share, color) in segments {
                let bottom = y.map(base);
                let top = y.map(base + share);
                let paint = if selected {
                    Paint::fill(color).with_stroke(LABEL, 1.5)
                } else {
                    Paint::fill(color).with_opacity(DIMMED)
                };
                surface.rect(
                    Rect {
                        x: bands.position(i),
                        y: top,
                        width: bands.bandwidth(),
                        height: bottom - top,
                    },
                    &paint,
                    Some(&tooltip),
                );
                base += share;
            }
        }

        let labels: Vec<String> = rows
            .iter()
            .map(|row| {
                if row.workstation == state.selected_workstation {
                    format!("[WS {}]", row.workstation)
                } else {
                    format!("WS {}", row.workstation)
                }
            })
            .collect();
        axis::x_band_axis(surface, &area, &bands, &labels);
        axis::legend(surface, &[("Active", GOOD), ("Waiting", WAITING), ("Downtime", BAD)]);
        RenderOutcome::Drawn
    }
}
