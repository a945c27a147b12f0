//! Plot area, axes, titles and legends shared by the charts

use super::scale::{BandScale, LinearScale, AXIS, GRID, LABEL};
use super::surface::{Anchor, Paint, Rect, Surface, TextStyle};

const MARGIN_TOP: f64 = 44.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_BOTTOM: f64 = 48.0;
const MARGIN_LEFT: f64 = 64.0;

/// Inner drawing region, in surface pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl PlotArea {
    pub fn for_surface(surface: &dyn Surface) -> Self {
        let (width, height) = surface.size();
        Self {
            left: MARGIN_LEFT,
            top: MARGIN_TOP,
            right: (width - MARGIN_RIGHT).max(MARGIN_LEFT + 1.0),
            bottom: (height - MARGIN_BOTTOM).max(MARGIN_TOP + 1.0),
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn x_range(&self) -> (f64, f64) {
        (self.left, self.right)
    }

    /// Bottom-to-top, as y scales expect
    pub fn y_range(&self) -> (f64, f64) {
        (self.bottom, self.top)
    }
}

pub fn title(surface: &mut dyn Surface, text: &str) {
    surface.text((16.0, 24.0), text, &TextStyle::title());
}

/// Left axis line with ticks, grid lines and an optional rotated label.
pub fn y_axis(
    surface: &mut dyn Surface,
    area: &PlotArea,
    scale: &LinearScale,
    label: &str,
    format: fn(f64) -> String,
) {
    surface.line((area.left, area.top), (area.left, area.bottom), &Paint::stroke(AXIS, 1.0));
    for tick in scale.ticks(5) {
        let y = scale.map(tick);
        surface.line((area.left, y), (area.right, y), &Paint::stroke(GRID, 1.0));
        surface.text(
            (area.left - 8.0, y + 4.0),
            &format(tick),
            &TextStyle::label().anchored(Anchor::End),
        );
    }
    if !label.is_empty() {
        let at = (16.0, area.top + area.height() / 2.0);
        surface.text(at, label, &TextStyle::label().anchored(Anchor::Middle).rotated(-90.0));
    }
}

/// Bottom axis for a band scale; labels are thinned so at most ~12 show.
pub fn x_band_axis(
    surface: &mut dyn Surface,
    area: &PlotArea,
    bands: &BandScale,
    labels: &[String],
) {
    surface.line((area.left, area.bottom), (area.right, area.bottom), &Paint::stroke(AXIS, 1.0));
    let stride = labels.len().div_ceil(12).max(1);
    for (i, label) in labels.iter().enumerate().step_by(stride) {
        surface.text(
            (bands.center(i), area.bottom + 18.0),
            label,
            &TextStyle::label().anchored(Anchor::Middle),
        );
    }
}

/// Bottom axis for a continuous scale.
pub fn x_linear_axis(
    surface: &mut dyn Surface,
    area: &PlotArea,
    scale: &LinearScale,
    label: &str,
    format: fn(f64) -> String,
) {
    surface.line((area.left, area.bottom), (area.right, area.bottom), &Paint::stroke(AXIS, 1.0));
    for tick in scale.ticks(6) {
        let x = scale.map(tick);
        surface.line((x, area.bottom), (x, area.bottom + 4.0), &Paint::stroke(AXIS, 1.0));
        surface.text(
            (x, area.bottom + 18.0),
            &format(tick),
            &TextStyle::label().anchored(Anchor::Middle),
        );
    }
    if !label.is_empty() {
        surface.text(
            (area.left + area.width() / 2.0, area.bottom + 38.0),
            label,
            &TextStyle::label().anchored(Anchor::Middle),
        );
    }
}

/// Dashed horizontal reference line with a right-aligned caption.
pub fn target_line(surface: &mut dyn Surface, area: &PlotArea, y: f64, caption: &str, color: &str) {
    surface.line((area.left, y), (area.right, y), &Paint::stroke(color, 1.5).dashed());
    surface.text(
        (area.right - 4.0, y - 6.0),
        caption,
        &TextStyle::label().anchored(Anchor::End),
    );
}

/// Swatch legend laid out right-to-left along the title row.
pub fn legend(surface: &mut dyn Surface, entries: &[(&str, &str)]) {
    let (width, _) = surface.size();
    let mut x = width - MARGIN_RIGHT;
    for (label, color) in entries.iter().rev() {
        let text_width = label.chars().count() as f64 * 6.5;
        x -= text_width;
        surface.text((x, 24.0), label, &TextStyle { color: LABEL, ..TextStyle::label() });
        x -= 16.0;
        surface.rect(
            Rect { x, y: 15.0, width: 11.0, height: 11.0 },
            &Paint::fill(color),
            None,
        );
        x -= 14.0;
    }
}

pub fn plain_number(value: f64) -> String {
    super::format_count(value)
}

pub fn percent(value: f64) -> String {
    format!("{:.0}%", value)
}

pub fn hours(value: f64) -> String {
    format!("{:.0}h", value)
}

pub fn decimal(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}
