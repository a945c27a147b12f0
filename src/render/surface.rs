//! Drawing surfaces
//!
//! [`SvgSurface`] produces a standalone SVG document; tooltips become
//! `<title>` children and hover emphasis is a CSS rule scoped to the chart,
//! so mouse-leave restores the mark on its own. [`RecordingSurface`] keeps
//! the draw calls as data.

use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paint {
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: f64,
    pub opacity: Option<f64>,
    pub dash: Option<&'static str>,
}

impl Paint {
    pub fn fill(color: &str) -> Self {
        Self {
            fill: Some(color.to_string()),
            ..Self::default()
        }
    }

    pub fn stroke(color: &str, width: f64) -> Self {
        Self {
            stroke: Some(color.to_string()),
            stroke_width: width,
            ..Self::default()
        }
    }

    pub fn with_stroke(mut self, color: &str, width: f64) -> Self {
        self.stroke = Some(color.to_string());
        self.stroke_width = width;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn dashed(mut self) -> Self {
        self.dash = Some("5,4");
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    #[default]
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(&self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub size: f64,
    pub color: &'static str,
    pub anchor: Anchor,
    pub bold: bool,
    /// Rotation in degrees around the text origin
    pub rotate: Option<f64>,
}

impl TextStyle {
    pub fn label() -> Self {
        Self {
            size: 11.0,
            color: super::scale::LABEL,
            anchor: Anchor::Start,
            bold: false,
            rotate: None,
        }
    }

    pub fn title() -> Self {
        Self {
            size: 14.0,
            bold: true,
            ..Self::label()
        }
    }

    pub fn anchored(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotate = Some(degrees);
        self
    }
}

/// Hover text attached to a data mark, one entry per line
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tooltip {
    pub lines: Vec<String>,
}

impl Tooltip {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

pub trait Surface {
    /// Drop everything drawn so far.
    fn clear(&mut self);

    /// Viewport width and height in pixels
    fn size(&self) -> (f64, f64);

    fn rect(&mut self, rect: Rect, paint: &Paint, tooltip: Option<&Tooltip>);

    fn line(&mut self, from: (f64, f64), to: (f64, f64), paint: &Paint);

    fn polyline(&mut self, points: &[(f64, f64)], paint: &Paint);

    fn circle(

        &mut self,

        center: (f64, f64),

        radius: f64,

        paint: &Paint,

        tooltip: Option<&Tooltip>,

    );

    /// SVG path data (`M`, `L`, `A`, `Z` commands)
    fn path(&mut self, data: &str, paint: &Paint, tooltip: Option<&Tooltip>);

    fn text(&mut self, at: (f64, f64), content: &str, style: &TextStyle);
}

// ============================================================================
// SVG backend
// ============================================================================

pub struct SvgSurface {
    width: f64,
    height: f64,
    class: String,
    body: String,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64, class: &str) -> Self {
        Self {
            width,
            height,
            class: class.to_string(),
            body: String::new(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.body.is_empty()
    }

    /// Complete SVG document for what has been drawn.
    pub fn finish(&self) -> String {
        let mut svg = String::with_capacity(self.body.len() + 512);
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="0 0 {:.0} {:.0}" class="chart {}" role="img">"#,
            self.width, self.height, self.width, self.height, escape_text(&self.class)
        );
        let _ = writeln!(
            svg,
            "  <style>.{cls} .mark {{ transition: opacity 0.15s; }} .{cls} .mark:hover {{ opacity: 1; stroke: #111827; stroke-width: 2; }}</style>",
            cls = escape_text(&self.class)
        );
        let _ = writeln!(
            svg,
            r#"  <rect width="{:.0}" height="{:.0}" fill="white"/>"#,
            self.width, self.height
        );
        svg.push_str(&self.body);
        svg.push_str("</svg>\n");
        svg
    }

    fn push_shape(&mut self, element: &str, attrs: &str, paint: &Paint, tooltip: Option<&Tooltip>) {
        let class = if tooltip.is_some() { r#" class="mark""# } else { "" };
        let _ = write!(self.body, "  <{}{} {}{}", element, class, attrs, paint_attrs(paint));
        match tooltip {
            Some(tip) if !tip.lines.is_empty() => {
                let _ = writeln!(
                    self.body,
                    "><title>{}</title></{}>",
                    escape_text(&tip.lines.join("\n")),
                    element
                );
            }
            _ => self.body.push_str("/>\n"),
        }
    }
}

impl Surface for SvgSurface {
    fn clear(&mut self) {
        self.body.clear();
    }

    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn rect(&mut self, rect: Rect, paint: &Paint, tooltip: Option<&Tooltip>) {
        let attrs = format!(
            r#"x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}""#,
            rect.x,
            rect.y,
            rect.width.max(0.0),
            rect.height.max(0.0)
        );
        self.push_shape("rect", &attrs, paint, tooltip);
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), paint: &Paint) {
        let attrs = format!(
            r#"x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}""#,
            from.0, from.1, to.0, to.1
        );
        self.push_shape("line", &attrs, paint, None);
    }

    fn polyline(&mut self, points: &[(f64, f64)], paint: &Paint) {
        if points.is_empty() {
            return;
        }
        let pts: Vec<String> = points.iter().map(|(x, y)| format!("{:.1},{:.1}", x, y)).collect();
        let attrs = format!(r#"points="{}""#, pts.join(" "));
        let paint = Paint {
            fill: paint.fill.clone().or_else(|| Some("none".to_string())),
            ..paint.clone()
        };
        self.push_shape("polyline", &attrs, &paint, None);
    }

    fn circle(

        &mut self,

        center: (f64, f64),

        radius: f64,

        paint: &Paint,

        tooltip: Option<&Tooltip>,

    ) {
        let attrs = format!(
            r#"cx="{:.1}" cy="{:.1}" r="{:.1}""#,
            center.0, center.1, radius
        );
        self.push_shape("circle", &attrs, paint, tooltip);
    }

    fn path(&mut self, data: &str, paint: &Paint, tooltip: Option<&Tooltip>) {
        let attrs = format!(r#"d="{}""#, escape_text(data));
        self.push_shape("path", &attrs, paint, tooltip);
    }

    fn text(&mut self, at: (f64, f64), content: &str, style: &TextStyle) {
        let weight = if style.bold { r#" font-weight="600""# } else { "" };
        let transform = style
            .rotate
            .map(|deg| format!(r#" transform="rotate({:.0}, {:.1}, {:.1})""#, deg, at.0, at.1))
            .unwrap_or_default();
        let _ = writeln!(
            self.body,
            r#"  <text x="{:.1}" y="{:.1}" font-family="Inter, Segoe UI, sans-serif" font-size="{:.0}" fill="{}" text-anchor="{}"{}{}>{}</text>"#,
            at.0,
            at.1,
            style.size,
            style.color,
            style.anchor.as_str(),
            weight,
            transform,
            escape_text(content)
        );
    }
}

fn paint_attrs(paint: &Paint) -> String {
    let mut attrs = String::new();
    match &paint.fill {
        Some(fill) => {
            let _ = write!(attrs, r#" fill="{}""#, escape_text(fill));
        }
        None => attrs.push_str(r#" fill="none""#),
    }
    if let Some(stroke) = &paint.stroke {
        let _ = write!(
            attrs,
            r#" stroke="{}" stroke-width="{:.1}""#,
            escape_text(stroke),
            paint.stroke_width
        );
    }
    if let Some(opacity) = paint.opacity {
        let _ = write!(attrs, r#" opacity="{:.2}""#, opacity);
    }
    if let Some(dash) = paint.dash {
        let _ = write!(attrs, r#" stroke-dasharray="{}""#, dash);
    }
    attrs
}

pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

// ============================================================================
// Recording backend
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Rect { rect: Rect, fill: Option<String>, tooltip: Option<Tooltip> },
    Line { from: (f64, f64), to: (f64, f64) },
    Polyline { points: Vec<(f64, f64)> },
    Circle { center: (f64, f64), radius: f64, fill: Option<String>, tooltip: Option<Tooltip> },
    Path { data: String, fill: Option<String>, tooltip: Option<Tooltip> },
    Text { at: (f64, f64), content: String },
}

pub struct RecordingSurface {
    width: f64,
    height: f64,
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    /// Marks carrying a tooltip, i.e. the data points of the chart
    pub fn tooltips(&self) -> Vec<&Tooltip> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Rect { tooltip, .. }
                | DrawOp::Circle { tooltip, .. }
                | DrawOp::Path { tooltip, .. } => {
                    tooltip.as_ref()
                }
                _ => None,
            })
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.ops.clear();
    }

    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn rect(&mut self, rect: Rect, paint: &Paint, tooltip: Option<&Tooltip>) {
        self.ops.push(DrawOp::Rect {
            rect,
            fill: paint.fill.clone(),
            tooltip: tooltip.cloned(),
        });
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64), _paint: &Paint) {
        self.ops.push(DrawOp::Line { from, to });
    }

    fn polyline(&mut self, points: &[(f64, f64)], _paint: &Paint) {
        self.ops.push(DrawOp::Polyline { points: points.to_vec() });
    }

    fn circle(

        &mut self,

        center: (f64, f64),

        radius: f64,

        paint: &Paint,

        tooltip: Option<&Tooltip>,

    ) {
        self.ops.push(DrawOp::Circle {
            center,
            radius,
            fill: paint.fill.clone(),
            tooltip: tooltip.cloned(),
        });
    }

    fn path(&mut self, data: &str, paint: &Paint, tooltip: Option<&Tooltip>) {
        self.ops.push(DrawOp::Path {
            data: data.to_string(),
            fill: paint.fill.clone(),
            tooltip: tooltip.cloned(),
        });
    }

    fn text(&mut self, at: (f64, f64), content: &str, _style: &TextStyle) {
        self.ops.push(DrawOp::Text {
            at,
            content: content.to_string(),
        });
    }
}
