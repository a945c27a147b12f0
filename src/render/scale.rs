//! Scale mapping and colour helpers

/// Categorical palette, cycled by index
pub const PALETTE: [&str; 6] = ["#4e79a7", "#f28e2b", "#59a14f", "#e15759", "#76b7b2", "#edc948"];

pub const GOOD: &str = "#59a14f";
pub const BAD: &str = "#e15759";
pub const HIGHLIGHT: &str = "#e15759";
pub const TARGET: &str = "#6b7280";
pub const AXIS: &str = "#9ca3af";
pub const GRID: &str = "#e5e7eb";
pub const LABEL: &str = "#374151";

pub fn palette(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// Continuous mapping from a data domain onto a pixel range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        let domain = if domain.0 == domain.1 {
            (domain.0 - 1.0, domain.1 + 1.0)
        } else {
            domain
        };
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Widen the domain outwards to multiples of the tick step.
    pub fn nice(self, count: usize) -> Self {
        let step = tick_step(self.domain.0, self.domain.1, count);
        if step <= 0.0 || !step.is_finite() {
            return self;
        }
        let lo = (self.domain.0 / step).floor() * step;
        let hi = (self.domain.1 / step).ceil() * step;
        Self::new((lo, hi), self.range)
    }

    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (d0, d1) = self.domain;
        let step = tick_step(d0, d1, count);
        if step <= 0.0 || !step.is_finite() {
            return vec![d0, d1];
        }
        let first = (d0 / step).ceil() as i64;
        let last = (d1 / step).floor() as i64;
        (first..=last).map(|i| i as f64 * step).collect()
    }
}

/// Step of 1, 2 or 5 times a power of ten giving roughly `count` ticks
fn tick_step(lo: f64, hi: f64, count: usize) -> f64 {
    let span = (hi - lo).abs();
    if span == 0.0 || count == 0 {
        return 0.0;
    }
    let raw = span / count as f64;
    let power = 10f64.powf(raw.log10().floor());
    let error = raw / power;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * power
}

/// Evenly spaced bands for categorical x positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandScale {
    count: usize,
    start: f64,
    step: f64,
    padding: f64,
}

impl BandScale {
    pub fn new(count: usize, range: (f64, f64), padding: f64) -> Self {
        let step = if count == 0 {
            0.0
        } else {
            (range.1 - range.0) / count as f64
        };
        Self {
            count,
            start: range.0,
            step,
            padding: padding.clamp(0.0, 0.9),
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn bandwidth(&self) -> f64 {
        self.step * (1.0 - self.padding)
    }

    /// Left edge of band `index`
    pub fn position(&self, index: usize) -> f64 {
        self.start + index as f64 * self.step + self.step * self.padding / 2.0
    }

    pub fn center(&self, index: usize) -> f64 {
        self.position(index) + self.bandwidth() / 2.0
    }
}

/// Linear interpolation between two `#rrggbb` colours, `t` clamped to [0, 1]
pub fn interpolate_color(from: &str, to: &str, t: f64) -> String {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let (Some(a), Some(b)) = (parse_hex(from), parse_hex(to)) else {
        return from.to_string();
    };
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    format!("#{:02x}{:02x}{:02x}", mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_maps_and_inverts_direction() {
        let y = LinearScale::new((0.0, 100.0), (300.0, 50.0));
        assert_eq!(y.map(0.0), 300.0);
        assert_eq!(y.map(100.0), 50.0);
        assert_eq!(y.map(50.0), 175.0);
    }

    #[test]
    fn nice_domain_and_ticks() {
        let s = LinearScale::new((0.0, 1234.0), (0.0, 1.0)).nice(5);
        assert_eq!(s.domain(), (0.0, 1400.0));
        assert_eq!(s.ticks(5), vec![0.0, 200.0, 400.0, 600.0, 800.0, 1000.0, 1200.0, 1400.0]);
    }

    #[test]
    fn degenerate_domain_is_widened() {
        let s = LinearScale::new((5.0, 5.0), (0.0, 10.0));
        assert_eq!(s.domain(), (4.0, 6.0));
        assert_eq!(s.map(5.0), 5.0);
    }

    #[test]
    fn bands_split_range() {
        let b = BandScale::new(4, (0.0, 400.0), 0.2);
        assert_eq!(b.bandwidth(), 80.0);
        assert_eq!(b.position(0), 10.0);
        assert_eq!(b.center(1), 150.0);
    }

    #[test]
    fn colour_interpolation_endpoints() {
        assert_eq!(interpolate_color("#000000", "#ffffff", 0.0), "#000000");
        assert_eq!(interpolate_color("#000000", "#ffffff", 1.0), "#ffffff");
        assert_eq!(interpolate_color("#000000", "#ff0000", 0.5), "#800000");
        assert_eq!(interpolate_color("#000000", "#ffffff", f64::NAN), "#000000");
    }
}
