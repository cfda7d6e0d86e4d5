//! Scales, polar math and path number formatting

use std::f64::consts::PI;

/// Plot area inside a canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn inner_width(&self, width: f64) -> f64 {
        (width - self.left - self.right).max(0.0)
    }

    pub fn inner_height(&self, height: f64) -> f64 {
        (height - self.top - self.bottom).max(0.0)
    }
}

/// Linear mapping from a data domain onto a pixel range
///
/// A degenerate domain (min == max) maps everything to the middle of the range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Scale over the min/max of `values`
    pub fn fit(values: impl IntoIterator<Item = f64>, range: (f64, f64)) -> Self {
        let (min, max) = values
            .into_iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if min.is_finite() && max.is_finite() {
            Self::new((min, max), range)
        } else {
            Self::new((0.0, 0.0), range)
        }
    }

    pub fn is_degenerate(&self) -> bool {
        (self.domain.1 - self.domain.0).abs() < f64::EPSILON
    }

    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if self.is_degenerate() {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }
}

/// Point at `angle` radians on a circle (0 = 3 o'clock, clockwise in screen space)
pub fn polar(cx: f64, cy: f64, radius: f64, angle: f64) -> (f64, f64) {
    (cx + radius * angle.cos(), cy + radius * angle.sin())
}

/// SVG large-arc flag for a sweep in radians
pub fn large_arc(sweep: f64) -> u8 {
    u8::from(sweep > PI)
}

/// Compact coordinate for path data: 2 decimals, trailing zeros dropped
pub fn num(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}
