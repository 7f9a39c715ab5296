use crate::coords::Vec2;

use super::Color;

/// Gradient spread behavior outside [0, 1] range.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SpreadMode {
    /// Clamp to edge stops.
    Pad,
    /// Repeat the gradient pattern.
    Repeat,
    /// Mirror-repeat the gradient pattern.
    Reflect,
}

impl SpreadMode {
    #[inline]
    fn apply(self, t: f32) -> f32 {
        match self {
            SpreadMode::Pad => t.clamp(0.0, 1.0),
            SpreadMode::Repeat => t - t.floor(),
            SpreadMode::Reflect => {
                let m = t.rem_euclid(2.0);
                if m > 1.0 { 2.0 - m } else { m }
            }
        }
    }
}

/// A single gradient stop.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ColorStop {
    pub t: f32,
    pub color: Color,
}

impl ColorStop {
    #[inline]
    pub const fn new(t: f32, color: Color) -> Self {
        Self { t, color }
    }
}

/// Linear gradient in local (pre-view-matrix) coordinates.
///
/// Stops are premultiplied and expected in ascending `t` order.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub start: Vec2,
    pub end: Vec2,
    pub stops: Vec<ColorStop>,
    pub spread: SpreadMode,
}

impl LinearGradient {
    pub fn new(start: Vec2, end: Vec2, stops: Vec<ColorStop>, spread: SpreadMode) -> Self {
        Self { start, end, stops, spread }
    }

    /// True when the definition can be evaluated.
    pub fn is_valid(&self) -> bool {
        self.start.is_finite()
            && self.end.is_finite()
            && self.stops.iter().all(|s| s.t.is_finite() && s.color.is_finite())
            && self.stops.len() >= 2
            && self.start != self.end
    }

    /// True when every stop is opaque.
    pub fn is_opaque(&self) -> bool {
        self.stops.iter().all(|s| s.color.is_opaque())
    }

    /// Evaluates the gradient at local point `p`.
    pub fn eval(&self, p: Vec2) -> Color {
        let Some(first) = self.stops.first() else { return Color::TRANSPARENT };
        let axis = self.end - self.start;
        let len2 = axis.dot(axis);
        if len2 <= 0.0 || self.stops.len() == 1 {
            return first.color;
        }
        let t = self.spread.apply((p - self.start).dot(axis) / len2);

        let mut prev = *first;
        for stop in &self.stops {
            if t <= stop.t {
                let span = stop.t - prev.t;
                if span <= 0.0 {
                    return stop.color;
                }
                let k = (t - prev.t) / span;
                return lerp(prev.color, stop.color, k);
            }
            prev = *stop;
        }
        prev.color
    }
}

#[inline]
fn lerp(a: Color, b: Color, k: f32) -> Color {
    Color::from_premul(
        a.r + (b.r - a.r) * k,
        a.g + (b.g - a.g) * k,
        a.b + (b.b - a.b) * k,
        a.a + (b.a - a.a) * k,
    )
}
