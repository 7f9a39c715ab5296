use super::{CornerRadii, Rect, Vec2};

/// Rounded rectangle: bounds plus per-corner circular radii.
///
/// Radii are fitted to the bounds on construction, so a stored `RRect` never has
/// overlapping corners.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct RRect {
    rect: Rect,
    radii: CornerRadii,
}

impl RRect {
    pub fn new(rect: Rect, radii: CornerRadii) -> Self {
        let rect = rect.normalized();
        Self { rect, radii: radii.fitted(rect.width(), rect.height()) }
    }

    #[inline]
    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect, CornerRadii::zero())
    }

    #[inline]
    pub fn from_rect_radius(rect: Rect, radius: f32) -> Self {
        Self::new(rect, CornerRadii::all(radius))
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    #[inline]
    pub fn radii(&self) -> CornerRadii {
        self.radii
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rect.is_empty()
    }

    /// No rounding at all.
    #[inline]
    pub fn is_rect(&self) -> bool {
        self.radii.is_zero()
    }

    /// Same radius on every corner.
    #[inline]
    pub fn is_simple(&self) -> bool {
        self.radii.is_uniform()
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }

    /// Grows the bounds by `d` on every side and the radii by `d` (radii of zero
    /// stay square).
    pub fn outset(&self, d: f32) -> RRect {
        let grow = |r: f32| if r > 0.0 { (r + d).max(0.0) } else { 0.0 };
        let [tl, tr, br, bl] = self.radii.to_array().map(grow);
        RRect::new(self.rect.outset(d), CornerRadii::new(tl, tr, br, bl))
    }

    /// True when `inner` is fully enclosed, checked conservatively against the
    /// corner insets.
    pub fn contains(&self, inner: &RRect) -> bool {
        if !self.rect.contains_rect(inner.rect) {
            return false;
        }
        let max_r = self.radii.to_array().iter().copied().fold(0.0f32, f32::max);
        self.rect.outset(-max_r * (1.0 - core::f32::consts::FRAC_1_SQRT_2)).contains_rect(inner.rect)
    }
}
