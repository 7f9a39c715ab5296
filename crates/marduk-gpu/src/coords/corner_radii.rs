/// Per-corner radii for a rounded rectangle.
///
/// Corners follow CSS convention: top-left, top-right, bottom-right, bottom-left.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct CornerRadii {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl CornerRadii {
    #[inline]
    pub const fn new(top_left: f32, top_right: f32, bottom_right: f32, bottom_left: f32) -> Self {
        Self { top_left, top_right, bottom_right, bottom_left }
    }

    /// Uniform radius on all four corners.
    #[inline]
    pub const fn all(r: f32) -> Self {
        Self { top_left: r, top_right: r, bottom_right: r, bottom_left: r }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self::all(0.0)
    }

    /// Radii in corner order (TL, TR, BR, BL).
    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.top_left, self.top_right, self.bottom_right, self.bottom_left]
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        self.to_array().iter().all(|r| *r <= 0.0)
    }

    #[inline]
    pub fn is_uniform(self) -> bool {
        let [a, b, c, d] = self.to_array();
        a == b && b == c && c == d
    }

    /// Clamps negatives to zero and scales all radii down uniformly so adjacent
    /// corners never overlap on a `w` x `h` rect.
    pub fn fitted(self, w: f32, h: f32) -> Self {
        let [tl, tr, br, bl] = self.to_array().map(|r| r.max(0.0));
        let mut scale = 1.0f32;
        for (sum, side) in [(tl + tr, w), (bl + br, w), (tl + bl, h), (tr + br, h)] {
            if sum > side && sum > 0.0 {
                scale = scale.min(side / sum);
            }
        }
        Self::new(tl * scale, tr * scale, br * scale, bl * scale)
    }
}
