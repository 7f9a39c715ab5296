use super::{Rect, Vec2};

/// 2D affine transform.
///
/// Maps `(x, y)` to `(sx·x + kx·y + tx, ky·x + sy·y + ty)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Matrix {
    pub sx: f32,
    pub kx: f32,
    pub tx: f32,
    pub ky: f32,
    pub sy: f32,
    pub ty: f32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    #[inline]
    pub const fn identity() -> Self {
        Self { sx: 1.0, kx: 0.0, tx: 0.0, ky: 0.0, sy: 1.0, ty: 0.0 }
    }

    #[inline]
    pub const fn translate(tx: f32, ty: f32) -> Self {
        Self { sx: 1.0, kx: 0.0, tx, ky: 0.0, sy: 1.0, ty }
    }

    #[inline]
    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self { sx, kx: 0.0, tx: 0.0, ky: 0.0, sy, ty: 0.0 }
    }

    /// Rotation by `radians` (clockwise on screen, since +Y is down).
    pub fn rotate(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        Self { sx: c, kx: -s, tx: 0.0, ky: s, sy: c, ty: 0.0 }
    }

    /// Transform that applies `self` first, then `next`.
    pub fn then(self, next: Matrix) -> Matrix {
        Matrix {
            sx: next.sx * self.sx + next.kx * self.ky,
            kx: next.sx * self.kx + next.kx * self.sy,
            tx: next.sx * self.tx + next.kx * self.ty + next.tx,
            ky: next.ky * self.sx + next.sy * self.ky,
            sy: next.ky * self.kx + next.sy * self.sy,
            ty: next.ky * self.tx + next.sy * self.ty + next.ty,
        }
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    #[inline]
    pub fn is_translate(&self) -> bool {
        self.sx == 1.0 && self.sy == 1.0 && self.kx == 0.0 && self.ky == 0.0
    }

    /// True when axis-aligned rects map to axis-aligned rects.
    #[inline]
    pub fn rect_stays_rect(&self) -> bool {
        (self.kx == 0.0 && self.ky == 0.0 && self.sx != 0.0 && self.sy != 0.0)
            || (self.sx == 0.0 && self.sy == 0.0 && self.kx != 0.0 && self.ky != 0.0)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        [self.sx, self.kx, self.tx, self.ky, self.sy, self.ty].iter().all(|v| v.is_finite())
    }

    #[inline]
    pub fn determinant(&self) -> f32 {
        self.sx * self.sy - self.kx * self.ky
    }

    pub fn invert(&self) -> Option<Matrix> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        let m = Matrix {
            sx: self.sy * inv,
            kx: -self.kx * inv,
            tx: (self.kx * self.ty - self.sy * self.tx) * inv,
            ky: -self.ky * inv,
            sy: self.sx * inv,
            ty: (self.ky * self.tx - self.sx * self.ty) * inv,
        };
        m.is_finite().then_some(m)
    }

    #[inline]
    pub fn map_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.sx * p.x + self.kx * p.y + self.tx,
            self.ky * p.x + self.sy * p.y + self.ty,
        )
    }

    /// Maps a vector (ignores translation).
    #[inline]
    pub fn map_vector(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.sx * v.x + self.kx * v.y, self.ky * v.x + self.sy * v.y)
    }

    /// Device-space bounds of a mapped rect.
    pub fn map_rect(&self, r: Rect) -> Rect {
        let pts = r.corners().map(|c| self.map_point(c));
        Rect::bounding(&pts).unwrap_or_default()
    }

    /// Largest stretch applied to any unit vector. Used to size strokes and
    /// tessellation tolerance in device space.
    pub fn max_scale(&self) -> f32 {
        let a = self.sx * self.sx + self.ky * self.ky;
        let b = self.sx * self.kx + self.ky * self.sy;
        let c = self.kx * self.kx + self.sy * self.sy;
        let mid = (a + c) * 0.5;
        let rad = (((a - c) * 0.5).powi(2) + b * b).sqrt();
        (mid + rad).max(0.0).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn then_applies_in_order() {
        let m = Matrix::scale(2.0, 2.0).then(Matrix::translate(10.0, 0.0));
        assert!(close(m.map_point(Vec2::new(1.0, 1.0)), Vec2::new(12.0, 2.0)));
    }

    #[test]
    fn invert_round_trips_points() {
        let m = Matrix::rotate(0.7).then(Matrix::translate(3.0, -4.0)).then(Matrix::scale(2.0, 0.5));
        let inv = m.invert().unwrap();
        let p = Vec2::new(5.0, 7.0);
        assert!(close(inv.map_point(m.map_point(p)), p));
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        assert!(Matrix::scale(0.0, 1.0).invert().is_none());
    }

    #[test]
    fn rotation_does_not_keep_rects() {
        assert!(Matrix::scale(2.0, 3.0).rect_stays_rect());
        assert!(!Matrix::rotate(0.3).rect_stays_rect());
        assert!((Matrix::rotate(0.3).max_scale() - 1.0).abs() < 1e-4);
    }
}
