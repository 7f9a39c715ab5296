use crate::coords::{RRect, Rect, Vec2};

/// Cubic control-point distance for a quarter circle.
const KAPPA: f32 = 0.552_284_8;

/// Interior rule for filled paths.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PathVerb {
    MoveTo(Vec2),
    LineTo(Vec2),
    QuadTo(Vec2, Vec2),
    CubicTo(Vec2, Vec2, Vec2),
    Close,
}

/// Vector path in local coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    verbs: Vec<PathVerb>,
    fill_rule: FillRule,
}

impl Path {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rect(rect: Rect) -> Self {
        let mut p = Self::new();
        p.add_rect(rect);
        p
    }

    pub fn from_rrect(rrect: &RRect) -> Self {
        let mut p = Self::new();
        p.add_rrect(rrect);
        p
    }

    pub fn from_oval(oval: Rect) -> Self {
        let mut p = Self::new();
        p.add_oval(oval);
        p
    }

    /// Polyline through `points`, closed when `close` is set.
    pub fn from_polygon(points: &[Vec2], close: bool) -> Self {
        let mut p = Self::new();
        if let Some((first, rest)) = points.split_first() {
            p.move_to(*first);
            for pt in rest {
                p.line_to(*pt);
            }
            if close {
                p.close();
            }
        }
        p
    }

    #[inline]
    pub fn with_fill_rule(mut self, rule: FillRule) -> Self {
        self.fill_rule = rule;
        self
    }

    #[inline]
    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    #[inline]
    pub fn set_fill_rule(&mut self, rule: FillRule) {
        self.fill_rule = rule;
    }

    #[inline]
    pub fn verbs(&self) -> &[PathVerb] {
        &self.verbs
    }

    /// True when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        !self.verbs.iter().any(|v| !matches!(v, PathVerb::MoveTo(_) | PathVerb::Close))
    }

    pub fn move_to(&mut self, p: Vec2) -> &mut Self {
        self.verbs.push(PathVerb::MoveTo(p));
        self
    }

    pub fn line_to(&mut self, p: Vec2) -> &mut Self {
        self.ensure_contour();
        self.verbs.push(PathVerb::LineTo(p));
        self
    }

    pub fn quad_to(&mut self, c: Vec2, p: Vec2) -> &mut Self {
        self.ensure_contour();
        self.verbs.push(PathVerb::QuadTo(c, p));
        self
    }

    pub fn cubic_to(&mut self, c0: Vec2, c1: Vec2, p: Vec2) -> &mut Self {
        self.ensure_contour();
        self.verbs.push(PathVerb::CubicTo(c0, c1, p));
        self
    }

    pub fn close(&mut self) -> &mut Self {
        if matches!(self.verbs.last(), Some(v) if !matches!(v, PathVerb::Close)) {
            self.verbs.push(PathVerb::Close);
        }
        self
    }

    /// Appends a clockwise rectangle contour.
    pub fn add_rect(&mut self, rect: Rect) -> &mut Self {
        let [a, b, c, d] = rect.normalized().corners();
        self.move_to(a).line_to(b).line_to(c).line_to(d).close()
    }

    /// Appends a clockwise rounded-rect contour.
    pub fn add_rrect(&mut self, rrect: &RRect) -> &mut Self {
        if rrect.is_rect() {
            return self.add_rect(rrect.rect());
        }
        let r = rrect.rect();
        let radii = rrect.radii();
        let (l, t, rt, b) = (r.left(), r.top(), r.right(), r.bottom());
        let (tl, tr, br, bl) = (radii.top_left, radii.top_right, radii.bottom_right, radii.bottom_left);
        let k = 1.0 - KAPPA;

        self.move_to(Vec2::new(l + tl, t));
        self.line_to(Vec2::new(rt - tr, t));
        self.cubic_to(Vec2::new(rt - tr * k, t), Vec2::new(rt, t + tr * k), Vec2::new(rt, t + tr));
        self.line_to(Vec2::new(rt, b - br));
        self.cubic_to(Vec2::new(rt, b - br * k), Vec2::new(rt - br * k, b), Vec2::new(rt - br, b));
        self.line_to(Vec2::new(l + bl, b));
        self.cubic_to(Vec2::new(l + bl * k, b), Vec2::new(l, b - bl * k), Vec2::new(l, b - bl));
        self.line_to(Vec2::new(l, t + tl));
        self.cubic_to(Vec2::new(l, t + tl * k), Vec2::new(l + tl * k, t), Vec2::new(l + tl, t));
        self.close()
    }

    /// Appends a clockwise ellipse contour inscribed in `oval`.
    pub fn add_oval(&mut self, oval: Rect) -> &mut Self {
        let r = oval.normalized();
        let c = r.center();
        let (rx, ry) = (r.width() * 0.5, r.height() * 0.5);
        let (kx, ky) = (rx * KAPPA, ry * KAPPA);

        self.move_to(Vec2::new(c.x + rx, c.y));
        self.cubic_to(Vec2::new(c.x + rx, c.y + ky), Vec2::new(c.x + kx, c.y + ry), Vec2::new(c.x, c.y + ry));
        self.cubic_to(Vec2::new(c.x - kx, c.y + ry), Vec2::new(c.x - rx, c.y + ky), Vec2::new(c.x - rx, c.y));
        self.cubic_to(Vec2::new(c.x - rx, c.y - ky), Vec2::new(c.x - kx, c.y - ry), Vec2::new(c.x, c.y - ry));
        self.cubic_to(Vec2::new(c.x + kx, c.y - ry), Vec2::new(c.x + rx, c.y - ky), Vec2::new(c.x + rx, c.y));
        self.close()
    }

    /// Appends every contour of `other`.
    pub fn add_path(&mut self, other: &Path) -> &mut Self {
        self.verbs.extend_from_slice(&other.verbs);
        self
    }

    /// Bounds of all points, control points included.
    pub fn bounds(&self) -> Option<Rect> {
        let mut pts = Vec::with_capacity(self.verbs.len() * 2);
        for v in &self.verbs {
            match *v {
                PathVerb::MoveTo(p) | PathVerb::LineTo(p) => pts.push(p),
                PathVerb::QuadTo(c, p) => pts.extend([c, p]),
                PathVerb::CubicTo(c0, c1, p) => pts.extend([c0, c1, p]),
                PathVerb::Close => {}
            }
        }
        Rect::bounding(&pts)
    }

    pub fn is_finite(&self) -> bool {
        self.verbs.iter().all(|v| match *v {
            PathVerb::MoveTo(p) | PathVerb::LineTo(p) => p.is_finite(),
            PathVerb::QuadTo(c, p) => c.is_finite() && p.is_finite(),
            PathVerb::CubicTo(c0, c1, p) => c0.is_finite() && c1.is_finite() && p.is_finite(),
            PathVerb::Close => true,
        })
    }

    fn ensure_contour(&mut self) {
        let needs_move = match self.verbs.last() {
            None => true,
            Some(PathVerb::Close) => true,
            Some(_) => false,
        };
        if needs_move {
            let start = self.last_move_point().unwrap_or_default();
            self.verbs.push(PathVerb::MoveTo(start));
        }
    }

    fn last_move_point(&self) -> Option<Vec2> {
        self.verbs.iter().rev().find_map(|v| match v {
            PathVerb::MoveTo(p) => Some(*p),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_open_contours_implicitly() {
        let mut p = Path::new();
        p.line_to(Vec2::new(1.0, 0.0));
        assert!(matches!(p.verbs()[0], PathVerb::MoveTo(_)));
        assert!(!p.is_empty());
    }

    #[test]
    fn only_moves_is_empty() {
        let mut p = Path::new();
        p.move_to(Vec2::zero()).close();
        assert!(p.is_empty());
    }

    #[test]
    fn oval_bounds_match_rect() {
        let r = Rect::new(2.0, 4.0, 10.0, 6.0);
        let b = Path::from_oval(r).bounds().unwrap();
        assert!((b.left() - 2.0).abs() < 1e-5 && (b.bottom() - 10.0).abs() < 1e-5);
    }

    #[test]
    fn rect_rrect_degenerates_to_rect() {
        let r = Rect::new(0.0, 0.0, 4.0, 4.0);
        assert_eq!(Path::from_rrect(&RRect::from_rect(r)), Path::from_rect(r));
    }
}
