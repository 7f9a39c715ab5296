use std::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::coords::{RRect, Rect, Vec2};

use super::{Path, PathVerb};

const MAX_CURVE_SEGMENTS: usize = 128;
const MIN_OVAL_SEGMENTS: usize = 8;
const MAX_OVAL_SEGMENTS: usize = 256;

/// A flattened path contour.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contour {
    pub points: Vec<Vec2>,
    pub closed: bool,
}

/// Turns curved and stroked geometry into polygons and triangles.
///
/// All input and output is in local coordinates. `tolerance` is the largest
/// allowed distance between the true curve and its approximation, in the same
/// units.
pub trait ShapeRasterizer {
    /// Flattens every contour of `path` into line segments.
    fn flatten(&self, path: &Path, tolerance: f32) -> Vec<Contour>;

    /// Triangle list (three points per triangle) covering a stroke of `width`.
    /// Triangles may overlap at joins.
    fn stroke(&self, path: &Path, width: f32, tolerance: f32) -> Vec<Vec2>;

    /// Clockwise polygon approximating the ellipse inscribed in `oval`.
    fn oval_polygon(&self, oval: Rect, tolerance: f32) -> Vec<Vec2>;

    /// Clockwise polygon of a rounded rect with `segments` steps per corner.
    ///
    /// Always yields `4 * (segments + 1)` points, so polygons of two rrects
    /// with the same `segments` can be stitched into a ring.
    fn rrect_polygon(&self, rrect: &RRect, segments: usize) -> Vec<Vec2>;

    /// Elliptical arc as a path. With `use_center` the path is a closed
    /// wedge; otherwise it is the open arc.
    fn arc_path(&self, oval: Rect, start_deg: f32, sweep_deg: f32, use_center: bool, tolerance: f32) -> Path;
}

/// Steps needed so a circular arc of `radius` deviates at most `tolerance`
/// per quarter turn.
pub fn corner_segments(radius: f32, tolerance: f32) -> usize {
    if radius <= tolerance || tolerance <= 0.0 {
        return 1;
    }
    let step = 2.0 * (1.0 - tolerance / radius).clamp(-1.0, 1.0).acos();
    ((FRAC_PI_2 / step).ceil() as usize).clamp(1, MAX_CURVE_SEGMENTS / 4)
}

/// `n` clockwise points on the ellipse inscribed in `oval`, starting at 3 o'clock.
pub fn ellipse_points(oval: Rect, n: usize) -> Vec<Vec2> {
    let c = oval.center();
    let (rx, ry) = (oval.width() * 0.5, oval.height() * 0.5);
    (0..n)
        .map(|i| {
            let (s, co) = (TAU * i as f32 / n as f32).sin_cos();
            Vec2::new(c.x + rx * co, c.y + ry * s)
        })
        .collect()
}

/// True when the polygon turns consistently in one direction.
pub fn is_convex(points: &[Vec2]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut sign = 0.0f32;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        let cross = (b - a).cross(c - b);
        if cross.abs() <= f32::EPSILON {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    sign != 0.0
}

/// Moves `c` into `out` when it has a segment, otherwise resets it.
fn finish(c: &mut Contour, out: &mut Vec<Contour>) {
    if c.points.len() > 1 {
        out.push(std::mem::take(c));
    } else {
        c.points.clear();
        c.closed = false;
    }
}

/// Default flattening and stroking.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicRasterizer;

impl BasicRasterizer {
    fn curve_segments(deviation: f32, tolerance: f32) -> usize {
        if tolerance <= 0.0 {
            return MAX_CURVE_SEGMENTS;
        }
        ((deviation / (8.0 * tolerance)).sqrt().ceil() as usize).clamp(1, MAX_CURVE_SEGMENTS)
    }
}

impl ShapeRasterizer for BasicRasterizer {
    fn flatten(&self, path: &Path, tolerance: f32) -> Vec<Contour> {
        let mut out: Vec<Contour> = Vec::new();
        let mut current = Contour::default();
        let mut last = Vec2::zero();

        for verb in path.verbs() {
            match *verb {
                PathVerb::MoveTo(p) => {
                    finish(&mut current, &mut out);
                    current.points.push(p);
                    last = p;
                }
                PathVerb::LineTo(p) => {
                    current.points.push(p);
                    last = p;
                }
                PathVerb::QuadTo(c, p) => {
                    let dev = (last - c * 2.0 + p).length() * 2.0;
                    let n = Self::curve_segments(dev, tolerance);
                    for i in 1..=n {
                        let t = i as f32 / n as f32;
                        let u = 1.0 - t;
                        current.points.push(last * (u * u) + c * (2.0 * u * t) + p * (t * t));
                    }
                    last = p;
                }
                PathVerb::CubicTo(c0, c1, p) => {
                    let d0 = (last - c0 * 2.0 + c1).length();
                    let d1 = (c0 - c1 * 2.0 + p).length();
                    let n = Self::curve_segments(d0.max(d1) * 6.0, tolerance);
                    for i in 1..=n {
                        let t = i as f32 / n as f32;
                        let u = 1.0 - t;
                        current.points.push(
                            last * (u * u * u) + c0 * (3.0 * u * u * t) + c1 * (3.0 * u * t * t) + p * (t * t * t),
                        );
                    }
                    last = p;
                }
                PathVerb::Close => {
                    current.closed = true;
                    if let Some(first) = current.points.first().copied() {
                        last = first;
                        if current.points.len() > 1 && current.points.last() == Some(&first) {
                            current.points.pop();
                        }
                    }
                    finish(&mut current, &mut out);
                    current.points.push(last);
                }
            }
        }
        finish(&mut current, &mut out);
        out
    }

    fn stroke(&self, path: &Path, width: f32, tolerance: f32) -> Vec<Vec2> {
        let hw = width * 0.5;
        let mut tris = Vec::new();
        for contour in self.flatten(path, tolerance) {
            let pts = &contour.points;
            let n = pts.len();
            let seg_count = if contour.closed { n } else { n - 1 };
            let normal = |i: usize| (pts[(i + 1) % n] - pts[i]).normalized().perp() * hw;

            for i in 0..seg_count {
                let a = pts[i];
                let b = pts[(i + 1) % n];
                let nrm = normal(i);
                if nrm == Vec2::zero() {
                    continue;
                }
                tris.extend_from_slice(&[a + nrm, b + nrm, b - nrm, a + nrm, b - nrm, a - nrm]);
            }

            // Bevel joins on both sides of every interior vertex.
            let joins = if contour.closed { n } else { n.saturating_sub(2) };
            for j in 0..joins {
                let (prev, next) = if contour.closed { ((j + n - 1) % n, j) } else { (j, j + 1) };
                let v = pts[(prev + 1) % n];
                let (n0, n1) = (normal(prev), normal(next));
                tris.extend_from_slice(&[v, v + n0, v + n1, v, v - n1, v - n0]);
            }
        }
        tris
    }

    fn oval_polygon(&self, oval: Rect, tolerance: f32) -> Vec<Vec2> {
        let r = oval.normalized();
        let (rx, ry) = (r.width() * 0.5, r.height() * 0.5);
        let n = (corner_segments(rx.max(ry), tolerance) * 4).clamp(MIN_OVAL_SEGMENTS, MAX_OVAL_SEGMENTS);
        ellipse_points(r, n)
    }

    fn rrect_polygon(&self, rrect: &RRect, segments: usize) -> Vec<Vec2> {
        let r = rrect.rect();
        let radii = rrect.radii();
        let segments = segments.max(1);
        // (corner radius, arc center, start angle) clockwise from top-left.
        let corners = [
            (radii.top_left, Vec2::new(r.left() + radii.top_left, r.top() + radii.top_left), PI),
            (radii.top_right, Vec2::new(r.right() - radii.top_right, r.top() + radii.top_right), 1.5 * PI),
            (radii.bottom_right, Vec2::new(r.right() - radii.bottom_right, r.bottom() - radii.bottom_right), 0.0),
            (radii.bottom_left, Vec2::new(r.left() + radii.bottom_left, r.bottom() - radii.bottom_left), FRAC_PI_2),
        ];

        let mut out = Vec::with_capacity(4 * (segments + 1));
        for (radius, center, start) in corners {
            for i in 0..=segments {
                let (s, c) = (start + FRAC_PI_2 * i as f32 / segments as f32).sin_cos();
                out.push(Vec2::new(center.x + radius * c, center.y + radius * s));
            }
        }
        out
    }

    fn arc_path(&self, oval: Rect, start_deg: f32, sweep_deg: f32, use_center: bool, tolerance: f32) -> Path {
        let r = oval.normalized();
        let c = r.center();
        let (rx, ry) = (r.width() * 0.5, r.height() * 0.5);
        let sweep = sweep_deg.clamp(-360.0, 360.0).to_radians();
        let start = start_deg.to_radians();

        let full = corner_segments(rx.max(ry), tolerance) * 4;
        let n = ((full as f32 * sweep.abs() / TAU).ceil() as usize).max(1);
        let point = |t: f32| {
            let (s, co) = t.sin_cos();
            Vec2::new(c.x + rx * co, c.y + ry * s)
        };

        let mut path = Path::new();
        if use_center {
            path.move_to(c);
            path.line_to(point(start));
        } else {
            path.move_to(point(start));
        }
        for i in 1..=n {
            path.line_to(point(start + sweep * i as f32 / n as f32));
        }
        if use_center {
            path.close();
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::FillRule;

    const TOL: f32 = 0.25;

    // ── flatten ────────────────────────────────────────────────────────────

    #[test]
    fn rect_flattens_to_four_closed_points() {
        let contours = BasicRasterizer.flatten(&Path::from_rect(Rect::new(0.0, 0.0, 4.0, 4.0)), TOL);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].points.len(), 4);
        assert!(contours[0].closed);
    }

    #[test]
    fn multiple_contours_are_kept_apart() {
        let mut p = Path::new().with_fill_rule(FillRule::EvenOdd);
        p.add_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        p.add_rect(Rect::new(2.0, 2.0, 2.0, 2.0));
        let contours = BasicRasterizer.flatten(&p, TOL);
        assert_eq!(contours.len(), 2);
    }

    #[test]
    fn curves_stay_within_tolerance() {
        let oval = Rect::new(0.0, 0.0, 100.0, 100.0);
        let contours = BasicRasterizer.flatten(&Path::from_oval(oval), TOL);
        let c = oval.center();
        for p in &contours[0].points {
            assert!(((*p - c).length() - 50.0).abs() < 0.5);
        }
    }

    // ── polygons ───────────────────────────────────────────────────────────

    #[test]
    fn convexity() {
        let square = Rect::new(0.0, 0.0, 4.0, 4.0).corners();
        assert!(is_convex(&square));
        let arrow = [
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 2.0),
            Vec2::new(0.0, 4.0),
            Vec2::new(1.0, 2.0),
        ];
        assert!(!is_convex(&arrow));
    }

    #[test]
    fn rrect_polygons_have_stable_counts() {
        let a = RRect::from_rect_radius(Rect::new(0.0, 0.0, 20.0, 20.0), 5.0);
        let b = RRect::from_rect(Rect::new(5.0, 5.0, 10.0, 10.0));
        assert_eq!(BasicRasterizer.rrect_polygon(&a, 3).len(), 16);
        assert_eq!(BasicRasterizer.rrect_polygon(&b, 3).len(), 16);
        assert!(is_convex(&BasicRasterizer.rrect_polygon(&a, 3)));
    }

    #[test]
    fn oval_polygon_is_clockwise_and_convex() {
        let poly = BasicRasterizer.oval_polygon(Rect::new(0.0, 0.0, 10.0, 6.0), TOL);
        assert!(poly.len() >= MIN_OVAL_SEGMENTS);
        assert!(crate::ops::signed_area(&poly) > 0.0);
        assert!(is_convex(&poly));
    }

    // ── strokes / arcs ─────────────────────────────────────────────────────

    #[test]
    fn open_line_stroke_is_one_quad() {
        let p = Path::from_polygon(&[Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0)], false);
        let tris = BasicRasterizer.stroke(&p, 2.0, TOL);
        assert_eq!(tris.len(), 6);
        let b = Rect::bounding(&tris).unwrap();
        assert_eq!(b, Rect::from_ltrb(0.0, -1.0, 10.0, 1.0));
    }

    #[test]
    fn wedge_starts_at_center() {
        let path = BasicRasterizer.arc_path(Rect::new(0.0, 0.0, 10.0, 10.0), 0.0, 90.0, true, TOL);
        assert_eq!(path.verbs()[0], PathVerb::MoveTo(Vec2::new(5.0, 5.0)));
        assert_eq!(path.verbs().last(), Some(&PathVerb::Close));
    }

    #[test]
    fn open_arc_is_not_closed() {
        let path = BasicRasterizer.arc_path(Rect::new(0.0, 0.0, 10.0, 10.0), 0.0, 90.0, false, TOL);
        assert!(!BasicRasterizer.flatten(&path, TOL)[0].closed);
    }
}
