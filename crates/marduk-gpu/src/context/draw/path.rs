use crate::coords::{Matrix, Rect};
use crate::ops::{Clip, Geometry, OpFlags, OpKind};
use crate::paint::{Aa, AaType, Paint};
use crate::shape::{ellipse_points, is_convex, Path, Region, Style};

use crate::context::DrawContext;

impl DrawContext<'_> {
    /// Fills or strokes an arbitrary path.
    ///
    /// A fill with a single convex contour is drawn in one pass. Everything
    /// else goes through the stencil with the path's fill rule.
    pub fn draw_path(&mut self, clip: &Clip, paint: &Paint, aa: Aa, matrix: &Matrix, path: &Path, style: Option<&Style>) {
        if self.was_abandoned() {
            return;
        }
        let style = style.copied().unwrap_or_default();
        if !path.is_finite() || !matrix.is_finite() || !style.is_valid() {
            log::warn!("draw_path with non-finite input; dropped");
            return;
        }
        if path.is_empty() {
            return;
        }

        let aa_type = self.decide_aa(aa, paint.allow_mixed_samples);
        let Style::Stroke { width } = style else {
            let mut contours = self.rasterizer().flatten(path, Self::tolerance(matrix));
            contours.retain(|c| c.points.len() >= 3);
            match contours.as_slice() {
                [] => {}
                [only] if is_convex(&only.points) => {
                    self.fill_convex(clip, OpKind::Path, paint, aa_type, matrix, &Matrix::identity(), &only.points, OpFlags::empty());
                }
                _ => {
                    self.fill_stencil_cover(clip, paint, aa_type, matrix, &contours, path.fill_rule());
                }
            }
            return;
        };
        self.stroke_path(clip, OpKind::Path, paint, aa_type, matrix, path, width);
    }

    /// Fills or strokes the ellipse inscribed in `oval`.
    pub fn draw_oval(&mut self, clip: &Clip, paint: &Paint, aa: Aa, matrix: &Matrix, oval: Rect, style: Option<&Style>) {
        if self.was_abandoned() {
            return;
        }
        let style = style.copied().unwrap_or_default();
        if !oval.is_finite() || !matrix.is_finite() || !style.is_valid() {
            log::warn!("draw_oval with non-finite input; dropped");
            return;
        }
        let oval = oval.normalized();
        if oval.is_empty() {
            return;
        }

        let aa_type = self.decide_aa(aa, paint.allow_mixed_samples);
        let tolerance = Self::tolerance(matrix);
        match style {
            Style::Fill => {
                let poly = self.rasterizer().oval_polygon(oval, tolerance);
                let flags = self.instancing_flags(aa_type);
                self.fill_convex(clip, OpKind::Oval, paint, aa_type, matrix, &Matrix::identity(), &poly, flags);
            }
            Style::Stroke { width } if width == 0.0 => {
                self.stroke_path(clip, OpKind::Oval, paint, aa_type, matrix, &Path::from_oval(oval), 0.0);
            }
            Style::Stroke { width } => {
                let half = width * 0.5;
                let outer = oval.outset(half);
                let inner = oval.outset(-half);
                if inner.is_empty() {
                    self.draw_oval(clip, paint, aa, matrix, outer, None);
                    return;
                }
                // Both rims need the same point count to be stitched.
                let n = self.rasterizer().oval_polygon(outer, tolerance).len();
                let rim = |r: Rect| ellipse_points(r, n);

                let mut geometry = Geometry::new();
                geometry.push_ring(&rim(outer), &rim(inner), matrix, paint.color, 1.0, 1.0);
                if aa_type == AaType::Coverage && matrix.rect_stays_rect() {
                    let fringe = 0.5 / matrix.max_scale().max(1e-6);
                    geometry.push_ring(&rim(outer.outset(fringe)), &rim(outer), matrix, paint.color, 0.0, 1.0);
                    let hole = inner.outset(-fringe);
                    if !hole.is_empty() {
                        geometry.push_ring(&rim(inner), &rim(hole), matrix, paint.color, 1.0, 0.0);
                    }
                }
                let flags = self.instancing_flags(aa_type);
                self.add_mesh(clip, OpKind::Oval, paint, aa_type, geometry, flags);
            }
        }
    }

    /// Elliptical arc of `oval`. Angles are in degrees, clockwise from
    /// 3 o'clock. With `use_center` the arc is a wedge.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_arc(
        &mut self,
        clip: &Clip,
        paint: &Paint,
        aa: Aa,
        matrix: &Matrix,
        oval: Rect,
        start_deg: f32,
        sweep_deg: f32,
        use_center: bool,
        style: Option<&Style>,
    ) {
        if self.was_abandoned() {
            return;
        }
        if !start_deg.is_finite() || !sweep_deg.is_finite() || !oval.is_finite() {
            log::warn!("draw_arc with non-finite input; dropped");
            return;
        }
        if oval.normalized().is_empty() || sweep_deg == 0.0 {
            return;
        }
        if !use_center && sweep_deg.abs() >= 360.0 {
            self.draw_oval(clip, paint, aa, matrix, oval, style);
            return;
        }
        let path = self.rasterizer().arc_path(oval, start_deg, sweep_deg, use_center, Self::tolerance(matrix));
        self.draw_path(clip, paint, aa, matrix, &path, style);
    }

    /// Draws a set of disjoint integer rects. Aliased fills become a single
    /// op of quads.
    pub fn draw_region(&mut self, clip: &Clip, paint: &Paint, aa: Aa, matrix: &Matrix, region: &Region, style: Option<&Style>) {
        if self.was_abandoned() || region.is_empty() {
            return;
        }
        let style = style.copied().unwrap_or_default();
        if style.is_fill() && aa == Aa::No {
            let aa_type = self.decide_aa(Aa::No, paint.allow_mixed_samples);
            let mut geometry = Geometry::new();
            for r in region.rects() {
                geometry.push_quad(Rect::from(*r).corners(), matrix, paint.color);
            }
            self.add_mesh(clip, OpKind::Region, paint, aa_type, geometry, OpFlags::empty());
            return;
        }
        self.draw_path(clip, paint, aa, matrix, &region.to_path(), Some(&style));
    }
}
