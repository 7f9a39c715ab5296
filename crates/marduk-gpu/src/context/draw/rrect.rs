use crate::coords::{Matrix, RRect};
use crate::ops::{Clip, Geometry, OpFlags, OpKind};
use crate::paint::{Aa, AaType, Paint};
use crate::shape::{corner_segments, FillRule, Path, Style};

use crate::context::DrawContext;

impl DrawContext<'_> {
    /// Fills or strokes a rounded rect. Square corners route to [`draw_rect`].
    ///
    /// [`draw_rect`]: DrawContext::draw_rect
    pub fn draw_rrect(&mut self, clip: &Clip, paint: &Paint, aa: Aa, matrix: &Matrix, rrect: &RRect, style: Option<&Style>) {
        if self.was_abandoned() {
            return;
        }
        let style = style.copied().unwrap_or_default();
        if !rrect.rect().is_finite() || !matrix.is_finite() || !style.is_valid() {
            log::warn!("draw_rrect with non-finite input; dropped");
            return;
        }
        if rrect.is_empty() {
            return;
        }
        if rrect.radii().is_zero() {
            self.draw_rect(clip, paint, aa, matrix, rrect.rect(), Some(&style));
            return;
        }

        let aa_type = self.decide_aa(aa, paint.allow_mixed_samples);
        match style {
            Style::Fill => {
                let poly = self.rasterizer().rrect_polygon(rrect, self.rrect_segments(rrect, matrix));
                let flags = self.instancing_flags(aa_type);
                self.fill_convex(clip, OpKind::RRect, paint, aa_type, matrix, &Matrix::identity(), &poly, flags);
            }
            Style::Stroke { width } if width == 0.0 => {
                self.stroke_path(clip, OpKind::RRect, paint, aa_type, matrix, &Path::from_rrect(rrect), 0.0);
            }
            Style::Stroke { width } => {
                let half = width * 0.5;
                let outer = rrect.outset(half);
                if rrect.rect().outset(-half).is_empty() {
                    self.draw_rrect(clip, paint, aa, matrix, &outer, None);
                    return;
                }
                let inner = rrect.outset(-half);
                let segments = self.rrect_segments(&outer, matrix);
                let mut geometry = Geometry::new();
                self.push_rrect_band(&mut geometry, &outer, &inner, segments, matrix, paint, aa_type);
                let flags = self.instancing_flags(aa_type);
                self.add_mesh(clip, OpKind::RRect, paint, aa_type, geometry, flags);
            }
        }
    }

    /// Rounded rect with a soft edge fading out over `blur_radius`.
    pub fn draw_shadow_rrect(
        &mut self,
        clip: &Clip,
        paint: &Paint,
        matrix: &Matrix,
        rrect: &RRect,
        blur_radius: f32,
        style: Option<&Style>,
    ) {
        if self.was_abandoned() {
            return;
        }
        let style = style.copied().unwrap_or_default();
        if !blur_radius.is_finite() || blur_radius < 0.0 || !rrect.rect().is_finite() || !style.is_valid() {
            log::warn!("draw_shadow_rrect with invalid input; dropped");
            return;
        }
        if rrect.is_empty() {
            return;
        }
        if blur_radius == 0.0 {
            self.draw_rrect(clip, paint, Aa::Yes, matrix, rrect, Some(&style));
            return;
        }

        let segments = self.rrect_segments(&rrect.outset(blur_radius), matrix);
        let raster = self.rasterizer();
        let poly = |r: &RRect| raster.rrect_polygon(r, segments);
        let mut geometry = Geometry::new();

        let (solid_outer, solid_inner) = match style {
            Style::Fill => (*rrect, None),
            Style::Stroke { width } => {
                let half = if width == 0.0 { 0.5 / matrix.max_scale().max(1e-6) } else { width * 0.5 };
                let inner_rect = rrect.rect().outset(-half);
                let inner = (!inner_rect.is_empty()).then(|| rrect.outset(-half));
                (rrect.outset(half), inner)
            }
        };

        match solid_inner {
            None => geometry.push_convex(&poly(&solid_outer), matrix, &Matrix::identity(), paint.color, false),
            Some(inner) => {
                geometry.push_ring(&poly(&solid_outer), &poly(&inner), matrix, paint.color, 1.0, 1.0);
                if !inner.rect().outset(-blur_radius).is_empty() {
                    let hole = inner.outset(-blur_radius);
                    geometry.push_ring(&poly(&inner), &poly(&hole), matrix, paint.color, 1.0, 0.0);
                }
            }
        }
        let halo = solid_outer.outset(blur_radius);
        geometry.push_ring(&poly(&halo), &poly(&solid_outer), matrix, paint.color, 0.0, 1.0);

        self.add_mesh(clip, OpKind::ShadowRRect, paint, AaType::Coverage, geometry, OpFlags::empty());
    }

    /// Fills the area between `outer` and `inner`.
    ///
    /// Concentric pairs become one ring op; anything else is filled even-odd
    /// through the stencil.
    pub fn draw_drrect(&mut self, clip: &Clip, paint: &Paint, aa: Aa, matrix: &Matrix, outer: &RRect, inner: &RRect) {
        if self.was_abandoned() {
            return;
        }
        if !outer.rect().is_finite() || !inner.rect().is_finite() || !matrix.is_finite() {
            log::warn!("draw_drrect with non-finite input; dropped");
            return;
        }
        if outer.is_empty() {
            return;
        }
        if inner.is_empty() {
            self.draw_rrect(clip, paint, aa, matrix, outer, None);
            return;
        }
        if !outer.contains(inner) {
            log::debug!("draw_drrect: inner shape escapes the outer one; nothing drawn");
            return;
        }

        let aa_type = self.decide_aa(aa, paint.allow_mixed_samples);
        let concentric = (outer.center() - inner.center()).length() <= 1e-3;
        if concentric {
            let segments = self.rrect_segments(outer, matrix).max(self.rrect_segments(inner, matrix));
            let mut geometry = Geometry::new();
            self.push_rrect_band(&mut geometry, outer, inner, segments, matrix, paint, aa_type);
            self.add_mesh(clip, OpKind::DRRect, paint, aa_type, geometry, OpFlags::empty());
            return;
        }

        let mut path = Path::from_rrect(outer);
        path.add_rrect(inner);
        let contours = self.rasterizer().flatten(&path, Self::tolerance(matrix));
        self.fill_stencil_cover(clip, paint, aa_type, matrix, &contours, FillRule::EvenOdd);
    }

    fn rrect_segments(&self, rrect: &RRect, matrix: &Matrix) -> usize {
        let max_radius = rrect.radii().to_array().into_iter().fold(0.0f32, f32::max);
        corner_segments(max_radius, Self::tolerance(matrix))
    }

    /// Solid band between two rrects, with fading edges for coverage AA.
    #[allow(clippy::too_many_arguments)]
    fn push_rrect_band(
        &self,
        geometry: &mut Geometry,
        outer: &RRect,
        inner: &RRect,
        segments: usize,
        matrix: &Matrix,
        paint: &Paint,
        aa: AaType,
    ) {
        let raster = self.rasterizer();
        let poly = |r: &RRect| raster.rrect_polygon(r, segments);
        geometry.push_ring(&poly(outer), &poly(inner), matrix, paint.color, 1.0, 1.0);
        if aa != AaType::Coverage || !matrix.rect_stays_rect() {
            return;
        }
        let fringe = 0.5 / matrix.max_scale().max(1e-6);
        geometry.push_ring(&poly(&outer.outset(fringe)), &poly(outer), matrix, paint.color, 0.0, 1.0);
        if !inner.rect().outset(-fringe).is_empty() {
            geometry.push_ring(&poly(inner), &poly(&inner.outset(-fringe)), matrix, paint.color, 1.0, 0.0);
        }
    }
}
