use crate::coords::{Matrix, Rect};
use crate::ops::{Clip, Geometry, OpKind};
use crate::paint::{Aa, AaType, Paint};
use crate::shape::{Path, Style};

use crate::context::DrawContext;

impl DrawContext<'_> {
    /// Fills or strokes `rect`. `None` style means fill.
    pub fn draw_rect(&mut self, clip: &Clip, paint: &Paint, aa: Aa, matrix: &Matrix, rect: Rect, style: Option<&Style>) {
        if self.was_abandoned() {
            return;
        }
        let style = style.copied().unwrap_or_default();
        if !rect.is_finite() || !matrix.is_finite() || !style.is_valid() {
            log::warn!("draw_rect with non-finite input; dropped");
            return;
        }
        match style {
            Style::Fill => self.fill_rect_local(clip, paint, aa, matrix, rect, &Matrix::identity()),
            Style::Stroke { width } => self.stroke_rect(clip, paint, aa, matrix, rect.normalized(), width),
        }
    }

    /// Fills `rect`, mapping it onto `local_rect` for shading.
    pub fn fill_rect_to_rect(
        &mut self,
        clip: &Clip,
        paint: &Paint,
        aa: Aa,
        matrix: &Matrix,
        rect: Rect,
        local_rect: Rect,
    ) {
        if self.was_abandoned() {
            return;
        }
        let rect = rect.normalized();
        if rect.is_empty() || !local_rect.is_finite() {
            return;
        }
        let local = Matrix::translate(-rect.left(), -rect.top())
            .then(Matrix::scale(local_rect.width() / rect.width(), local_rect.height() / rect.height()))
            .then(Matrix::translate(local_rect.left(), local_rect.top()));
        self.fill_rect_local(clip, paint, aa, matrix, rect, &local);
    }

    /// Fills `rect`; shaders see its points through `local_matrix`.
    pub fn fill_rect_with_local_matrix(
        &mut self,
        clip: &Clip,
        paint: &Paint,
        aa: Aa,
        matrix: &Matrix,
        rect: Rect,
        local_matrix: &Matrix,
    ) {
        if self.was_abandoned() {
            return;
        }
        if !local_matrix.is_finite() {
            log::warn!("fill_rect_with_local_matrix with a non-finite local matrix; dropped");
            return;
        }
        self.fill_rect_local(clip, paint, aa, matrix, rect, local_matrix);
    }

    fn fill_rect_local(&mut self, clip: &Clip, paint: &Paint, aa: Aa, matrix: &Matrix, rect: Rect, local: &Matrix) {
        let rect = rect.normalized();
        if rect.is_empty() || !rect.is_finite() || !matrix.is_finite() {
            return;
        }
        if self.try_clear_instead(clip, paint, matrix, rect) {
            return;
        }
        let aa = self.decide_aa(aa, paint.allow_mixed_samples);
        let flags = self.instancing_flags(aa);
        self.fill_convex(clip, OpKind::Rect, paint, aa, matrix, local, &rect.corners(), flags);
    }

    fn stroke_rect(&mut self, clip: &Clip, paint: &Paint, request: Aa, matrix: &Matrix, rect: Rect, width: f32) {
        if rect.width() <= 0.0 && rect.height() <= 0.0 {
            return;
        }
        let aa = self.decide_aa(request, paint.allow_mixed_samples);
        if width == 0.0 {
            self.stroke_path(clip, OpKind::StrokeRect, paint, aa, matrix, &Path::from_rect(rect), 0.0);
            return;
        }

        let half = width * 0.5;
        let outer = rect.outset(half);
        let inner = rect.outset(-half);
        if inner.is_empty() {
            // Stroke swallows the interior.
            self.fill_rect_local(clip, paint, request, matrix, outer, &Matrix::identity());
            return;
        }

        let mut geometry = Geometry::new();
        geometry.push_ring(&outer.corners(), &inner.corners(), matrix, paint.color, 1.0, 1.0);
        if aa == AaType::Coverage && matrix.rect_stays_rect() {
            let fringe = 0.5 / matrix.max_scale().max(1e-6);
            geometry.push_ring(&outer.outset(fringe).corners(), &outer.corners(), matrix, paint.color, 0.0, 1.0);
            let inner_edge = inner.outset(-fringe);
            if !inner_edge.is_empty() {
                geometry.push_ring(&inner.corners(), &inner_edge.corners(), matrix, paint.color, 1.0, 0.0);
            }
        }
        let flags = self.instancing_flags(aa);
        self.add_mesh(clip, OpKind::StrokeRect, paint, aa, geometry, flags);
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::{SoftwareInspector, SubmissionKind};
    use crate::caps::{Caps, PixelFormat};
    use crate::context::draw_context::tests::{pending_ops, pixels, setup, setup_with};
    use crate::context::{ContextOptions, DrawContextId, GpuContext};
    use crate::coords::{IRect, Matrix, Rect, Vec2};
    use crate::ops::{Clip, OpFlags, OpKind, ProgramKind};
    use crate::paint::{Aa, BlendMode, Color, ColorStop, LinearGradient, Paint, Shader, SpreadMode};
    use crate::shape::Style;
    use crate::target::RenderTargetDesc;
    use std::sync::Arc;

    const RED: Color = Color::from_premul(1.0, 0.0, 0.0, 1.0);
    const HALF_BLUE: Color = Color::from_premul(0.0, 0.0, 0.5, 0.5);

    fn op_kinds(gpu: &GpuContext, id: DrawContextId) -> Vec<OpKind> {
        let target = gpu.target_of(id).unwrap();
        gpu.manager()
            .last_list(target)
            .and_then(|l| gpu.manager().op_list(l))
            .map(|l| l.ops().iter().map(|o| o.kind()).collect())
            .unwrap_or_default()
    }

    fn mesh_programs(inspector: &SoftwareInspector) -> Vec<ProgramKind> {
        inspector
            .submissions()
            .into_iter()
            .filter_map(|s| match s.kind {
                SubmissionKind::Mesh { program, .. } => Some(program),
                _ => None,
            })
            .collect()
    }

    // ── fills ──────────────────────────────────────────────────────────────

    #[test]
    fn aliased_fill_covers_pixel_centers() {
        let (mut gpu, inspector, id) = setup(4, 4);
        gpu.draw_context(id).unwrap().draw_rect(
            &Clip::WideOpen,
            &Paint::solid(RED),
            Aa::No,
            &Matrix::identity(),
            Rect::new(1.0, 1.0, 2.0, 2.0),
            None,
        );
        gpu.flush();
        let px = pixels(&gpu, &inspector, id);
        for y in 0..4 {
            for x in 0..4 {
                let inside = (1..3).contains(&x) && (1..3).contains(&y);
                assert_eq!(px[y * 4 + x] == RED, inside, "pixel ({x}, {y})");
            }
        }
        assert_eq!(mesh_programs(&inspector), [ProgramKind::Color]);
    }

    #[test]
    fn coverage_fill_fades_at_the_edge() {
        let (mut gpu, inspector, id) = setup(16, 16);
        gpu.draw_context(id).unwrap().draw_rect(
            &Clip::WideOpen,
            &Paint::solid(RED),
            Aa::Yes,
            &Matrix::identity(),
            Rect::new(0.0, 0.0, 8.0, 8.0),
            None,
        );
        gpu.flush();
        let px = pixels(&gpu, &inspector, id);
        assert_eq!(px[4 * 16 + 4], RED);
        assert_eq!(px[4 * 16 + 12], Color::TRANSPARENT);
        assert_eq!(mesh_programs(&inspector), [ProgramKind::ColorCoverage]);
    }

    #[test]
    fn multisampled_target_uses_plain_program() {
        let desc = RenderTargetDesc::new(8, 8, PixelFormat::Rgba8Unorm).with_samples(4);
        let (mut gpu, inspector, id) = setup_with(Caps::default(), ContextOptions::default(), desc);
        gpu.draw_context(id).unwrap().draw_rect(
            &Clip::WideOpen,
            &Paint::solid(HALF_BLUE),
            Aa::Yes,
            &Matrix::identity(),
            Rect::new(1.0, 1.0, 4.0, 4.0),
            None,
        );
        gpu.flush();
        assert_eq!(mesh_programs(&inspector), [ProgramKind::Color]);
        assert_eq!(gpu.stats().msaa_resolves, 1);
    }

    #[test]
    fn opaque_full_target_fill_is_a_clear() {
        let (mut gpu, _, id) = setup(4, 4);
        let mut dc = gpu.draw_context(id).unwrap();
        dc.draw_rect(&Clip::WideOpen, &Paint::solid(HALF_BLUE), Aa::No, &Matrix::identity(), Rect::new(0.0, 0.0, 2.0, 2.0), None);
        dc.draw_rect(&Clip::WideOpen, &Paint::solid(RED), Aa::Yes, &Matrix::identity(), Rect::new(-1.0, -1.0, 6.0, 6.0), None);
        assert_eq!(op_kinds(&gpu, id), [OpKind::Clear]);

        let mut dc = gpu.draw_context(id).unwrap();
        let clip = Clip::Scissor(IRect::new(0, 0, 2, 2));
        dc.draw_rect(&clip, &Paint::solid(RED), Aa::No, &Matrix::identity(), Rect::new(0.0, 0.0, 4.0, 4.0), None);
        let rotated = Matrix::rotate(0.3);
        dc.draw_rect(&Clip::WideOpen, &Paint::solid(RED), Aa::No, &rotated, Rect::new(-10.0, -10.0, 30.0, 30.0), None);
        assert_eq!(op_kinds(&gpu, id), [OpKind::Clear, OpKind::Rect, OpKind::Rect]);
    }

    #[test]
    fn simple_fills_are_tagged_for_instancing() {
        let (mut gpu, _, id) = setup(8, 8);
        gpu.draw_context(id).unwrap().draw_rect(
            &Clip::WideOpen,
            &Paint::solid(HALF_BLUE),
            Aa::No,
            &Matrix::identity(),
            Rect::new(0.0, 0.0, 2.0, 2.0),
            None,
        );
        let target = gpu.target_of(id).unwrap();
        let list = gpu.manager().op_list(gpu.manager().last_list(target).unwrap()).unwrap();
        assert!(list.ops()[0].flags().contains(OpFlags::INSTANCED));
    }

    #[test]
    fn invalid_input_is_dropped() {
        let (mut gpu, _, id) = setup(8, 8);
        let mut dc = gpu.draw_context(id).unwrap();
        let paint = Paint::solid(RED);
        dc.draw_rect(&Clip::WideOpen, &paint, Aa::No, &Matrix::identity(), Rect::new(f32::NAN, 0.0, 2.0, 2.0), None);
        dc.draw_rect(&Clip::WideOpen, &paint, Aa::No, &Matrix::identity(), Rect::new(0.0, 0.0, 0.0, 2.0), None);
        dc.draw_rect(&Clip::WideOpen, &paint, Aa::No, &Matrix::identity(), Rect::new(0.0, 0.0, 2.0, 2.0), Some(&Style::stroke(-1.0)));
        assert_eq!(pending_ops(&gpu, id), 0);
    }

    // ── local coordinates ──────────────────────────────────────────────────

    fn ramp() -> Paint {
        let gradient = LinearGradient::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            vec![ColorStop::new(0.0, Color::BLACK), ColorStop::new(1.0, Color::WHITE)],
            SpreadMode::Pad,
        );
        Paint::solid(Color::WHITE).with_shader(Arc::new(Shader::LinearGradient(gradient)))
    }

    #[test]
    fn rect_to_rect_maps_shader_space() {
        let (mut gpu, inspector, id) = setup(8, 1);
        gpu.draw_context(id).unwrap().fill_rect_to_rect(
            &Clip::WideOpen,
            &ramp(),
            Aa::No,
            &Matrix::identity(),
            Rect::new(0.0, 0.0, 8.0, 1.0),
            Rect::new(0.0, 0.0, 1.0, 1.0),
        );
        gpu.flush();
        let px = pixels(&gpu, &inspector, id);
        assert!(px[0].r < 0.1);
        assert!(px[7].r > 0.9);
        assert_eq!(mesh_programs(&inspector), [ProgramKind::Textured]);
    }

    #[test]
    fn local_matrix_maps_shader_space() {
        let (mut gpu, inspector, id) = setup(8, 1);
        gpu.draw_context(id).unwrap().fill_rect_with_local_matrix(
            &Clip::WideOpen,
            &ramp(),
            Aa::No,
            &Matrix::identity(),
            Rect::new(0.0, 0.0, 8.0, 1.0),
            &Matrix::scale(1.0 / 16.0, 1.0),
        );
        gpu.flush();
        let px = pixels(&gpu, &inspector, id);
        // Only half the ramp fits.
        assert!(px[7].r > 0.4 && px[7].r < 0.5);
    }

    // ── strokes ────────────────────────────────────────────────────────────

    #[test]
    fn stroke_leaves_the_interior() {
        let (mut gpu, inspector, id) = setup(12, 12);
        gpu.draw_context(id).unwrap().draw_rect(
            &Clip::WideOpen,
            &Paint::solid(RED),
            Aa::No,
            &Matrix::identity(),
            Rect::new(2.0, 2.0, 8.0, 8.0),
            Some(&Style::stroke(2.0)),
        );
        gpu.flush();
        let px = pixels(&gpu, &inspector, id);
        assert_eq!(px[5 * 12 + 1], RED);
        assert_eq!(px[5 * 12 + 2], RED);
        assert_eq!(px[5 * 12 + 5], Color::TRANSPARENT);
        assert_eq!(px[5 * 12], Color::TRANSPARENT);
        assert_eq!(px[5 * 12 + 10], RED);
        assert_eq!(px[5 * 12 + 11], Color::TRANSPARENT);
    }

    #[test]
    fn wide_stroke_becomes_a_fill() {
        let (mut gpu, _, id) = setup(12, 12);
        gpu.draw_context(id).unwrap().draw_rect(
            &Clip::WideOpen,
            &Paint::solid(HALF_BLUE),
            Aa::No,
            &Matrix::identity(),
            Rect::new(2.0, 2.0, 2.0, 2.0),
            Some(&Style::stroke(4.0)),
        );
        assert_eq!(op_kinds(&gpu, id), [OpKind::Rect]);
    }

    #[test]
    fn hairline_is_one_pixel_wide() {
        let (mut gpu, inspector, id) = setup(8, 8);
        gpu.draw_context(id).unwrap().draw_rect(
            &Clip::WideOpen,
            &Paint::solid(RED),
            Aa::No,
            &Matrix::identity(),
            Rect::new(2.0, 2.0, 4.0, 4.0),
            Some(&Style::hairline()),
        );
        assert_eq!(op_kinds(&gpu, id), [OpKind::StrokeRect]);
        gpu.flush();
        let px = pixels(&gpu, &inspector, id);
        let painted = px.iter().filter(|&&c| c != Color::TRANSPARENT).count();
        assert!((12..=20).contains(&painted), "{painted} pixels");
        assert_eq!(px[4 * 8 + 4], Color::TRANSPARENT);
    }

    // ── merging ────────────────────────────────────────────────────────────

    fn scene(merging: bool) -> (Vec<Color>, u64, usize) {
        let options = ContextOptions { enable_merging: merging, ..ContextOptions::default() };
        let desc = RenderTargetDesc::new(16, 16, PixelFormat::Rgba8Unorm);
        let (mut gpu, inspector, id) = setup_with(Caps::default(), options, desc);
        let mut dc = gpu.draw_context(id).unwrap();
        let m = Matrix::identity();
        dc.clear(None, Color::WHITE, true);
        for i in 0..4 {
            let r = Rect::new(i as f32 * 3.0, 1.0, 4.0, 6.0);
            dc.draw_rect(&Clip::WideOpen, &Paint::solid(HALF_BLUE), Aa::Yes, &m, r, None);
        }
        let plus = Paint::solid(Color::from_premul(0.2, 0.0, 0.0, 0.2)).with_blend(BlendMode::Plus);
        for i in 0..3 {
            dc.draw_rect(&Clip::WideOpen, &plus, Aa::No, &m, Rect::new(2.0 + i as f32, 8.0, 6.0, 6.0), None);
        }
        dc.draw_rect(&Clip::WideOpen, &Paint::solid(RED), Aa::No, &m, Rect::new(10.0, 10.0, 3.0, 3.0), None);
        gpu.flush();
        let meshes = inspector.submissions().iter().filter(|s| matches!(s.kind, SubmissionKind::Mesh { .. })).count();
        (pixels(&gpu, &inspector, id), gpu.stats().merged_ops, meshes)
    }

    #[test]
    fn merged_output_matches_unmerged() {
        let (merged, merges, merged_meshes) = scene(true);
        let (plain, no_merges, plain_meshes) = scene(false);
        assert_eq!(no_merges, 0);
        assert!(merges > 0);
        assert!(merged_meshes < plain_meshes);
        assert_eq!(plain_meshes, 8);
        assert_eq!(merged, plain);
    }
}
