use crate::coords::{IRect, Matrix, Rect};
use crate::ops::{Clip, DrawOp};
use crate::paint::{Aa, BlendMode, Color, Paint};

use crate::context::DrawContext;

impl DrawContext<'_> {
    /// Clears `rect` (the whole target when `None`) to `color`, ignoring any
    /// clip. With `can_ignore_rect` a partial clear may be widened to the whole
    /// target when the backend prefers that.
    pub fn clear(&mut self, rect: Option<IRect>, color: Color, can_ignore_rect: bool) {
        if self.was_abandoned() {
            return;
        }
        let bounds = self.state.desc.bounds();
        let rect = match rect {
            None => None,
            Some(r) => match r.intersect(bounds) {
                None => return,
                Some(r) if r == bounds => None,
                Some(_) if can_ignore_rect && self.core.backend.caps().prefer_full_clears => None,
                Some(r) => Some(r),
            },
        };

        if rect.is_none() {
            self.drop_pending_ops();
        }
        self.record(DrawOp::clear(rect, color, bounds));
    }

    /// Fills the whole target with `paint`. Shaders see local coordinates
    /// through the inverse of `matrix`.
    pub fn draw_paint(&mut self, clip: &Clip, paint: &Paint, matrix: &Matrix) {
        if self.was_abandoned() {
            return;
        }
        let Some(inverse) = matrix.invert() else {
            log::warn!("draw_paint with a singular matrix; dropped");
            return;
        };
        let device = self.state.desc.bounds_f();
        self.fill_rect_with_local_matrix(clip, paint, Aa::No, &Matrix::identity(), device, &inverse);
    }

    /// Records a clear instead of a fill that overwrites every target pixel.
    /// Returns true when it did.
    pub(super) fn try_clear_instead(&mut self, clip: &Clip, paint: &Paint, matrix: &Matrix, rect: Rect) -> bool {
        if paint.shader.is_some() || !paint.blend.overwrites_with(paint.color) || !matrix.rect_stays_rect() {
            return false;
        }
        let target = self.state.desc.bounds();
        let clip_covers = match clip {
            Clip::WideOpen => true,
            Clip::Scissor(s) => s.contains(target),
        };
        if !clip_covers || !matrix.map_rect(rect).contains_rect(Rect::from(target)) {
            return false;
        }
        let color = if paint.blend == BlendMode::Clear { Color::TRANSPARENT } else { paint.color };
        log::trace!("full-target fill recorded as clear");
        self.clear(None, color, true);
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::SubmissionKind;
    use crate::caps::{Caps, PixelFormat};
    use crate::context::draw_context::tests::{pending_ops, pixels, setup, setup_with};
    use crate::context::ContextOptions;
    use crate::coords::{IRect, Matrix, Rect, Vec2};
    use crate::ops::{Clip, OpKind};
    use crate::paint::{Aa, BlendMode, Color, ColorStop, LinearGradient, Paint, Shader, SpreadMode};
    use crate::target::RenderTargetDesc;
    use std::sync::Arc;

    const RED: Color = Color::from_premul(1.0, 0.0, 0.0, 1.0);
    const HALF: Color = Color::from_premul(0.0, 0.0, 0.5, 0.5);

    fn kinds(inspector: &crate::backend::SoftwareInspector) -> Vec<SubmissionKind> {
        inspector.submissions().into_iter().map(|s| s.kind).collect()
    }

    // ── clear ──────────────────────────────────────────────────────────────

    #[test]
    fn null_rect_equals_full_rect() {
        let run = |rect: Option<IRect>| {
            let (mut gpu, inspector, id) = setup(6, 4);
            let mut dc = gpu.draw_context(id).unwrap();
            dc.clear(Some(IRect::new(1, 1, 2, 2)), Color::WHITE, false);
            dc.clear(rect, RED, true);
            gpu.flush();
            (pixels(&gpu, &inspector, id), kinds(&inspector))
        };
        let (a, ka) = run(None);
        let (b, kb) = run(Some(IRect::new(0, 0, 6, 4)));
        assert_eq!(a, b);
        assert_eq!(ka, kb);
        assert!(a.iter().all(|&c| c == RED));
    }

    #[test]
    fn full_clear_drops_earlier_ops() {
        let (mut gpu, _, id) = setup(8, 8);
        let mut dc = gpu.draw_context(id).unwrap();
        dc.draw_rect(&Clip::WideOpen, &Paint::solid(HALF), Aa::No, &Matrix::identity(), Rect::new(0.0, 0.0, 4.0, 4.0), None);
        dc.clear(Some(IRect::new(0, 0, 2, 2)), RED, false);
        assert_eq!(pending_ops(&gpu, id), 2);
        gpu.draw_context(id).unwrap().clear(None, Color::WHITE, true);
        assert_eq!(pending_ops(&gpu, id), 1);
    }

    #[test]
    fn partial_clear_stays_partial_unless_widening_is_cheaper() {
        let (mut gpu, inspector, id) = setup(8, 8);
        gpu.draw_context(id).unwrap().clear(Some(IRect::new(0, 0, 2, 2)), RED, true);
        gpu.flush();
        assert!(matches!(kinds(&inspector)[..], [SubmissionKind::Clear { rect: Some(_), .. }]));

        let mut caps = Caps::default();
        caps.prefer_full_clears = true;
        let desc = RenderTargetDesc::new(8, 8, PixelFormat::Rgba8Unorm);
        let (mut gpu, inspector, id) = setup_with(caps, ContextOptions::default(), desc);
        let mut dc = gpu.draw_context(id).unwrap();
        dc.clear(Some(IRect::new(0, 0, 2, 2)), RED, false);
        dc.clear(Some(IRect::new(4, 4, 2, 2)), RED, true);
        gpu.flush();
        assert!(matches!(
            kinds(&inspector)[..],
            [SubmissionKind::Clear { rect: None, .. }]
        ));
    }

    #[test]
    fn clear_outside_the_target_is_dropped() {
        let (mut gpu, _, id) = setup(4, 4);
        gpu.draw_context(id).unwrap().clear(Some(IRect::new(10, 10, 2, 2)), RED, false);
        assert_eq!(pending_ops(&gpu, id), 0);
    }

    #[test]
    fn clear_ignores_the_scissor_of_earlier_draws() {
        let (mut gpu, inspector, id) = setup(4, 4);
        let mut dc = gpu.draw_context(id).unwrap();
        let clip = Clip::Scissor(IRect::new(0, 0, 1, 1));
        dc.draw_rect(&clip, &Paint::solid(HALF), Aa::No, &Matrix::identity(), Rect::new(0.0, 0.0, 4.0, 4.0), None);
        dc.clear(Some(IRect::new(0, 0, 4, 2)), RED, false);
        gpu.flush();
        let px = pixels(&gpu, &inspector, id);
        assert!(px[..8].iter().all(|&c| c == RED));
        assert!(px[8..].iter().all(|&c| c == Color::TRANSPARENT));
    }

    // ── draw_paint ─────────────────────────────────────────────────────────

    #[test]
    fn opaque_paint_becomes_a_clear() {
        let (mut gpu, inspector, id) = setup(4, 4);
        gpu.draw_context(id).unwrap().draw_paint(&Clip::WideOpen, &Paint::solid(RED), &Matrix::identity());
        gpu.flush();
        assert!(matches!(kinds(&inspector)[..], [SubmissionKind::Clear { rect: None, color }] if color == RED));
    }

    #[test]
    fn clear_blend_paint_clears_to_transparent() {
        let (mut gpu, inspector, id) = setup(2, 2);
        let mut dc = gpu.draw_context(id).unwrap();
        dc.clear(None, RED, true);
        dc.draw_paint(&Clip::WideOpen, &Paint::solid(RED).with_blend(BlendMode::Clear), &Matrix::identity());
        gpu.flush();
        assert!(pixels(&gpu, &inspector, id).iter().all(|&c| c == Color::TRANSPARENT));
    }

    #[test]
    fn translucent_or_clipped_paint_stays_a_draw() {
        let (mut gpu, _, id) = setup(4, 4);
        let mut dc = gpu.draw_context(id).unwrap();
        dc.draw_paint(&Clip::WideOpen, &Paint::solid(HALF), &Matrix::identity());
        dc.draw_paint(&Clip::Scissor(IRect::new(0, 0, 2, 2)), &Paint::solid(RED), &Matrix::identity());
        let target = gpu.target_of(id).unwrap();
        let list = gpu.manager().last_list(target).and_then(|l| gpu.manager().op_list(l)).unwrap();
        let kinds: Vec<OpKind> = list.ops().iter().map(|o| o.kind()).collect();
        assert_eq!(kinds, [OpKind::Rect, OpKind::Rect]);
    }

    #[test]
    fn paint_shader_sees_inverse_view_coordinates() {
        let (mut gpu, inspector, id) = setup(8, 1);
        let gradient = LinearGradient::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            vec![ColorStop::new(0.0, Color::BLACK), ColorStop::new(1.0, Color::WHITE)],
            SpreadMode::Pad,
        );
        let paint = Paint::solid(Color::WHITE).with_shader(Arc::new(Shader::LinearGradient(gradient)));
        // Local space is device space scaled by 1/2, so the ramp spans 8 pixels.
        gpu.draw_context(id).unwrap().draw_paint(&Clip::WideOpen, &paint, &Matrix::scale(2.0, 2.0));
        gpu.flush();
        let px = pixels(&gpu, &inspector, id);
        assert!(px[0].r < 0.1);
        assert!(px[4].r > 0.5 && px[4].r < 0.7);
        assert!(px[7].r > 0.9);
    }

    #[test]
    fn singular_paint_matrix_is_dropped() {
        let (mut gpu, _, id) = setup(4, 4);
        gpu.draw_context(id).unwrap().draw_paint(&Clip::WideOpen, &Paint::solid(HALF), &Matrix::scale(0.0, 1.0));
        assert_eq!(pending_ops(&gpu, id), 0);
    }
}
