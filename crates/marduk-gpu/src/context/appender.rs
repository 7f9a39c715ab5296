use crate::caps::Caps;
use crate::coords::IRect;
use crate::ops::{Clip, DrawOp};
use crate::paint::{Aa, AaType};
use crate::shape::ShapeRasterizer;

use super::DrawContext;

/// Narrow append access to a draw context.
///
/// Only the crate constructs one; it is handed to [`TextDrawer`](super::TextDrawer)
/// implementations so they can record ops without reaching the rest of the
/// draw surface.
pub struct OpAppender<'a> {
    ctx: DrawContext<'a>,
}

impl<'a> OpAppender<'a> {
    pub(crate) fn new(ctx: DrawContext<'a>) -> Self {
        Self { ctx }
    }

    /// Clips and records `op`. Returns false when it was dropped.
    #[inline]
    pub fn add_draw_op(&mut self, clip: &Clip, op: DrawOp) -> bool {
        self.ctx.add_draw_op(clip, op)
    }

    #[inline]
    pub fn decide_aa(&self, aa: Aa, allow_mixed_samples: bool) -> AaType {
        self.ctx.decide_aa(aa, allow_mixed_samples)
    }

    #[inline]
    pub fn caps(&self) -> &Caps {
        self.ctx.core.backend.caps()
    }

    #[inline]
    pub fn rasterizer(&self) -> &dyn ShapeRasterizer {
        self.ctx.rasterizer()
    }

    #[inline]
    pub fn target_bounds(&self) -> IRect {
        self.ctx.state.desc.bounds()
    }
}
