use bitflags::bitflags;

use crate::coords::{IRect, IVec2, Rect};
use crate::paint::{AaType, BlendMode, Color, PaintDescriptor};
use crate::shape::FillRule;
use crate::target::TargetId;

use super::{Geometry, GeometryProgram, ProgramKind};

/// What a recorded op draws. Part of the merge key.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum OpKind {
    Clear,
    Discard,
    Copy,
    Rect,
    StrokeRect,
    RRect,
    ShadowRRect,
    DRRect,
    Oval,
    Path,
    StencilPath,
    CoverPath,
    Vertices,
    Atlas,
    Region,
    Lattice,
    Text,
    Custom(u32),
}

/// Stencil usage of a mesh op.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum StencilMode {
    #[default]
    Disabled,
    /// Accumulate winding into the stencil plane; color is not written.
    Write(FillRule),
    /// Write color where the stencil is set and reset it.
    TestAndReset,
}

bitflags! {
    #[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
    pub struct OpFlags: u32 {
        /// Bounds include an analytic AA fringe.
        const HAS_AA_BLOAT = 1 << 0;
        /// Geometry has zero area (hairlines, degenerate shapes).
        const ZERO_AREA = 1 << 1;
        const USES_STENCIL = 1 << 2;
        /// Clear of the whole target.
        const FULL_CLEAR = 1 << 3;
        /// Eligible for an instanced pipeline.
        const INSTANCED = 1 << 4;
    }
}

/// Shaded triangle payload.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshOp {
    pub program: GeometryProgram,
    pub geometry: Geometry,
    pub paint: PaintDescriptor,
    pub stencil: StencilMode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OpPayload {
    Clear { rect: Option<IRect>, color: Color },
    Discard,
    /// Pixel copy of `src_rect` in `src` to `dst_point` in the list's target.
    Copy { src: TargetId, src_rect: IRect, dst_point: IVec2 },
    Mesh(MeshOp),
}

/// State two ops must share to be merged into one submission.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct MergeKey {
    pub kind: OpKind,
    pub program: ProgramKind,
    pub attribute_count: usize,
    pub blend: BlendMode,
    pub aa: AaType,
    pub shader: Option<usize>,
    pub stencil: StencilMode,
    pub scissor: Option<IRect>,
    pub instanced: bool,
}

/// One recorded unit of work.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawOp {
    kind: OpKind,
    payload: OpPayload,
    scissor: Option<IRect>,
    bounds: Rect,
    flags: OpFlags,
    sampled: Vec<TargetId>,
    merged_count: u32,
}

impl DrawOp {
    /// Clear of `rect`, or of the whole target when `rect` is `None`.
    pub fn clear(rect: Option<IRect>, color: Color, target: IRect) -> Self {
        let mut flags = OpFlags::empty();
        if rect.is_none() {
            flags |= OpFlags::FULL_CLEAR;
        }
        Self {
            kind: OpKind::Clear,
            payload: OpPayload::Clear { rect, color },
            scissor: None,
            bounds: Rect::from(rect.unwrap_or(target)),
            flags,
            sampled: Vec::new(),
            merged_count: 1,
        }
    }

    pub fn discard(target: IRect) -> Self {
        Self {
            kind: OpKind::Discard,
            payload: OpPayload::Discard,
            scissor: None,
            bounds: Rect::from(target),
            flags: OpFlags::FULL_CLEAR,
            sampled: Vec::new(),
            merged_count: 1,
        }
    }

    /// Copy of `src_rect` from `src`, already clipped to both targets.
    pub fn copy(src: TargetId, src_rect: IRect, dst_point: IVec2) -> Self {
        let dst = IRect::new(dst_point.x, dst_point.y, src_rect.width, src_rect.height);
        Self {
            kind: OpKind::Copy,
            payload: OpPayload::Copy { src, src_rect, dst_point },
            scissor: None,
            bounds: Rect::from(dst),
            flags: OpFlags::empty(),
            sampled: vec![src],
            merged_count: 1,
        }
    }

    /// Mesh op with bounds taken from the geometry. `None` for empty geometry.
    pub fn mesh(
        kind: OpKind,
        program: GeometryProgram,
        geometry: Geometry,
        paint: PaintDescriptor,
        stencil: StencilMode,
    ) -> Option<Self> {
        if geometry.is_empty() {
            return None;
        }
        let bounds = geometry.bounds()?;

        let mut flags = OpFlags::empty();
        if paint.aa() == AaType::Coverage {
            flags |= OpFlags::HAS_AA_BLOAT;
        }
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            flags |= OpFlags::ZERO_AREA;
        }
        if stencil != StencilMode::Disabled {
            flags |= OpFlags::USES_STENCIL;
        }

        let mut sampled = Vec::new();
        if let Some(shader) = paint.shader() {
            shader.sampled_targets(&mut sampled);
            sampled.sort();
            sampled.dedup();
        }

        Some(Self {
            kind,
            payload: OpPayload::Mesh(MeshOp { program, geometry, paint, stencil }),
            scissor: None,
            bounds,
            flags,
            sampled,
            merged_count: 1,
        })
    }

    pub fn with_flags(mut self, flags: OpFlags) -> Self {
        self.flags |= flags;
        self
    }

    #[inline]
    pub fn kind(&self) -> OpKind {
        self.kind
    }

    #[inline]
    pub fn payload(&self) -> &OpPayload {
        &self.payload
    }

    #[inline]
    pub fn mesh_op(&self) -> Option<&MeshOp> {
        match &self.payload {
            OpPayload::Mesh(m) => Some(m),
            _ => None,
        }
    }

    #[inline]
    pub fn scissor(&self) -> Option<IRect> {
        self.scissor
    }

    /// Device bounds after clipping.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    #[inline]
    pub fn flags(&self) -> OpFlags {
        self.flags
    }

    /// Targets this op reads as textures.
    #[inline]
    pub fn sampled(&self) -> &[TargetId] {
        &self.sampled
    }

    /// Number of recorded ops folded into this one.
    #[inline]
    pub fn merged_count(&self) -> u32 {
        self.merged_count
    }

    /// Declared vertex attributes (0 for ops without a mesh).
    pub fn attribute_count(&self) -> usize {
        self.mesh_op().map_or(0, |m| m.program.attribute_count())
    }

    #[inline]
    pub fn is_barrier(&self) -> bool {
        matches!(self.payload, OpPayload::Clear { .. } | OpPayload::Discard | OpPayload::Copy { .. })
    }

    pub fn blend(&self) -> Option<BlendMode> {
        self.mesh_op().map(|m| m.paint.blend())
    }

    /// Pure function of the op's kind and state. Only mesh ops merge.
    pub fn merge_key(&self) -> Option<MergeKey> {
        let m = self.mesh_op()?;
        Some(MergeKey {
            kind: self.kind,
            program: m.program.kind(),
            attribute_count: m.program.attribute_count(),
            blend: m.paint.blend(),
            aa: m.paint.aa(),
            shader: m.paint.shader_id(),
            stencil: m.stencil,
            scissor: self.scissor,
            instanced: self.flags.contains(OpFlags::INSTANCED),
        })
    }

    /// Records the resolved scissor and narrows bounds to it.
    pub(crate) fn set_clip(&mut self, scissor: Option<IRect>, visible: Rect) {
        self.scissor = scissor;
        self.bounds = visible;
    }

    /// Folds `other` into `self`. Callers check merge keys first.
    pub(crate) fn absorb(&mut self, other: DrawOp) {
        debug_assert_eq!(self.merge_key(), other.merge_key());
        if let (OpPayload::Mesh(dst), OpPayload::Mesh(src)) = (&mut self.payload, &other.payload) {
            dst.geometry.append(&src.geometry);
        }
        self.bounds = self.bounds.union(other.bounds);
        self.flags |= other.flags;
        for t in other.sampled {
            if !self.sampled.contains(&t) {
                self.sampled.push(t);
            }
        }
        self.merged_count += other.merged_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Matrix;
    use crate::paint::Paint;

    fn rect_op(x: f32, paint: &Paint, aa: AaType) -> DrawOp {
        let mut g = Geometry::new();
        g.push_quad(Rect::new(x, 0.0, 4.0, 4.0).corners(), &Matrix::identity(), paint.color);
        DrawOp::mesh(
            OpKind::Rect,
            GeometryProgram::for_paint(false, aa == AaType::Coverage),
            g,
            PaintDescriptor::new(paint, aa),
            StencilMode::Disabled,
        )
        .unwrap()
    }

    // ── merge keys ─────────────────────────────────────────────────────────

    #[test]
    fn key_ignores_color_and_geometry() {
        let a = rect_op(0.0, &Paint::solid(Color::BLACK), AaType::None);
        let b = rect_op(10.0, &Paint::solid(Color::WHITE), AaType::None);
        assert_eq!(a.merge_key(), b.merge_key());
    }

    #[test]
    fn key_separates_blend_and_aa() {
        let base = rect_op(0.0, &Paint::default(), AaType::None);
        let plus = rect_op(0.0, &Paint::default().with_blend(BlendMode::Plus), AaType::None);
        let cov = rect_op(0.0, &Paint::default(), AaType::Coverage);
        assert_ne!(base.merge_key(), plus.merge_key());
        assert_ne!(base.merge_key(), cov.merge_key());
    }

    #[test]
    fn clears_have_no_key() {
        let c = DrawOp::clear(None, Color::WHITE, IRect::from_wh(8, 8));
        assert!(c.merge_key().is_none());
        assert!(c.flags().contains(OpFlags::FULL_CLEAR));
        assert_eq!(c.bounds(), Rect::from_wh(8.0, 8.0));
    }

    #[test]
    fn copies_are_barriers_that_sample_their_source() {
        let mut targets: slotmap::SlotMap<TargetId, ()> = slotmap::SlotMap::with_key();
        let src = targets.insert(());
        let op = DrawOp::copy(src, IRect::new(2, 2, 3, 4), IVec2::new(5, 1));
        assert!(op.is_barrier());
        assert!(op.merge_key().is_none());
        assert_eq!(op.sampled(), &[src]);
        assert_eq!(op.bounds(), Rect::new(5.0, 1.0, 3.0, 4.0));
    }

    // ── construction ───────────────────────────────────────────────────────

    #[test]
    fn empty_geometry_yields_no_op() {
        let op = DrawOp::mesh(
            OpKind::Path,
            GeometryProgram::for_paint(false, false),
            Geometry::new(),
            PaintDescriptor::new(&Paint::default(), AaType::None),
            StencilMode::Disabled,
        );
        assert!(op.is_none());
    }

    #[test]
    fn absorb_unions_bounds_and_counts() {
        let mut a = rect_op(0.0, &Paint::default(), AaType::None);
        let b = rect_op(10.0, &Paint::default(), AaType::None);
        a.absorb(b);
        assert_eq!(a.merged_count(), 2);
        assert_eq!(a.bounds(), Rect::from_ltrb(0.0, 0.0, 14.0, 4.0));
        assert_eq!(a.mesh_op().unwrap().geometry.triangle_count(), 4);
    }
}
