use crate::caps::PixelFormat;
use crate::coords::{Matrix, Rect, Vec2};
use crate::op_list::OpListId;
use crate::ops::{Clip, DrawOp, Geometry, GeometryProgram, OpFlags, OpKind, StencilMode};
use crate::paint::{Aa, AaType, Paint, PaintDescriptor};
use crate::shape::{Contour, FillRule, Path, ShapeRasterizer};
use crate::target::{Origin, TargetId};

use super::{ColorSpace, DrawContextId, DrawContextState, GpuCore, SurfaceProps, TextDrawer};

/// Curve flattening tolerance in device pixels.
const DEVICE_TOLERANCE: f32 = 0.25;

/// Recording view of one draw context.
///
/// Obtained from [`GpuContext::draw_context`](super::GpuContext::draw_context).
/// Every draw call decides antialiasing, builds geometry and appends an op to
/// the target's open op list; nothing reaches the backend until a flush.
pub struct DrawContext<'a> {
    id: DrawContextId,
    pub(super) state: &'a mut DrawContextState,
    pub(super) core: &'a mut GpuCore,
}

impl<'a> DrawContext<'a> {
    pub(super) fn new(id: DrawContextId, state: &'a mut DrawContextState, core: &'a mut GpuCore) -> Self {
        Self { id, state, core }
    }

    /// Shorter-lived view of the same context.
    pub(super) fn reborrow(&mut self) -> DrawContext<'_> {
        DrawContext { id: self.id, state: &mut *self.state, core: &mut *self.core }
    }

    // ── queries ────────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> DrawContextId {
        self.id
    }

    #[inline]
    pub fn target_id(&self) -> TargetId {
        self.state.target
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.state.desc.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.state.desc.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.state.desc.format
    }

    #[inline]
    pub fn sample_count(&self) -> u32 {
        self.state.desc.sample_count
    }

    #[inline]
    pub fn origin(&self) -> Origin {
        self.state.desc.origin
    }

    #[inline]
    pub fn is_unified_multisampled(&self) -> bool {
        self.state.desc.is_unified_multisampled()
    }

    #[inline]
    pub fn has_mixed_samples(&self) -> bool {
        self.state.desc.is_mixed_sampled()
    }

    #[inline]
    pub fn is_stencil_buffer_multisampled(&self) -> bool {
        self.state.desc.is_stencil_buffer_multisampled()
    }

    #[inline]
    pub fn color_space(&self) -> Option<ColorSpace> {
        self.state.color_space
    }

    /// Tagged targets blend in a defined color space.
    #[inline]
    pub fn is_gamma_correct(&self) -> bool {
        self.state.color_space.is_some()
    }

    #[inline]
    pub fn surface_props(&self) -> SurfaceProps {
        self.state.props
    }

    #[inline]
    pub fn was_abandoned(&self) -> bool {
        self.core.is_abandoned()
    }

    /// List the next op would be appended to, if it is still open.
    pub fn open_op_list(&self) -> Option<OpListId> {
        self.state.op_list.filter(|&id| self.core.manager.is_open(id))
    }

    pub fn set_text_drawer(&mut self, drawer: impl TextDrawer + 'static) {
        self.state.text_drawer = Box::new(drawer);
    }

    // ── antialiasing ───────────────────────────────────────────────────────

    /// Picks the AA strategy for one draw. Reads the target description only.
    pub fn decide_aa(&self, aa: Aa, allow_mixed_samples: bool) -> AaType {
        if aa == Aa::No {
            return AaType::None;
        }
        let desc = &self.state.desc;
        if desc.is_unified_multisampled() {
            AaType::Msaa
        } else if allow_mixed_samples && desc.is_stencil_buffer_multisampled() {
            AaType::MixedSamples
        } else {
            AaType::Coverage
        }
    }

    // ── recording ──────────────────────────────────────────────────────────

    /// Cached list if still open, else a fresh one for this target.
    fn acquire_op_list(&mut self) -> OpListId {
        if let Some(id) = self.open_op_list() {
            return id;
        }
        let id = self.core.manager.new_op_list(self.state.target);
        self.state.op_list = Some(id);
        id
    }

    /// Clips `op` and appends it. Returns false when it was dropped.
    pub(crate) fn add_draw_op(&mut self, clip: &Clip, mut op: DrawOp) -> bool {
        let target_bounds = self.state.desc.bounds();
        let Some(scissor) = clip.apply(target_bounds, op.bounds()) else {
            log::trace!("{:?} op at {:?} culled by {clip:?}", op.kind(), op.bounds());
            return false;
        };
        let visible = scissor.unwrap_or(target_bounds);
        let Some(visible) = Rect::from(visible).intersect(op.bounds()) else {
            return false;
        };
        op.set_clip(scissor, visible);
        self.record(op)
    }

    /// Appends an op whose clip is already settled.
    pub(crate) fn record(&mut self, op: DrawOp) -> bool {
        if self.core.is_abandoned() {
            return false;
        }
        let target = self.state.target;
        for &sampled in op.sampled() {
            if sampled == target {
                log::warn!("{:?} op samples its own target {target:?}; dropped", op.kind());
                return false;
            }
            if !self.core.registry.contains(sampled) {
                log::warn!("{:?} op samples released target {sampled:?}; dropped", op.kind());
                return false;
            }
        }

        let list_id = self.acquire_op_list();
        for &sampled in op.sampled() {
            self.core.manager.add_dependency(list_id, sampled);
            let newly_held = self
                .core
                .manager
                .op_list_mut(list_id)
                .is_some_and(|list| list.hold_ref(sampled));
            if newly_held {
                self.core.registry.add_ref(sampled);
            }
        }

        let kind = op.kind();
        let Some(list) = self.core.manager.op_list_mut(list_id) else {
            return false;
        };
        if let Err(e) = list.append(op) {
            debug_assert!(false, "append to freshly acquired list failed: {e}");
            return false;
        }
        log::trace!("recorded {kind:?} op into {list_id:?} ({} ops)", list.len());

        let max = self.core.options.max_ops_per_list;
        if max > 0 && list.len() >= max {
            list.close();
        }
        if self.core.options.validate {
            debug_assert!(self.core.manager.validate(&self.core.registry));
        }
        true
    }

    /// Drops ops that a whole-target overwrite makes invisible.
    pub(super) fn drop_pending_ops(&mut self) {
        let Some(id) = self.open_op_list() else {
            return;
        };
        if let Some(list) = self.core.manager.op_list_mut(id) {
            let dropped = list.drop_pending();
            if dropped > 0 {
                log::trace!("full overwrite dropped {dropped} pending ops from {id:?}");
            }
        }
    }

    // ── geometry helpers shared by the draw modules ────────────────────────

    #[inline]
    pub(super) fn rasterizer(&self) -> &dyn ShapeRasterizer {
        self.core.rasterizer.as_ref()
    }

    /// Local-space flattening tolerance giving [`DEVICE_TOLERANCE`] on screen.
    pub(super) fn tolerance(matrix: &Matrix) -> f32 {
        DEVICE_TOLERANCE / matrix.max_scale().max(1e-6)
    }

    /// Simple shapes may be drawn instanced unless they use mixed samples.
    pub(super) fn instancing_flags(&self, aa: AaType) -> OpFlags {
        if self.state.instancing.enabled && aa != AaType::MixedSamples {
            OpFlags::INSTANCED
        } else {
            OpFlags::empty()
        }
    }

    /// Builds the paint's program and records a mesh op.
    pub(super) fn add_mesh(
        &mut self,
        clip: &Clip,
        kind: OpKind,
        paint: &Paint,
        aa: AaType,
        geometry: Geometry,
        flags: OpFlags,
    ) -> bool {
        let program = GeometryProgram::for_paint(paint.shader.is_some(), aa == AaType::Coverage);
        let Some(op) = DrawOp::mesh(kind, program, geometry, PaintDescriptor::new(paint, aa), StencilMode::Disabled)
        else {
            return false;
        };
        self.add_draw_op(clip, op.with_flags(flags))
    }

    /// Single-pass fill of a convex polygon given in pre-view coordinates.
    pub(super) fn fill_convex(
        &mut self,
        clip: &Clip,
        kind: OpKind,
        paint: &Paint,
        aa: AaType,
        matrix: &Matrix,
        local: &Matrix,
        polygon: &[Vec2],
        flags: OpFlags,
    ) -> bool {
        let mut geometry = Geometry::new();
        geometry.push_convex(polygon, matrix, local, paint.color, aa == AaType::Coverage);
        self.add_mesh(clip, kind, paint, aa, geometry, flags)
    }

    /// Two-pass fill: winding into the stencil, then a covering quad that
    /// shades where the stencil is set and clears it again.
    pub(super) fn fill_stencil_cover(
        &mut self,
        clip: &Clip,
        paint: &Paint,
        aa: AaType,
        matrix: &Matrix,
        contours: &[Contour],
        fill_rule: FillRule,
    ) -> bool {
        let Some(inverse) = matrix.invert() else {
            log::warn!("stencil fill with a singular matrix; dropped");
            return false;
        };

        let mut stencil = Geometry::new();
        for contour in contours {
            stencil.push_fan(&contour.points, matrix, paint.color);
        }
        let Some(device_bounds) = stencil.bounds() else {
            return false;
        };

        // Coverage AA has no meaning in the stencil pass.
        let stencil_aa = if aa == AaType::Coverage { AaType::None } else { aa };
        let stencil_paint = Paint::solid(paint.color).with_blend(paint.blend);
        let Some(stencil_op) = DrawOp::mesh(
            OpKind::StencilPath,
            GeometryProgram::for_paint(false, false),
            stencil,
            PaintDescriptor::new(&stencil_paint, stencil_aa),
            StencilMode::Write(fill_rule),
        ) else {
            return false;
        };

        let mut cover = Geometry::new();
        let corners = device_bounds.corners().map(|p| inverse.map_point(p));
        cover.push_quad(corners, matrix, paint.color);
        let Some(cover_op) = DrawOp::mesh(
            OpKind::CoverPath,
            GeometryProgram::for_paint(paint.shader.is_some(), false),
            cover,
            PaintDescriptor::new(paint, stencil_aa),
            StencilMode::TestAndReset,
        ) else {
            return false;
        };

        if !self.add_draw_op(clip, stencil_op) {
            return false;
        }
        self.add_draw_op(clip, cover_op)
    }

    /// Stroke of `path` as a triangle list. Hairlines are one device pixel.
    pub(super) fn stroke_path(
        &mut self,
        clip: &Clip,
        kind: OpKind,
        paint: &Paint,
        aa: AaType,
        matrix: &Matrix,
        path: &Path,
        width: f32,
    ) -> bool {
        let width = if width == 0.0 { 1.0 / matrix.max_scale().max(1e-6) } else { width };
        let tris = self.rasterizer().stroke(path, width, Self::tolerance(matrix));
        if tris.is_empty() {
            return false;
        }
        let mut geometry = Geometry::new();
        geometry.push_triangles(&tris, matrix, paint.color);
        self.add_mesh(clip, kind, paint, aa, geometry, OpFlags::empty())
    }
}
