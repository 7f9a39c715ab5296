//! Recording entry point.
//!
//! [`GpuContext`] owns the backend, the target registry and the drawing
//! manager. Per-target recording state lives in an arena of draw contexts; a
//! [`DrawContext`] is a short-lived view that borrows one of them together with
//! the shared core.

mod appender;
mod draw;
mod draw_context;
mod options;
mod pixels;
mod surface;
mod text;

use slotmap::{new_key_type, SlotMap};

use crate::backend::Backend;
use crate::caps::{Caps, PixelFormat};
use crate::error::InstantiateError;
use crate::manager::{DrawingManager, FlushResources};
use crate::shape::{BasicRasterizer, ShapeRasterizer};
use crate::stats::GpuStats;
use crate::target::{LiveTarget, RenderTargetDesc, TargetId, TargetRegistry};

pub use appender::OpAppender;
pub use draw_context::DrawContext;
pub use options::ContextOptions;
pub use pixels::ImageInfo;
pub use surface::{ColorSpace, InstancedPipelineInfo, PixelGeometry, SurfaceProps};
pub use text::{NoTextDrawer, TextDrawer};

new_key_type! {
    /// Handle to a draw context owned by a [`GpuContext`].
    pub struct DrawContextId;
}

/// Recording state of one draw context.
pub(crate) struct DrawContextState {
    pub target: TargetId,
    pub desc: RenderTargetDesc,
    /// Last list this context appended to. Re-validated before every append.
    pub op_list: Option<crate::op_list::OpListId>,
    pub color_space: Option<ColorSpace>,
    pub props: SurfaceProps,
    pub instancing: InstancedPipelineInfo,
    pub text_drawer: Box<dyn TextDrawer>,
}

/// Everything draw contexts share.
pub(crate) struct GpuCore {
    pub backend: Box<dyn Backend>,
    pub registry: TargetRegistry,
    pub manager: DrawingManager,
    pub options: ContextOptions,
    pub stats: GpuStats,
    pub rasterizer: Box<dyn ShapeRasterizer>,
    pub abandoned: bool,
}

impl GpuCore {
    #[inline]
    pub fn is_abandoned(&self) -> bool {
        self.abandoned || self.backend.is_abandoned()
    }

    /// Flushes everything (`None`) or one target's dependency closure.
    pub fn flush(&mut self, only: Option<TargetId>) -> usize {
        if self.is_abandoned() {
            self.drop_all_lists();
            return 0;
        }
        self.stats.flushes += 1;
        let mut res = FlushResources {
            registry: &mut self.registry,
            backend: &mut *self.backend,
            stats: &mut self.stats,
            options: &self.options,
        };
        self.manager.flush(only, &mut res)
    }

    pub fn instantiate(&mut self, target: TargetId) -> Result<LiveTarget, InstantiateError> {
        let mut res = FlushResources {
            registry: &mut self.registry,
            backend: &mut *self.backend,
            stats: &mut self.stats,
            options: &self.options,
        };
        res.instantiate(target)
    }

    pub fn release_target(&mut self, target: TargetId) {
        let mut res = FlushResources {
            registry: &mut self.registry,
            backend: &mut *self.backend,
            stats: &mut self.stats,
            options: &self.options,
        };
        self.manager.release_target(target, &mut res);
    }

    /// Abandons every pending list and releases the references they held.
    fn drop_all_lists(&mut self) {
        for mut list in self.manager.take_all() {
            self.stats.ops_abandoned += list.abandon() as u64;
            for target in list.take_refs() {
                self.release_target(target);
            }
        }
    }
}

/// Owner of a backend and every draw context recording into it.
///
/// Single-owner: all recording and flushing goes through `&mut self`.
pub struct GpuContext {
    core: GpuCore,
    contexts: SlotMap<DrawContextId, DrawContextState>,
}

impl GpuContext {
    pub fn new(backend: impl Backend + 'static, options: ContextOptions) -> Self {
        Self {
            core: GpuCore {
                backend: Box::new(backend),
                registry: TargetRegistry::new(),
                manager: DrawingManager::new(),
                options,
                stats: GpuStats::default(),
                rasterizer: Box::new(BasicRasterizer),
                abandoned: false,
            },
            contexts: SlotMap::with_key(),
        }
    }

    /// Replaces the built-in [`BasicRasterizer`].
    pub fn with_rasterizer(mut self, rasterizer: impl ShapeRasterizer + 'static) -> Self {
        self.core.rasterizer = Box::new(rasterizer);
        self
    }

    #[inline]
    pub fn caps(&self) -> &Caps {
        self.core.backend.caps()
    }

    #[inline]
    pub fn options(&self) -> &ContextOptions {
        &self.core.options
    }

    #[inline]
    pub fn stats(&self) -> GpuStats {
        self.core.stats
    }

    pub fn reset_stats(&mut self) {
        self.core.stats.reset();
    }

    #[inline]
    pub fn manager(&self) -> &DrawingManager {
        &self.core.manager
    }

    #[inline]
    pub fn registry(&self) -> &TargetRegistry {
        &self.core.registry
    }

    #[inline]
    pub fn is_abandoned(&self) -> bool {
        self.core.is_abandoned()
    }

    /// Marks the context abandoned. Pending work is dropped and every later
    /// call becomes a no-op.
    pub fn abandon(&mut self) {
        if self.core.abandoned {
            return;
        }
        self.core.abandoned = true;
        self.core.drop_all_lists();
        log::warn!("gpu context abandoned; {} draw contexts left inert", self.contexts.len());
    }

    /// Creates a render target and a draw context recording into it.
    ///
    /// Returns `None` when the target cannot exist on this backend or the
    /// color space does not fit the format.
    pub fn make_draw_context(
        &mut self,
        desc: RenderTargetDesc,
        color_space: Option<ColorSpace>,
        props: SurfaceProps,
    ) -> Option<DrawContextId> {
        if self.is_abandoned() {
            return None;
        }
        if let Err(e) = desc.check(self.caps()) {
            log::warn!("cannot make draw context for {}x{} {:?}: {e}", desc.width, desc.height, desc.format);
            return None;
        }
        if desc.format == PixelFormat::Rgba8UnormSrgb && color_space != Some(ColorSpace::Srgb) {
            log::warn!("sRGB target needs an sRGB color space, got {color_space:?}");
            return None;
        }
        let target = self.core.registry.create(desc);
        Some(self.insert_context(target, desc, color_space, props))
    }

    /// A second draw context on an existing target. It takes its own
    /// reference on the target.
    pub fn make_draw_context_for(
        &mut self,
        target: TargetId,
        color_space: Option<ColorSpace>,
        props: SurfaceProps,
    ) -> Option<DrawContextId> {
        if self.is_abandoned() {
            return None;
        }
        let desc = *self.core.registry.desc(target)?;
        self.core.registry.add_ref(target);
        Some(self.insert_context(target, desc, color_space, props))
    }

    fn insert_context(
        &mut self,
        target: TargetId,
        desc: RenderTargetDesc,
        color_space: Option<ColorSpace>,
        props: SurfaceProps,
    ) -> DrawContextId {
        let instancing = InstancedPipelineInfo::new(self.caps(), &desc);
        let id = self.contexts.insert(DrawContextState {
            target,
            desc,
            op_list: None,
            color_space,
            props,
            instancing,
            text_drawer: Box::new(NoTextDrawer),
        });
        log::debug!("draw context {id:?} on target {target:?} ({}x{} {:?})", desc.width, desc.height, desc.format);
        id
    }

    /// Borrows one draw context for recording.
    pub fn draw_context(&mut self, id: DrawContextId) -> Option<DrawContext<'_>> {
        let state = self.contexts.get_mut(id)?;
        Some(DrawContext::new(id, state, &mut self.core))
    }

    /// Target a draw context records into.
    pub fn target_of(&self, id: DrawContextId) -> Option<TargetId> {
        self.contexts.get(id).map(|s| s.target)
    }

    /// Drops a draw context and its reference on the target. Releasing the
    /// last reference abandons the target's pending lists.
    pub fn release_draw_context(&mut self, id: DrawContextId) -> bool {
        let Some(state) = self.contexts.remove(id) else {
            return false;
        };
        self.core.release_target(state.target);
        true
    }

    #[inline]
    pub fn target_desc(&self, target: TargetId) -> Option<&RenderTargetDesc> {
        self.core.registry.desc(target)
    }

    /// Binds backend storage to `target` if it has none yet.
    pub fn instantiate(&mut self, target: TargetId) -> Result<LiveTarget, InstantiateError> {
        if self.is_abandoned() {
            return Err(InstantiateError::Abandoned);
        }
        self.core.instantiate(target)
    }

    /// Executes every pending op list. Returns the number of lists executed.
    pub fn flush(&mut self) -> usize {
        self.core.flush(None)
    }

    /// Executes the lists `target` depends on, then its own.
    pub fn flush_target(&mut self, target: TargetId) -> usize {
        self.core.flush(Some(target))
    }
}
