//! Submission interface between the op layer and a device.
//!
//! The op layer never talks to a device directly. At flush it turns each
//! surviving op into a [`PreparedCall`] and hands it to a [`Backend`], together
//! with the live target to draw into.

mod software;

pub use software::{SoftwareBackend, SoftwareInspector, Submission, SubmissionKind};

use crate::caps::{Caps, PixelFormat};
use crate::coords::{IRect, IVec2};
use crate::error::BackendError;
use crate::ops::{GeometryProgram, StencilMode, Vertex};
use crate::paint::{Color, PaintDescriptor};
use crate::target::{LiveTarget, LiveTargetId, RenderTargetDesc, TargetId};

/// A sampled render target resolved to its live backing.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureBinding {
    pub target: TargetId,
    pub live: LiveTargetId,
}

/// Shaded triangles ready for submission.
///
/// Fragment color is the interpolated vertex color, or the paint's shader
/// evaluated at the interpolated local coordinates and scaled by the vertex
/// alpha. Programs that declare coverage scale the result by it.
#[derive(Debug, Clone, Copy)]
pub struct MeshCall<'a> {
    pub program: &'a GeometryProgram,
    pub vertices: &'a [Vertex],
    pub indices: &'a [u32],
    pub paint: &'a PaintDescriptor,
    pub scissor: Option<IRect>,
    pub stencil: StencilMode,
    pub textures: &'a [TextureBinding],
}

impl MeshCall<'_> {
    #[inline]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.vertices)
    }

    #[inline]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.indices)
    }

    /// Live target bound for a sampled handle.
    pub fn texture(&self, target: TargetId) -> Option<LiveTargetId> {
        self.textures.iter().find(|t| t.target == target).map(|t| t.live)
    }
}

/// One unit of backend work produced from a prepared op.
#[derive(Debug, Clone, Copy)]
pub enum PreparedCall<'a> {
    /// Clear `rect` (whole target when `None`), ignoring stencil and blending.
    Clear { rect: Option<IRect>, color: Color },
    /// Contents may be dropped.
    Discard,
    Mesh(MeshCall<'a>),
}

/// Capability provider and submission sink.
pub trait Backend {
    fn caps(&self) -> &Caps;

    /// True once the device context is lost; every later call is a no-op.
    fn is_abandoned(&self) -> bool;

    /// Allocates storage matching `desc` exactly.
    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> Result<LiveTarget, BackendError>;

    fn release_render_target(&mut self, target: LiveTargetId);

    fn submit(&mut self, target: LiveTargetId, call: &PreparedCall<'_>) -> Result<(), BackendError>;

    /// Copies `src_rect` of `src` to `dst_point` in `dst`. Both rectangles lie
    /// inside their targets and the targets share a pixel format.
    fn copy_surface(
        &mut self,
        dst: LiveTargetId,
        src: LiveTargetId,
        src_rect: IRect,
        dst_point: IVec2,
    ) -> Result<(), BackendError>;

    /// Resolves multisampled contents into the single-sample view.
    fn resolve_msaa(&mut self, target: LiveTargetId);

    /// Copies `rect` (already clipped to the target) into `dst` as `format`.
    fn read_pixels(
        &mut self,
        target: LiveTargetId,
        rect: IRect,
        format: PixelFormat,
        dst: &mut [u8],
        row_bytes: usize,
    ) -> Result<(), BackendError>;

    /// Copies `src`, laid out as `format`, into `rect` of the target.
    fn write_pixels(
        &mut self,
        target: LiveTargetId,
        rect: IRect,
        format: PixelFormat,
        src: &[u8],
        row_bytes: usize,
    ) -> Result<(), BackendError>;
}
