use crate::caps::Caps;
use crate::target::RenderTargetDesc;

/// Color space a draw context's target is tagged with.
///
/// The crate does not convert between spaces; the tag decides whether blending
/// is treated as gamma-correct.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ColorSpace {
    Srgb,
    SrgbLinear,
    DisplayP3,
}

/// Subpixel layout of the display a surface ends up on.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum PixelGeometry {
    #[default]
    Unknown,
    RgbHorizontal,
    BgrHorizontal,
    RgbVertical,
    BgrVertical,
}

/// Per-surface properties consulted by text drawing.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct SurfaceProps {
    pub pixel_geometry: PixelGeometry,
    pub use_device_independent_fonts: bool,
}

impl SurfaceProps {
    #[inline]
    pub fn new(pixel_geometry: PixelGeometry) -> Self {
        Self { pixel_geometry, use_device_independent_fonts: false }
    }
}

/// Whether simple shapes on this target may be tagged for instanced drawing.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct InstancedPipelineInfo {
    pub enabled: bool,
}

impl InstancedPipelineInfo {
    /// Instancing needs backend support and a target without mixed samples.
    pub fn new(caps: &Caps, desc: &RenderTargetDesc) -> Self {
        Self { enabled: caps.instanced_support && !desc.is_mixed_sampled() }
    }
}
