use crate::caps::{Caps, PixelFormat};
use crate::coords::{IRect, Rect};
use crate::error::InstantiateError;

/// Vertical origin of a render target's pixel rows.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Origin {
    #[default]
    TopLeft,
    BottomLeft,
}

/// Immutable description of a render target.
///
/// Every query here is answered without touching the backend.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RenderTargetDesc {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Color samples per pixel (1 = single sampled).
    pub sample_count: u32,
    /// Stencil samples per pixel. Equal to `sample_count` unless the target
    /// uses mixed samples.
    pub stencil_sample_count: u32,
    pub origin: Origin,
}

impl RenderTargetDesc {
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            sample_count: 1,
            stencil_sample_count: 1,
            origin: Origin::TopLeft,
        }
    }

    /// Uniform multisampling: color and stencil share `count` samples.
    pub fn with_samples(mut self, count: u32) -> Self {
        self.sample_count = count;
        self.stencil_sample_count = count;
        self
    }

    /// Multisampled stencil over the current color sample count.
    pub fn with_stencil_samples(mut self, count: u32) -> Self {
        self.stencil_sample_count = count;
        self
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    #[inline]
    pub fn is_unified_multisampled(&self) -> bool {
        self.sample_count > 1
    }

    #[inline]
    pub fn is_mixed_sampled(&self) -> bool {
        self.stencil_sample_count > self.sample_count
    }

    #[inline]
    pub fn is_stencil_buffer_multisampled(&self) -> bool {
        self.stencil_sample_count > 1
    }

    #[inline]
    pub fn bounds(&self) -> IRect {
        IRect::from_wh(self.width as i32, self.height as i32)
    }

    #[inline]
    pub fn bounds_f(&self) -> Rect {
        Rect::from_wh(self.width as f32, self.height as f32)
    }

    /// Checks the description against `caps` without allocating anything.
    pub fn check(&self, caps: &Caps) -> Result<(), InstantiateError> {
        let max = caps.max_render_target_size;
        if self.width == 0 || self.height == 0 || self.width > max || self.height > max {
            return Err(InstantiateError::TooLarge { width: self.width, height: self.height, max });
        }
        if !caps.is_renderable(self.format) {
            return Err(InstantiateError::UnsupportedFormat(self.format));
        }
        if !caps.supports_sample_count(self.format, self.sample_count) {
            return Err(InstantiateError::UnsupportedSampleCount {
                format: self.format,
                count: self.sample_count,
            });
        }
        if self.stencil_sample_count < self.sample_count {
            return Err(InstantiateError::InvalidStencilSamples {
                color: self.sample_count,
                stencil: self.stencil_sample_count,
            });
        }
        if self.is_mixed_sampled() && !caps.mixed_samples_support {
            return Err(InstantiateError::UnsupportedSampleCount {
                format: self.format,
                count: self.stencil_sample_count,
            });
        }
        Ok(())
    }
}
