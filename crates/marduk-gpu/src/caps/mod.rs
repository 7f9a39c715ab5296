//! Backend capability description.
//!
//! `Caps` is read-only for the op layer: it decides whether a render target can
//! be instantiated, how many vertex attributes a geometry program may declare,
//! and which AA strategies exist.

mod format;

use std::collections::HashMap;

pub use format::PixelFormat;

/// Sample counts probed on an adapter.
const PROBED_SAMPLE_COUNTS: [u32; 5] = [1, 2, 4, 8, 16];

/// Per-format capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatCaps {
    pub renderable: bool,
    pub readable: bool,
    pub writable: bool,
    /// Supported color sample counts, ascending. Contains 1 when renderable.
    pub sample_counts: Vec<u32>,
}

impl FormatCaps {
    pub fn renderable(sample_counts: &[u32]) -> Self {
        Self { renderable: true, readable: true, writable: true, sample_counts: sample_counts.to_vec() }
    }
}

/// Capability provider consumed by the op layer.
#[derive(Debug, Clone)]
pub struct Caps {
    /// Largest number of vertex attributes a geometry program may declare.
    pub max_vertex_attributes: u32,
    /// Largest width/height of a render target.
    pub max_render_target_size: u32,
    /// Stencil buffers with more samples than the color buffer are available.
    pub mixed_samples_support: bool,
    /// Instanced rect/oval/rrect pipelines are available.
    pub instanced_support: bool,
    /// A whole-target clear is cheaper than a scissored one.
    pub prefer_full_clears: bool,
    formats: HashMap<PixelFormat, FormatCaps>,
}

impl Default for Caps {
    fn default() -> Self {
        Self::from_limits(&wgpu::Limits::default())
    }
}

impl Caps {
    /// Capabilities implied by a set of wgpu limits, with the format table wgpu
    /// guarantees on every backend.
    pub fn from_limits(limits: &wgpu::Limits) -> Self {
        let mut formats = HashMap::new();
        for format in [PixelFormat::Rgba8Unorm, PixelFormat::Rgba8UnormSrgb, PixelFormat::Bgra8Unorm] {
            formats.insert(format, FormatCaps::renderable(&[1, 4]));
        }
        formats.insert(PixelFormat::Rgba16Float, FormatCaps::renderable(&[1, 4]));
        formats.insert(PixelFormat::R8Unorm, FormatCaps::renderable(&[1]));

        Self {
            max_vertex_attributes: limits.max_vertex_attributes,
            max_render_target_size: limits.max_texture_dimension_2d,
            mixed_samples_support: false,
            instanced_support: true,
            prefer_full_clears: false,
            formats,
        }
    }

    /// Probes a live adapter for limits and per-format support.
    pub fn from_adapter(adapter: &wgpu::Adapter) -> Self {
        let mut caps = Self::from_limits(&adapter.limits());
        caps.formats.clear();

        for format in PixelFormat::ALL {
            let features = adapter.get_texture_format_features(format.to_wgpu());
            let usages = features.allowed_usages;
            let renderable = usages.contains(wgpu::TextureUsages::RENDER_ATTACHMENT);
            let sample_counts = if renderable {
                PROBED_SAMPLE_COUNTS
                    .into_iter()
                    .filter(|&n| n == 1 || features.flags.sample_count_supported(n))
                    .collect()
            } else {
                Vec::new()
            };
            caps.formats.insert(
                format,
                FormatCaps {
                    renderable,
                    readable: usages.contains(wgpu::TextureUsages::COPY_SRC),
                    writable: usages.contains(wgpu::TextureUsages::COPY_DST),
                    sample_counts,
                },
            );
        }

        log::debug!(
            "caps probed: max_vertex_attributes={} max_rt_size={}",
            caps.max_vertex_attributes,
            caps.max_render_target_size
        );
        caps
    }

    /// Replaces (or removes, with `None`) one format's capabilities.
    pub fn with_format(mut self, format: PixelFormat, caps: Option<FormatCaps>) -> Self {
        match caps {
            Some(c) => self.formats.insert(format, c),
            None => self.formats.remove(&format),
        };
        self
    }

    pub fn with_max_vertex_attributes(mut self, n: u32) -> Self {
        self.max_vertex_attributes = n;
        self
    }

    #[inline]
    pub fn format_caps(&self, format: PixelFormat) -> Option<&FormatCaps> {
        self.formats.get(&format)
    }

    #[inline]
    pub fn is_renderable(&self, format: PixelFormat) -> bool {
        self.format_caps(format).is_some_and(|c| c.renderable)
    }

    #[inline]
    pub fn supports_sample_count(&self, format: PixelFormat, count: u32) -> bool {
        self.format_caps(format).is_some_and(|c| c.renderable && c.sample_counts.contains(&count))
    }

    #[inline]
    pub fn is_readable(&self, format: PixelFormat) -> bool {
        self.format_caps(format).is_some_and(|c| c.readable)
    }

    #[inline]
    pub fn is_writable(&self, format: PixelFormat) -> bool {
        self.format_caps(format).is_some_and(|c| c.writable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_drive_attribute_budget() {
        let limits = wgpu::Limits { max_vertex_attributes: 7, ..wgpu::Limits::default() };
        assert_eq!(Caps::from_limits(&limits).max_vertex_attributes, 7);
    }

    #[test]
    fn default_table_supports_4x_rgba() {
        let caps = Caps::default();
        assert!(caps.supports_sample_count(PixelFormat::Rgba8Unorm, 4));
        assert!(!caps.supports_sample_count(PixelFormat::R8Unorm, 4));
        assert!(!caps.supports_sample_count(PixelFormat::Rgba8Unorm, 3));
    }

    #[test]
    fn removing_a_format_makes_it_unsupported() {
        let caps = Caps::default().with_format(PixelFormat::Rgba16Float, None);
        assert!(!caps.is_renderable(PixelFormat::Rgba16Float));
        assert!(!caps.is_readable(PixelFormat::Rgba16Float));
    }

    #[test]
    fn swizzle_is_the_only_lossless_conversion() {
        assert!(PixelFormat::Rgba8Unorm.converts_losslessly_to(PixelFormat::Bgra8Unorm));
        assert!(!PixelFormat::Rgba8Unorm.converts_losslessly_to(PixelFormat::Rgba16Float));
        assert!(!PixelFormat::Rgba8Unorm.converts_losslessly_to(PixelFormat::Rgba8UnormSrgb));
    }
}
