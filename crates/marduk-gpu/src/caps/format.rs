/// Pixel formats a render target or a pixel transfer can use.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum PixelFormat {
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Bgra8Unorm,
    Rgba16Float,
    /// Single-channel coverage (alpha-only) format.
    R8Unorm,
}

impl PixelFormat {
    pub const ALL: [PixelFormat; 5] = [
        PixelFormat::Rgba8Unorm,
        PixelFormat::Rgba8UnormSrgb,
        PixelFormat::Bgra8Unorm,
        PixelFormat::Rgba16Float,
        PixelFormat::R8Unorm,
    ];

    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8Unorm | PixelFormat::Rgba8UnormSrgb | PixelFormat::Bgra8Unorm => 4,
            PixelFormat::Rgba16Float => 8,
            PixelFormat::R8Unorm => 1,
        }
    }

    #[inline]
    pub const fn to_wgpu(self) -> wgpu::TextureFormat {
        match self {
            PixelFormat::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
            PixelFormat::Rgba8UnormSrgb => wgpu::TextureFormat::Rgba8UnormSrgb,
            PixelFormat::Bgra8Unorm => wgpu::TextureFormat::Bgra8Unorm,
            PixelFormat::Rgba16Float => wgpu::TextureFormat::Rgba16Float,
            PixelFormat::R8Unorm => wgpu::TextureFormat::R8Unorm,
        }
    }

    pub fn from_wgpu(format: wgpu::TextureFormat) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.to_wgpu() == format)
    }

    /// True when pixels can be transferred between `self` and `other` without
    /// losing information: identical formats or an RGBA/BGRA channel swizzle.
    #[inline]
    pub fn converts_losslessly_to(self, other: PixelFormat) -> bool {
        self == other
            || matches!(
                (self, other),
                (PixelFormat::Rgba8Unorm, PixelFormat::Bgra8Unorm)
                    | (PixelFormat::Bgra8Unorm, PixelFormat::Rgba8Unorm)
            )
    }
}
