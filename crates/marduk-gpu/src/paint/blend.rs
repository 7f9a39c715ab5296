use super::Color;

/// Porter-Duff / separable blend modes supported by the op layer.
///
/// All modes operate on premultiplied colors.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum BlendMode {
    Clear,
    Src,
    #[default]
    SrcOver,
    DstOver,
    DstIn,
    DstOut,
    Plus,
    Multiply,
    Screen,
}

impl BlendMode {
    /// True when drawing `a` then `b` over any destination gives the same result
    /// as drawing `b` then `a`. Only additive blending qualifies.
    #[inline]
    pub fn commutes_with(self, other: BlendMode) -> bool {
        self == BlendMode::Plus && other == BlendMode::Plus
    }

    /// True when the result ignores the destination for an opaque source.
    #[inline]
    pub fn overwrites_with(self, src: Color) -> bool {
        match self {
            BlendMode::Src | BlendMode::Clear => true,
            BlendMode::SrcOver => src.is_opaque(),
            _ => false,
        }
    }

    /// Blends premultiplied `src` onto premultiplied `dst`.
    pub fn apply(self, src: Color, dst: Color) -> Color {
        let out = match self {
            BlendMode::Clear => Color::TRANSPARENT,
            BlendMode::Src => src,
            BlendMode::SrcOver => over(src, dst),
            BlendMode::DstOver => over(dst, src),
            BlendMode::DstIn => dst.scaled(src.a),
            BlendMode::DstOut => dst.scaled(1.0 - src.a),
            BlendMode::Plus => Color::from_premul(
                src.r + dst.r,
                src.g + dst.g,
                src.b + dst.b,
                src.a + dst.a,
            ),
            BlendMode::Multiply => {
                let ch = |s: f32, d: f32| s * (1.0 - dst.a) + d * (1.0 - src.a) + s * d;
                Color::from_premul(
                    ch(src.r, dst.r),
                    ch(src.g, dst.g),
                    ch(src.b, dst.b),
                    src.a + dst.a - src.a * dst.a,
                )
            }
            BlendMode::Screen => {
                let ch = |s: f32, d: f32| s + d - s * d;
                Color::from_premul(ch(src.r, dst.r), ch(src.g, dst.g), ch(src.b, dst.b), ch(src.a, dst.a))
            }
        };
        out.clamped()
    }

    /// Fixed-function blend state for backends that render through wgpu.
    ///
    /// `Multiply` and `Screen` need dual-source or shader blending on most
    /// devices; they map to the nearest fixed-function approximation.
    pub fn to_wgpu(self) -> wgpu::BlendState {
        use wgpu::BlendFactor as F;
        let (src_factor, dst_factor) = match self {
            BlendMode::Clear => (F::Zero, F::Zero),
            BlendMode::Src => (F::One, F::Zero),
            BlendMode::SrcOver => (F::One, F::OneMinusSrcAlpha),
            BlendMode::DstOver => (F::OneMinusDstAlpha, F::One),
            BlendMode::DstIn => (F::Zero, F::SrcAlpha),
            BlendMode::DstOut => (F::Zero, F::OneMinusSrcAlpha),
            BlendMode::Plus => (F::One, F::One),
            BlendMode::Multiply => (F::Dst, F::OneMinusSrcAlpha),
            BlendMode::Screen => (F::One, F::OneMinusSrc),
        };
        let component = wgpu::BlendComponent {
            src_factor,
            dst_factor,
            operation: wgpu::BlendOperation::Add,
        };
        wgpu::BlendState { color: component, alpha: component }
    }
}

#[inline]
fn over(top: Color, bottom: Color) -> Color {
    let k = 1.0 - top.a;
    Color::from_premul(
        top.r + bottom.r * k,
        top.g + bottom.g * k,
        top.b + bottom.b * k,
        top.a + bottom.a * k,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn src_over_opaque_replaces_destination() {
        let red = Color::from_premul(1.0, 0.0, 0.0, 1.0);
        assert_eq!(BlendMode::SrcOver.apply(red, Color::WHITE), red);
        assert!(BlendMode::SrcOver.overwrites_with(red));
        assert!(!BlendMode::SrcOver.overwrites_with(red.scaled(0.5)));
    }

    #[test]
    fn only_plus_commutes() {
        assert!(BlendMode::Plus.commutes_with(BlendMode::Plus));
        assert!(!BlendMode::SrcOver.commutes_with(BlendMode::SrcOver));
        assert!(!BlendMode::Plus.commutes_with(BlendMode::SrcOver));
    }

    #[test]
    fn src_over_maps_to_premul_blend_state() {
        let state = BlendMode::SrcOver.to_wgpu();
        assert_eq!(state.color.src_factor, wgpu::BlendFactor::One);
        assert_eq!(state.color.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
    }
}
