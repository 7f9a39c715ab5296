use std::sync::Arc;

use crate::coords::{Matrix, Vec2};
use crate::target::TargetId;

use super::{BlendMode, Color, LinearGradient};

/// Samples another render target as a texture.
///
/// `local_matrix` maps the draw's local coordinates to texel coordinates of the
/// sampled target.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageShader {
    pub target: TargetId,
    pub local_matrix: Matrix,
}

/// Shader tree evaluated per fragment in local coordinates.
///
/// Shared between paints through `Arc`; two paints merge only when they point at
/// the same tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Shader {
    LinearGradient(LinearGradient),
    Image(ImageShader),
    /// `src` blended over `dst` with `mode`.
    Compose {
        dst: Arc<Shader>,
        src: Arc<Shader>,
        mode: BlendMode,
    },
}

impl Shader {
    pub fn image(target: TargetId) -> Self {
        Shader::Image(ImageShader { target, local_matrix: Matrix::identity() })
    }

    pub fn image_with_matrix(target: TargetId, local_matrix: Matrix) -> Self {
        Shader::Image(ImageShader { target, local_matrix })
    }

    /// Collects every render target the tree samples (may contain duplicates).
    pub fn sampled_targets(&self, out: &mut Vec<TargetId>) {
        match self {
            Shader::LinearGradient(_) => {}
            Shader::Image(img) => out.push(img.target),
            Shader::Compose { dst, src, .. } => {
                dst.sampled_targets(out);
                src.sampled_targets(out);
            }
        }
    }

    /// True when every output of the tree is opaque, as far as can be proven
    /// without sampling.
    pub fn is_opaque(&self) -> bool {
        match self {
            Shader::LinearGradient(g) => g.is_opaque(),
            Shader::Image(_) => false,
            Shader::Compose { dst, src, mode } => match mode {
                BlendMode::SrcOver => dst.is_opaque() || src.is_opaque(),
                BlendMode::Src => src.is_opaque(),
                _ => false,
            },
        }
    }

    /// Evaluates the tree at `local`. `sample` resolves image lookups.
    pub fn eval(&self, local: Vec2, sample: &mut dyn FnMut(TargetId, Vec2) -> Color) -> Color {
        match self {
            Shader::LinearGradient(g) => g.eval(local),
            Shader::Image(img) => sample(img.target, img.local_matrix.map_point(local)),
            Shader::Compose { dst, src, mode } => {
                let d = dst.eval(local, sample);
                let s = src.eval(local, sample);
                mode.apply(s, d)
            }
        }
    }
}
