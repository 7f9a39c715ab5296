use std::sync::Arc;

use crate::target::TargetId;

use super::{BlendMode, Color, Shader};

/// Caller's antialiasing request.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Aa {
    No,
    #[default]
    Yes,
}

/// Antialiasing strategy decided per draw call from the request and the target.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum AaType {
    #[default]
    None,
    /// Uniform multisampling of color and stencil.
    Msaa,
    /// Multisampled stencil with single-sampled color.
    MixedSamples,
    /// Analytic coverage computed in geometry.
    Coverage,
}

impl AaType {
    /// True for strategies resolved by the hardware sample pattern.
    #[inline]
    pub fn is_hw(self) -> bool {
        matches!(self, AaType::Msaa | AaType::MixedSamples)
    }
}

/// Client-facing paint: what to draw with, before any per-target decision.
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    pub color: Color,
    pub blend: BlendMode,
    pub shader: Option<Arc<Shader>>,
    /// Opt into mixed-samples AA when the target supports it.
    pub allow_mixed_samples: bool,
}

impl Default for Paint {
    fn default() -> Self {
        Self::solid(Color::BLACK)
    }
}

impl Paint {
    #[inline]
    pub fn solid(color: Color) -> Self {
        Self { color, blend: BlendMode::SrcOver, shader: None, allow_mixed_samples: false }
    }

    #[inline]
    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    #[inline]
    pub fn with_shader(mut self, shader: Arc<Shader>) -> Self {
        self.shader = Some(shader);
        self
    }

    #[inline]
    pub fn with_mixed_samples(mut self, allow: bool) -> Self {
        self.allow_mixed_samples = allow;
        self
    }

    /// True when every pixel the paint touches ends up opaque.
    pub fn is_opaque(&self) -> bool {
        self.color.is_opaque() && self.shader.as_ref().is_none_or(|s| s.is_opaque())
    }

    pub fn sampled_targets(&self) -> Vec<TargetId> {
        let mut out = Vec::new();
        if let Some(shader) = &self.shader {
            shader.sampled_targets(&mut out);
        }
        out.sort();
        out.dedup();
        out
    }
}

/// Immutable shading state attached to a recorded op.
///
/// The paint color is baked into vertex colors, so it is not part of the merge
/// key; blend, shader identity and the decided AA type are.
#[derive(Debug, Clone, PartialEq)]
pub struct PaintDescriptor {
    color: Color,
    blend: BlendMode,
    shader: Option<Arc<Shader>>,
    aa: AaType,
}

impl PaintDescriptor {
    pub fn new(paint: &Paint, aa: AaType) -> Self {
        Self { color: paint.color, blend: paint.blend, shader: paint.shader.clone(), aa }
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    pub fn blend(&self) -> BlendMode {
        self.blend
    }

    #[inline]
    pub fn shader(&self) -> Option<&Arc<Shader>> {
        self.shader.as_ref()
    }

    #[inline]
    pub fn aa(&self) -> AaType {
        self.aa
    }

    /// Identity of the shader tree, for merge keys.
    #[inline]
    pub fn shader_id(&self) -> Option<usize> {
        self.shader.as_ref().map(|s| Arc::as_ptr(s) as usize)
    }
}
