//! Paint model: colors, blending, shader trees and the per-op paint descriptor.
//!
//! Colors are linear premultiplied alpha throughout. Color-space conversion is
//! out of scope for this crate; a draw context only records the space its target
//! is tagged with.

mod blend;
mod color;
mod descriptor;
mod gradient;
mod shader;

pub use blend::BlendMode;
pub use color::Color;
pub use descriptor::{Aa, AaType, Paint, PaintDescriptor};
pub use gradient::{ColorStop, LinearGradient, SpreadMode};
pub use shader::{ImageShader, Shader};
