//! Coordinate and geometry types shared by the draw surface and op builders.
//!
//! Canonical CPU space:
//! - origin top-left
//! - +X right, +Y down
//!
//! Float types (`Vec2`, `Rect`, `RRect`, `Matrix`) describe geometry before and
//! after the view transform. `IRect` and `IVec2` address physical pixels (scissors,
//! clears, copies, pixel I/O).

mod corner_radii;
mod irect;
mod ivec2;
mod matrix;
mod rect;
mod rrect;
mod vec2;

pub use corner_radii::CornerRadii;
pub use irect::IRect;
pub use ivec2::IVec2;
pub use matrix::Matrix;
pub use rect::Rect;
pub use rrect::RRect;
pub use vec2::Vec2;
