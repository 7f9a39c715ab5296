//! Recorded draw operations.
//!
//! A [`DrawOp`] is geometry plus the shading, clip and stencil state it is
//! drawn with. Ops declare a [`MergeKey`]; the merge pass folds ops with equal
//! keys into one submission when doing so cannot change the rendered result.

mod clip;
mod geometry;
mod merge;
mod op;
mod program;

pub use clip::Clip;
pub use geometry::Geometry;
pub use op::{DrawOp, MergeKey, MeshOp, OpFlags, OpKind, OpPayload, StencilMode};
pub use program::{GeometryProgram, ProgramKind, Vertex, VertexAttribute};

#[cfg(test)]
pub(crate) use geometry::signed_area;
pub(crate) use merge::merge_ops;
