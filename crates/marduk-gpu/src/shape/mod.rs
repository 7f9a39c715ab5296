//! Shape descriptions and the rasterization collaborator.
//!
//! Paths, regions and lattices are plain data in local coordinates. Turning
//! them into polygons and triangles is delegated to a [`ShapeRasterizer`].

mod lattice;
mod path;
mod rasterizer;
mod region;
mod style;

pub use lattice::{Lattice, LatticeCell, RsXform, VertexMode};
pub use path::{FillRule, Path, PathVerb};
pub use rasterizer::{corner_segments, ellipse_points, is_convex, BasicRasterizer, Contour, ShapeRasterizer};
pub use region::Region;
pub use style::Style;
