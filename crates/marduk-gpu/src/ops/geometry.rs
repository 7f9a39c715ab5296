use crate::coords::{Matrix, Rect, Vec2};
use crate::paint::Color;

use super::Vertex;

/// Half-width of the analytic AA fringe, in device pixels.
const AA_FRINGE: f32 = 0.5;
/// Longest allowed miter when offsetting polygon corners, in offset distances.
const MITER_LIMIT: f32 = 2.0;

/// Indexed triangle list owned by one op.
///
/// Indices are relative to this geometry's vertices; [`Geometry::append`]
/// rebases them when ops merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl Geometry {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        debug_assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
        debug_assert!(indices.len() % 3 == 0);
        Self { vertices, indices }
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Device-space bounds of every referenced vertex.
    pub fn bounds(&self) -> Option<Rect> {
        let pts: Vec<Vec2> = self
            .vertices
            .iter()
            .map(|v| Vec2::new(v.position[0], v.position[1]))
            .collect();
        Rect::bounding(&pts)
    }

    #[inline]
    pub fn push_vertex(&mut self, v: Vertex) -> u32 {
        self.vertices.push(v);
        (self.vertices.len() - 1) as u32
    }

    #[inline]
    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Concatenates `other`, rebasing its indices past the current vertices.
    pub fn append(&mut self, other: &Geometry) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Quad from clockwise corners; local coordinates are the corners.
    pub fn push_quad(&mut self, corners: [Vec2; 4], matrix: &Matrix, color: Color) {
        self.push_quad_local(corners, corners, matrix, color);
    }

    /// Quad with explicit per-corner local coordinates.
    pub fn push_quad_local(&mut self, corners: [Vec2; 4], locals: [Vec2; 4], matrix: &Matrix, color: Color) {
        let base = self.vertices.len() as u32;
        for (p, l) in corners.iter().zip(locals) {
            self.vertices.push(vertex(matrix.map_point(*p), l, color, 1.0));
        }
        self.push_triangle(base, base + 1, base + 2);
        self.push_triangle(base, base + 2, base + 3);
    }

    /// Independent triangles, three points each.
    pub fn push_triangles(&mut self, points: &[Vec2], matrix: &Matrix, color: Color) {
        for tri in points.chunks_exact(3) {
            let base = self.vertices.len() as u32;
            for p in tri {
                self.vertices.push(vertex(matrix.map_point(*p), *p, color, 1.0));
            }
            self.push_triangle(base, base + 1, base + 2);
        }
    }

    /// Triangle fan over a local-space polygon, rooted at its first point.
    ///
    /// Correct for convex polygons; for concave ones it is the stencil pass of
    /// stencil-then-cover.
    pub fn push_fan(&mut self, polygon: &[Vec2], matrix: &Matrix, color: Color) {
        if polygon.len() < 3 {
            return;
        }
        let base = self.vertices.len() as u32;
        for p in polygon {
            self.vertices.push(vertex(matrix.map_point(*p), *p, color, 1.0));
        }
        for i in 1..polygon.len() as u32 - 1 {
            self.push_triangle(base, base + i, base + i + 1);
        }
    }

    /// Convex polygon. `local` maps the polygon's points to shader space.
    ///
    /// With `fringe`, the interior is inset and a ring fading to zero coverage
    /// is added around it in device space.
    pub fn push_convex(&mut self, polygon: &[Vec2], matrix: &Matrix, local: &Matrix, color: Color, fringe: bool) {
        let mut polygon = polygon.to_vec();
        polygon.dedup_by(|a, b| (*a - *b).length() < 1e-6);
        if polygon.len() > 1 && (polygon[0] - polygon[polygon.len() - 1]).length() < 1e-6 {
            polygon.pop();
        }
        if polygon.len() < 3 {
            return;
        }

        let device: Vec<Vec2> = polygon.iter().map(|p| matrix.map_point(*p)).collect();
        let (inner, outer) = if fringe {
            (offset_polygon(&device, -AA_FRINGE), offset_polygon(&device, AA_FRINGE))
        } else {
            (device, Vec::new())
        };
        let inverse = matrix.invert();
        let to_local = |d: Vec2, fallback: Vec2| local.map_point(inverse.map_or(fallback, |m| m.map_point(d)));

        let base = self.vertices.len() as u32;
        for (d, p) in inner.iter().zip(&polygon) {
            self.vertices.push(vertex(*d, to_local(*d, *p), color, 1.0));
        }
        for i in 1..inner.len() as u32 - 1 {
            self.push_triangle(base, base + i, base + i + 1);
        }
        if fringe {
            let outer_l: Vec<Vec2> = outer.iter().zip(&polygon).map(|(d, p)| to_local(*d, *p)).collect();
            self.push_ring_device(&outer, &outer_l, 0.0, base, inner.len(), color);
        }
    }

    /// Band between two local-space loops with the same point count.
    ///
    /// Coverage interpolates from `outer_coverage` to `inner_coverage`; a solid
    /// ring uses 1.0 on both.
    pub fn push_ring(
        &mut self,
        outer: &[Vec2],
        inner: &[Vec2],
        matrix: &Matrix,
        color: Color,
        outer_coverage: f32,
        inner_coverage: f32,
    ) {
        debug_assert_eq!(outer.len(), inner.len());
        if outer.len() < 3 || outer.len() != inner.len() {
            return;
        }
        let inner_base = self.vertices.len() as u32;
        for p in inner {
            self.vertices.push(vertex(matrix.map_point(*p), *p, color, inner_coverage));
        }
        let outer_dev: Vec<Vec2> = outer.iter().map(|p| matrix.map_point(*p)).collect();
        self.push_ring_device(&outer_dev, outer, outer_coverage, inner_base, inner.len(), color);
    }

    /// Adds the `outer` loop and stitches it to `n` already pushed vertices
    /// starting at `inner_base`.
    fn push_ring_device(
        &mut self,
        outer: &[Vec2],
        outer_local: &[Vec2],
        coverage: f32,
        inner_base: u32,
        n: usize,
        color: Color,
    ) {
        let outer_base = self.vertices.len() as u32;
        for (d, l) in outer.iter().zip(outer_local) {
            self.vertices.push(vertex(*d, *l, color, coverage));
        }
        let n = n as u32;
        for i in 0..n {
            let j = (i + 1) % n;
            self.push_triangle(inner_base + i, outer_base + i, outer_base + j);
            self.push_triangle(inner_base + i, outer_base + j, inner_base + j);
        }
    }
}

#[inline]
fn vertex(device: Vec2, local: Vec2, color: Color, coverage: f32) -> Vertex {
    Vertex::new(device.to_array(), local.to_array(), color.to_array(), coverage)
}

/// Signed area (positive for clockwise loops in y-down device space).
pub(crate) fn signed_area(polygon: &[Vec2]) -> f32 {
    let n = polygon.len();
    (0..n).map(|i| polygon[i].cross(polygon[(i + 1) % n])).sum::<f32>() * 0.5
}

/// Moves every edge of a simple polygon outward by `d` (inward when negative).
pub(crate) fn offset_polygon(polygon: &[Vec2], d: f32) -> Vec<Vec2> {
    let n = polygon.len();
    if n < 3 {
        return polygon.to_vec();
    }
    // Outward normal is -perp for clockwise (positive area) loops.
    let sign = if signed_area(polygon) >= 0.0 { -1.0 } else { 1.0 };
    let normal = |a: Vec2, b: Vec2| (b - a).normalized().perp() * sign;

    (0..n)
        .map(|i| {
            let prev = polygon[(i + n - 1) % n];
            let cur = polygon[i];
            let next = polygon[(i + 1) % n];
            let n0 = normal(prev, cur);
            let n1 = normal(cur, next);
            let bisector = (n0 + n1).normalized();
            let cos_half = bisector.dot(n1);
            let len = if cos_half > 1.0 / MITER_LIMIT { d / cos_half } else { d * MITER_LIMIT };
            cur + bisector * len
        })
        .collect()
}
