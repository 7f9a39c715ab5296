use crate::coords::{Matrix, Rect, Vec2};
use crate::ops::{Clip, Geometry, OpFlags, OpKind, Vertex};
use crate::paint::{Aa, Color, Paint};
use crate::shape::{RsXform, VertexMode};

use crate::context::DrawContext;

impl DrawContext<'_> {
    /// Draws caller-supplied triangles.
    ///
    /// `texs` and `colors`, when given, must match `positions` in length.
    /// `indices` select the vertex sequence `mode` is applied to; without them
    /// the positions are used in order. Per-vertex colors replace the paint
    /// color and are scaled by its alpha.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_vertices(
        &mut self,
        clip: &Clip,
        paint: &Paint,
        matrix: &Matrix,
        mode: VertexMode,
        positions: &[Vec2],
        texs: Option<&[Vec2]>,
        colors: Option<&[Color]>,
        indices: Option<&[u32]>,
    ) {
        if self.was_abandoned() {
            return;
        }
        let n = positions.len();
        if texs.is_some_and(|t| t.len() != n) || colors.is_some_and(|c| c.len() != n) {
            log::warn!("draw_vertices: attribute arrays do not match {n} positions; dropped");
            return;
        }
        if !matrix.is_finite() || !positions.iter().all(|p| p.is_finite()) {
            log::warn!("draw_vertices with non-finite input; dropped");
            return;
        }

        let sequence: Vec<u32> = match indices {
            Some(idx) if idx.iter().any(|&i| i as usize >= n) => {
                log::warn!("draw_vertices: index out of range for {n} vertices; dropped");
                return;
            }
            Some(idx) => idx.to_vec(),
            None => (0..n as u32).collect(),
        };
        let triangles = mode.to_triangle_list(&sequence);
        if triangles.is_empty() {
            return;
        }

        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let local = texs.map_or(p, |t| t[i]);
                let color = colors.map_or(paint.color, |c| c[i].scaled(paint.color.a));
                Vertex::new(matrix.map_point(p).to_array(), local.to_array(), color.to_array(), 1.0)
            })
            .collect();

        let aa = self.decide_aa(Aa::No, paint.allow_mixed_samples);
        let geometry = Geometry::from_parts(vertices, triangles);
        self.add_mesh(clip, OpKind::Vertices, paint, aa, geometry, OpFlags::empty());
    }

    /// Draws one textured quad per sprite. Each sprite is the size of its
    /// `tex_rects` entry, placed by the matching transform.
    pub fn draw_atlas(
        &mut self,
        clip: &Clip,
        paint: &Paint,
        matrix: &Matrix,
        xforms: &[RsXform],
        tex_rects: &[Rect],
        colors: Option<&[Color]>,
    ) {
        if self.was_abandoned() || xforms.is_empty() {
            return;
        }
        if xforms.len() != tex_rects.len() || colors.is_some_and(|c| c.len() != xforms.len()) {
            log::warn!("draw_atlas: {} transforms for {} sprites; dropped", xforms.len(), tex_rects.len());
            return;
        }

        let mut geometry = Geometry::new();
        for (i, (xform, tex)) in xforms.iter().zip(tex_rects).enumerate() {
            let tex = tex.normalized();
            if tex.is_empty() {
                continue;
            }
            let corners = Rect::new(0.0, 0.0, tex.width(), tex.height()).corners().map(|p| xform.map_point(p));
            let color = colors.map_or(paint.color, |c| c[i].scaled(paint.color.a));
            geometry.push_quad_local(corners, tex.corners(), matrix, color);
        }
        if geometry.is_empty() {
            return;
        }

        let aa = self.decide_aa(Aa::No, paint.allow_mixed_samples);
        self.add_mesh(clip, OpKind::Atlas, paint, aa, geometry, OpFlags::empty());
    }
}
