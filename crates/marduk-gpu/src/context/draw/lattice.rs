use crate::coords::{Matrix, Rect};
use crate::ops::{Clip, Geometry, OpFlags, OpKind};
use crate::paint::{Aa, Paint};
use crate::shape::Lattice;

use crate::context::DrawContext;

impl DrawContext<'_> {
    /// Stretches an `image_w` x `image_h` image into `dst` along the lattice
    /// divisions. The paint's shader supplies the image; local coordinates are
    /// image pixels.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_image_lattice(
        &mut self,
        clip: &Clip,
        paint: &Paint,
        matrix: &Matrix,
        image_w: u32,
        image_h: u32,
        lattice: &Lattice,
        dst: Rect,
    ) {
        if self.was_abandoned() {
            return;
        }
        if !lattice.is_valid(image_w, image_h) {
            log::warn!("invalid lattice for a {image_w}x{image_h} image; dropped");
            return;
        }
        let dst = dst.normalized();
        if !dst.is_finite() || dst.is_empty() {
            return;
        }

        let mut geometry = Geometry::new();
        for cell in lattice.cells(image_w, image_h, dst) {
            geometry.push_quad_local(cell.dst.corners(), cell.src.corners(), matrix, paint.color);
        }
        if geometry.is_empty() {
            return;
        }
        let aa = self.decide_aa(Aa::No, paint.allow_mixed_samples);
        self.add_mesh(clip, OpKind::Lattice, paint, aa, geometry, OpFlags::empty());
    }
}
