use crate::coords::{Rect, Vec2};

/// Nine-patch style grid over an image.
///
/// `x_divs`/`y_divs` split each axis into segments. Even-indexed segments keep
/// their source size in the destination; odd-indexed segments stretch to fill
/// what is left.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lattice {
    pub x_divs: Vec<i32>,
    pub y_divs: Vec<i32>,
}

/// One source/destination cell pair.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LatticeCell {
    pub src: Rect,
    pub dst: Rect,
}

impl Lattice {
    pub fn new(x_divs: Vec<i32>, y_divs: Vec<i32>) -> Self {
        Self { x_divs, y_divs }
    }

    /// Divisions must be strictly increasing and lie within the image.
    pub fn is_valid(&self, image_w: u32, image_h: u32) -> bool {
        let ok = |divs: &[i32], len: u32| {
            divs.windows(2).all(|w| w[0] < w[1])
                && divs.iter().all(|&d| d >= 0 && d as i64 <= len as i64)
        };
        image_w > 0 && image_h > 0 && ok(&self.x_divs, image_w) && ok(&self.y_divs, image_h)
    }

    /// Non-empty cells, row-major.
    pub fn cells(&self, image_w: u32, image_h: u32, dst: Rect) -> Vec<LatticeCell> {
        let xs = axis(&self.x_divs, image_w as f32, dst.left(), dst.width());
        let ys = axis(&self.y_divs, image_h as f32, dst.top(), dst.height());

        let mut out = Vec::with_capacity(xs.len() * ys.len());
        for &(sy, dy) in &ys {
            for &(sx, dx) in &xs {
                out.push(LatticeCell {
                    src: Rect::from_ltrb(sx.0, sy.0, sx.1, sy.1),
                    dst: Rect::from_ltrb(dx.0, dy.0, dx.1, dy.1),
                });
            }
        }
        out
    }
}

type Span = (f32, f32);

/// Source and destination spans along one axis, skipping empty ones.
fn axis(divs: &[i32], src_len: f32, dst_start: f32, dst_len: f32) -> Vec<(Span, Span)> {
    let mut edges = Vec::with_capacity(divs.len() + 2);
    edges.push(0.0);
    edges.extend(divs.iter().map(|&d| d as f32));
    edges.push(src_len);

    let segments: Vec<Span> = edges.windows(2).map(|w| (w[0], w[1])).collect();
    let fixed: f32 = segments.iter().step_by(2).map(|s| s.1 - s.0).sum();
    let scalable = src_len - fixed;

    // Fixed segments shrink together when the destination is too small.
    let (fixed_scale, stretch) = if dst_len < fixed {
        (if fixed > 0.0 { dst_len / fixed } else { 0.0 }, 0.0)
    } else if scalable > 0.0 {
        (1.0, (dst_len - fixed) / scalable)
    } else {
        (1.0, 0.0)
    };

    let mut out = Vec::with_capacity(segments.len());
    let mut cursor = dst_start;
    for (i, (s0, s1)) in segments.into_iter().enumerate() {
        let scale = if i % 2 == 0 { fixed_scale } else { stretch };
        let len = (s1 - s0) * scale;
        if s1 > s0 && len > 0.0 {
            out.push(((s0, s1), (cursor, cursor + len)));
        }
        cursor += len;
    }
    out
}

/// Rotation+scale then translation, as used by sprite atlases.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RsXform {
    pub scos: f32,
    pub ssin: f32,
    pub tx: f32,
    pub ty: f32,
}

impl RsXform {
    pub const fn new(scos: f32, ssin: f32, tx: f32, ty: f32) -> Self {
        Self { scos, ssin, tx, ty }
    }

    pub fn from_rotation_scale(scale: f32, radians: f32, tx: f32, ty: f32) -> Self {
        let (s, c) = radians.sin_cos();
        Self::new(scale * c, scale * s, tx, ty)
    }

    #[inline]
    pub fn map_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.scos * p.x - self.ssin * p.y + self.tx,
            self.ssin * p.x + self.scos * p.y + self.ty,
        )
    }
}

/// Primitive topology for raw vertex draws.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum VertexMode {
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl VertexMode {
    /// Converts a vertex sequence (given as indices) into a triangle list.
    pub fn to_triangle_list(self, seq: &[u32]) -> Vec<u32> {
        match self {
            VertexMode::Triangles => seq[..seq.len() - seq.len() % 3].to_vec(),
            VertexMode::TriangleStrip => {
                let mut out = Vec::with_capacity(seq.len().saturating_sub(2) * 3);
                for i in 0..seq.len().saturating_sub(2) {
                    if i % 2 == 0 {
                        out.extend_from_slice(&[seq[i], seq[i + 1], seq[i + 2]]);
                    } else {
                        out.extend_from_slice(&[seq[i + 1], seq[i], seq[i + 2]]);
                    }
                }
                out
            }
            VertexMode::TriangleFan => {
                let mut out = Vec::with_capacity(seq.len().saturating_sub(2) * 3);
                for i in 1..seq.len().saturating_sub(1) {
                    out.extend_from_slice(&[seq[0], seq[i], seq[i + 1]]);
                }
                out
            }
        }
    }
}
