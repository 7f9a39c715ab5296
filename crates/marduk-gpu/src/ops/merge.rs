use super::{DrawOp, StencilMode};

/// True when `later` may be moved in front of `earlier` without changing the
/// rendered result.
fn can_reorder(earlier: &DrawOp, later: &DrawOp) -> bool {
    if earlier.is_barrier() || later.is_barrier() {
        return false;
    }
    if !earlier.bounds().intersects(later.bounds()) {
        return true;
    }
    let stencil = earlier.mesh_op().is_some_and(|m| m.stencil != StencilMode::Disabled)
        || later.mesh_op().is_some_and(|m| m.stencil != StencilMode::Disabled);
    match (earlier.blend(), later.blend()) {
        (Some(a), Some(b)) => !stencil && a.commutes_with(b),
        _ => false,
    }
}

/// Folds compatible ops together, preserving rendered output.
///
/// Each op is offered to up to `lookback` preceding survivors, nearest first.
/// The walk stops at the first survivor it may not be reordered past. Returns
/// the surviving ops and the number of merges performed.
pub(crate) fn merge_ops(ops: Vec<DrawOp>, lookback: usize) -> (Vec<DrawOp>, usize) {
    let lookback = lookback.max(1);
    let mut out: Vec<DrawOp> = Vec::with_capacity(ops.len());
    let mut merges = 0;

    'ops: for op in ops {
        if let Some(key) = op.merge_key() {
            for idx in (0..out.len()).rev().take(lookback) {
                let candidate = &out[idx];
                if candidate.merge_key().as_ref() == Some(&key) {
                    log::trace!("merging {:?} into survivor {idx}", op.kind());
                    out[idx].absorb(op);
                    merges += 1;
                    continue 'ops;
                }
                if !can_reorder(candidate, &op) {
                    break;
                }
            }
        }
        out.push(op);
    }

    (out, merges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{IRect, Matrix, Rect};
    use crate::ops::{Geometry, GeometryProgram, OpKind};
    use crate::paint::{AaType, BlendMode, Color, Paint, PaintDescriptor};

    fn op(kind: OpKind, r: Rect, blend: BlendMode) -> DrawOp {
        let paint = Paint::solid(Color::BLACK).with_blend(blend);
        let mut g = Geometry::new();
        g.push_quad(r.corners(), &Matrix::identity(), paint.color);
        DrawOp::mesh(
            kind,
            GeometryProgram::for_paint(false, false),
            g,
            PaintDescriptor::new(&paint, AaType::None),
            StencilMode::Disabled,
        )
        .unwrap()
    }

    fn rect(x: f32) -> Rect {
        Rect::new(x, 0.0, 4.0, 4.0)
    }

    // ── adjacency ──────────────────────────────────────────────────────────

    #[test]
    fn adjacent_equal_keys_merge() {
        let ops = vec![op(OpKind::Rect, rect(0.0), BlendMode::SrcOver), op(OpKind::Rect, rect(2.0), BlendMode::SrcOver)];
        let (out, merges) = merge_ops(ops, 10);
        assert_eq!((out.len(), merges), (1, 1));
        assert_eq!(out[0].merged_count(), 2);
    }

    #[test]
    fn different_keys_stay_apart() {
        let ops = vec![op(OpKind::Rect, rect(0.0), BlendMode::SrcOver), op(OpKind::Oval, rect(10.0), BlendMode::SrcOver)];
        let (out, merges) = merge_ops(ops, 10);
        assert_eq!((out.len(), merges), (2, 0));
    }

    // ── look-back ──────────────────────────────────────────────────────────

    #[test]
    fn looks_past_disjoint_ops() {
        let ops = vec![
            op(OpKind::Rect, rect(0.0), BlendMode::SrcOver),
            op(OpKind::Oval, rect(20.0), BlendMode::SrcOver),
            op(OpKind::Rect, rect(40.0), BlendMode::SrcOver),
        ];
        let (out, _) = merge_ops(ops, 10);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].kind(), OpKind::Rect);
        assert_eq!(out[0].merged_count(), 2);
    }

    #[test]
    fn overlapping_non_commutative_blocks() {
        let ops = vec![
            op(OpKind::Rect, rect(0.0), BlendMode::SrcOver),
            op(OpKind::Oval, rect(2.0), BlendMode::SrcOver),
            op(OpKind::Rect, rect(3.0), BlendMode::SrcOver),
        ];
        let (out, merges) = merge_ops(ops, 10);
        assert_eq!((out.len(), merges), (3, 0));
    }

    #[test]
    fn additive_blends_commute_when_overlapping() {
        let ops = vec![
            op(OpKind::Rect, rect(0.0), BlendMode::Plus),
            op(OpKind::Oval, rect(1.0), BlendMode::Plus),
            op(OpKind::Rect, rect(2.0), BlendMode::Plus),
        ];
        let (out, merges) = merge_ops(ops, 10);
        assert_eq!((out.len(), merges), (2, 1));
    }

    #[test]
    fn clears_are_barriers() {
        let ops = vec![
            op(OpKind::Rect, rect(0.0), BlendMode::SrcOver),
            DrawOp::clear(Some(IRect::new(50, 50, 2, 2)), Color::WHITE, IRect::from_wh(64, 64)),
            op(OpKind::Rect, rect(10.0), BlendMode::SrcOver),
        ];
        let (out, merges) = merge_ops(ops, 10);
        assert_eq!((out.len(), merges), (3, 0));
    }

    #[test]
    fn lookback_window_is_bounded() {
        let mut ops = vec![op(OpKind::Rect, rect(0.0), BlendMode::SrcOver)];
        for i in 1..=3 {
            ops.push(op(OpKind::Oval, rect(i as f32 * 10.0), BlendMode::SrcOver));
        }
        ops.push(op(OpKind::Rect, rect(100.0), BlendMode::SrcOver));

        // The ovals fold into one survivor; the last rect sits two survivors back.
        let (out, merges) = merge_ops(ops.clone(), 1);
        assert_eq!((out.len(), merges), (3, 2));
        let (out, merges) = merge_ops(ops, 2);
        assert_eq!((out.len(), merges), (2, 3));
    }
}
