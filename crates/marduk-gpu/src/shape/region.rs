use crate::coords::{IRect, Rect};

use super::Path;

/// Union of non-overlapping integer rectangles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    rects: Vec<IRect>,
}

impl Region {
    /// Empty rects are discarded. Callers keep the rest disjoint.
    pub fn new(rects: impl IntoIterator<Item = IRect>) -> Self {
        Self { rects: rects.into_iter().filter(|r| !r.is_empty()).collect() }
    }

    pub fn from_rect(rect: IRect) -> Self {
        Self::new([rect])
    }

    #[inline]
    pub fn rects(&self) -> &[IRect] {
        &self.rects
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    #[inline]
    pub fn is_rect(&self) -> bool {
        self.rects.len() == 1
    }

    pub fn bounds(&self) -> Option<IRect> {
        let first = *self.rects.first()?;
        Some(self.rects[1..].iter().fold(first, |acc, r| {
            IRect::from_ltrb(
                acc.x.min(r.x),
                acc.y.min(r.y),
                acc.right().max(r.right()),
                acc.bottom().max(r.bottom()),
            )
        }))
    }

    /// One rectangle contour per rect; disjoint rects make the rule irrelevant.
    pub fn to_path(&self) -> Path {
        let mut p = Path::new();
        for r in &self.rects {
            p.add_rect(Rect::from(*r));
        }
        p
    }
}
