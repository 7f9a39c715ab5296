use crate::coords::{IRect, Rect};

/// Clip state a draw call is recorded under.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Clip {
    #[default]
    WideOpen,
    /// Device-space scissor rectangle.
    Scissor(IRect),
}

impl Clip {
    /// Resolves the clip against the target and the op's device bounds.
    ///
    /// Returns `None` when nothing would be drawn. Otherwise returns the scissor
    /// the op must carry, which is `None` when the clip cannot affect the op.
    pub fn apply(self, target: IRect, bounds: Rect) -> Option<Option<IRect>> {
        let visible = Rect::from(target).intersect(bounds)?;
        match self {
            Clip::WideOpen => Some(None),
            Clip::Scissor(s) => {
                let s = s.intersect(target)?;
                let sf = Rect::from(s);
                if !sf.intersects(visible) {
                    return None;
                }
                Some((!sf.contains_rect(visible)).then_some(s))
            }
        }
    }
}
