use std::mem;

use crate::coords::{Matrix, Vec2};
use crate::ops::Clip;
use crate::paint::Paint;

use super::{DrawContext, OpAppender, SurfaceProps};

/// Turns text into draw ops.
///
/// Glyph shaping and atlas management live outside this crate; a draw context
/// hands its drawer an [`OpAppender`] and the surface properties of its target.
pub trait TextDrawer {
    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &mut self,
        appender: &mut OpAppender<'_>,
        props: &SurfaceProps,
        clip: &Clip,
        paint: &Paint,
        matrix: &Matrix,
        text: &str,
        origin: Vec2,
    );
}

/// Default drawer: records nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTextDrawer;

impl TextDrawer for NoTextDrawer {
    fn draw_text(
        &mut self,
        _appender: &mut OpAppender<'_>,
        _props: &SurfaceProps,
        _clip: &Clip,
        _paint: &Paint,
        _matrix: &Matrix,
        text: &str,
        _origin: Vec2,
    ) {
        log::debug!("no text drawer installed; {} bytes of text dropped", text.len());
    }
}

impl DrawContext<'_> {
    /// Delegates to the installed [`TextDrawer`].
    pub fn draw_text(&mut self, clip: &Clip, paint: &Paint, matrix: &Matrix, text: &str, origin: Vec2) {
        if self.was_abandoned() || text.is_empty() {
            return;
        }
        let props = self.state.props;
        let mut drawer = mem::replace(&mut self.state.text_drawer, Box::new(NoTextDrawer));
        {
            let mut appender = OpAppender::new(self.reborrow());
            drawer.draw_text(&mut appender, &props, clip, paint, matrix, text, origin);
        }
        self.state.text_drawer = drawer;
    }
}
