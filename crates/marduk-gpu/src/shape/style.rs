/// Fill or stroke a shape.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub enum Style {
    #[default]
    Fill,
    /// Stroke of `width` local units. Zero is a one device pixel hairline.
    Stroke { width: f32 },
}

impl Style {
    #[inline]
    pub fn stroke(width: f32) -> Self {
        Style::Stroke { width }
    }

    #[inline]
    pub fn hairline() -> Self {
        Style::Stroke { width: 0.0 }
    }

    #[inline]
    pub fn is_fill(&self) -> bool {
        matches!(self, Style::Fill)
    }

    #[inline]
    pub fn is_hairline(&self) -> bool {
        matches!(self, Style::Stroke { width } if *width == 0.0)
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Style::Fill => true,
            Style::Stroke { width } => width.is_finite() && *width >= 0.0,
        }
    }
}
