/// Linear premultiplied RGBA color.
///
/// Invariant:
/// - `rgb` components are multiplied by `a` (premultiplied alpha).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Color {
    pub r: f32, // premultiplied
    pub g: f32, // premultiplied
    pub b: f32, // premultiplied
    pub a: f32,
}

impl Color {
    pub const TRANSPARENT: Color = Color::from_premul(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::from_premul(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::from_premul(1.0, 1.0, 1.0, 1.0);

    /// Creates a premultiplied color from straight `0`–`255` bytes.
    #[inline]
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::from_straight(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a as f32 / 255.0)
    }

    #[inline]
    pub const fn from_premul(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a premultiplied color from straight alpha components.
    #[inline]
    pub fn from_straight(r: f32, g: f32, b: f32, a: f32) -> Self {
        let a = a.clamp(0.0, 1.0);
        Self {
            r: r.clamp(0.0, 1.0) * a,
            g: g.clamp(0.0, 1.0) * a,
            b: b.clamp(0.0, 1.0) * a,
            a,
        }
    }

    #[inline]
    pub fn from_array(c: [f32; 4]) -> Self {
        Self::from_premul(c[0], c[1], c[2], c[3])
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub fn is_opaque(self) -> bool {
        self.a >= 1.0
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }

    /// Scales every channel (premultiplied), e.g. by a coverage value.
    #[inline]
    pub fn scaled(self, k: f32) -> Self {
        Self::from_premul(self.r * k, self.g * k, self.b * k, self.a * k)
    }

    /// Component-wise product of two premultiplied colors.
    #[inline]
    pub fn modulate(self, other: Color) -> Self {
        Self::from_premul(self.r * other.r, self.g * other.g, self.b * other.b, self.a * other.a)
    }

    /// Clamps all channels to [0, 1] and enforces premultiplication.
    #[inline]
    pub fn clamped(self) -> Self {
        let a = self.a.clamp(0.0, 1.0);
        Self {
            r: self.r.clamp(0.0, a),
            g: self.g.clamp(0.0, a),
            b: self.b.clamp(0.0, a),
            a,
        }
    }

    /// Quantizes to premultiplied `0`–`255` bytes in RGBA order.
    #[inline]
    pub fn to_rgba8_premul(self) -> [u8; 4] {
        let c = self.clamped();
        [c.r, c.g, c.b, c.a].map(|v| (v * 255.0 + 0.5) as u8)
    }

    #[inline]
    pub fn from_rgba8_premul(px: [u8; 4]) -> Self {
        let [r, g, b, a] = px.map(|v| v as f32 / 255.0);
        Self::from_premul(r, g, b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_input_is_premultiplied() {
        let c = Color::from_straight(1.0, 0.5, 0.0, 0.5);
        assert_eq!(c, Color::from_premul(0.5, 0.25, 0.0, 0.5));
    }

    #[test]
    fn byte_quantization_is_stable() {
        let px = [200, 100, 50, 255];
        assert_eq!(Color::from_rgba8_premul(px).to_rgba8_premul(), px);
    }
}
