/// Straight-alpha RGBA color with `[0, 1]` f64 components.
///
/// Components are clamped only at rasterization time, so animated colors may
/// transiently leave the unit range (e.g. under overshooting eases).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self { a, ..self }
    }

    /// Scale alpha, leaving rgb untouched. Used to fold resolved opacity into
    /// the draw color.
    pub fn modulate(self, opacity: f64) -> Self {
        Self {
            a: self.a * opacity,
            ..self
        }
    }

    /// Premultiplied RGBA8 (r, g, b already multiplied by a).
    pub fn to_premul_rgba8(self) -> [u8; 4] {
        let a = self.a.clamp(0.0, 1.0);
        let q = |c: f64| ((c.clamp(0.0, 1.0) * a) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), (a * 255.0).round() as u8]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn premul_conversion_scales_rgb_by_alpha() {
        let c = Color::rgba(1.0, 0.0, 0.0, 0.5);
        assert_eq!(c.to_premul_rgba8(), [128, 0, 0, 128]);
    }

    #[test]
    fn out_of_range_components_clamp_at_conversion() {
        let c = Color::rgba(1.4, -0.2, 0.0, 1.0);
        assert_eq!(c.to_premul_rgba8(), [255, 0, 0, 255]);
    }

    #[test]
    fn modulate_stacks_with_alpha() {
        let c = Color::rgba(0.0, 1.0, 0.0, 0.5).modulate(0.5);
        assert_eq!(c.to_premul_rgba8()[3], 64);
    }
}
