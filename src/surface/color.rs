use serde::{Deserialize, Serialize};

/// Straight (non-premultiplied) RGBA, every channel in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn lerp(self, next: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: self.r + (next.r - self.r) * t,
            g: self.g + (next.g - self.g) * t,
            b: self.b + (next.b - self.b) * t,
            a: self.a + (next.a - self.a) * t,
        }
    }
}

/// CSS-style HSLA: hue in degrees, saturation and lightness in percent, alpha in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsla {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
    pub alpha: f32,
}

impl Hsla {
    pub const fn new(hue: f32, saturation: f32, lightness: f32, alpha: f32) -> Self {
        Self {
            hue,
            saturation,
            lightness,
            alpha,
        }
    }

    pub fn shifted(self, hue: f32, lightness: f32) -> Self {
        Self {
            hue: self.hue + hue,
            lightness: self.lightness + lightness,
            ..self
        }
    }

    pub fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }

    pub fn to_rgba(self) -> Rgba {
        let h = self.hue.rem_euclid(360.0) / 60.0;
        let s = (self.saturation / 100.0).clamp(0.0, 1.0);
        let l = (self.lightness / 100.0).clamp(0.0, 1.0);

        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = l - chroma * 0.5;
        Rgba::new(r + m, g + m, b + m, self.alpha.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::{Hsla, Rgba};

    fn close(a: Rgba, b: Rgba) -> bool {
        (a.r - b.r).abs() < 1e-4
            && (a.g - b.g).abs() < 1e-4
            && (a.b - b.b).abs() < 1e-4
            && (a.a - b.a).abs() < 1e-4
    }

    #[test]
    fn primary_hues_convert() {
        assert!(close(Hsla::new(0.0, 100.0, 50.0, 1.0).to_rgba(), Rgba::new(1.0, 0.0, 0.0, 1.0)));
        assert!(close(Hsla::new(120.0, 100.0, 50.0, 1.0).to_rgba(), Rgba::new(0.0, 1.0, 0.0, 1.0)));
        assert!(close(Hsla::new(240.0, 100.0, 50.0, 0.5).to_rgba(), Rgba::new(0.0, 0.0, 1.0, 0.5)));
    }

    #[test]
    fn hue_wraps_past_full_turn() {
        let wrapped = Hsla::new(380.0, 70.0, 60.0, 1.0).to_rgba();
        let base = Hsla::new(20.0, 70.0, 60.0, 1.0).to_rgba();
        assert!(close(wrapped, base));
    }

    #[test]
    fn white_highlight_is_nearly_white() {
        let c = Hsla::new(280.0, 100.0, 90.0, 0.3).to_rgba();
        assert!(c.r > 0.8 && c.g > 0.79 && c.b > 0.8);
    }
}
