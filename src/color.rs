//! Structured colors for the node network.
//!
//! Node, particle and background colors are stored as numeric values instead
//! of CSS template strings. A [`HuePreset`] fixes hue and saturation; the
//! lightness and alpha are supplied per draw from the entity's role and depth.
//!
//! ```ignore
//! let preset = HuePreset::new(174.0, 63.0);
//! let color = preset.with(30.0, 0.75).to_rgba();
//! ```

use serde::{Deserialize, Serialize};

/// An sRGB color with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity, 0.0 (transparent) to 1.0 (opaque).
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::opaque(0, 0, 0);

    /// Create a color from channels and alpha.
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a fully opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Channels as floats in 0.0..=1.0 (r, g, b, a).
    pub fn to_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a.clamp(0.0, 1.0),
        ]
    }
}

/// Hue and saturation of a color family; lightness and alpha come per draw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HuePreset {
    /// Hue in degrees.
    pub hue: f32,
    /// Saturation in percent (0-100).
    pub saturation: f32,
}

impl HuePreset {
    pub const fn new(hue: f32, saturation: f32) -> Self {
        Self { hue, saturation }
    }

    /// Complete the preset with lightness (percent) and alpha.
    pub fn with(self, lightness: f32, alpha: f32) -> Hsla {
        Hsla {
            hue: self.hue,
            saturation: self.saturation,
            lightness,
            alpha,
        }
    }
}

/// A color in HSL space with alpha. Saturation and lightness are percentages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsla {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
    pub alpha: f32,
}

impl Hsla {
    /// Convert to sRGB. Out-of-range saturation, lightness and alpha are
    /// clamped the way a CSS color parser clamps them.
    pub fn to_rgba(self) -> Rgba {
        let h = self.hue.rem_euclid(360.0) / 60.0;
        let s = (self.saturation / 100.0).clamp(0.0, 1.0);
        let l = (self.lightness / 100.0).clamp(0.0, 1.0);

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let m = l - c / 2.0;

        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        let to_u8 = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        let alpha = if self.alpha.is_nan() { 0.0 } else { self.alpha.clamp(0.0, 1.0) };
        Rgba::new(to_u8(r), to_u8(g), to_u8(b), alpha)
    }
}

/// Fog factor for an entity at `depth`: 1.0 at the rotation centre, falling
/// towards 0.0 at `most_distant`, negative past it.
#[inline]
pub fn depth_fog(depth: f64, most_distant: f64) -> f64 {
    1.0 - depth / most_distant
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsl_primaries() {
        let red = HuePreset::new(0.0, 100.0).with(50.0, 1.0).to_rgba();
        assert_eq!((red.r, red.g, red.b), (255, 0, 0));

        let blue = HuePreset::new(240.0, 100.0).with(50.0, 1.0).to_rgba();
        assert_eq!((blue.r, blue.g, blue.b), (0, 0, 255));

        let gray = HuePreset::new(90.0, 0.0).with(50.0, 1.0).to_rgba();
        assert_eq!((gray.r, gray.g, gray.b), (128, 128, 128));
    }

    #[test]
    fn test_connection_hue() {
        // hsl(174, 63%, 30%)
        let c = HuePreset::new(174.0, 63.0).with(30.0, 1.0).to_rgba();
        assert_eq!((c.r, c.g, c.b), (28, 125, 115));
    }

    #[test]
    fn test_alpha_is_clamped() {
        let preset = HuePreset::new(80.0, 50.0);
        assert_eq!(preset.with(40.0, 1.7).to_rgba().a, 1.0);
        assert_eq!(preset.with(40.0, -0.3).to_rgba().a, 0.0);
        assert_eq!(preset.with(40.0, f32::NAN).to_rgba().a, 0.0);
    }

    #[test]
    fn test_depth_fog() {
        assert_eq!(depth_fog(0.0, 4350.0), 1.0);
        assert_eq!(depth_fog(4350.0, 4350.0), 0.0);
        assert!(depth_fog(-100.0, 4350.0) > 1.0);
    }
}
