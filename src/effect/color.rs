//! Firework tint: random hue at fixed saturation and lightness.

use rand::Rng;

/// Saturation used for every firework.
pub const SATURATION: f32 = 1.0;
/// Lightness used for every firework.
pub const LIGHTNESS: f32 = 0.7;

/// A tint in HSL space. Only the hue varies between fireworks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireworkColor {
    /// Hue in `[0, 1)`.
    pub hue: f32,
    /// Saturation in `[0, 1]`.
    pub saturation: f32,
    /// Lightness in `[0, 1]`.
    pub lightness: f32,
}

impl FireworkColor {
    /// Tint for the given hue at the fixed firework saturation and
    /// lightness. The hue wraps into `[0, 1)`.
    pub fn from_hue(hue: f32) -> Self {
        Self {
            hue: hue.rem_euclid(1.0),
            saturation: SATURATION,
            lightness: LIGHTNESS,
        }
    }

    /// Tint with a uniformly random hue.
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::from_hue(rng.random::<f32>())
    }

    /// Convert to sRGB components in `[0, 1]`.
    pub fn to_rgb(self) -> [f32; 3] {
        let h = self.hue.rem_euclid(1.0);
        let s = self.saturation.clamp(0.0, 1.0);
        let l = self.lightness.clamp(0.0, 1.0);

        if s == 0.0 {
            return [l, l, l];
        }

        let hi = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let lo = 2.0 * l - hi;
        [
            hue_channel(lo, hi, h + 1.0 / 3.0),
            hue_channel(lo, hi, h),
            hue_channel(lo, hi, h - 1.0 / 3.0),
        ]
    }

    /// Convert to linear-light RGB for shaders writing to an sRGB target.
    pub fn to_linear_rgb(self) -> [f32; 3] {
        self.to_rgb().map(srgb_to_linear)
    }
}

fn hue_channel(lo: f32, hi: f32, t: f32) -> f32 {
    let t = if t < 0.0 {
        t + 1.0
    } else if t > 1.0 {
        t - 1.0
    } else {
        t
    };

    if t < 1.0 / 6.0 {
        lo + (hi - lo) * 6.0 * t
    } else if t < 0.5 {
        hi
    } else if t < 2.0 / 3.0 {
        lo + (hi - lo) * 6.0 * (2.0 / 3.0 - t)
    } else {
        lo
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    /// Recover (saturation, lightness) from an RGB triple.
    fn sat_light(rgb: [f32; 3]) -> (f32, f32) {
        let max = rgb.iter().copied().fold(f32::MIN, f32::max);
        let min = rgb.iter().copied().fold(f32::MAX, f32::min);
        let l = (max + min) / 2.0;
        let s = if max == min {
            0.0
        } else if l <= 0.5 {
            (max - min) / (max + min)
        } else {
            (max - min) / (2.0 - max - min)
        };
        (s, l)
    }

    #[test]
    fn primary_hues() {
        let red = FireworkColor::from_hue(0.0).to_rgb();
        assert!((red[0] - 1.0).abs() < 1e-5);
        assert!((red[1] - 0.4).abs() < 1e-5);
        assert!((red[2] - 0.4).abs() < 1e-5);

        let green = FireworkColor::from_hue(1.0 / 3.0).to_rgb();
        assert!((green[1] - 1.0).abs() < 1e-5);
        assert!((green[0] - 0.4).abs() < 1e-5);
    }

    #[test]
    fn only_hue_varies() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let color = FireworkColor::random(&mut rng);
            assert_eq!(color.saturation, 1.0);
            assert_eq!(color.lightness, 0.7);
            assert!((0.0..1.0).contains(&color.hue));

            let (s, l) = sat_light(color.to_rgb());
            assert!((s - 1.0).abs() < 1e-4, "saturation {s}");
            assert!((l - 0.7).abs() < 1e-4, "lightness {l}");
        }
    }

    #[test]
    fn hue_wraps() {
        assert_eq!(
            FireworkColor::from_hue(1.25).to_rgb(),
            FireworkColor::from_hue(0.25).to_rgb()
        );
        assert!((FireworkColor::from_hue(-0.25).hue - 0.75).abs() < 1e-6);
    }

    #[test]
    fn linear_is_darker() {
        let color = FireworkColor::from_hue(0.6);
        let srgb = color.to_rgb();
        let linear = color.to_linear_rgb();
        for (s, l) in srgb.iter().zip(linear) {
            assert!(l <= *s);
        }
    }
}
