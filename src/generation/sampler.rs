use rand::Rng;

pub const HUE_RANGE: std::ops::Range<f32> = 20.0..40.0;
pub const LIGHTNESS_RANGE: std::ops::Range<f32> = 20.0..90.0;
pub const SQUARE_SIZE_RANGE: std::ops::Range<f32> = 25.0..95.0;

/// A colour in HSL space: hue in degrees, saturation and lightness in percent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Hsl {
    pub fn new(hue: f32, saturation: f32, lightness: f32) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }

    /// Convert to an opaque 8-bit sRGB pixel.
    pub fn to_rgba(&self) -> image::Rgba<u8> {
        let h = self.hue.rem_euclid(360.0) / 360.0;
        let s = (self.saturation / 100.0).clamp(0.0, 1.0);
        let l = (self.lightness / 100.0).clamp(0.0, 1.0);

        let (r, g, b) = if s == 0.0 {
            (l, l, l)
        } else {
            let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
            let p = 2.0 * l - q;
            (
                hue_to_channel(p, q, h + 1.0 / 3.0),
                hue_to_channel(p, q, h),
                hue_to_channel(p, q, h - 1.0 / 3.0),
            )
        };
        let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        image::Rgba([to_u8(r), to_u8(g), to_u8(b), 255])
    }
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// A fully saturated yellow-orange of random hue and lightness.
pub fn random_yellow<R: Rng + ?Sized>(rng: &mut R) -> Hsl {
    let hue = rng.gen_range(HUE_RANGE);
    let lightness = rng.gen_range(LIGHTNESS_RANGE);
    Hsl::new(hue, 100.0, lightness)
}

/// Side length in pixels of one square of the sky texture.
pub fn random_square_size<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen_range(SQUARE_SIZE_RANGE)
}
