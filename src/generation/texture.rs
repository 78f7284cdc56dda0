//! The sky bitmap: random yellow squares on a dark olive background.

use image::{Rgba, RgbaImage};
use rand::Rng;

use crate::generation::sampler::{random_square_size, random_yellow};

pub const SKY_TEXTURE_SIZE: u32 = 512;
/// Distance between two square origins.
pub const SQUARE_SPACING: u32 = 50;
/// How often the bitmap repeats across the sphere in u and v.
pub const SKY_TEXTURE_REPEAT: [f32; 2] = [4.0, 4.0];
/// `#9c9303`
pub const BACKGROUND: Rgba<u8> = Rgba([0x9c, 0x93, 0x03, 0xff]);

/// Paint the 512x512 sky bitmap.
///
/// One square per grid cell, each with its own colour and size. Sizes larger
/// than the pitch spill over into the next cells, later cells paint on top.
pub fn synthesize_sky_texture<R: Rng + ?Sized>(rng: &mut R) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(SKY_TEXTURE_SIZE, SKY_TEXTURE_SIZE, BACKGROUND);

    let pitch = SQUARE_SPACING + 1;
    let rows = SKY_TEXTURE_SIZE / pitch;
    let columns = SKY_TEXTURE_SIZE / pitch;

    for row in 0..rows {
        for column in 0..columns {
            let x = column * pitch;
            let y = row * pitch;
            // colour is drawn before size for every cell
            let colour = random_yellow(rng).to_rgba();
            let size = random_square_size(rng);
            fill_square(&mut img, x, y, size, colour);
        }
    }

    img
}

/// Fill an axis aligned square, clipped to the image bounds.
pub fn fill_square(img: &mut RgbaImage, x: u32, y: u32, size: f32, colour: Rgba<u8>) {
    let side = size.max(0.0).round() as u32;
    let x_end = x.saturating_add(side).min(img.width());
    let y_end = y.saturating_add(side).min(img.height());
    for py in y..y_end {
        for px in x..x_end {
            img.put_pixel(px, py, colour);
        }
    }
}
