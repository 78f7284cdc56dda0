use image::Rgba;
use neon_city::generation::{
    building::{self, BuildingParams, create_building, ring_count, ring_offsets},
    sampler::{Hsl, random_square_size, random_yellow},
    texture::{BACKGROUND, SKY_TEXTURE_SIZE, fill_square, synthesize_sky_texture},
};

use crate::common::test_utils::{SEED, approx_eq, rng};

mod common;

const CITY_PARAMS: BuildingParams = BuildingParams {
    max_height: 25.0,
    max_rings: 15,
};

#[test]
fn yellows_stay_in_range() {
    let mut rng = rng(SEED);
    for _ in 0..2_000 {
        let colour = random_yellow(&mut rng);
        assert!((20.0..40.0).contains(&colour.hue), "hue {}", colour.hue);
        assert_eq!(colour.saturation, 100.0);
        assert!(
            (20.0..90.0).contains(&colour.lightness),
            "lightness {}",
            colour.lightness
        );
    }
}

#[test]
fn square_sizes_stay_in_range() {
    let mut rng = rng(SEED);
    for _ in 0..2_000 {
        let size = random_square_size(&mut rng);
        assert!((25.0..95.0).contains(&size), "size {}", size);
    }
}

#[test]
fn hsl_converts_to_srgb() {
    assert_eq!(Hsl::new(0.0, 100.0, 50.0).to_rgba(), Rgba([255, 0, 0, 255]));
    assert_eq!(Hsl::new(60.0, 100.0, 50.0).to_rgba(), Rgba([255, 255, 0, 255]));
    assert_eq!(Hsl::new(0.0, 0.0, 100.0).to_rgba(), Rgba([255, 255, 255, 255]));
    assert_eq!(Hsl::new(120.0, 100.0, 25.0).to_rgba(), Rgba([0, 128, 0, 255]));
}

#[test]
fn sky_texture_is_512_square_for_any_seed() {
    for seed in 0..8 {
        let img = synthesize_sky_texture(&mut rng(seed));
        assert_eq!(img.dimensions(), (SKY_TEXTURE_SIZE, SKY_TEXTURE_SIZE));
    }
}

#[test]
fn same_seed_paints_same_texture() {
    let a = synthesize_sky_texture(&mut rng(SEED));
    let b = synthesize_sky_texture(&mut rng(SEED));
    assert_eq!(a.as_raw(), b.as_raw());

    let c = synthesize_sky_texture(&mut rng(SEED + 1));
    assert_ne!(a.as_raw(), c.as_raw());
}

#[test]
fn first_cell_is_painted_yellow() {
    let img = synthesize_sky_texture(&mut rng(SEED));
    // every square is at least 25 px wide, so the corner is always covered
    let pixel = *img.get_pixel(0, 0);
    assert_ne!(pixel, BACKGROUND);
    let [r, g, b, a] = pixel.0;
    assert!(r >= g && g >= b, "{:?} is not a yellow", pixel);
    assert_eq!(a, 255);
}

#[test]
fn squares_are_clipped_to_the_canvas() {
    let mut img = image::RgbaImage::from_pixel(8, 8, BACKGROUND);
    let red = Rgba([255, 0, 0, 255]);
    fill_square(&mut img, 6, 6, 10.4, red);
    assert_eq!(*img.get_pixel(7, 7), red);
    assert_eq!(*img.get_pixel(6, 6), red);
    assert_eq!(*img.get_pixel(5, 5), BACKGROUND);

    fill_square(&mut img, 0, 0, 2.6, red);
    assert_eq!(*img.get_pixel(2, 2), red);
    assert_eq!(*img.get_pixel(3, 0), BACKGROUND);
}

#[test]
fn heights_are_multiples_of_five_between_10_and_25() {
    let mut rng = rng(SEED);
    let mut seen = std::collections::BTreeSet::new();
    for _ in 0..1_000 {
        let b = create_building(&mut rng, 0.0, 0.0, CITY_PARAMS);
        assert!([10, 15, 20, 25].contains(&b.height), "height {}", b.height);
        seen.insert(b.height);
    }
    assert_eq!(seen.len(), 4, "all heights should occur");
}

#[test]
fn rings_follow_the_height_heuristic() {
    let mut rng = rng(SEED);
    for params in [CITY_PARAMS, BuildingParams::default()] {
        for _ in 0..500 {
            let b = create_building(&mut rng, 0.0, 0.0, params);
            let expected = (b.height as f32 / params.max_height * params.max_rings as f32).round() as usize;
            assert_eq!(b.rings.len(), expected.min(params.max_rings as usize));
            let half = b.height as f32 / 2.0;
            for ring in &b.rings {
                assert!(ring.offset >= -half && ring.offset <= half, "offset {}", ring.offset);
            }
        }
    }
}

#[test]
fn tallest_tower_gets_fifteen_rings() {
    assert_eq!(ring_count(25, 25.0, 15), 15);
    assert!(approx_eq(building::ring_spacing(25, 15), 1.5625));
    let offsets: Vec<f32> = ring_offsets(25, 15).collect();
    assert_eq!(offsets.len(), 15);
    for (i, offset) in offsets.iter().enumerate() {
        let expected = (i + 1) as f32 * 1.5625 - 12.5;
        assert!(approx_eq(*offset, expected), "ring {}: {} != {}", i, offset, expected);
    }
}

#[test]
fn shortest_tower_gets_six_rings() {
    assert_eq!(ring_count(10, 25.0, 15), 6);
    assert_eq!(ring_count(15, 25.0, 15), 9);
    assert_eq!(ring_count(20, 25.0, 15), 12);
}

#[test]
fn ring_count_never_exceeds_the_maximum() {
    assert_eq!(ring_count(50, 25.0, 15), 15);
    assert_eq!(ring_count(10, 0.0, 15), 0);
    assert_eq!(ring_count(10, -5.0, 15), 0);
    assert_eq!(ring_count(0, 25.0, 15), 0);
    assert_eq!(ring_offsets(0, 0).count(), 0);
}

#[test]
fn buildings_stand_on_the_ground() {
    let b = create_building(&mut rng(SEED), -40.0, 70.0, CITY_PARAMS);
    let centre = b.centre();
    assert_eq!(centre.x, -40.0);
    assert_eq!(centre.z, 70.0);
    assert!(approx_eq(centre.y, b.height as f32 / 2.0));
}
