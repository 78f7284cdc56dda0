//! Neon towers and their rings.

use rand::Rng;

/// Width and depth of every tower.
pub const FOOTPRINT: f32 = 5.0;
/// Heights are `HEIGHT_STEP * n` with `n` drawn from `HEIGHT_FACTORS`.
pub const HEIGHT_STEP: u32 = 5;
pub const HEIGHT_FACTORS: std::ops::RangeInclusive<u32> = 2..=5;

pub const RING_RADIUS: f32 = 3.0;
pub const RING_TUBE: f32 = 0.2;
pub const RING_RADIAL_SEGMENTS: u32 = 16;
pub const RING_TUBULAR_SEGMENTS: u32 = 100;

/// Scaling knobs for the ring heuristic.
///
/// `max_height` is the height that earns the full `max_rings`; shorter towers
/// get proportionally fewer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuildingParams {
    pub max_height: f32,
    pub max_rings: u32,
}

impl Default for BuildingParams {
    fn default() -> Self {
        Self {
            max_height: 25.0,
            max_rings: 6,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ring {
    /// Vertical offset from the tower centre.
    pub offset: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Building {
    pub x: f32,
    pub z: f32,
    pub height: u32,
    pub rings: Vec<Ring>,
}

impl Building {
    /// World position of the box centre; the base sits on y = 0.
    pub fn centre(&self) -> cgmath::Vector3<f32> {
        cgmath::Vector3::new(self.x, self.height as f32 / 2.0, self.z)
    }

    pub fn ring_spacing(&self) -> f32 {
        ring_spacing(self.height, self.rings.len() as u32)
    }
}

/// Number of rings for a tower of `height`, never more than `max_rings`.
pub fn ring_count(height: u32, max_height: f32, max_rings: u32) -> u32 {
    if !(max_height > 0.0) {
        return 0;
    }
    let count = (height as f32 / max_height * max_rings as f32).round();
    (count.max(0.0) as u32).min(max_rings)
}

pub fn ring_spacing(height: u32, ring_count: u32) -> f32 {
    height as f32 / (ring_count + 1) as f32
}

/// Evenly spaced ring offsets, relative to the tower centre.
pub fn ring_offsets(height: u32, ring_count: u32) -> impl Iterator<Item = f32> {
    let spacing = ring_spacing(height, ring_count);
    let half = height as f32 / 2.0;
    (1..=ring_count).map(move |i| i as f32 * spacing - half)
}

pub fn random_height<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    HEIGHT_STEP * rng.gen_range(HEIGHT_FACTORS)
}

/// Roll a tower standing at `(x, z)`.
pub fn create_building<R: Rng + ?Sized>(
    rng: &mut R,
    x: f32,
    z: f32,
    params: BuildingParams,
) -> Building {
    let height = random_height(rng);
    let count = ring_count(height, params.max_height, params.max_rings);
    let rings = ring_offsets(height, count)
        .map(|offset| Ring { offset })
        .collect();
    Building {
        x,
        z,
        height,
        rings,
    }
}
