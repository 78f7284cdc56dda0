use crate::{
    config::CityConfig,
    data_structures::scene_graph::MeshKey,
    generation::building::{FOOTPRINT, RING_RADIAL_SEGMENTS, RING_RADIUS, RING_TUBE, RING_TUBULAR_SEGMENTS},
    resources::geometry::MeshData,
};

/**
 * This module contains all logic for creating GPU-ready meshes and texture layouts.
 * Nothing is loaded from disk: every mesh is generated.
 */
pub mod geometry;
pub mod texture;

pub const SKY_WIDTH_SEGMENTS: u32 = 64;
pub const SKY_HEIGHT_SEGMENTS: u32 = 64;

/// Generate the geometry a [`MeshKey`] stands for.
pub fn build_mesh(key: MeshKey, city: &CityConfig) -> MeshData {
    match key {
        MeshKey::SkySphere => geometry::sphere(city.sky_radius, SKY_WIDTH_SEGMENTS, SKY_HEIGHT_SEGMENTS),
        MeshKey::Ground => geometry::plane(city.ground_size, city.ground_size),
        MeshKey::Tower(height) => geometry::cuboid(FOOTPRINT, height as f32, FOOTPRINT),
        MeshKey::Ring => geometry::torus(RING_RADIUS, RING_TUBE, RING_RADIAL_SEGMENTS, RING_TUBULAR_SEGMENTS),
    }
}
