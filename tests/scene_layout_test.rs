use cgmath::{InnerSpace, Vector3};
use neon_city::{
    config::CityConfig,
    data_structures::{
        model::Side,
        scene_graph::{Drawable, MaterialKey, MeshKey},
    },
    generation::texture::SKY_TEXTURE_REPEAT,
    scene::{self, RING_EMISSIVE_INTENSITY, grid_positions},
};

use crate::common::test_utils::{SEED, approx_eq, city};

mod common;

#[test]
fn grid_has_625_positions_x_major() {
    let positions = grid_positions(&CityConfig::default());
    assert_eq!(positions.len(), 625);
    assert_eq!(positions[0], (-120.0, -120.0));
    assert_eq!(positions[1], (-120.0, -110.0));
    assert_eq!(positions[25], (-110.0, -120.0));
    assert_eq!(positions[624], (120.0, 120.0));
    for (x, z) in positions {
        assert_eq!(x as i32 % 10, 0);
        assert_eq!(z as i32 % 10, 0);
    }
}

#[test]
fn every_seed_builds_625_buildings() {
    for seed in [0, 1, SEED] {
        let description = city(seed);
        assert_eq!(description.buildings.len(), 625);
        let positions: Vec<(f32, f32)> = description.buildings.iter().map(|b| (b.x, b.z)).collect();
        assert_eq!(positions, grid_positions(&CityConfig::default()));
    }
}

#[test]
fn same_seed_builds_the_same_city() {
    let a = city(SEED);
    let b = city(SEED);
    assert_eq!(a.buildings, b.buildings);
    assert_eq!(a.sky_texture.as_raw(), b.sky_texture.as_raw());
}

#[test]
fn graph_holds_sky_ground_and_buildings() {
    let description = city(SEED);
    let root = &description.root;
    assert_eq!(root.get_children().len(), 2 + 625);
    assert_eq!(root.get_children()[0].drawable.map(|d| d.mesh), Some(MeshKey::SkySphere));
    assert_eq!(root.get_children()[1].drawable.map(|d| d.mesh), Some(MeshKey::Ground));

    let rings: usize = description.buildings.iter().map(|b| b.rings.len()).sum();
    assert_eq!(root.count(), 1 + 2 + 625 + rings);
}

#[test]
fn batches_cover_every_drawable_once() {
    let description = city(SEED);
    let batches = description.batches();

    let sky = Drawable {
        mesh: MeshKey::SkySphere,
        material: MaterialKey::Sky,
    };
    let ground = Drawable {
        mesh: MeshKey::Ground,
        material: MaterialKey::Ground,
    };
    let ring = Drawable {
        mesh: MeshKey::Ring,
        material: MaterialKey::Ring,
    };
    assert_eq!(batches[&sky].len(), 1);
    assert_eq!(batches[&ground].len(), 1);

    let rings: usize = description.buildings.iter().map(|b| b.rings.len()).sum();
    assert_eq!(batches[&ring].len(), rings);

    let towers: usize = batches
        .iter()
        .filter(|(d, _)| matches!(d.mesh, MeshKey::Tower(_)))
        .map(|(_, instances)| instances.len())
        .sum();
    assert_eq!(towers, 625);

    for (drawable, instances) in &batches {
        if let MeshKey::Tower(height) = drawable.mesh {
            assert_eq!(drawable.material, MaterialKey::Tower);
            for instance in instances {
                assert!(approx_eq(instance.position.y, height as f32 / 2.0));
            }
        }
    }
}

#[test]
fn rings_inherit_the_building_transform() {
    let description = city(SEED);
    let batches = description.batches();
    let ring_instances = &batches[&Drawable {
        mesh: MeshKey::Ring,
        material: MaterialKey::Ring,
    }];

    let expected: Vec<Vector3<f32>> = description
        .buildings
        .iter()
        .flat_map(|b| {
            let centre = b.centre();
            b.rings
                .iter()
                .map(move |r| Vector3::new(centre.x, centre.y + r.offset, centre.z))
        })
        .collect();
    assert_eq!(ring_instances.len(), expected.len());

    for (instance, position) in ring_instances.iter().zip(expected) {
        assert!((instance.position - position).magnitude() < 1e-4);
        // the torus axis ends up vertical so the ring wraps the tower
        let axis = instance.rotation * Vector3::unit_z();
        assert!(approx_eq(axis.y.abs(), 1.0), "axis {:?}", axis);
    }

    for building in &description.buildings {
        for ring in &building.rings {
            let y = building.centre().y + ring.offset;
            assert!(y >= 0.0 && y <= building.height as f32);
        }
    }
}

#[test]
fn ground_faces_up() {
    let node = scene::ground_node();
    let normal = node.local.rotation * Vector3::unit_z();
    assert!((normal - Vector3::unit_y()).magnitude() < 1e-5);
}

#[test]
fn materials_match_the_look() {
    let materials = scene::materials();
    let get = |key: MaterialKey| {
        materials
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, m)| m.clone())
            .expect("material missing")
    };

    let sky = get(MaterialKey::Sky);
    assert_eq!(sky.side, Side::Back);
    assert_eq!(sky.uv_repeat, SKY_TEXTURE_REPEAT);

    let ring = get(MaterialKey::Ring);
    assert_eq!(ring.colour, ring.emissive);
    assert_eq!(ring.emissive_intensity, RING_EMISSIVE_INTENSITY);
    assert_eq!(ring.side, Side::Front);

    let ground = get(MaterialKey::Ground);
    let tower = get(MaterialKey::Tower);
    assert!(ground.colour[0] < tower.colour[0], "ground is darker than the towers");
    assert_eq!(ground.emissive, [0.0; 3]);
}

#[test]
fn lights_come_from_the_config() {
    let description = city(SEED);
    assert_eq!(description.lights.ambient_intensity, 0.9);
    assert_eq!(description.lights.directional_intensity, 0.5);
    assert_eq!(description.lights.directional_position, [50.0, 50.0, 10.0]);
}
