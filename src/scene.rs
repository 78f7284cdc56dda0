//! Scene assembly.
//!
//! [`SceneDescription`] is the CPU side of the city: the scene graph, the
//! synthesized sky texture, the materials and the lights. It is built once
//! from a seeded RNG and never changes afterwards. [`GpuScene`] uploads a
//! description: one mesh per distinct [`MeshKey`], one material per
//! [`MaterialKey`] and one instance buffer per batch.

use std::collections::HashMap;

use anyhow::Context as _;
use cgmath::{Deg, Rotation3, Vector3};
use image::RgbaImage;
use rand::Rng;
use wgpu::util::DeviceExt;

use crate::{
    config::{CityConfig, SceneConfig},
    data_structures::{
        instance::{Instance, InstanceRaw},
        model::{srgb_hex, Material, Mesh, Side, StandardMaterial},
        scene_graph::{Batches, Drawable, MaterialKey, MeshKey, SceneNode},
        texture::Texture,
    },
    generation::{
        building::{create_building, Building, BuildingParams},
        texture::{synthesize_sky_texture, SKY_TEXTURE_REPEAT},
    },
    pipelines::light::Lights,
    resources::build_mesh,
};

pub const GROUND_COLOUR: u32 = 0x111111;
pub const TOWER_COLOUR: u32 = 0x222222;
pub const RING_COLOUR: u32 = 0xfff000;
pub const RING_EMISSIVE_INTENSITY: f32 = 0.8;

/// Every `(x, z)` of the building grid, x-major.
pub fn grid_positions(city: &CityConfig) -> Vec<(f32, f32)> {
    let step = city.spacing.max(1) as usize;
    let axis: Vec<i32> = (-city.extent..=city.extent).step_by(step).collect();
    axis.iter()
        .flat_map(|&x| axis.iter().map(move |&z| (x as f32, z as f32)))
        .collect()
}

/// Scene node for a tower and its rings.
///
/// Rings lie flat around the tower: the torus is built in the XY plane and
/// turned a quarter about X.
pub fn building_node(building: &Building) -> SceneNode {
    let mut node = SceneNode::mesh(
        "building",
        MeshKey::Tower(building.height),
        MaterialKey::Tower,
        Instance::from(building.centre()),
    );
    for ring in &building.rings {
        let local = Instance::from(Vector3::new(0.0, ring.offset, 0.0))
            .with_rotation(cgmath::Quaternion::from_angle_x(Deg(90.0)));
        node.add_child(SceneNode::mesh("ring", MeshKey::Ring, MaterialKey::Ring, local));
    }
    node
}

pub fn sky_sphere_node() -> SceneNode {
    SceneNode::mesh("sky", MeshKey::SkySphere, MaterialKey::Sky, Instance::default())
}

pub fn ground_node() -> SceneNode {
    let local = Instance::default().with_rotation(cgmath::Quaternion::from_angle_x(Deg(-90.0)));
    SceneNode::mesh("ground", MeshKey::Ground, MaterialKey::Ground, local)
}

pub fn materials() -> Vec<(MaterialKey, StandardMaterial)> {
    vec![
        (
            MaterialKey::Sky,
            StandardMaterial {
                side: Side::Back,
                uv_repeat: SKY_TEXTURE_REPEAT,
                ..Default::default()
            },
        ),
        (MaterialKey::Ground, StandardMaterial::with_colour(srgb_hex(GROUND_COLOUR))),
        (MaterialKey::Tower, StandardMaterial::with_colour(srgb_hex(TOWER_COLOUR))),
        (
            MaterialKey::Ring,
            StandardMaterial {
                colour: srgb_hex(RING_COLOUR),
                emissive: srgb_hex(RING_COLOUR),
                emissive_intensity: RING_EMISSIVE_INTENSITY,
                ..Default::default()
            },
        ),
    ]
}

#[derive(Clone, Debug)]
pub struct SceneDescription {
    pub root: SceneNode,
    pub buildings: Vec<Building>,
    pub sky_texture: RgbaImage,
    pub materials: Vec<(MaterialKey, StandardMaterial)>,
    pub lights: Lights,
}

impl SceneDescription {
    /// Build the whole city. The sky texture is drawn from `rng` first, then the
    /// buildings in grid order.
    pub fn assemble<R: Rng + ?Sized>(config: &SceneConfig, rng: &mut R) -> Self {
        let sky_texture = synthesize_sky_texture(rng);

        let params = BuildingParams {
            max_height: config.city.max_height,
            max_rings: config.city.max_rings,
        };
        let buildings: Vec<Building> = grid_positions(&config.city)
            .into_iter()
            .map(|(x, z)| create_building(rng, x, z, params))
            .collect();

        let mut root = SceneNode::container("city");
        root.add_child(sky_sphere_node());
        root.add_child(ground_node());
        for building in &buildings {
            root.add_child(building_node(building));
        }

        log::debug!(
            "assembled {} buildings, {} rings, {} nodes",
            buildings.len(),
            buildings.iter().map(|b| b.rings.len()).sum::<usize>(),
            root.count()
        );

        Self {
            root,
            buildings,
            sky_texture,
            materials: materials(),
            lights: Lights::from(&config.light),
        }
    }

    pub fn batches(&self) -> Batches {
        self.root.collect_batches()
    }
}

#[derive(Debug)]
pub struct Batch {
    pub drawable: Drawable,
    pub instance_buffer: wgpu::Buffer,
    pub count: u32,
}

/// Everything the scene pass draws, resident on the GPU.
#[derive(Debug)]
pub struct GpuScene {
    pub meshes: HashMap<MeshKey, Mesh>,
    pub materials: HashMap<MaterialKey, Material>,
    pub batches: Vec<Batch>,
}

impl GpuScene {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        description: &SceneDescription,
        city: &CityConfig,
        material_layout: &wgpu::BindGroupLayout,
    ) -> anyhow::Result<Self> {
        let sky_texture = Texture::try_from_image(
            device,
            queue,
            &description.sky_texture,
            Some("sky texture"),
        )
        .context("uploading the sky texture")?;
        let mut sky_texture = Some(sky_texture);

        let materials: HashMap<MaterialKey, Material> = description
            .materials
            .iter()
            .map(|(key, material)| {
                let texture = match key {
                    MaterialKey::Sky => sky_texture.take(),
                    _ => None,
                };
                let name = format!("{:?}", key);
                (
                    *key,
                    Material::new(device, queue, &name, material, texture, material_layout),
                )
            })
            .collect();

        let batches = description.batches();
        let mut meshes = HashMap::new();
        for drawable in batches.keys() {
            meshes.entry(drawable.mesh).or_insert_with(|| {
                build_mesh(drawable.mesh, city).upload(device, &format!("{:?}", drawable.mesh))
            });
        }

        let batches: Vec<Batch> = batches
            .into_iter()
            .map(|(drawable, instances)| {
                let raw: Vec<InstanceRaw> = instances.iter().map(Instance::to_raw).collect();
                let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{:?} instances", drawable.mesh)),
                    contents: bytemuck::cast_slice(&raw),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                Batch {
                    drawable,
                    instance_buffer,
                    count: raw.len() as u32,
                }
            })
            .collect();

        for batch in &batches {
            anyhow::ensure!(
                materials.contains_key(&batch.drawable.material),
                "no material for {:?}",
                batch.drawable.material
            );
        }

        log::debug!(
            "uploaded {} meshes, {} materials, {} batches",
            meshes.len(),
            materials.len(),
            batches.len()
        );

        Ok(Self {
            meshes,
            materials,
            batches,
        })
    }

    pub fn instance_count(&self) -> u32 {
        self.batches.iter().map(|b| b.count).sum()
    }
}
