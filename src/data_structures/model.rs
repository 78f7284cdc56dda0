//! Meshes, materials and the draw helpers used by the scene pass.

use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::data_structures::texture::Texture;

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Geometry living on the GPU.
#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
}

impl Mesh {
    pub fn new(device: &wgpu::Device, name: &str, vertices: &[ModelVertex], indices: &[u32]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", name)),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", name)),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            name: name.to_string(),
            vertex_buffer,
            index_buffer,
            num_elements: indices.len() as u32,
        }
    }
}

/// Which faces of a mesh are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Front,
    /// Only the inside is visible; normals are flipped for lighting.
    Back,
}

/// A lit, optionally textured and self-illuminated surface.
///
/// Colours are linear RGB. Use [`srgb_hex`] for colours written as `0xRRGGBB`.
#[derive(Clone, Debug, PartialEq)]
pub struct StandardMaterial {
    pub colour: [f32; 3],
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
    pub side: Side,
    pub uv_repeat: [f32; 2],
}

impl StandardMaterial {
    pub fn with_colour(colour: [f32; 3]) -> Self {
        Self {
            colour,
            ..Default::default()
        }
    }

    pub fn to_uniform(&self, textured: bool) -> MaterialUniform {
        let e = self.emissive_intensity;
        MaterialUniform {
            colour: [self.colour[0], self.colour[1], self.colour[2], 1.0],
            emissive: [self.emissive[0] * e, self.emissive[1] * e, self.emissive[2] * e, 0.0],
            uv_repeat: self.uv_repeat,
            normal_sign: match self.side {
                Side::Front => 1.0,
                Side::Back => -1.0,
            },
            textured: if textured { 1.0 } else { 0.0 },
        }
    }
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            colour: [1.0, 1.0, 1.0],
            emissive: [0.0, 0.0, 0.0],
            emissive_intensity: 1.0,
            side: Side::Front,
            uv_repeat: [1.0, 1.0],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    colour: [f32; 4],
    // rgb premultiplied by the intensity, w unused
    emissive: [f32; 4],
    uv_repeat: [f32; 2],
    normal_sign: f32,
    textured: f32,
}

/// The GPU side of a [`StandardMaterial`].
#[derive(Debug)]
pub struct Material {
    pub name: String,
    pub side: Side,
    pub diffuse_texture: Texture,
    pub uniform: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl Material {
    /// Without a texture a 1x1 white one is bound so every material shares one layout.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        name: &str,
        material: &StandardMaterial,
        diffuse_texture: Option<Texture>,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let textured = diffuse_texture.is_some();
        let diffuse_texture =
            diffuse_texture.unwrap_or_else(|| Texture::create_white(device, queue));
        let uniform = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} material uniform", name)),
            contents: bytemuck::cast_slice(&[material.to_uniform(textured)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let sampler = diffuse_texture
            .sampler
            .clone()
            .unwrap_or_else(|| crate::data_structures::texture::create_default_sampler(device));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&diffuse_texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
            label: Some(name),
        });

        Self {
            name: name.to_string(),
            side: material.side,
            diffuse_texture,
            uniform,
            bind_group,
        }
    }
}

/// Convert a `0xRRGGBB` sRGB colour into linear RGB.
pub fn srgb_hex(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| {
        let c = ((hex >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(16), channel(8), channel(0)]
}

pub trait DrawModel<'a> {
    fn draw_mesh_instanced(
        &mut self,
        mesh: &'a Mesh,
        material: &'a Material,
        instances: Range<u32>,
        camera_bind_group: &'a wgpu::BindGroup,
        light_bind_group: &'a wgpu::BindGroup,
    );
}

impl<'a, 'b> DrawModel<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh_instanced(
        &mut self,
        mesh: &'b Mesh,
        material: &'b Material,
        instances: Range<u32>,
        camera_bind_group: &'b wgpu::BindGroup,
        light_bind_group: &'b wgpu::BindGroup,
    ) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.set_bind_group(0, &material.bind_group, &[]);
        self.set_bind_group(1, camera_bind_group, &[]);
        self.set_bind_group(2, light_bind_group, &[]);
        self.draw_indexed(0..mesh.num_elements, 0, instances);
    }
}
