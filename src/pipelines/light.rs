use wgpu::util::DeviceExt;

use crate::config::LightConfig;

/// An ambient term plus one directional light.
///
/// The directional light shines from `position` towards the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lights {
    pub ambient_colour: [f32; 3],
    pub ambient_intensity: f32,
    pub directional_colour: [f32; 3],
    pub directional_intensity: f32,
    pub directional_position: [f32; 3],
}

impl From<&LightConfig> for Lights {
    fn from(config: &LightConfig) -> Self {
        Self {
            ambient_colour: config.ambient_colour,
            ambient_intensity: config.ambient_intensity,
            directional_colour: config.directional_colour,
            directional_intensity: config.directional_intensity,
            directional_position: config.directional_position,
        }
    }
}

impl Lights {
    pub fn to_uniform(&self) -> LightUniform {
        let scale = |c: [f32; 3], i: f32| [c[0] * i, c[1] * i, c[2] * i];
        LightUniform {
            ambient: scale(self.ambient_colour, self.ambient_intensity),
            _padding: 0,
            position: self.directional_position,
            _padding2: 0,
            colour: scale(self.directional_colour, self.directional_intensity),
            _padding3: 0,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    ambient: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: u32,
    position: [f32; 3],
    _padding2: u32,
    colour: [f32; 3],
    _padding3: u32,
}

#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl LightResources {
    pub fn new(device: &wgpu::Device, lights: &Lights) -> Self {
        let uniform = lights.to_uniform();
        let buffer = mk_buffer(device, uniform);
        let bind_group_layout = mk_bind_group_layout(device);
        let bind_group = mk_bind_group(device, &bind_group_layout, &buffer);
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }
}

pub fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Uniform Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

pub fn mk_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("light_bind_group_layout"),
    })
}

pub fn mk_bind_group(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    light_buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: light_buffer.as_entire_binding(),
        }],
        label: Some("light_bind_group"),
    })
}
