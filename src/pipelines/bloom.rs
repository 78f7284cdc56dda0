//! Bloom post-processing.
//!
//! The scene is rendered into an HDR target owned by [`Bloom`]. `execute` then
//! runs the chain:
//!
//! 1. bright pass: keep pixels whose luminance crosses the threshold
//! 2. five mip levels, each a separable gaussian (horizontal then vertical)
//!    at half the resolution of the previous level
//! 3. composite: scene + strength * weighted sum of the blurred levels,
//!    written to the output view
//!
//! All passes draw a single full-screen triangle, which keeps the chain
//! working on WebGL2 where compute is unavailable.

use wgpu::util::DeviceExt;

use crate::{config::BloomConfig, data_structures::texture::Texture, pipelines::basic::mk_render_pipeline};

pub const MIP_LEVELS: usize = 5;
/// Gaussian kernel radius per level.
pub const KERNEL_RADII: [u32; MIP_LEVELS] = [3, 5, 7, 9, 11];
/// Base contribution of each level before the radius is applied.
pub const BLOOM_FACTORS: [f32; MIP_LEVELS] = [1.0, 0.8, 0.6, 0.4, 0.2];
const MAX_COEFFICIENTS: usize = 12;

/// One-sided gaussian weights for a kernel of `kernel_radius` taps.
///
/// Normalized so that the full symmetric kernel (`w[0] + 2 * w[1..]`) sums to one.
pub fn gaussian_coefficients(kernel_radius: u32) -> Vec<f32> {
    let sigma = kernel_radius.max(1) as f32;
    let raw: Vec<f32> = (0..kernel_radius.max(1))
        .map(|i| {
            let x = i as f32;
            0.398_94 * (-0.5 * x * x / (sigma * sigma)).exp() / sigma
        })
        .collect();
    let total = raw[0] + 2.0 * raw[1..].iter().sum::<f32>();
    raw.into_iter().map(|w| w / total).collect()
}

/// Blend a level's factor towards its mirror image as the radius grows.
pub fn lerp_bloom_factor(factor: f32, radius: f32) -> f32 {
    let mirror = 1.2 - factor;
    factor + (mirror - factor) * radius
}

pub fn composite_factors(radius: f32) -> [f32; MIP_LEVELS] {
    BLOOM_FACTORS.map(|f| lerp_bloom_factor(f, radius))
}

/// Render target sizes of the blur levels for a `size` output. Level 0 is half resolution.
pub fn mip_sizes(size: [u32; 2]) -> [[u32; 2]; MIP_LEVELS] {
    let half = |v: u32| ((v as f32 / 2.0).round() as u32).max(1);
    let mut current = [half(size[0].max(1)), half(size[1].max(1))];
    let mut sizes = [[1, 1]; MIP_LEVELS];
    for level in sizes.iter_mut() {
        *level = current;
        current = [half(current[0]), half(current[1])];
    }
    sizes
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct BrightUniform {
    threshold: f32,
    smooth_width: f32,
    _padding: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct BlurUniform {
    // texel step in uv space along the blur axis
    direction: [f32; 2],
    kernel_radius: u32,
    _padding: u32,
    coefficients: [[f32; 4]; MAX_COEFFICIENTS / 4],
}

impl BlurUniform {
    fn new(direction: [f32; 2], kernel_radius: u32) -> Self {
        let mut coefficients = [[0.0; 4]; MAX_COEFFICIENTS / 4];
        for (i, w) in gaussian_coefficients(kernel_radius)
            .into_iter()
            .take(MAX_COEFFICIENTS)
            .enumerate()
        {
            coefficients[i / 4][i % 4] = w;
        }
        Self {
            direction,
            kernel_radius: kernel_radius.clamp(1, MAX_COEFFICIENTS as u32),
            _padding: 0,
            coefficients,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct CompositeUniform {
    factors: [[f32; 4]; 2],
    strength: f32,
    _padding: [f32; 3],
}

impl CompositeUniform {
    fn new(settings: &BloomConfig) -> Self {
        let mut factors = [[0.0; 4]; 2];
        for (i, f) in composite_factors(settings.radius).into_iter().enumerate() {
            factors[i / 4][i % 4] = f;
        }
        Self {
            factors,
            strength: settings.strength,
            _padding: [0.0; 3],
        }
    }
}

/// Size dependent resources, rebuilt on every resize.
#[derive(Debug)]
struct BloomTargets {
    size: [u32; 2],
    hdr: Texture,
    bright: Texture,
    horizontal: Vec<Texture>,
    vertical: Vec<Texture>,
    bright_group: wgpu::BindGroup,
    blur_groups: Vec<(wgpu::BindGroup, wgpu::BindGroup)>,
    composite_group: wgpu::BindGroup,
}

#[derive(Debug)]
pub struct Bloom {
    settings: BloomConfig,
    sampler: wgpu::Sampler,
    bright_layout: wgpu::BindGroupLayout,
    blur_layout: wgpu::BindGroupLayout,
    composite_layout: wgpu::BindGroupLayout,
    bright_pipeline: wgpu::RenderPipeline,
    blur_pipeline: wgpu::RenderPipeline,
    composite_pipeline: wgpu::RenderPipeline,
    targets: BloomTargets,
}

impl Bloom {
    pub fn new(
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
        size: [u32; 2],
        settings: BloomConfig,
    ) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("bloom sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bright_layout = mk_layout(device, "bloom_bright_layout", 1);
        let blur_layout = mk_layout(device, "bloom_blur_layout", 1);
        let composite_layout = mk_layout(device, "bloom_composite_layout", 1 + MIP_LEVELS as u32);

        let bright_pipeline = mk_fullscreen_pipeline(
            device,
            &bright_layout,
            Texture::HDR_FORMAT,
            "Bloom Bright Shader",
            include_str!("bloom_bright.wgsl"),
        );
        let blur_pipeline = mk_fullscreen_pipeline(
            device,
            &blur_layout,
            Texture::HDR_FORMAT,
            "Bloom Blur Shader",
            include_str!("bloom_blur.wgsl"),
        );
        let composite_pipeline = mk_fullscreen_pipeline(
            device,
            &composite_layout,
            output_format,
            "Bloom Composite Shader",
            include_str!("bloom_composite.wgsl"),
        );

        let targets = BloomTargets::new(
            device,
            size,
            &settings,
            &sampler,
            &bright_layout,
            &blur_layout,
            &composite_layout,
        );

        Self {
            settings,
            sampler,
            bright_layout,
            blur_layout,
            composite_layout,
            bright_pipeline,
            blur_pipeline,
            composite_pipeline,
            targets,
        }
    }

    /// The HDR colour target the scene pass renders into.
    pub fn hdr_view(&self) -> &wgpu::TextureView {
        &self.targets.hdr.view
    }

    pub fn size(&self) -> [u32; 2] {
        self.targets.size
    }

    pub fn resize(&mut self, device: &wgpu::Device, size: [u32; 2]) {
        self.targets = BloomTargets::new(
            device,
            size,
            &self.settings,
            &self.sampler,
            &self.bright_layout,
            &self.blur_layout,
            &self.composite_layout,
        );
    }

    /// Record the whole chain, ending with the composite into `output`.
    pub fn execute(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        let targets = &self.targets;
        fullscreen_pass(
            encoder,
            "bloom bright pass",
            &self.bright_pipeline,
            &targets.bright_group,
            &targets.bright.view,
        );
        for (level, (horizontal_group, vertical_group)) in targets.blur_groups.iter().enumerate() {
            fullscreen_pass(
                encoder,
                "bloom horizontal blur",
                &self.blur_pipeline,
                horizontal_group,
                &targets.horizontal[level].view,
            );
            fullscreen_pass(
                encoder,
                "bloom vertical blur",
                &self.blur_pipeline,
                vertical_group,
                &targets.vertical[level].view,
            );
        }
        fullscreen_pass(
            encoder,
            "bloom composite pass",
            &self.composite_pipeline,
            &targets.composite_group,
            output,
        );
    }
}

impl BloomTargets {
    fn new(
        device: &wgpu::Device,
        size: [u32; 2],
        settings: &BloomConfig,
        sampler: &wgpu::Sampler,
        bright_layout: &wgpu::BindGroupLayout,
        blur_layout: &wgpu::BindGroupLayout,
        composite_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let size = [size[0].max(1), size[1].max(1)];
        let mips = mip_sizes(size);

        let hdr = Texture::create_render_target(device, size, Texture::HDR_FORMAT, "scene hdr target");
        let bright = Texture::create_render_target(device, mips[0], Texture::HDR_FORMAT, "bloom bright target");
        let horizontal: Vec<Texture> = mips
            .iter()
            .map(|&mip| Texture::create_render_target(device, mip, Texture::HDR_FORMAT, "bloom horizontal target"))
            .collect();
        let vertical: Vec<Texture> = mips
            .iter()
            .map(|&mip| Texture::create_render_target(device, mip, Texture::HDR_FORMAT, "bloom vertical target"))
            .collect();

        let bright_uniform = BrightUniform {
            threshold: settings.threshold,
            smooth_width: settings.smooth_width,
            _padding: [0.0; 2],
        };
        let bright_group = mk_group(
            device,
            bright_layout,
            "bloom bright group",
            &[&hdr.view],
            sampler,
            &uniform_buffer(device, "bloom bright uniform", bytemuck::cast_slice(&[bright_uniform])),
        );

        let blur_groups = (0..MIP_LEVELS)
            .map(|level| {
                let [w, h] = mips[level];
                let source = if level == 0 {
                    &bright.view
                } else {
                    &vertical[level - 1].view
                };
                let horizontal_uniform = BlurUniform::new([1.0 / w as f32, 0.0], KERNEL_RADII[level]);
                let vertical_uniform = BlurUniform::new([0.0, 1.0 / h as f32], KERNEL_RADII[level]);
                let horizontal_group = mk_group(
                    device,
                    blur_layout,
                    "bloom horizontal group",
                    &[source],
                    sampler,
                    &uniform_buffer(device, "bloom blur uniform", bytemuck::cast_slice(&[horizontal_uniform])),
                );
                let vertical_group = mk_group(
                    device,
                    blur_layout,
                    "bloom vertical group",
                    &[&horizontal[level].view],
                    sampler,
                    &uniform_buffer(device, "bloom blur uniform", bytemuck::cast_slice(&[vertical_uniform])),
                );
                (horizontal_group, vertical_group)
            })
            .collect();

        let mut composite_views: Vec<&wgpu::TextureView> = vec![&hdr.view];
        composite_views.extend(vertical.iter().map(|t| &t.view));
        let composite_group = mk_group(
            device,
            composite_layout,
            "bloom composite group",
            &composite_views,
            sampler,
            &uniform_buffer(
                device,
                "bloom composite uniform",
                bytemuck::cast_slice(&[CompositeUniform::new(settings)]),
            ),
        );

        Self {
            size,
            hdr,
            bright,
            horizontal,
            vertical,
            bright_group,
            blur_groups,
            composite_group,
        }
    }
}

fn uniform_buffer(device: &wgpu::Device, label: &str, contents: &[u8]) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}

/// `textures` sampled textures, then the sampler, then the uniform buffer.
fn mk_layout(device: &wgpu::Device, label: &str, textures: u32) -> wgpu::BindGroupLayout {
    let mut entries: Vec<wgpu::BindGroupLayoutEntry> = (0..textures)
        .map(|binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                multisampled: false,
                view_dimension: wgpu::TextureViewDimension::D2,
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
            },
            count: None,
        })
        .collect();
    entries.push(wgpu::BindGroupLayoutEntry {
        binding: textures,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    });
    entries.push(wgpu::BindGroupLayoutEntry {
        binding: textures + 1,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    });
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &entries,
    })
}

fn mk_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    label: &str,
    views: &[&wgpu::TextureView],
    sampler: &wgpu::Sampler,
    uniform: &wgpu::Buffer,
) -> wgpu::BindGroup {
    let mut entries: Vec<wgpu::BindGroupEntry> = views
        .iter()
        .enumerate()
        .map(|(binding, view)| wgpu::BindGroupEntry {
            binding: binding as u32,
            resource: wgpu::BindingResource::TextureView(view),
        })
        .collect();
    let next = views.len() as u32;
    entries.push(wgpu::BindGroupEntry {
        binding: next,
        resource: wgpu::BindingResource::Sampler(sampler),
    });
    entries.push(wgpu::BindGroupEntry {
        binding: next + 1,
        resource: uniform.as_entire_binding(),
    });
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &entries,
    })
}

fn mk_fullscreen_pipeline(
    device: &wgpu::Device,
    bind_group_layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
    label: &str,
    source: &str,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });
    mk_render_pipeline(
        device,
        &layout,
        format,
        Some(wgpu::BlendState::REPLACE),
        None,
        &[],
        wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        },
        None,
    )
}

fn fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
    target: &wgpu::TextureView,
) {
    let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: target,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        occlusion_query_set: None,
        timestamp_writes: None,
    });
    render_pass.set_pipeline(pipeline);
    render_pass.set_bind_group(0, bind_group, &[]);
    render_pass.draw(0..3, 0..1);
}
