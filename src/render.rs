//! Frame composition.
//!
//! A frame is two stages: the scene pass draws every [`Batch`] into the HDR
//! target owned by the bloom chain, then [`Bloom::execute`] composites the
//! glow onto the output view. [`Renderer`] owns everything that depends on the
//! output size (depth buffer, bloom targets, projection) and is resized as a
//! whole.
//!
//! [`Batch`]: crate::scene::Batch

use instant::Duration;

use crate::{
    camera::{CameraResources, Projection},
    config::SceneConfig,
    data_structures::{model::DrawModel, texture::Texture},
    pipelines::{
        basic::StandardPipelines,
        bloom::Bloom,
        light::{LightResources, Lights},
    },
    resources,
    scene::GpuScene,
};

/// Where the render loop is in its life.
///
/// `Idle` until the first frame, `Running` afterwards, `Stopped` once a stop
/// was requested. There is no way back to `Idle`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lifecycle {
    #[default]
    Idle,
    Running,
    Stopped,
}

impl Lifecycle {
    /// A frame is about to be drawn.
    pub fn frame(self) -> Self {
        match self {
            Lifecycle::Idle => Lifecycle::Running,
            other => other,
        }
    }

    pub fn stop(self) -> Self {
        Lifecycle::Stopped
    }

    pub fn is_stopped(self) -> bool {
        self == Lifecycle::Stopped
    }

    /// Whether another frame should be requested. Nothing is presented to an
    /// unconfigured surface, so asking for frames then would spin.
    pub fn wants_redraw(self, surface_configured: bool) -> bool {
        surface_configured && !self.is_stopped()
    }
}

#[derive(Debug)]
pub struct Renderer {
    pub depth_texture: Texture,
    pub camera: CameraResources,
    pub projection: Projection,
    pub light: LightResources,
    pub material_layout: wgpu::BindGroupLayout,
    pub pipelines: StandardPipelines,
    pub bloom: Bloom,
    pub clear_colour: wgpu::Color,
    size: [u32; 2],
}

impl Renderer {
    /// `output_format` is the format of the views later passed to [`render`](Self::render).
    pub fn new(
        device: &wgpu::Device,
        output_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        config: &SceneConfig,
        lights: &Lights,
    ) -> Self {
        let size = [width.max(1), height.max(1)];
        let projection = Projection::new(
            size[0],
            size[1],
            cgmath::Deg(config.camera.fovy),
            config.camera.znear,
            config.camera.zfar,
        );
        let camera = CameraResources::new(device, &config.camera, &projection);
        let light = LightResources::new(device, lights);
        let material_layout = resources::texture::material_layout(device);
        let pipelines = StandardPipelines::new(
            device,
            &material_layout,
            &camera.bind_group_layout,
            &light.bind_group_layout,
        );
        let depth_texture = Texture::create_depth_texture(device, size, "depth_texture");
        let bloom = Bloom::new(device, output_format, size, config.bloom.clone());

        Self {
            depth_texture,
            camera,
            projection,
            light,
            material_layout,
            pipelines,
            bloom,
            clear_colour: config.clear_colour,
            size,
        }
    }

    pub fn size(&self) -> [u32; 2] {
        self.size
    }

    /// Rebuild every size dependent target. Zero sizes are ignored.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.size = [width, height];
        self.projection.resize(width, height);
        self.depth_texture = Texture::create_depth_texture(device, self.size, "depth_texture");
        self.bloom.resize(device, self.size);
    }

    /// Advance camera damping by `dt` and upload the camera uniform.
    pub fn update(&mut self, queue: &wgpu::Queue, dt: Duration) {
        self.camera.update(queue, &self.projection, dt);
    }

    /// Draw `scene` and composite it with bloom into `output`.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &GpuScene,
        output: &wgpu::TextureView,
    ) {
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: self.bloom.hdr_view(),
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            for batch in &scene.batches {
                let (Some(mesh), Some(material)) = (
                    scene.meshes.get(&batch.drawable.mesh),
                    scene.materials.get(&batch.drawable.material),
                ) else {
                    log::warn!("skipping batch {:?}: not uploaded", batch.drawable);
                    continue;
                };
                render_pass.set_pipeline(self.pipelines.for_side(material.side));
                render_pass.set_vertex_buffer(1, batch.instance_buffer.slice(..));
                render_pass.draw_mesh_instanced(
                    mesh,
                    material,
                    0..batch.count,
                    &self.camera.bind_group,
                    &self.light.bind_group,
                );
            }
        }

        self.bloom.execute(&mut encoder, output);

        queue.submit(std::iter::once(encoder.finish()));
    }
}

/// Read an `Rgba8Unorm(Srgb)` texture back to the CPU.
///
/// Natively this blocks until the GPU is done with the copy.
pub async fn read_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
) -> anyhow::Result<image::RgbaImage> {
    let width = texture.width();
    let height = texture.height();
    let unpadded_bytes_per_row = 4 * width;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let padded_bytes_per_row = unpadded_bytes_per_row.div_ceil(align) * align;

    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("readback buffer"),
        size: (padded_bytes_per_row * height) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("readback encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            aspect: wgpu::TextureAspect::All,
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded_bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        texture.size(),
    );
    let submission_index = queue.submit(std::iter::once(encoder.finish()));

    let slice = buffer.slice(..);
    let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        tx.send(result).ok();
    });
    #[cfg(target_arch = "wasm32")]
    {
        let _ = submission_index;
        device.poll(wgpu::PollType::Poll)?;
    }
    #[cfg(not(target_arch = "wasm32"))]
    device.poll(wgpu::PollType::Wait {
        submission_index: Some(submission_index),
        timeout: Some(std::time::Duration::from_secs(3)),
    })?;
    rx.receive()
        .await
        .ok_or_else(|| anyhow::anyhow!("readback channel closed"))??;

    let data = slice.get_mapped_range();
    let mut pixels = Vec::with_capacity((unpadded_bytes_per_row * height) as usize);
    for row in data.chunks(padded_bytes_per_row as usize) {
        pixels.extend_from_slice(&row[..unpadded_bytes_per_row as usize]);
    }
    drop(data);
    buffer.unmap();

    image::RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| anyhow::anyhow!("readback of {}x{} has the wrong length", width, height))
}
