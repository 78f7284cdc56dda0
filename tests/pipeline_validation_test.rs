#![cfg(not(target_arch = "wasm32"))]

use instant::Duration;
use neon_city::{
    SceneConfig,
    render::Renderer,
    scene::{GpuScene, SceneDescription},
};

use crate::common::test_utils::{SEED, noop_device, rng};

mod common;

const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

fn output_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("validation output"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

#[test]
fn frames_pass_wgpu_validation() {
    let (device, queue) = noop_device();
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let config = SceneConfig::default();
    let description = SceneDescription::assemble(&config, &mut rng(SEED));
    let mut renderer = Renderer::new(&device, FORMAT, 64, 48, &config, &description.lights);
    let scene = GpuScene::new(
        &device,
        &queue,
        &description,
        &config.city,
        &renderer.material_layout,
    )
    .expect("scene upload failed");

    renderer.update(&queue, Duration::from_millis(16));
    renderer.render(&device, &queue, &scene, &output_view(&device, 64, 48));

    // odd sizes round differently down the bloom chain
    renderer.resize(&device, 33, 17);
    assert_eq!(renderer.bloom.size(), [33, 17]);
    renderer.update(&queue, Duration::from_millis(16));
    renderer.render(&device, &queue, &scene, &output_view(&device, 33, 17));

    let error = futures::executor::block_on(device.pop_error_scope());
    assert!(error.is_none(), "validation failed: {:?}", error);
}
