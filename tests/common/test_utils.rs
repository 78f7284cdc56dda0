use neon_city::{SceneConfig, scene::SceneDescription};
use rand::{SeedableRng, rngs::StdRng};

pub(crate) const SEED: u64 = 0x6e65_6f6e;

pub(crate) fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub(crate) fn city(seed: u64) -> SceneDescription {
    SceneDescription::assemble(&SceneConfig::default(), &mut rng(seed))
}

pub(crate) fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= 1e-4 * a.abs().max(b.abs()).max(1.0)
}

/// A device without a window, for rendering into textures.
#[cfg(feature = "integration-tests")]
pub(crate) fn headless() -> (wgpu::Device, wgpu::Queue) {
    let runtime = tokio::runtime::Runtime::new().expect("failed to start a tokio runtime");
    let instance = neon_city::context::create_instance();
    let (_, device, queue) = runtime
        .block_on(neon_city::context::request_device(&instance, None))
        .expect("no GPU available for integration tests");
    (device, queue)
}

/// A device on wgpu's noop backend. Nothing is executed, but every resource,
/// pipeline and pass is still validated.
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn noop_device() -> (wgpu::Device, wgpu::Queue) {
    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::NOOP,
        backend_options: wgpu::BackendOptions {
            noop: wgpu::NoopBackendOptions { enable: true },
            ..Default::default()
        },
        ..Default::default()
    });
    let (_, device, queue) =
        futures::executor::block_on(neon_city::context::request_device(&instance, None))
            .expect("the noop backend always offers an adapter");
    (device, queue)
}
