//! Application event loop.
//!
//! [`App`] drives the winit loop. Startup is asynchronous: the GPU context,
//! the generated city and the renderer are built in one future, which is
//! blocked on by a tokio runtime natively and spawned on the browser's
//! executor on the web. Either way the result comes back as a
//! [`FlowEvent::Initialized`] so both platforms share one code path.
//!
//! # Lifecycle
//!
//! Each redraw:
//! 1. advance camera damping and upload the camera uniform
//! 2. scene pass into the HDR target
//! 3. bloom chain composited onto the surface texture
//! 4. present and request the next redraw
//!
//! Rendering continues until the window is closed or a [`StopHandle`] fires.

use std::{fmt::Debug, sync::Arc};

use anyhow::Context as _;
use instant::Instant;
use rand::{SeedableRng, rngs::StdRng};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    config::{SEED_ENV, SceneConfig},
    context::Context,
    render::{Lifecycle, Renderer},
    scene::{GpuScene, SceneDescription},
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Everything that exists once startup has finished.
#[derive(Debug)]
pub struct AppState {
    pub(crate) ctx: Context,
    pub renderer: Renderer,
    pub scene: GpuScene,
    pub seed: u64,
}

impl AppState {
    async fn new(window: Arc<Window>, config: SceneConfig) -> anyhow::Result<Self> {
        let ctx = Context::new(window)
            .await
            .context("App initialization failed. Cannot create the main context")?;

        let seed = config.seed.unwrap_or_else(rand::random);
        log::info!("city seed {} (set {} to repeat it)", seed, SEED_ENV);
        let mut rng = StdRng::seed_from_u64(seed);
        let description = SceneDescription::assemble(&config, &mut rng);

        let renderer = Renderer::new(
            &ctx.device,
            ctx.config.format,
            ctx.config.width,
            ctx.config.height,
            &config,
            &description.lights,
        );
        let scene = GpuScene::new(
            &ctx.device,
            &ctx.queue,
            &description,
            &config.city,
            &renderer.material_layout,
        )?;
        log::info!(
            "initialized {} buildings as {} instances",
            description.buildings.len(),
            scene.instance_count()
        );

        Ok(Self {
            ctx,
            renderer,
            scene,
            seed,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.ctx.resize(width, height) {
            self.renderer.resize(&self.ctx.device, width, height);
            log::info!("resized to {}x{}", width, height);
        }
    }

    fn render(&mut self, dt: instant::Duration) -> Result<(), wgpu::SurfaceError> {
        self.renderer.update(&self.ctx.queue, dt);
        if !self.ctx.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.renderer
            .render(&self.ctx.device, &self.ctx.queue, &self.scene, &view);
        self.ctx.window.pre_present_notify();
        output.present();
        Ok(())
    }

    /// Release GPU resources: the scene first, the device last.
    fn teardown(self) {
        let AppState {
            ctx,
            renderer,
            scene,
            ..
        } = self;
        drop(scene);
        drop(renderer);
        drop(ctx);
    }
}

pub(crate) enum FlowEvent {
    Initialized(Box<anyhow::Result<AppState>>),
    Exit,
}

impl Debug for FlowEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized(result) => f
                .debug_tuple("Initialized")
                .field(&(**result).as_ref().map(|state| state.seed))
                .finish(),
            Self::Exit => f.write_str("Exit"),
        }
    }
}

/// Asks the running event loop to stop. Cheap to clone.
#[derive(Clone, Debug)]
pub struct StopHandle(EventLoopProxy<FlowEvent>);

impl StopHandle {
    /// Returns false when the loop has already shut down.
    pub fn stop(&self) -> bool {
        self.0.send_event(FlowEvent::Exit).is_ok()
    }
}

pub(crate) struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<FlowEvent>,
    // taken when the window is created
    config: Option<SceneConfig>,
    state: Option<AppState>,
    lifecycle: Lifecycle,
    last_time: Instant,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(event_loop: &EventLoop<FlowEvent>, config: SceneConfig) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime =
            tokio::runtime::Runtime::new().context("failed to start the async runtime")?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            config: Some(config),
            state: None,
            lifecycle: Lifecycle::Idle,
            last_time: Instant::now(),
            error: None,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error = Some(error);
        self.stop(event_loop);
    }

    fn stop(&mut self, event_loop: &ActiveEventLoop) {
        self.lifecycle = self.lifecycle.stop();
        event_loop.exit();
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(config) = self.config.take() else {
            return;
        };

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("neon city");
        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;
            const CANVAS_ID: &str = "canvas";
            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, anyhow::Error::new(e).context("failed to create a window"));
                return;
            }
        };

        let init_future = AppState::new(window, config);
        #[cfg(not(target_arch = "wasm32"))]
        {
            let result = self.async_runtime.block_on(init_future);
            self.user_event(event_loop, FlowEvent::Initialized(Box::new(result)));
        }
        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = init_future.await;
                if proxy
                    .send_event(FlowEvent::Initialized(Box::new(result)))
                    .is_err()
                {
                    log::error!("event loop closed before initialization finished");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            FlowEvent::Initialized(result) => match *result {
                Ok(mut state) => {
                    // The canvas may have changed size while we were initializing
                    let size = state.ctx.window.inner_size();
                    state.resize(size.width, size.height);
                    state.ctx.window.request_redraw();
                    self.last_time = Instant::now();
                    self.state = Some(state);
                }
                Err(e) => self.fail(event_loop, e),
            },
            FlowEvent::Exit => self.stop(event_loop),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        let renderer = &mut state.renderer;
        let viewport_height = state.ctx.config.height;
        renderer.camera.controller.handle_window_events(
            &event,
            &renderer.camera.camera,
            &renderer.projection,
            viewport_height,
        );

        match event {
            WindowEvent::CloseRequested => self.stop(event_loop),
            WindowEvent::Resized(size) => {
                state.resize(size.width, size.height);
                // redraws stop while minimized, start them again
                if self.lifecycle.wants_redraw(state.ctx.is_surface_configured) {
                    state.ctx.window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => {
                if self.lifecycle.is_stopped() {
                    return;
                }
                self.lifecycle = self.lifecycle.frame();
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();

                match state.render(dt) {
                    Ok(_) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
                if self.lifecycle.wants_redraw(state.ctx.is_surface_configured) {
                    state.ctx.window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.lifecycle = self.lifecycle.stop();
        if let Some(state) = self.state.take() {
            log::info!("shutting down");
            state.teardown();
        }
    }
}

/// Install the platform logger once; later calls do nothing.
pub fn init_logger() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Err(e) = env_logger::try_init() {
                println!("Warning: Could not initialize logger: {}", e);
            };
        }
        #[cfg(target_arch = "wasm32")]
        {
            console_log::init_with_level(log::Level::Info).unwrap_throw();
        }
    });
}

/// Open a window and render the city until it is closed.
pub fn run(config: SceneConfig) -> anyhow::Result<()> {
    run_with_handle(config, |_| ())
}

/// Like [`run`], handing a [`StopHandle`] to `on_start` before the loop starts.
pub fn run_with_handle(
    config: SceneConfig,
    on_start: impl FnOnce(StopHandle),
) -> anyhow::Result<()> {
    init_logger();
    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, config)?;
    on_start(StopHandle(app.proxy.clone()));
    event_loop.run_app(&mut app)?;
    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_format_flow_events() {
        assert_eq!(format!("{:?}", FlowEvent::Exit), "Exit");

        let failed = FlowEvent::Initialized(Box::new(Err(anyhow::anyhow!("no adapter"))));
        assert!(format!("{:?}", failed).starts_with("Initialized(Err(no adapter"));
    }
}
