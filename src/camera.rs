//! Orbit camera, projection and the uniforms that carry them to the GPU.
//!
//! The camera circles a target point. Input never moves it directly: drags
//! and scrolls accumulate into pending deltas on the [`OrbitController`],
//! which bleeds a fraction of them into the camera on every frame. That is
//! what gives the camera its inertia.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use instant::Duration;
use wgpu::util::DeviceExt;
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent},
};

use crate::config::CameraConfig;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Keeps the camera off the poles where the view matrix degenerates.
const POLAR_EPSILON: f32 = 1e-6;
/// Scroll step applied per wheel notch.
const ZOOM_STEP: f32 = 0.95;
/// Pixel scroll deltas are converted to notches with this ratio.
const PIXELS_PER_LINE: f32 = 50.0;

/// Position on a sphere around `target`.
///
/// `phi` is the polar angle from +Y, `theta` the azimuth from +Z towards +X.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub target: Point3<f32>,
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,
}

impl Camera {
    pub fn look_at(position: Point3<f32>, target: Point3<f32>) -> Self {
        let offset = position - target;
        let radius = offset.magnitude();
        let (theta, phi) = if radius == 0.0 {
            (0.0, PI / 2.0)
        } else {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        };
        Self {
            target,
            radius,
            theta,
            phi,
        }
    }

    pub fn position(&self) -> Point3<f32> {
        let sin_phi = self.phi.sin();
        self.target
            + Vector3::new(
                self.radius * sin_phi * self.theta.sin(),
                self.radius * self.phi.cos(),
                self.radius * sin_phi * self.theta.cos(),
            )
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position(), self.target, Vector3::unit_y())
    }

    /// Camera right and up axes in world space.
    pub fn basis(&self) -> (Vector3<f32>, Vector3<f32>) {
        let forward = (self.target - self.position()).normalize();
        let right = forward.cross(Vector3::unit_y()).normalize();
        let up = right.cross(forward).normalize();
        (right, up)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        let mut projection = Self {
            aspect: 1.0,
            fovy: fovy.into(),
            znear,
            zfar,
        };
        projection.resize(width, height);
        projection
    }

    /// Degenerate sizes keep the previous aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn fovy(&self) -> Rad<f32> {
        self.fovy
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position().to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Drag {
    None,
    Rotate,
    Pan,
}

/// Turns pointer input into damped orbit, pan and zoom.
#[derive(Clone, Debug)]
pub struct OrbitController {
    damping_factor: f32,
    rotate_speed: f32,
    zoom_speed: f32,
    min_distance: f32,
    max_distance: f32,
    // pending, not yet applied motion
    delta_theta: f32,
    delta_phi: f32,
    pan_offset: Vector3<f32>,
    scale: f32,
    drag: Drag,
    cursor: Option<PhysicalPosition<f64>>,
    touch: Option<(u64, PhysicalPosition<f64>)>,
}

impl OrbitController {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            damping_factor: config.damping_factor.clamp(0.0, 1.0),
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            delta_theta: 0.0,
            delta_phi: 0.0,
            pan_offset: Vector3::new(0.0, 0.0, 0.0),
            scale: 1.0,
            drag: Drag::None,
            cursor: None,
            touch: None,
        }
    }

    /// Queue a rotation from a pointer movement of `dx`, `dy` pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: u32) {
        let height = viewport_height.max(1) as f32;
        self.delta_theta -= 2.0 * PI * dx / height * self.rotate_speed;
        self.delta_phi -= 2.0 * PI * dy / height * self.rotate_speed;
    }

    /// Queue a screen-space pan so the point under the cursor follows it.
    pub fn pan(&mut self, dx: f32, dy: f32, camera: &Camera, projection: &Projection, viewport_height: u32) {
        let height = viewport_height.max(1) as f32;
        let target_distance = camera.radius * (projection.fovy().0 / 2.0).tan();
        let (right, up) = camera.basis();
        self.pan_offset += right * (-2.0 * dx * target_distance / height);
        self.pan_offset += up * (2.0 * dy * target_distance / height);
    }

    /// Positive `notches` zoom in.
    pub fn zoom(&mut self, notches: f32) {
        self.scale *= ZOOM_STEP.powf(notches * self.zoom_speed);
    }

    pub fn is_settled(&self) -> bool {
        const EPS: f32 = 1e-6;
        self.delta_theta.abs() < EPS
            && self.delta_phi.abs() < EPS
            && self.pan_offset.magnitude2() < EPS * EPS
            && (self.scale - 1.0).abs() < EPS
    }

    /// Feed a window event. Returns whether it was consumed.
    pub fn handle_window_events(
        &mut self,
        event: &WindowEvent,
        camera: &Camera,
        projection: &Projection,
        viewport_height: u32,
    ) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                self.drag = match (button, state) {
                    (MouseButton::Left, ElementState::Pressed) => Drag::Rotate,
                    (MouseButton::Right, ElementState::Pressed)
                    | (MouseButton::Middle, ElementState::Pressed) => Drag::Pan,
                    (_, ElementState::Released) => Drag::None,
                    _ => self.drag,
                };
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(last) = self.cursor {
                    let dx = (position.x - last.x) as f32;
                    let dy = (position.y - last.y) as f32;
                    match self.drag {
                        Drag::Rotate => self.rotate(dx, dy, viewport_height),
                        Drag::Pan => self.pan(dx, dy, camera, projection, viewport_height),
                        Drag::None => (),
                    }
                }
                self.cursor = Some(*position);
                self.drag != Drag::None
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.drag = Drag::None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
                };
                self.zoom(notches);
                true
            }
            WindowEvent::Touch(touch) => {
                match touch.phase {
                    TouchPhase::Started => {
                        if self.touch.is_none() {
                            self.touch = Some((touch.id, touch.location));
                        }
                    }
                    TouchPhase::Moved => {
                        if let Some((id, last)) = self.touch {
                            if id == touch.id {
                                let dx = (touch.location.x - last.x) as f32;
                                let dy = (touch.location.y - last.y) as f32;
                                self.rotate(dx, dy, viewport_height);
                                self.touch = Some((id, touch.location));
                            }
                        }
                    }
                    TouchPhase::Ended | TouchPhase::Cancelled => {
                        if matches!(self.touch, Some((id, _)) if id == touch.id) {
                            self.touch = None;
                        }
                    }
                }
                true
            }
            _ => false,
        }
    }

    /// Apply a damped share of the pending motion to `camera`.
    ///
    /// `damping_factor` is the share per 60 Hz frame; other frame times are
    /// corrected so the camera settles equally fast at any refresh rate.
    pub fn update(&mut self, camera: &mut Camera, dt: Duration) {
        let keep = damping_keep(self.damping_factor, dt);
        let apply = 1.0 - keep;

        camera.theta += self.delta_theta * apply;
        camera.phi = (camera.phi + self.delta_phi * apply).clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        camera.radius = (camera.radius * self.scale).clamp(self.min_distance, self.max_distance);
        camera.target += self.pan_offset * apply;

        self.delta_theta *= keep;
        self.delta_phi *= keep;
        self.pan_offset *= keep;
        self.scale = 1.0;
    }
}

/// Share of a pending delta that remains after a frame of length `dt`.
pub fn damping_keep(damping_factor: f32, dt: Duration) -> f32 {
    let frames = dt.as_secs_f32() * 60.0;
    (1.0 - damping_factor.clamp(0.0, 1.0)).powf(frames)
}

#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: OrbitController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device, config: &CameraConfig, projection: &Projection) -> Self {
        let camera = Camera::look_at(config.position.into(), config.target.into());
        let controller = OrbitController::new(config);

        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, projection);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
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
            label: Some("camera_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            camera,
            controller,
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    /// Advance damping and push the new view to the GPU.
    pub fn update(&mut self, queue: &wgpu::Queue, projection: &Projection, dt: Duration) {
        self.controller.update(&mut self.camera, dt);
        self.uniform.update_view_proj(&self.camera, projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}
