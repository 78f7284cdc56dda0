//! neon-city
//!
//! A generative neon city rendered with wgpu on native targets and WebGL2.
//! A seeded RNG lays out a 25x25 grid of towers wrapped in glowing rings,
//! paints a procedural texture for the sky dome, and the result is viewed
//! through a damped orbit camera with a bloom post-process.
//!
//! High-level modules
//! - `camera`: orbit camera, damping controller and view/projection uniforms
//! - `config`: every tunable of the scene with its default value
//! - `context`: window, surface and GPU device
//! - `data_structures`: instances, meshes, materials, textures and the scene graph
//! - `flow`: event loop, lifecycle and stop handle
//! - `generation`: seeded samplers, the sky texture and tower generation
//! - `pipelines`: lit scene pipelines, lights and the bloom chain
//! - `resources`: procedural geometry and bind group layouts
//! - `render`: frame composition
//! - `scene`: turns a seed into a scene description and uploads it
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod generation;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scene;

pub use config::SceneConfig;
pub use flow::{StopHandle, run, run_with_handle};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), JsValue> {
    run(SceneConfig::default()).map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
