//! Engine data structures: meshes, materials, textures, instances and the scene graph.
//!
//! - `model` contains vertex layout, GPU meshes and the standard material
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `instance` holds per-instance transformation data
//! - `scene_graph` enables hierarchical scene organization

pub mod instance;
pub mod model;
pub mod scene_graph;
pub mod texture;
