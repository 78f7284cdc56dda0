//! Procedural generation of the city.
//!
//! Everything in here is CPU-only and driven by an injected random source, so
//! the same seed always produces the same city:
//!
//! - `sampler` draws the random yellows and square sizes
//! - `texture` paints the tiled sky bitmap
//! - `building` sizes the towers and distributes their rings

pub mod building;
pub mod sampler;
pub mod texture;

pub use building::{Building, BuildingParams, Ring, create_building, ring_count};
pub use sampler::{Hsl, random_square_size, random_yellow};
pub use texture::synthesize_sky_texture;
