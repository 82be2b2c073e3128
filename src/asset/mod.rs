//! # Assets
//!
//! Everything the viewer draws besides the camera feed: the reticle ring, the
//! placeholder cube and the product model.
//!
//! Model loading is asynchronous and owned by an [`AssetLoader`]. The viewer
//! keeps the result in a [`ModelSlot`], which shows the placeholder until the
//! real model resolves and keeps showing it if loading fails.

pub mod geometry;
pub mod loader;
pub mod slot;

pub use geometry::{generate_cube, generate_ring, Aabb, GeometryData};
pub use loader::{AssetLoader, ModelHandle, ObjLoader};
pub use slot::{ModelSlot, ModelStatus};

/// Reticle ring dimensions in meters.
pub const RETICLE_INNER_RADIUS: f32 = 0.07;
pub const RETICLE_OUTER_RADIUS: f32 = 0.09;
pub const RETICLE_SEGMENTS: u32 = 32;

pub fn reticle_geometry() -> GeometryData {
    generate_ring(RETICLE_INNER_RADIUS, RETICLE_OUTER_RADIUS, RETICLE_SEGMENTS)
}
