// src/lib.rs
//! arview
//!
//! Place a 3D product model on a real-world surface seen through the camera,
//! move, scale and turn it with touch gestures, and capture a screenshot.
//!
//! The crate is the interaction engine only. The platform's AR tracking
//! stack, the GPU renderer and model decoding sit behind traits
//! ([`session::TrackingPlatform`], [`render::SceneRenderer`],
//! [`asset::AssetLoader`]) so the whole flow runs headless in tests.

pub mod app;
pub mod asset;
pub mod capture;
pub mod config;
pub mod error;
pub mod input;
pub mod math;
pub mod placement;
pub mod prelude;
pub mod render;
pub mod session;
pub mod tracking;

// Re-export main types for convenience
pub use app::{ArViewer, FrameReport};
pub use error::{ArError, Result};

/// A viewer on the simulated platform with a headless renderer, sized to
/// the default viewport.
pub fn simulated() -> Result<ArViewer<session::SimulatedPlatform, render::HeadlessRenderer>> {
    let config = config::ViewerConfig::default();
    let renderer = render::HeadlessRenderer::new(config.viewport.width, config.viewport.height);
    ArViewer::new(config, session::SimulatedPlatform::new(), renderer)
}
