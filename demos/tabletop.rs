//! # Tabletop Demo
//!
//! Runs a complete placement session on the simulated platform with the
//! headless renderer: start a session, wait for the reticle, tap to place,
//! drag, pinch and twist the model, capture a screenshot, end the session.
//!
//! ## Usage:
//! ```bash
//! RUST_LOG=info cargo run --example tabletop -- [model.obj] [output-dir]
//! ```
//!
//! Without a model path the configured one is tried; if it cannot be loaded
//! the placeholder cube is used instead.

use std::path::PathBuf;

use anyhow::Context;
use arview::prelude::*;
use log::{info, warn};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let model_path = args.next();
    let output_dir = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));

    let mut config = ViewerConfig::default();
    config.viewport.width = 390;
    config.viewport.height = 844;
    if let Some(path) = model_path {
        config.asset.model_path = path;
    }

    // Requests take a few frames to resolve, like on a real device
    let platform = SimulatedPlatform::new().with_latency(2).with_jitter(0.002, 7);
    let renderer = HeadlessRenderer::new(config.viewport.width, config.viewport.height);
    let mut viewer = ArViewer::new(config, platform.clone(), renderer)?;

    let loader = viewer.obj_loader();
    viewer.load_model(&loader);
    viewer
        .start_session()
        .context("could not start the AR session")?;

    // Wait for setup and a surface
    let mut frames = 0;
    let reticle = loop {
        platform.advance_frame();
        let report = viewer.tick();
        frames += 1;
        if let Some(Err(error)) = &report.asset {
            warn!("Continuing with placeholder: {}", error);
        }
        if let Some(pose) = report.reticle {
            break pose;
        }
        anyhow::ensure!(frames < 120, "no surface found after {} frames", frames);
    };
    info!(
        "Surface found after {} frames at ({:.2}, {:.2}, {:.2})",
        frames, reticle.position.x, reticle.position.y, reticle.position.z
    );

    // Tap in the middle of the screen
    let (cx, cy) = (195.0, 422.0);
    viewer.touch(1, TouchPhase::Started, cx, cy);
    viewer.touch(1, TouchPhase::Ended, cx, cy);
    anyhow::ensure!(
        viewer.placement_state() == PlacementState::Placed,
        "tap did not place the model"
    );

    // Drag towards the top right
    viewer.touch(1, TouchPhase::Started, cx, cy);
    for step in 1..=10 {
        let t = step as f32;
        viewer.touch(1, TouchPhase::Moved, cx + 6.0 * t, cy - 8.0 * t);
        advance(&platform, &mut viewer);
    }
    viewer.touch(1, TouchPhase::Ended, cx + 60.0, cy - 80.0);
    advance(&platform, &mut viewer);

    // Pinch out while twisting
    viewer.touch(1, TouchPhase::Started, cx - 40.0, cy);
    viewer.touch(2, TouchPhase::Started, cx + 40.0, cy);
    advance(&platform, &mut viewer);
    for step in 1..=10 {
        let t = step as f32;
        let angle = 0.05 * t;
        let half = 40.0 + 4.0 * t;
        let (dx, dy) = (half * angle.cos(), half * angle.sin());
        viewer.touch(1, TouchPhase::Moved, cx - dx, cy - dy);
        viewer.touch(2, TouchPhase::Moved, cx + dx, cy + dy);
        advance(&platform, &mut viewer);
    }
    viewer.touch(1, TouchPhase::Ended, cx, cy);
    viewer.touch(2, TouchPhase::Ended, cx, cy);
    advance(&platform, &mut viewer);

    if let Some(transform) = viewer.object_transform() {
        info!(
            "Model at ({:.2}, {:.2}, {:.2}), scale {:.2}, yaw {:.2} rad",
            transform.position.x,
            transform.position.y,
            transform.position.z,
            transform.scale,
            transform.yaw
        );
    }

    let path = viewer
        .save_capture(&output_dir)
        .context("capture failed")?;
    info!("Screenshot saved to {}", path.display());

    viewer.end_session()?;
    info!(
        "Done: {} session(s) acquired, {} released",
        platform.sessions_acquired(),
        platform.sessions_released()
    );
    Ok(())
}

fn advance(platform: &SimulatedPlatform, viewer: &mut ArViewer<SimulatedPlatform, HeadlessRenderer>) {
    platform.advance_frame();
    viewer.tick();
}
