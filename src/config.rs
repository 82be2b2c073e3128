//! # Viewer Configuration
//!
//! Tunables for every component, grouped per component. Defaults match the
//! product viewer: a 20 cm placeholder cube, the phone model at half scale,
//! user scaling between 0.05x and 5x, and PNG captures named `ar-capture.png`.

use crate::error::{ArError, Result};
use crate::session::SessionOptions;

/// How single-finger drags move a placed object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanMode {
    /// Screen deltas scaled onto the camera's horizontal right/forward basis.
    ViewPlane,
    /// Rays through the previous and current finger positions intersected with
    /// the placement plane; the object follows the finger exactly.
    SurfaceRaycast,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementConfig {
    pub default_scale: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// World meters moved per screen pixel in [`PanMode::ViewPlane`].
    pub pan_meters_per_pixel: f32,
    pub pan_mode: PanMode,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            default_scale: 1.0,
            min_scale: 0.05,
            max_scale: 5.0,
            pan_meters_per_pixel: 0.002,
            pan_mode: PanMode::ViewPlane,
        }
    }
}

impl PlacementConfig {
    pub fn with_scale_bounds(mut self, min_scale: f32, max_scale: f32) -> Self {
        self.min_scale = min_scale;
        self.max_scale = max_scale;
        self
    }

    pub fn with_pan_mode(mut self, pan_mode: PanMode) -> Self {
        self.pan_mode = pan_mode;
        self
    }

    /// Never panics; inverted bounds resolve to `max_scale`.
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.max(self.min_scale).min(self.max_scale)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GestureConfig {
    /// Pinches narrower than this (pixels) produce no scale events.
    pub min_pinch_distance: f32,
    /// Maximum finger travel (pixels) for a touch to still count as a tap.
    pub tap_slop: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            min_pinch_distance: 8.0,
            tap_slop: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackingConfig {
    /// Exponential smoothing factor for the reticle pose. `None` passes the
    /// platform's hit results through untouched; `Some(1.0)` is equivalent.
    pub smoothing: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetConfig {
    pub model_path: String,
    /// Uniform scale applied to the loaded model on top of the user's scale.
    pub model_scale: f32,
    /// Edge length of the stand-in cube shown until the model arrives.
    pub placeholder_size: f32,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            model_path: "models/oldphone.obj".to_string(),
            model_scale: 0.5,
            placeholder_size: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    pub file_name: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            file_name: "ar-capture.png".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
    pub fovy_radians: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1170,
            height: 2532,
            fovy_radians: 1.05,
        }
    }
}

impl ViewportConfig {
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewerConfig {
    pub placement: PlacementConfig,
    pub gesture: GestureConfig,
    pub tracking: TrackingConfig,
    pub asset: AssetConfig,
    pub capture: CaptureConfig,
    pub viewport: ViewportConfig,
    pub session: SessionOptions,
}

impl ViewerConfig {
    pub fn validate(&self) -> Result<()> {
        let placement = &self.placement;
        if !(placement.min_scale > 0.0) {
            return Err(ArError::config(format!(
                "min_scale must be positive, got {}",
                placement.min_scale
            )));
        }
        if placement.min_scale > placement.max_scale {
            return Err(ArError::config(format!(
                "scale bounds are inverted: [{}, {}]",
                placement.min_scale, placement.max_scale
            )));
        }
        if !(placement.min_scale..=placement.max_scale).contains(&placement.default_scale) {
            return Err(ArError::config(format!(
                "default scale {} lies outside [{}, {}]",
                placement.default_scale, placement.min_scale, placement.max_scale
            )));
        }
        if let Some(factor) = self.tracking.smoothing {
            if !(factor > 0.0 && factor <= 1.0) {
                return Err(ArError::config(format!(
                    "smoothing factor must be in (0, 1], got {}",
                    factor
                )));
            }
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(ArError::config("viewport must not be empty"));
        }
        Ok(())
    }
}
