//! # arview Prelude
//!
//! Commonly used types in one import:
//!
//! ```rust
//! use arview::prelude::*;
//! ```

// Viewer and configuration
pub use crate::app::{ArViewer, FrameReport};
pub use crate::config::{PanMode, ViewerConfig};
pub use crate::error::{ArError, CaptureError, PlatformError};

// Session lifecycle
pub use crate::session::{
    EndReason, SessionEvent, SessionManager, SessionState, SimulatedPlatform, TrackingPlatform,
    TrackingSession,
};

// Interaction
pub use crate::input::{GestureEvent, GestureRecognizer, TouchPhase, TouchPoint};
pub use crate::placement::{ObjectTransform, PlacementController, PlacementState};
pub use crate::tracking::HitTestTracker;

// Assets, rendering and capture
pub use crate::asset::{AssetLoader, ModelHandle, ModelStatus, ObjLoader};
pub use crate::capture::CapturedImage;
pub use crate::render::{HeadlessRenderer, SceneRenderer, SceneView};

// Common math
pub use crate::math::Pose;
pub use cgmath::{Vector3, InnerSpace, Zero};
