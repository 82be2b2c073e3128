use cgmath::{InnerSpace, Vector3};
use log::{debug, info};

use super::transform::ObjectTransform;
use crate::config::PlacementConfig;
use crate::error::{ArError, Result};
use crate::input::GestureEvent;
use crate::math::{Pose, Ray};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementState {
    Searching,
    Placed,
}

/// The camera's right and forward directions flattened onto the ground plane.
/// Screen-space pans are mapped through this basis so that dragging right
/// moves the object to the viewer's right and dragging up moves it away.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBasis {
    pub right: Vector3<f32>,
    pub forward: Vector3<f32>,
}

impl ViewBasis {
    pub fn from_viewer(viewer: &Pose) -> Self {
        let flat = |v: Vector3<f32>| Vector3::new(v.x, 0.0, v.z);
        let forward = flat(viewer.forward());
        let right = flat(viewer.right());

        // Looking straight down: forward collapses, so derive it from right
        match (right.magnitude2() > 1e-8, forward.magnitude2() > 1e-8) {
            (true, true) => Self {
                right: right.normalize(),
                forward: forward.normalize(),
            },
            (true, false) => {
                let right = right.normalize();
                Self {
                    right,
                    forward: Vector3::unit_y().cross(right),
                }
            }
            (false, true) => {
                let forward = forward.normalize();
                Self {
                    right: forward.cross(Vector3::unit_y()),
                    forward,
                }
            }
            (false, false) => Self::default(),
        }
    }
}

impl Default for ViewBasis {
    fn default() -> Self {
        Self {
            right: Vector3::unit_x(),
            forward: -Vector3::unit_z(),
        }
    }
}

/// Owns the placement state and the placed object's transform.
///
/// Operations invoked in the wrong state return
/// [`ArError::InvalidStateOperation`] and change nothing; callers log and
/// carry on.
pub struct PlacementController {
    state: PlacementState,
    transform: Option<ObjectTransform>,
    config: PlacementConfig,
}

impl PlacementController {
    pub fn new(config: PlacementConfig) -> Self {
        Self {
            state: PlacementState::Searching,
            transform: None,
            config,
        }
    }

    pub fn state(&self) -> PlacementState {
        self.state
    }

    pub fn is_placed(&self) -> bool {
        self.state == PlacementState::Placed
    }

    /// The placed object's transform. Always `None` while searching.
    pub fn transform(&self) -> Option<&ObjectTransform> {
        self.transform.as_ref()
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Places the object at `candidate`, the tracker's latest result.
    ///
    /// Ignored when already placed (a second tap does not re-place) or when
    /// there is no candidate because no surface is under the reticle.
    pub fn confirm(&mut self, candidate: Option<Pose>) -> Result<&ObjectTransform> {
        if self.state == PlacementState::Placed {
            debug!("Ignoring confirm: object already placed");
            return Err(ArError::invalid_state("confirm placement", self.state));
        }
        let Some(pose) = candidate else {
            debug!("Ignoring confirm: no surface under the reticle");
            return Err(ArError::invalid_state(
                "confirm placement without a surface",
                self.state,
            ));
        };

        let transform = ObjectTransform::from_pose(&pose, self.config.default_scale);
        info!(
            "Placed object at ({:.3}, {:.3}, {:.3}) yaw {:.3}",
            transform.position.x, transform.position.y, transform.position.z, transform.yaw
        );
        self.state = PlacementState::Placed;
        let placed = self.transform.insert(transform);
        Ok(&*placed)
    }

    /// Applies one gesture increment to the placed object.
    pub fn apply_gesture(&mut self, event: GestureEvent, view: &ViewBasis) -> Result<()> {
        let config = &self.config;
        let Some(transform) = self.transform.as_mut() else {
            debug!("Ignoring {:?}: nothing placed", event);
            return Err(ArError::invalid_state("apply gesture", self.state));
        };

        match event {
            GestureEvent::Pan { dx, dy } => {
                // Screen +y is down, so dragging up pushes along forward
                let delta = (view.right * dx - view.forward * dy) * config.pan_meters_per_pixel;
                transform.translate(delta.x, delta.z);
            }
            GestureEvent::Scale { ratio } => {
                if !(ratio.is_finite() && ratio > 0.0) {
                    debug!("Ignoring degenerate scale ratio {}", ratio);
                    return Ok(());
                }
                transform.scale = config.clamp_scale(transform.scale * ratio);
            }
            GestureEvent::Rotate { delta_radians } => {
                if delta_radians.is_finite() {
                    transform.rotate(delta_radians);
                }
            }
        }
        Ok(())
    }

    /// Raycast dragging: moves the object by the distance between where `from`
    /// and `to` cross the placement plane. Rays that miss the plane (pointing
    /// above the horizon) leave the object where it is.
    pub fn drag(&mut self, from: &Ray, to: &Ray) -> Result<()> {
        let Some(transform) = self.transform.as_mut() else {
            debug!("Ignoring drag: nothing placed");
            return Err(ArError::invalid_state("drag object", self.state));
        };

        let plane = transform.plane();
        if let (Some(start), Some(end)) = (plane.intersection(from), plane.intersection(to)) {
            let delta = end - start;
            transform.translate(delta.x, delta.z);
        }
        Ok(())
    }

    /// Back to searching; the transform is discarded. Safe in any state.
    pub fn reset(&mut self) {
        if self.transform.take().is_some() {
            info!("Placement reset");
        }
        self.state = PlacementState::Searching;
    }
}

impl Default for PlacementController {
    fn default() -> Self {
        Self::new(PlacementConfig::default())
    }
}
