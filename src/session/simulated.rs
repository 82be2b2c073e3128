//! A scripted stand-in for the platform tracking stack.
//!
//! The simulated world is a single infinite floor below the session origin.
//! Hit tests cast a ray from the viewer along its view direction and report
//! where it meets the floor. Requests can be delayed by a number of frames,
//! denied, or failed, and the platform can end the session on its own, which
//! is enough to exercise every path through [`SessionManager`].
//!
//! [`SessionManager`]: super::SessionManager

use std::cell::RefCell;
use std::rc::Rc;

use cgmath::{Quaternion, Rad, Rotation3, Vector3};
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::platform::{
    HitTestSource, ReferenceSpace, ReferenceSpaceKind, SessionOptions, TrackingPlatform,
    TrackingSession,
};
use crate::error::PlatformError;
use crate::math::{Plane, Pose, Ray};

/// Floor height relative to a session origin at roughly eye level.
pub const DEFAULT_FLOOR_HEIGHT: f32 = -1.4;

/// Session features the simulated stack can grant.
pub const SUPPORTED_FEATURES: &[&str] = &["hit-test", "dom-overlay"];

type PlatformResult<T> = Result<T, PlatformError>;

struct Deferred {
    frames_left: u32,
    fire: Box<dyn FnOnce()>,
}

struct Jitter {
    amplitude: f32,
    rng: StdRng,
}

struct SimState {
    supported: bool,
    latency_frames: u32,
    deferred: Vec<Deferred>,
    next_session_error: Option<PlatformError>,
    next_hit_test_error: Option<PlatformError>,
    next_release_error: Option<PlatformError>,
    floor_height: f32,
    viewer: Pose,
    surface_visible: bool,
    jitter: Option<Jitter>,
    platform_ended: bool,
    next_handle: u32,
    sessions_acquired: u32,
    sessions_released: u32,
}

impl SimState {
    fn next_handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }
}

/// Cheap to clone; clones share the same simulated world, so a test can keep
/// one handle while the session manager owns another.
#[derive(Clone)]
pub struct SimulatedPlatform {
    state: Rc<RefCell<SimState>>,
}

impl SimulatedPlatform {
    /// A supported platform whose requests resolve on the next poll, with the
    /// viewer at the origin looking forward and down at the floor.
    pub fn new() -> Self {
        let viewer = Pose::new(
            Vector3::new(0.0, 0.0, 0.0),
            Quaternion::from_angle_x(Rad(-0.6)),
        );
        Self {
            state: Rc::new(RefCell::new(SimState {
                supported: true,
                latency_frames: 0,
                deferred: Vec::new(),
                next_session_error: None,
                next_hit_test_error: None,
                next_release_error: None,
                floor_height: DEFAULT_FLOOR_HEIGHT,
                viewer,
                surface_visible: true,
                jitter: None,
                platform_ended: false,
                next_handle: 0,
                sessions_acquired: 0,
                sessions_released: 0,
            })),
        }
    }

    pub fn unsupported() -> Self {
        let platform = Self::new();
        platform.state.borrow_mut().supported = false;
        platform
    }

    /// Every request resolves this many [`advance_frame`](Self::advance_frame)
    /// calls after it was issued.
    pub fn with_latency(self, frames: u32) -> Self {
        self.state.borrow_mut().latency_frames = frames;
        self
    }

    /// Adds uniform noise of up to `amplitude` meters to hit positions.
    pub fn with_jitter(self, amplitude: f32, seed: u64) -> Self {
        self.state.borrow_mut().jitter = Some(Jitter {
            amplitude,
            rng: StdRng::seed_from_u64(seed),
        });
        self
    }

    pub fn deny_next_session(&self, error: PlatformError) {
        self.state.borrow_mut().next_session_error = Some(error);
    }

    pub fn fail_next_hit_test_source(&self, error: PlatformError) {
        self.state.borrow_mut().next_hit_test_error = Some(error);
    }

    pub fn fail_next_release(&self, error: PlatformError) {
        self.state.borrow_mut().next_release_error = Some(error);
    }

    pub fn set_viewer_pose(&self, viewer: Pose) {
        self.state.borrow_mut().viewer = viewer;
    }

    pub fn viewer_pose(&self) -> Pose {
        self.state.borrow().viewer
    }

    /// Simulates losing or regaining a trackable surface.
    pub fn set_surface_visible(&self, visible: bool) {
        self.state.borrow_mut().surface_visible = visible;
    }

    pub fn floor_height(&self) -> f32 {
        self.state.borrow().floor_height
    }

    /// The user left immersive mode through system UI.
    pub fn end_from_platform(&self) {
        self.state.borrow_mut().platform_ended = true;
    }

    /// Counts down delayed requests and resolves those that are due.
    pub fn advance_frame(&self) {
        let due: Vec<Deferred> = {
            let mut state = self.state.borrow_mut();
            for deferred in state.deferred.iter_mut() {
                deferred.frames_left = deferred.frames_left.saturating_sub(1);
            }
            let (due, waiting) = std::mem::take(&mut state.deferred)
                .into_iter()
                .partition(|d| d.frames_left == 0);
            state.deferred = waiting;
            due
        };
        for deferred in due {
            (deferred.fire)();
        }
    }

    pub fn pending_requests(&self) -> usize {
        self.state.borrow().deferred.len()
    }

    pub fn sessions_acquired(&self) -> u32 {
        self.state.borrow().sessions_acquired
    }

    pub fn sessions_released(&self) -> u32 {
        self.state.borrow().sessions_released
    }

    fn respond<T: 'static>(&self, value: PlatformResult<T>) -> LocalBoxFuture<'static, PlatformResult<T>> {
        let (sender, receiver) = oneshot::channel();
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if state.latency_frames == 0 {
            let _ = sender.send(value);
        } else {
            state.deferred.push(Deferred {
                frames_left: state.latency_frames,
                fire: Box::new(move || {
                    let _ = sender.send(value);
                }),
            });
        }
        receiver
            .map(|received| {
                received.unwrap_or_else(|_| Err(PlatformError::Failed("request dropped".to_string())))
            })
            .boxed_local()
    }

    fn cast_hit(&self) -> Option<Pose> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        if !state.surface_visible {
            return None;
        }
        let ray = Ray::new(state.viewer.position, state.viewer.forward());
        let mut point = Plane::horizontal(state.floor_height).intersection(&ray)?;
        if let Some(jitter) = state.jitter.as_mut() {
            if jitter.amplitude > 0.0 {
                point.x += jitter.rng.random_range(-jitter.amplitude..=jitter.amplitude);
                point.z += jitter.rng.random_range(-jitter.amplitude..=jitter.amplitude);
            }
        }
        Some(Pose::on_floor(point, state.viewer.yaw()))
    }
}

impl Default for SimulatedPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl TrackingPlatform for SimulatedPlatform {
    fn is_supported(&self) -> bool {
        self.state.borrow().supported
    }

    fn request_session(
        &mut self,
        options: &SessionOptions,
    ) -> LocalBoxFuture<'static, PlatformResult<Box<dyn TrackingSession>>> {
        let result = {
            let mut state = self.state.borrow_mut();
            let missing = options
                .required_features
                .iter()
                .find(|feature| !SUPPORTED_FEATURES.contains(&feature.as_str()));
            match (state.next_session_error.take(), missing) {
                (Some(error), _) => Err(error),
                (None, Some(feature)) => Err(PlatformError::Failed(format!(
                    "required feature '{}' is not available",
                    feature
                ))),
                (None, None) => {
                    state.sessions_acquired += 1;
                    state.platform_ended = false;
                    let id = state.next_handle();
                    debug!(
                        "Simulated session {} granted (features {:?})",
                        id, options.required_features
                    );
                    Ok(Box::new(SimulatedSession {
                        id,
                        platform: self.clone(),
                        hit_test: options.enables("hit-test"),
                        released: false,
                    }) as Box<dyn TrackingSession>)
                }
            }
        };
        self.respond(result)
    }
}

struct SimulatedSession {
    id: u32,
    platform: SimulatedPlatform,
    /// Whether the session was granted the hit-test feature.
    hit_test: bool,
    released: bool,
}

impl TrackingSession for SimulatedSession {
    fn request_reference_space(
        &mut self,
        kind: ReferenceSpaceKind,
    ) -> LocalBoxFuture<'static, PlatformResult<ReferenceSpace>> {
        let id = self.platform.state.borrow_mut().next_handle();
        debug!("Session {}: {} space -> {}", self.id, kind.as_str(), id);
        self.platform.respond(Ok(ReferenceSpace { kind, id }))
    }

    fn request_hit_test_source(
        &mut self,
        _space: &ReferenceSpace,
    ) -> LocalBoxFuture<'static, PlatformResult<HitTestSource>> {
        let result = {
            let mut state = self.platform.state.borrow_mut();
            match state.next_hit_test_error.take() {
                Some(error) => Err(error),
                None if !self.hit_test => Err(PlatformError::Failed(
                    "hit-test feature was not requested".to_string(),
                )),
                None => Ok(HitTestSource {
                    id: state.next_handle(),
                }),
            }
        };
        self.platform.respond(result)
    }

    fn hit_test_results(&self, _source: &HitTestSource, _space: &ReferenceSpace) -> Vec<Pose> {
        if self.is_ended() {
            return Vec::new();
        }
        self.platform.cast_hit().into_iter().collect()
    }

    fn viewer_pose(&self, _space: &ReferenceSpace) -> Option<Pose> {
        if self.is_ended() {
            return None;
        }
        Some(self.platform.viewer_pose())
    }

    fn is_ended(&self) -> bool {
        self.released || self.platform.state.borrow().platform_ended
    }

    fn end(&mut self) -> PlatformResult<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        let mut state = self.platform.state.borrow_mut();
        state.sessions_released += 1;
        match state.next_release_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
