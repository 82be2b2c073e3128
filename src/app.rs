//! # Viewer
//!
//! [`ArViewer`] owns one of every component and runs them in a fixed order
//! each frame. Hosts drive it with three kinds of calls:
//!
//! - the plain operations behind the UI controls ([`start_session`],
//!   [`end_session`], [`reset_placement`], [`capture`]),
//! - input ([`touch`], [`handle_window_event`], [`select`]),
//! - [`tick`] once per display frame.
//!
//! ```no_run
//! use arview::prelude::*;
//!
//! let platform = SimulatedPlatform::new();
//! let renderer = HeadlessRenderer::new(390, 844);
//! let mut viewer = ArViewer::new(ViewerConfig::default(), platform, renderer).unwrap();
//!
//! viewer.start_session().unwrap();
//! loop {
//!     let report = viewer.tick();
//!     if report.reticle.is_some() {
//!         viewer.select().ok();
//!         break;
//!     }
//! }
//! ```
//!
//! [`start_session`]: ArViewer::start_session
//! [`end_session`]: ArViewer::end_session
//! [`reset_placement`]: ArViewer::reset_placement
//! [`capture`]: ArViewer::capture
//! [`touch`]: ArViewer::touch
//! [`handle_window_event`]: ArViewer::handle_window_event
//! [`select`]: ArViewer::select
//! [`tick`]: ArViewer::tick

use std::path::{Path, PathBuf};

use cgmath::{Matrix4, SquareMatrix};
use log::{debug, info, warn};
use winit::event::{TouchPhase, WindowEvent};

use crate::asset::{
    reticle_geometry, AssetLoader, GeometryData, ModelHandle, ModelSlot, ModelStatus, ObjLoader,
};
use crate::capture::{CaptureService, CapturedImage};
use crate::config::{PanMode, ViewerConfig};
use crate::error::{ArError, Result};
use crate::input::{GestureEvent, GestureRecognizer, Tap, TouchTracker};
use crate::math::{screen_to_ray, Pose};
use crate::placement::{ObjectTransform, PlacementController, PlacementState, ViewBasis};
use crate::render::{preview_view, projection_matrix, reticle_matrix, SceneRenderer, SceneView};
use crate::session::{SessionEvent, SessionManager, SessionState, TrackingPlatform};
use crate::tracking::HitTestTracker;

/// What happened during one [`ArViewer::tick`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub frame: u64,
    pub session: SessionState,
    pub events: Vec<SessionEvent>,
    pub placement: PlacementState,
    /// Where the reticle is drawn this frame, if anywhere.
    pub reticle: Option<Pose>,
    pub gestures_applied: usize,
    pub model: ModelStatus,
    /// Set on the frame a model load settles.
    pub asset: Option<Result<()>>,
}

pub struct ArViewer<P: TrackingPlatform, R: SceneRenderer> {
    config: ViewerConfig,
    session: SessionManager<P>,
    tracker: HitTestTracker,
    placement: PlacementController,
    touches: TouchTracker,
    gestures: GestureRecognizer,
    model: ModelSlot,
    reticle_mesh: GeometryData,
    capture: CaptureService,
    renderer: R,
    viewer_pose: Option<Pose>,
    frame: u64,
}

impl<P: TrackingPlatform, R: SceneRenderer> ArViewer<P, R> {
    pub fn new(config: ViewerConfig, platform: P, renderer: R) -> Result<Self> {
        config.validate()?;
        let session = SessionManager::new(platform, config.session.clone());
        if !session.is_supported() {
            info!("AR unsupported on this platform, static preview only");
        }
        Ok(Self {
            session,
            tracker: HitTestTracker::new(&config.tracking),
            placement: PlacementController::new(config.placement),
            touches: TouchTracker::new(config.gesture.tap_slop),
            gestures: GestureRecognizer::new(&config.gesture),
            model: ModelSlot::new(ModelHandle::placeholder(config.asset.placeholder_size)),
            reticle_mesh: reticle_geometry(),
            capture: CaptureService::new(),
            renderer,
            viewer_pose: None,
            frame: 0,
            config,
        })
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    pub fn session(&self) -> &SessionManager<P> {
        &self.session
    }

    pub fn placement_state(&self) -> PlacementState {
        self.placement.state()
    }

    pub fn object_transform(&self) -> Option<&ObjectTransform> {
        self.placement.transform()
    }

    /// The reticle pose from the latest tick.
    pub fn reticle(&self) -> Option<Pose> {
        self.tracker.candidate()
    }

    pub fn model(&self) -> &ModelHandle {
        self.model.current()
    }

    pub fn model_status(&self) -> ModelStatus {
        self.model.status()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn last_capture(&self) -> Option<&CapturedImage> {
        self.capture.last_capture()
    }

    /// Start button. Setup completes over the following ticks.
    pub fn start_session(&mut self) -> Result<()> {
        self.session.start()
    }

    /// End button. Tears down immediately, even mid-setup.
    pub fn end_session(&mut self) -> Result<SessionEvent> {
        let event = self.session.end()?;
        self.route(&event);
        Ok(event)
    }

    /// Tap-to-place against the reticle shown in the latest tick.
    pub fn select(&mut self) -> Result<ObjectTransform> {
        if !self.session.is_active() {
            debug!("Ignoring select: session is {:?}", self.session.state());
            return Err(ArError::invalid_state("select", self.session.state()));
        }
        let placed = *self.placement.confirm(self.tracker.candidate())?;
        // The reticle hides as soon as the object is down.
        self.tracker.update(PlacementState::Placed, &[]);
        Ok(placed)
    }

    /// Feeds one raw touch sample. A completed tap triggers [`select`](Self::select).
    pub fn touch(&mut self, id: u64, phase: TouchPhase, x: f32, y: f32) {
        if let Some(tap) = self.touches.apply(id, phase, x, y) {
            self.on_tap(tap);
        }
    }

    /// Window adapter: touches, mouse fallback, resizes.
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        if let WindowEvent::Resized(size) = event {
            self.resize(size.width, size.height);
            return;
        }
        if let Some(tap) = self.touches.handle_window_event(event) {
            self.on_tap(tap);
        }
    }

    fn on_tap(&mut self, tap: Tap) {
        debug!("Tap at ({:.0}, {:.0})", tap.x, tap.y);
        if let Err(error) = self.select() {
            debug!("Tap ignored: {}", error);
        }
    }

    /// Reset button.
    pub fn reset_placement(&mut self) {
        self.placement.reset();
        self.gestures.reset();
    }

    /// Capture button.
    pub fn capture(&mut self) -> Result<&CapturedImage> {
        let image = self
            .capture
            .capture(self.session.state(), &mut self.renderer)?;
        Ok(image)
    }

    /// Captures and writes the PNG into `dir` under the configured file name.
    pub fn save_capture(&mut self, dir: &Path) -> Result<PathBuf> {
        let file_name = self.config.capture.file_name.clone();
        let image = self.capture()?;
        Ok(image.save_to_dir(dir, &file_name)?)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            debug!("Ignoring resize to {}x{}", width, height);
            return;
        }
        self.config.viewport.width = width;
        self.config.viewport.height = height;
        self.renderer.resize(width, height);
    }

    /// An OBJ loader applying the configured model scale.
    pub fn obj_loader(&self) -> ObjLoader {
        ObjLoader::from(&self.config.asset)
    }

    /// Starts loading the configured model. The placeholder stays visible
    /// until it arrives.
    pub fn load_model(&mut self, loader: &dyn AssetLoader) {
        let path = PathBuf::from(&self.config.asset.model_path);
        self.load_model_from(loader, &path);
    }

    pub fn load_model_from(&mut self, loader: &dyn AssetLoader, path: &Path) {
        info!("Loading model {}", path.display());
        self.model.request(loader, path);
    }

    /// Loads the configured model before returning.
    pub fn load_model_blocking(&mut self, loader: &dyn AssetLoader) -> Result<()> {
        self.load_model(loader);
        self.model.wait().unwrap_or(Ok(()))
    }

    /// Runs one frame.
    pub fn tick(&mut self) -> FrameReport {
        self.frame += 1;

        let events = self.session.poll();
        for event in &events {
            self.route(event);
        }

        let asset = self.model.poll();

        self.viewer_pose = self.session.viewer_pose();
        let hits = self.session.hit_test_results();
        let reticle = self.tracker.update(self.placement.state(), &hits);

        let gestures = self.gestures.process(self.touches.points());
        let gestures_applied = if self.session.is_active() {
            gestures
                .into_iter()
                .filter(|event| self.apply_gesture(*event))
                .count()
        } else {
            0
        };

        self.render(reticle);

        FrameReport {
            frame: self.frame,
            session: self.session.state(),
            events,
            placement: self.placement.state(),
            reticle,
            gestures_applied,
            model: self.model.status(),
            asset,
        }
    }

    fn route(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::Started => {
                self.tracker.activate();
                self.gestures.reset();
            }
            SessionEvent::Ended(reason) => {
                info!("Session ended ({:?}), clearing placement", reason);
                self.placement.reset();
                self.tracker.deactivate();
                self.gestures.reset();
                self.viewer_pose = None;
            }
            SessionEvent::Unavailable(error) => {
                warn!("Session unavailable: {}", error);
                self.tracker.deactivate();
            }
        }
    }

    fn apply_gesture(&mut self, event: GestureEvent) -> bool {
        if !self.placement.is_placed() {
            return false;
        }
        let viewer = self.viewer_pose.unwrap_or_default();

        // Screen angles grow clockwise; yaw grows counter-clockwise seen from above
        let event = match event {
            GestureEvent::Rotate { delta_radians } => GestureEvent::Rotate {
                delta_radians: -delta_radians,
            },
            other => other,
        };

        if let (GestureEvent::Pan { dx, dy }, PanMode::SurfaceRaycast) =
            (event, self.config.placement.pan_mode)
        {
            if let Some(&point) = self.touches.points().first() {
                let view = viewer.inverse_matrix();
                let projection = projection_matrix(&self.config.viewport);
                let size = self.config.viewport.size();
                let from = screen_to_ray((point.x - dx, point.y - dy), size, &view, &projection);
                let to = screen_to_ray((point.x, point.y), size, &view, &projection);
                if let (Some(from), Some(to)) = (from, to) {
                    return self.placement.drag(&from, &to).is_ok();
                }
            }
        }

        self.placement
            .apply_gesture(event, &ViewBasis::from_viewer(&viewer))
            .is_ok()
    }

    fn render(&mut self, reticle: Option<Pose>) {
        let model = self.model.current();
        let projection = projection_matrix(&self.config.viewport);

        let scene = match self.session.state() {
            SessionState::Active => SceneView {
                view: self
                    .viewer_pose
                    .map(|pose| pose.inverse_matrix())
                    .unwrap_or_else(Matrix4::identity),
                projection,
                reticle: reticle.as_ref().map(reticle_matrix),
                reticle_mesh: &self.reticle_mesh,
                model,
                model_matrix: self
                    .placement
                    .transform()
                    .map(|transform| transform.to_matrix(model.base_scale)),
            },
            // No camera feed: show the model on its own
            _ => SceneView {
                view: preview_view(),
                projection,
                reticle: None,
                reticle_mesh: &self.reticle_mesh,
                model,
                model_matrix: Some(Matrix4::from_scale(model.base_scale)),
            },
        };

        self.renderer.render_frame(&scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{generate_cube, ObjLoader};
    use crate::error::{CaptureError, PlatformError};
    use crate::render::HeadlessRenderer;
    use crate::session::{EndReason, SimulatedPlatform};
    use cgmath::Vector3;
    use futures::future::LocalBoxFuture;
    use futures::FutureExt;

    type TestViewer = ArViewer<SimulatedPlatform, HeadlessRenderer>;

    fn viewer_with(config: ViewerConfig, platform: &SimulatedPlatform) -> TestViewer {
        ArViewer::new(config, platform.clone(), HeadlessRenderer::new(60, 120)).unwrap()
    }

    fn viewer(platform: &SimulatedPlatform) -> TestViewer {
        let mut config = ViewerConfig::default();
        config.viewport.width = 60;
        config.viewport.height = 120;
        viewer_with(config, platform)
    }

    fn active_viewer(platform: &SimulatedPlatform) -> TestViewer {
        let mut viewer = viewer(platform);
        viewer.start_session().unwrap();
        let report = viewer.tick();
        assert_eq!(report.events, vec![SessionEvent::Started]);
        viewer
    }

    fn placed_viewer(platform: &SimulatedPlatform) -> TestViewer {
        let mut viewer = active_viewer(platform);
        viewer.tick();
        viewer.select().unwrap();
        viewer
    }

    #[test]
    fn test_placement_after_surface_appears() {
        let platform = SimulatedPlatform::new();
        let mut viewer = active_viewer(&platform);

        platform.set_surface_visible(false);
        for _ in 0..5 {
            let report = viewer.tick();
            assert!(report.reticle.is_none());
            assert!(viewer.select().is_err());
            assert_eq!(viewer.placement_state(), PlacementState::Searching);
        }

        platform.set_surface_visible(true);
        let report = viewer.tick();
        let frame_six = report.reticle.unwrap();
        let placed = viewer.select().unwrap();

        assert_eq!(viewer.placement_state(), PlacementState::Placed);
        assert_eq!(placed.position, frame_six.position);
        assert_eq!(placed.scale, 1.0);
        assert!(viewer.reticle().is_none());
    }

    #[test]
    fn test_second_tap_does_not_replace() {
        let platform = SimulatedPlatform::new();
        let mut viewer = placed_viewer(&platform);
        let first = *viewer.object_transform().unwrap();

        platform.set_viewer_pose(Pose::new(
            Vector3::new(1.0, 0.0, 0.0),
            viewer.session().viewer_pose().unwrap().orientation,
        ));
        viewer.tick();
        assert!(viewer.select().is_err());
        assert_eq!(*viewer.object_transform().unwrap(), first);
    }

    #[test]
    fn test_reticle_hidden_while_placed() {
        let platform = SimulatedPlatform::new();
        let mut viewer = placed_viewer(&platform);
        for _ in 0..3 {
            assert!(viewer.tick().reticle.is_none());
        }
        viewer.reset_placement();
        assert!(viewer.tick().reticle.is_some());
    }

    #[test]
    fn test_pinch_scale_clamps_to_max() {
        let platform = SimulatedPlatform::new();
        let mut viewer = placed_viewer(&platform);

        viewer.touch(1, TouchPhase::Started, 20.0, 60.0);
        viewer.touch(2, TouchPhase::Started, 30.0, 60.0);
        viewer.tick();
        viewer.touch(2, TouchPhase::Moved, 120.0, 60.0);
        let report = viewer.tick();

        assert!(report.gestures_applied >= 1);
        assert_eq!(viewer.object_transform().unwrap().scale, 5.0);
    }

    #[test]
    fn test_clockwise_twist_turns_object_clockwise_from_above() {
        let platform = SimulatedPlatform::new();
        let mut viewer = placed_viewer(&platform);
        let before = viewer.object_transform().unwrap().yaw;

        viewer.touch(1, TouchPhase::Started, 100.0, 100.0);
        viewer.touch(2, TouchPhase::Started, 200.0, 100.0);
        viewer.tick();
        viewer.touch(1, TouchPhase::Moved, 100.0, 95.0);
        viewer.touch(2, TouchPhase::Moved, 200.0, 105.0);
        viewer.tick();

        let twist = 10.0_f32.atan2(100.0);
        let after = viewer.object_transform().unwrap().yaw;
        let expected = crate::math::normalize_angle(before - twist);
        assert!((after - expected).abs() < 1e-4, "yaw {} expected {}", after, expected);
    }

    #[test]
    fn test_pan_keeps_object_on_plane() {
        let platform = SimulatedPlatform::new();
        let mut viewer = placed_viewer(&platform);
        let before = *viewer.object_transform().unwrap();

        viewer.touch(7, TouchPhase::Started, 30.0, 60.0);
        viewer.tick();
        viewer.touch(7, TouchPhase::Moved, 50.0, 40.0);
        viewer.tick();

        let after = viewer.object_transform().unwrap();
        assert_eq!(after.position.y, before.position.y);
        assert!(after.position.x > before.position.x);
        assert!(after.position.z < before.position.z);
    }

    #[test]
    fn test_raycast_pan_tracks_finger_on_plane() {
        let platform = SimulatedPlatform::new();
        let mut config = ViewerConfig::default();
        config.viewport.width = 60;
        config.viewport.height = 120;
        config.placement = config.placement.with_pan_mode(PanMode::SurfaceRaycast);
        let mut viewer = viewer_with(config, &platform);
        viewer.start_session().unwrap();
        viewer.tick();
        viewer.tick();
        viewer.select().unwrap();
        let before = *viewer.object_transform().unwrap();

        viewer.touch(1, TouchPhase::Started, 30.0, 60.0);
        viewer.tick();
        viewer.touch(1, TouchPhase::Moved, 40.0, 60.0);
        viewer.tick();

        let after = viewer.object_transform().unwrap();
        assert_eq!(after.position.y, before.position.y);
        assert!(after.position.x > before.position.x);
    }

    #[test]
    fn test_gestures_ignored_until_active() {
        let platform = SimulatedPlatform::new().with_latency(3);
        let mut viewer = viewer(&platform);
        viewer.start_session().unwrap();

        viewer.touch(1, TouchPhase::Started, 10.0, 10.0);
        viewer.tick();
        viewer.touch(1, TouchPhase::Moved, 40.0, 10.0);
        let report = viewer.tick();
        assert_eq!(report.session, SessionState::Requesting);
        assert_eq!(report.gestures_applied, 0);
        assert!(report.reticle.is_none());
    }

    #[test]
    fn test_tap_places_object() {
        let platform = SimulatedPlatform::new();
        let mut viewer = active_viewer(&platform);
        viewer.tick();

        viewer.touch(3, TouchPhase::Started, 30.0, 60.0);
        viewer.touch(3, TouchPhase::Ended, 31.0, 61.0);
        assert_eq!(viewer.placement_state(), PlacementState::Placed);
    }

    #[test]
    fn test_end_resets_everything() {
        let platform = SimulatedPlatform::new();
        let mut viewer = placed_viewer(&platform);

        let event = viewer.end_session().unwrap();
        assert_eq!(event, SessionEvent::Ended(EndReason::User));
        assert_eq!(viewer.session_state(), SessionState::Idle);
        assert_eq!(viewer.placement_state(), PlacementState::Searching);
        assert!(viewer.object_transform().is_none());
        assert!(viewer.tick().reticle.is_none());
        assert_eq!(platform.sessions_released(), 1);
    }

    #[test]
    fn test_platform_end_routes_reset() {
        let platform = SimulatedPlatform::new();
        let mut viewer = placed_viewer(&platform);

        platform.end_from_platform();
        let report = viewer.tick();
        assert_eq!(report.events, vec![SessionEvent::Ended(EndReason::Platform)]);
        assert_eq!(report.placement, PlacementState::Searching);
        assert_eq!(report.session, SessionState::Idle);
    }

    #[test]
    fn test_end_during_setup_then_restart() {
        let platform = SimulatedPlatform::new().with_latency(2);
        let mut viewer = viewer(&platform);
        viewer.start_session().unwrap();
        platform.advance_frame();
        viewer.tick();

        let event = viewer.end_session().unwrap();
        assert_eq!(event, SessionEvent::Ended(EndReason::Cancelled));
        assert_eq!(viewer.session_state(), SessionState::Idle);

        for _ in 0..4 {
            platform.advance_frame();
            let report = viewer.tick();
            assert!(report.events.is_empty());
            assert_eq!(report.session, SessionState::Idle);
        }
        assert_eq!(platform.sessions_released(), platform.sessions_acquired());

        viewer.start_session().unwrap();
        let mut started = false;
        for _ in 0..8 {
            platform.advance_frame();
            started |= viewer.tick().events.contains(&SessionEvent::Started);
        }
        assert!(started);
        assert_eq!(viewer.session_state(), SessionState::Active);
    }

    #[test]
    fn test_unsupported_platform_keeps_preview() {
        let platform = SimulatedPlatform::unsupported();
        let mut viewer = viewer(&platform);

        let err = viewer.start_session().unwrap_err();
        assert_eq!(err, ArError::SessionUnavailable(PlatformError::Unsupported));
        assert!(err.is_recoverable());

        let report = viewer.tick();
        assert_eq!(report.session, SessionState::Idle);
        assert_eq!(viewer.renderer().frames_rendered(), 1);
        assert!(matches!(
            viewer.capture(),
            Err(ArError::Capture(CaptureError::NoActiveSession))
        ));
    }

    #[test]
    fn test_denied_session_reports_unavailable() {
        let platform = SimulatedPlatform::new();
        platform.deny_next_session(PlatformError::PermissionDenied);
        let mut viewer = viewer(&platform);
        viewer.start_session().unwrap();

        let report = viewer.tick();
        assert_eq!(
            report.events,
            vec![SessionEvent::Unavailable(ArError::SessionUnavailable(
                PlatformError::PermissionDenied
            ))]
        );
        assert_eq!(report.session, SessionState::Idle);
        assert!(viewer.start_session().is_ok());
    }

    #[test]
    fn test_capture_while_active() {
        let platform = SimulatedPlatform::new();
        let mut viewer = placed_viewer(&platform);
        viewer.tick();

        let image = viewer.capture().unwrap();
        assert_eq!((image.width, image.height), (60, 120));

        let dir = tempfile::tempdir().unwrap();
        let path = viewer.save_capture(dir.path()).unwrap();
        assert!(path.ends_with("ar-capture.png"));
        assert_eq!(viewer.last_capture().unwrap().sequence, 2);

        viewer
            .renderer_mut()
            .fail_next_read(CaptureError::FrameUnavailable("lost".to_string()));
        assert!(viewer.capture().is_err());
        assert_eq!(viewer.last_capture().unwrap().sequence, 2);
    }

    #[test]
    fn test_resize_updates_viewport_and_renderer() {
        let platform = SimulatedPlatform::new();
        let mut viewer = active_viewer(&platform);
        viewer.resize(80, 40);
        viewer.resize(0, 40);
        assert_eq!(viewer.config().viewport.size(), (80.0, 40.0));
        assert_eq!(viewer.renderer().size(), (80, 40));
    }

    /// Resolves after a set number of polls.
    struct SlowLoader {
        polls: usize,
    }

    impl AssetLoader for SlowLoader {
        fn load(&self, _path: &Path) -> LocalBoxFuture<'static, Result<ModelHandle>> {
            let mut remaining = self.polls;
            futures::future::poll_fn(move |_| {
                if remaining == 0 {
                    std::task::Poll::Ready(Ok(ModelHandle::new("phone", vec![generate_cube(1.0)], 0.5)))
                } else {
                    remaining -= 1;
                    std::task::Poll::Pending
                }
            })
            .boxed_local()
        }
    }

    #[test]
    fn test_model_swap_keeps_placement() {
        let platform = SimulatedPlatform::new();
        let mut viewer = placed_viewer(&platform);
        let placed = *viewer.object_transform().unwrap();

        viewer.load_model(&SlowLoader { polls: 2 });
        assert_eq!(viewer.tick().model, ModelStatus::Loading);
        assert_eq!(viewer.tick().model, ModelStatus::Loading);
        let report = viewer.tick();
        assert_eq!(report.asset, Some(Ok(())));
        assert_eq!(report.model, ModelStatus::Ready);

        assert_eq!(viewer.model().name, "phone");
        assert_eq!(*viewer.object_transform().unwrap(), placed);
        assert_eq!(viewer.placement_state(), PlacementState::Placed);
    }

    #[test]
    fn test_obj_model_uses_configured_scale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tri.obj");
        std::fs::write(&path, "o tri\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();

        let platform = SimulatedPlatform::new();
        let mut config = ViewerConfig::default();
        config.asset.model_path = path.display().to_string();
        config.asset.model_scale = 0.25;
        let mut viewer = viewer_with(config, &platform);

        let loader = viewer.obj_loader();
        viewer.load_model_blocking(&loader).unwrap();
        assert_eq!(viewer.model_status(), ModelStatus::Ready);
        assert_eq!(viewer.model().base_scale, 0.25);
    }

    #[test]
    fn test_missing_model_keeps_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let platform = SimulatedPlatform::new();
        let mut config = ViewerConfig::default();
        config.asset.model_path = dir.path().join("absent.obj").display().to_string();
        let mut viewer = viewer_with(config, &platform);

        let loader = viewer.obj_loader();
        let err = viewer.load_model_blocking(&loader).unwrap_err();
        assert!(matches!(err, ArError::AssetLoadFailed { .. }));
        assert_eq!(viewer.model_status(), ModelStatus::Failed);
        assert_eq!(viewer.model().name, "placeholder");

        viewer.start_session().unwrap();
        viewer.tick();
        viewer.tick();
        assert!(viewer.select().is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ViewerConfig::default();
        config.placement = config.placement.with_scale_bounds(2.0, 1.0);
        let result = ArViewer::new(config, SimulatedPlatform::new(), HeadlessRenderer::new(1, 1));
        assert!(matches!(result, Err(ArError::Config(_))));
    }
}
