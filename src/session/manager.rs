use std::future::Future;
use std::task::{Context, Poll};

use futures::future::LocalBoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use log::{debug, info, warn};

use super::platform::{
    HitTestSource, ReferenceSpace, ReferenceSpaceKind, SessionOptions, TrackingPlatform,
    TrackingSession,
};
use crate::error::{ArError, PlatformError, Result};
use crate::math::Pose;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Requesting,
    Active,
    /// Transient: observed only while teardown is running.
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The user pressed End.
    User,
    /// The platform ended the session on its own.
    Platform,
    /// End was requested before setup finished.
    Cancelled,
}

/// Published by the manager; the rest of the viewer reacts to these instead
/// of touching the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started,
    Ended(EndReason),
    /// Setup failed; the manager is back in `Idle` and `start` may be retried.
    Unavailable(ArError),
}

enum SetupStep {
    Session(std::result::Result<Box<dyn TrackingSession>, PlatformError>),
    ViewerSpace(std::result::Result<ReferenceSpace, PlatformError>),
    HitTestSource(std::result::Result<HitTestSource, PlatformError>),
    LocalSpace(std::result::Result<ReferenceSpace, PlatformError>),
}

/// A resolved setup step, tagged with the start attempt that issued it.
struct Completion {
    attempt: u64,
    step: SetupStep,
}

struct SessionResources {
    session: Box<dyn TrackingSession>,
    viewer_space: Option<ReferenceSpace>,
    hit_test_source: Option<HitTestSource>,
    local_space: Option<ReferenceSpace>,
}

impl SessionResources {
    fn new(session: Box<dyn TrackingSession>) -> Self {
        Self {
            session,
            viewer_space: None,
            hit_test_source: None,
            local_space: None,
        }
    }
}

type SetupFuture = LocalBoxFuture<'static, Completion>;

/// Sole owner of the platform session.
///
/// Setup requests are kept in flight across frames and drained by
/// [`poll`](Self::poll). Each carries the attempt number that issued it; a
/// result for an attempt that has since been ended or replaced is discarded,
/// and a session delivered that late is released on the spot.
///
/// Ending an attempt drops its pending setup step unless that step is the
/// session request itself. Those are kept in `abandoned` until they land, as
/// a session granted after cancellation still has to be released.
pub struct SessionManager<P: TrackingPlatform> {
    platform: P,
    options: SessionOptions,
    state: SessionState,
    attempt: u64,
    resources: Option<SessionResources>,
    in_flight: FuturesUnordered<SetupFuture>,
    abandoned: FuturesUnordered<SetupFuture>,
}

impl<P: TrackingPlatform> SessionManager<P> {
    pub fn new(platform: P, options: SessionOptions) -> Self {
        Self {
            platform,
            options,
            state: SessionState::Idle,
            attempt: 0,
            resources: None,
            in_flight: FuturesUnordered::new(),
            abandoned: FuturesUnordered::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn is_supported(&self) -> bool {
        self.platform.is_supported()
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Setup requests not yet resolved, including session requests from
    /// cancelled attempts.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len() + self.abandoned.len()
    }

    /// Begins acquiring a session. Valid only from `Idle`.
    ///
    /// Fails immediately with `SessionUnavailable(Unsupported)` when the
    /// platform has no AR support; the manager stays `Idle`.
    pub fn start(&mut self) -> Result<()> {
        if self.state != SessionState::Idle {
            debug!("Ignoring start: session is {:?}", self.state);
            return Err(ArError::invalid_state("start session", self.state));
        }
        if !self.platform.is_supported() {
            warn!("AR is not supported on this platform");
            return Err(PlatformError::Unsupported.into());
        }

        self.attempt += 1;
        self.state = SessionState::Requesting;
        info!(
            "Requesting AR session (attempt {}) with features {:?}",
            self.attempt, self.options.required_features
        );
        let request = self.platform.request_session(&self.options);
        self.issue(request, SetupStep::Session);
        Ok(())
    }

    /// Ends the session. From `Active` this is a normal end; from
    /// `Requesting` it cancels setup. Either way the manager is `Idle` when
    /// this returns, even if releasing the platform session fails.
    pub fn end(&mut self) -> Result<SessionEvent> {
        let reason = match self.state {
            SessionState::Active => EndReason::User,
            SessionState::Requesting => EndReason::Cancelled,
            state => {
                debug!("Ignoring end: session is {:?}", state);
                return Err(ArError::invalid_state("end session", state));
            }
        };
        Ok(self.shutdown(reason))
    }

    /// Drains resolved setup steps and checks for a platform-initiated end.
    /// Call once per frame before anything reads session state.
    pub fn poll(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        let mut cx = Context::from_waker(futures::task::noop_waker_ref());

        while let Poll::Ready(Some(completion)) = self.abandoned.poll_next_unpin(&mut cx) {
            self.resolve(completion);
        }
        while let Poll::Ready(Some(completion)) = self.in_flight.poll_next_unpin(&mut cx) {
            if let Some(event) = self.resolve(completion) {
                events.push(event);
            }
        }

        let ended_by_platform = self
            .resources
            .as_ref()
            .is_some_and(|resources| resources.session.is_ended());
        if self.state == SessionState::Active && ended_by_platform {
            info!("Platform ended the AR session");
            events.push(self.shutdown(EndReason::Platform));
        }

        events
    }

    /// This frame's surface hits, nearest first. Empty unless `Active`.
    pub fn hit_test_results(&self) -> Vec<Pose> {
        if self.state != SessionState::Active {
            return Vec::new();
        }
        match &self.resources {
            Some(SessionResources {
                session,
                hit_test_source: Some(source),
                local_space: Some(space),
                ..
            }) => session.hit_test_results(source, space),
            _ => Vec::new(),
        }
    }

    /// The device pose in the `local` space, if `Active` and tracked.
    pub fn viewer_pose(&self) -> Option<Pose> {
        if self.state != SessionState::Active {
            return None;
        }
        let resources = self.resources.as_ref()?;
        resources.session.viewer_pose(resources.local_space.as_ref()?)
    }

    fn issue<F, T>(&mut self, request: F, step: fn(std::result::Result<T, PlatformError>) -> SetupStep)
    where
        F: Future<Output = std::result::Result<T, PlatformError>> + 'static,
        T: 'static,
    {
        let attempt = self.attempt;
        self.in_flight.push(
            request
                .map(move |result| Completion {
                    attempt,
                    step: step(result),
                })
                .boxed_local(),
        );
    }

    fn resolve(&mut self, completion: Completion) -> Option<SessionEvent> {
        let Completion { attempt, step } = completion;

        if attempt != self.attempt || self.state != SessionState::Requesting {
            warn!(
                "Discarding setup result from attempt {} (current attempt {}, state {:?})",
                attempt, self.attempt, self.state
            );
            if let SetupStep::Session(Ok(mut late_session)) = step {
                if let Err(error) = late_session.end() {
                    warn!("Failed to release late session: {}", error);
                }
            }
            return None;
        }

        let failure = match step {
            SetupStep::Session(Ok(mut session)) => {
                debug!("Session acquired, requesting viewer space");
                let request = session.request_reference_space(ReferenceSpaceKind::Viewer);
                self.resources = Some(SessionResources::new(session));
                self.issue(request, SetupStep::ViewerSpace);
                None
            }
            SetupStep::ViewerSpace(Ok(space)) => match self.resources.as_mut() {
                Some(resources) => {
                    debug!("Viewer space ready, requesting hit-test source");
                    resources.viewer_space = Some(space);
                    let request = resources.session.request_hit_test_source(&space);
                    self.issue(request, SetupStep::HitTestSource);
                    None
                }
                None => Some(missing_session()),
            },
            SetupStep::HitTestSource(Ok(source)) => match self.resources.as_mut() {
                Some(resources) => {
                    debug!("Hit-test source ready, requesting local space");
                    resources.hit_test_source = Some(source);
                    let request = resources
                        .session
                        .request_reference_space(ReferenceSpaceKind::Local);
                    self.issue(request, SetupStep::LocalSpace);
                    None
                }
                None => Some(missing_session()),
            },
            SetupStep::LocalSpace(Ok(space)) => match self.resources.as_mut() {
                Some(resources) => {
                    resources.local_space = Some(space);
                    self.state = SessionState::Active;
                    info!("AR session active (attempt {})", self.attempt);
                    return Some(SessionEvent::Started);
                }
                None => Some(missing_session()),
            },
            SetupStep::Session(Err(error))
            | SetupStep::ViewerSpace(Err(error))
            | SetupStep::HitTestSource(Err(error))
            | SetupStep::LocalSpace(Err(error)) => Some(error),
        };

        failure.map(|error| {
            warn!("AR session setup failed: {}", error);
            self.attempt += 1;
            self.release();
            self.state = SessionState::Idle;
            SessionEvent::Unavailable(error.into())
        })
    }

    fn shutdown(&mut self, reason: EndReason) -> SessionEvent {
        let awaiting_grant = self.state == SessionState::Requesting && self.resources.is_none();
        self.state = SessionState::Ended;
        self.attempt += 1;

        let pending = std::mem::take(&mut self.in_flight);
        if awaiting_grant {
            self.abandoned.extend(pending);
        } else if !pending.is_empty() {
            debug!("Dropping {} setup request(s) of the ended attempt", pending.len());
        }

        self.release();
        self.state = SessionState::Idle;
        info!(
            "AR session ended ({:?}); {} session request(s) still outstanding",
            reason,
            self.abandoned.len()
        );
        SessionEvent::Ended(reason)
    }

    fn release(&mut self) {
        if let Some(mut resources) = self.resources.take() {
            if let Err(error) = resources.session.end() {
                warn!("Session teardown failed, continuing: {}", error);
            }
        }
    }
}

fn missing_session() -> PlatformError {
    PlatformError::Failed("setup step resolved without a session".to_string())
}
