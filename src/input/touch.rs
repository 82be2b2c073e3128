use log::debug;
use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};

/// Pointer id used when the left mouse button stands in for a finger.
pub const MOUSE_POINTER_ID: u64 = u64::MAX;

/// A finger currently touching the screen, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: u64,
    pub x: f32,
    pub y: f32,
}

impl TouchPoint {
    pub fn new(id: u64, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }
}

/// A short single-finger touch, delivered as the "select" signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tap {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy)]
struct TouchStart {
    id: u64,
    x: f32,
    y: f32,
    /// Moved beyond the slop or shared the screen with another finger.
    disqualified: bool,
}

/// Active touch bookkeeping. Fingers are kept in the order they went down, so
/// the first two entries are always the same pair for as long as both stay.
pub struct TouchTracker {
    points: Vec<TouchPoint>,
    starts: Vec<TouchStart>,
    tap_slop: f32,
    cursor: (f32, f32),
    mouse_down: bool,
}

impl TouchTracker {
    pub fn new(tap_slop: f32) -> Self {
        Self {
            points: Vec::new(),
            starts: Vec::new(),
            tap_slop,
            cursor: (0.0, 0.0),
            mouse_down: false,
        }
    }

    pub fn points(&self) -> &[TouchPoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Applies one pointer sample. Returns a [`Tap`] when a finger lifts
    /// without having travelled further than the slop and without a second
    /// finger joining it.
    pub fn apply(&mut self, id: u64, phase: TouchPhase, x: f32, y: f32) -> Option<Tap> {
        match phase {
            TouchPhase::Started => {
                self.points.retain(|p| p.id != id);
                self.starts.retain(|s| s.id != id);
                self.points.push(TouchPoint::new(id, x, y));
                let multi = self.points.len() > 1;
                for start in self.starts.iter_mut() {
                    start.disqualified |= multi;
                }
                self.starts.push(TouchStart {
                    id,
                    x,
                    y,
                    disqualified: multi,
                });
                None
            }
            TouchPhase::Moved => {
                if let Some(point) = self.points.iter_mut().find(|p| p.id == id) {
                    point.x = x;
                    point.y = y;
                }
                let slop = self.tap_slop;
                if let Some(start) = self.starts.iter_mut().find(|s| s.id == id) {
                    if (x - start.x).hypot(y - start.y) > slop {
                        start.disqualified = true;
                    }
                }
                None
            }
            TouchPhase::Ended | TouchPhase::Cancelled => {
                self.points.retain(|p| p.id != id);
                let index = self.starts.iter().position(|s| s.id == id)?;
                let start = self.starts.remove(index);
                let travelled = (x - start.x).hypot(y - start.y);
                if phase == TouchPhase::Ended && !start.disqualified && travelled <= self.tap_slop
                {
                    debug!("Tap at ({:.0}, {:.0})", x, y);
                    Some(Tap { x, y })
                } else {
                    None
                }
            }
        }
    }

    /// Feeds a winit window event. Touch events map one to one; the left mouse
    /// button drives a synthetic finger with id [`MOUSE_POINTER_ID`].
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> Option<Tap> {
        match event {
            WindowEvent::Touch(touch) => self.apply(
                touch.id,
                touch.phase,
                touch.location.x as f32,
                touch.location.y as f32,
            ),
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x as f32, position.y as f32);
                if self.mouse_down {
                    let (x, y) = self.cursor;
                    self.apply(MOUSE_POINTER_ID, TouchPhase::Moved, x, y)
                } else {
                    None
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let (x, y) = self.cursor;
                match (*state, self.mouse_down) {
                    (ElementState::Pressed, false) => {
                        self.mouse_down = true;
                        self.apply(MOUSE_POINTER_ID, TouchPhase::Started, x, y)
                    }
                    (ElementState::Released, true) => {
                        self.mouse_down = false;
                        self.apply(MOUSE_POINTER_ID, TouchPhase::Ended, x, y)
                    }
                    _ => None,
                }
            }
            WindowEvent::Focused(false) => {
                self.clear();
                None
            }
            _ => None,
        }
    }

    /// Drops every active touch, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.points.clear();
        self.starts.clear();
        self.mouse_down = false;
    }
}

impl Default for TouchTracker {
    fn default() -> Self {
        Self::new(12.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_keep_insertion_order() {
        let mut tracker = TouchTracker::default();
        tracker.apply(7, TouchPhase::Started, 10.0, 10.0);
        tracker.apply(3, TouchPhase::Started, 50.0, 50.0);
        tracker.apply(7, TouchPhase::Moved, 12.0, 11.0);

        let ids: Vec<u64> = tracker.points().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![7, 3]);
        assert_eq!(tracker.points()[0], TouchPoint::new(7, 12.0, 11.0));
    }

    #[test]
    fn test_short_touch_is_tap() {
        let mut tracker = TouchTracker::new(12.0);
        assert!(tracker.apply(1, TouchPhase::Started, 100.0, 100.0).is_none());
        tracker.apply(1, TouchPhase::Moved, 104.0, 103.0);
        let tap = tracker.apply(1, TouchPhase::Ended, 104.0, 103.0);
        assert_eq!(tap, Some(Tap { x: 104.0, y: 103.0 }));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_drag_is_not_tap_even_if_it_returns() {
        let mut tracker = TouchTracker::new(12.0);
        tracker.apply(1, TouchPhase::Started, 100.0, 100.0);
        tracker.apply(1, TouchPhase::Moved, 160.0, 100.0);
        tracker.apply(1, TouchPhase::Moved, 100.0, 100.0);
        assert!(tracker.apply(1, TouchPhase::Ended, 100.0, 100.0).is_none());
    }

    #[test]
    fn test_pinch_fingers_never_tap() {
        let mut tracker = TouchTracker::new(12.0);
        tracker.apply(1, TouchPhase::Started, 100.0, 100.0);
        tracker.apply(2, TouchPhase::Started, 200.0, 100.0);
        assert!(tracker.apply(2, TouchPhase::Ended, 200.0, 100.0).is_none());
        assert!(tracker.apply(1, TouchPhase::Ended, 100.0, 100.0).is_none());
    }

    #[test]
    fn test_cancelled_touch_is_not_tap() {
        let mut tracker = TouchTracker::new(12.0);
        tracker.apply(1, TouchPhase::Started, 100.0, 100.0);
        assert!(tracker.apply(1, TouchPhase::Cancelled, 100.0, 100.0).is_none());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_unknown_release_is_ignored() {
        let mut tracker = TouchTracker::default();
        assert!(tracker.apply(9, TouchPhase::Ended, 0.0, 0.0).is_none());
        assert!(tracker.apply(9, TouchPhase::Moved, 0.0, 0.0).is_none());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_mouse_click_is_tap() {
        use winit::dpi::PhysicalPosition;
        use winit::event::DeviceId;

        // SAFETY: the dummy id is only compared against itself
        let device_id = unsafe { DeviceId::dummy() };
        let mut tracker = TouchTracker::default();
        tracker.handle_window_event(&WindowEvent::CursorMoved {
            device_id,
            position: PhysicalPosition::new(40.0, 60.0),
        });
        tracker.handle_window_event(&WindowEvent::MouseInput {
            device_id,
            state: ElementState::Pressed,
            button: MouseButton::Left,
        });
        assert_eq!(tracker.points().len(), 1);
        assert_eq!(tracker.points()[0].id, MOUSE_POINTER_ID);

        let tap = tracker.handle_window_event(&WindowEvent::MouseInput {
            device_id,
            state: ElementState::Released,
            button: MouseButton::Left,
        });
        assert_eq!(tap, Some(Tap { x: 40.0, y: 60.0 }));
    }
}
