use log::debug;

use super::touch::TouchPoint;
use crate::config::GestureConfig;
use crate::math::wrap_angle_delta;

/// One increment of user manipulation. Every value is relative to the
/// immediately preceding sample, so consumers apply it directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Single-finger drag, in screen pixels (+x right, +y down).
    Pan { dx: f32, dy: f32 },
    /// Two-finger pinch, as a multiplier on the current scale.
    Scale { ratio: f32 },
    /// Two-finger twist, in radians (positive is clockwise on screen).
    Rotate { delta_radians: f32 },
}

/// What the recognizer remembers from the previous sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TouchSampleSet {
    /// No fingers, or more than two (which we do not interpret).
    Empty,
    Single { id: u64, x: f32, y: f32 },
    Pair {
        ids: [u64; 2],
        distance: f32,
        angle: f32,
    },
}

impl TouchSampleSet {
    pub fn from_points(points: &[TouchPoint]) -> Self {
        match points {
            [p] => TouchSampleSet::Single {
                id: p.id,
                x: p.x,
                y: p.y,
            },
            [a, b] => {
                let dx = b.x - a.x;
                let dy = b.y - a.y;
                TouchSampleSet::Pair {
                    ids: [a.id, b.id],
                    distance: dx.hypot(dy),
                    angle: dy.atan2(dx),
                }
            }
            _ => TouchSampleSet::Empty,
        }
    }
}

/// Pure 2D gesture classification.
///
/// Whenever the set of fingers changes (count or identity) the recognizer
/// stores the new sample as its baseline and emits nothing for that frame;
/// otherwise the first frame after a finger lands or lifts would compare
/// unrelated measurements and produce a large spurious jump.
pub struct GestureRecognizer {
    samples: TouchSampleSet,
    min_pinch_distance: f32,
}

impl GestureRecognizer {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            samples: TouchSampleSet::Empty,
            min_pinch_distance: config.min_pinch_distance,
        }
    }

    pub fn samples(&self) -> &TouchSampleSet {
        &self.samples
    }

    /// Forgets the baseline, e.g. at session start.
    pub fn reset(&mut self) {
        self.samples = TouchSampleSet::Empty;
    }

    /// Consumes the current finger set and returns the increments since the
    /// previous call.
    pub fn process(&mut self, points: &[TouchPoint]) -> Vec<GestureEvent> {
        let next = TouchSampleSet::from_points(points);
        let mut events = Vec::new();

        match (self.samples, next) {
            (
                TouchSampleSet::Single { id: prev_id, x: px, y: py },
                TouchSampleSet::Single { id, x, y },
            ) if prev_id == id => {
                let (dx, dy) = (x - px, y - py);
                if dx != 0.0 || dy != 0.0 {
                    events.push(GestureEvent::Pan { dx, dy });
                }
            }
            (
                TouchSampleSet::Pair {
                    ids: prev_ids,
                    distance: prev_distance,
                    angle: prev_angle,
                },
                TouchSampleSet::Pair { ids, distance, angle },
            ) if prev_ids == ids => {
                if prev_distance >= self.min_pinch_distance && distance >= self.min_pinch_distance
                {
                    let ratio = distance / prev_distance;
                    if ratio != 1.0 {
                        events.push(GestureEvent::Scale { ratio });
                    }
                }
                let delta_radians = wrap_angle_delta(angle - prev_angle);
                if delta_radians != 0.0 {
                    events.push(GestureEvent::Rotate { delta_radians });
                }
            }
            (previous, current) if previous != current => {
                if !matches!((previous, current), (TouchSampleSet::Empty, TouchSampleSet::Empty))
                {
                    debug!("Touch set changed, re-baselining gestures: {:?}", current);
                }
            }
            _ => {}
        }

        self.samples = next;
        events
    }
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new(&GestureConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn one(id: u64, x: f32, y: f32) -> Vec<TouchPoint> {
        vec![TouchPoint::new(id, x, y)]
    }

    fn two(a: (f32, f32), b: (f32, f32)) -> Vec<TouchPoint> {
        vec![TouchPoint::new(1, a.0, a.1), TouchPoint::new(2, b.0, b.1)]
    }

    #[test]
    fn test_first_sample_only_baselines() {
        let mut recognizer = GestureRecognizer::default();
        assert!(recognizer.process(&one(1, 10.0, 10.0)).is_empty());
        assert_eq!(
            *recognizer.samples(),
            TouchSampleSet::Single { id: 1, x: 10.0, y: 10.0 }
        );
    }

    #[test]
    fn test_single_finger_pans() {
        let mut recognizer = GestureRecognizer::default();
        recognizer.process(&one(1, 10.0, 10.0));
        let events = recognizer.process(&one(1, 15.0, 7.0));
        assert_eq!(events, vec![GestureEvent::Pan { dx: 5.0, dy: -3.0 }]);
    }

    #[test]
    fn test_stationary_finger_is_silent() {
        let mut recognizer = GestureRecognizer::default();
        recognizer.process(&one(1, 10.0, 10.0));
        assert!(recognizer.process(&one(1, 10.0, 10.0)).is_empty());
    }

    #[test]
    fn test_pinch_and_twist_scenario() {
        let mut recognizer = GestureRecognizer::default();
        assert!(recognizer.process(&two((100.0, 100.0), (200.0, 100.0))).is_empty());

        // Distance 100 -> sqrt(130^2 + 10^2), angle 0 -> atan2(10, 130)
        let events = recognizer.process(&two((90.0, 95.0), (220.0, 105.0)));
        assert_eq!(events.len(), 2);
        assert!(!events.iter().any(|e| matches!(e, GestureEvent::Pan { .. })));

        match events[0] {
            GestureEvent::Scale { ratio } => assert!((ratio - 1.3038).abs() < 1e-3, "{}", ratio),
            other => panic!("expected scale, got {:?}", other),
        }
        match events[1] {
            GestureEvent::Rotate { delta_radians } => {
                assert!((delta_radians - 0.0768).abs() < 1e-3, "{}", delta_radians)
            }
            other => panic!("expected rotate, got {:?}", other),
        }
    }

    #[test]
    fn test_finger_count_change_rebaselines() {
        let mut recognizer = GestureRecognizer::default();
        recognizer.process(&one(1, 100.0, 100.0));
        recognizer.process(&one(1, 110.0, 100.0));

        // Second finger lands far away: no pan, no scale, no rotate
        assert!(recognizer.process(&two((110.0, 100.0), (400.0, 500.0))).is_empty());

        // Lifting it again must not jump either
        assert!(recognizer.process(&one(1, 300.0, 300.0)).is_empty());
        let events = recognizer.process(&one(1, 301.0, 300.0));
        assert_eq!(events, vec![GestureEvent::Pan { dx: 1.0, dy: 0.0 }]);
    }

    #[test]
    fn test_finger_swap_rebaselines() {
        let mut recognizer = GestureRecognizer::default();
        recognizer.process(&one(1, 0.0, 0.0));
        assert!(recognizer.process(&one(2, 50.0, 50.0)).is_empty());
    }

    #[test]
    fn test_three_fingers_are_ignored() {
        let mut recognizer = GestureRecognizer::default();
        recognizer.process(&two((0.0, 0.0), (100.0, 0.0)));
        let three = vec![
            TouchPoint::new(1, 0.0, 0.0),
            TouchPoint::new(2, 200.0, 0.0),
            TouchPoint::new(3, 50.0, 50.0),
        ];
        assert!(recognizer.process(&three).is_empty());
        assert_eq!(*recognizer.samples(), TouchSampleSet::Empty);
    }

    #[test]
    fn test_rotation_across_atan2_seam_is_small() {
        let mut recognizer = GestureRecognizer::default();
        recognizer.process(&two((100.0, 100.0), (0.0, 101.0)));
        let events = recognizer.process(&two((100.0, 100.0), (0.0, 99.0)));
        let rotate = events
            .iter()
            .find_map(|e| match e {
                GestureEvent::Rotate { delta_radians } => Some(*delta_radians),
                _ => None,
            })
            .unwrap();
        assert!(rotate.abs() < 0.1, "{}", rotate);
    }

    #[test]
    fn test_tiny_pinch_does_not_scale() {
        let mut recognizer = GestureRecognizer::default();
        recognizer.process(&two((100.0, 100.0), (101.0, 100.0)));
        let events = recognizer.process(&two((100.0, 100.0), (104.0, 100.0)));
        assert!(!events.iter().any(|e| matches!(e, GestureEvent::Scale { .. })));
    }

    #[test]
    fn test_pan_deltas_sum_to_displacement() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let mut recognizer = GestureRecognizer::default();
            let (mut x, mut y) = (rng.random_range(0.0..1000.0), rng.random_range(0.0..1000.0));
            let (start_x, start_y) = (x, y);
            recognizer.process(&one(5, x, y));

            let (mut sum_x, mut sum_y) = (0.0f32, 0.0f32);
            for _ in 0..50 {
                x += rng.random_range(-20.0..20.0);
                y += rng.random_range(-20.0..20.0);
                for event in recognizer.process(&one(5, x, y)) {
                    if let GestureEvent::Pan { dx, dy } = event {
                        sum_x += dx;
                        sum_y += dy;
                    }
                }
            }
            assert!((sum_x - (x - start_x)).abs() < 1e-2);
            assert!((sum_y - (y - start_y)).abs() < 1e-2);
        }
    }
}
