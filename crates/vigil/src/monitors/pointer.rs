//! Pointer movement scoring.
//!
//! Moves are grouped into gestures separated by idle gaps. When the idle
//! timer fires, the gesture is analysed once: fast and perfectly straight
//! paths raise the score, naturally curved paths lower it.

use serde::Serialize;
use vigil_common::constants::pointer::{
    CURVED_BASE_REWARD, CURVED_DEVIATION_CAP, FAST_BASE_PENALTY, FAST_SPEED_DIVISOR,
    STRAIGHT_BASE_PENALTY,
};
use vigil_common::{Point, Score};

use crate::config::PointerConfig;

/// Movement burst between two idle periods
#[derive(Debug, Clone)]
struct GesturePath {
    origin: Point,
    last: Point,
    /// Sum of segment lengths (px)
    distance: f64,
    /// Timestamp of the latest event (ms)
    last_timestamp: u64,
    /// Speed of the latest segment (px/s)
    speed: f64,
}

impl GesturePath {
    fn start(origin: Point, timestamp: u64) -> Self {
        Self {
            origin,
            last: origin,
            distance: 0.0,
            last_timestamp: timestamp,
            speed: 0.0,
        }
    }

    fn extend(&mut self, to: Point, timestamp: u64) {
        let segment = self.last.distance_to(&to);
        self.distance += segment;

        let elapsed_secs = timestamp.saturating_sub(self.last_timestamp) as f64 / 1000.0;
        self.speed = if elapsed_secs > 0.0 {
            segment / elapsed_secs
        } else {
            0.0
        };

        self.last = to;
        self.last_timestamp = timestamp;
    }
}

/// Analysis of one completed gesture
#[derive(Debug, Clone, Serialize)]
pub struct GestureReport {
    pub start: Point,
    pub end: Point,
    /// Accumulated path length (px)
    pub total_distance: f64,
    /// Chord from start to end (px)
    pub straight_distance: f64,
    /// |total - straight|
    pub deviation: f64,
    /// Speed of the final segment (px/s)
    pub speed: f64,
    pub straight: bool,
    /// Signed score change before smoothing
    pub contribution: f64,
    /// Previous score plus contribution
    pub raw_score: f64,
    /// EMA state clamped and rounded
    pub score: Score,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GestureOutcome {
    /// Below the noise floor; score untouched
    Ignored { distance: f64 },
    Scored(GestureReport),
}

/// Tracks pointer gestures and maintains the smoothed pointer score
#[derive(Debug)]
pub struct PointerActivityMonitor {
    settings: PointerConfig,
    path: Option<GesturePath>,
    score: Score,
    /// Unclamped EMA state; may leave [0, 100]
    smoothed: f64,
}

impl PointerActivityMonitor {
    pub fn new(settings: PointerConfig) -> Self {
        Self {
            settings,
            path: None,
            score: Score::ZERO,
            smoothed: 0.0,
        }
    }

    pub fn current_score(&self) -> Score {
        self.score
    }

    pub fn settings(&self) -> &PointerConfig {
        &self.settings
    }

    /// Returns true while a gesture is waiting for its idle timeout
    pub fn gesture_in_progress(&self) -> bool {
        self.path.is_some()
    }

    /// Record a move. The caller must (re)start the idle timer afterwards.
    pub fn on_pointer_move(&mut self, x: f64, y: f64, timestamp: u64) {
        let point = Point::new(x, y);
        match self.path.as_mut() {
            Some(path) => path.extend(point, timestamp),
            None => self.path = Some(GesturePath::start(point, timestamp)),
        }
    }

    /// Analyse and consume the pending gesture.
    ///
    /// Returns `None` if no gesture was in progress (e.g. the monitor was
    /// reset while a timer was pending).
    pub fn on_idle_timeout(&mut self) -> Option<GestureOutcome> {
        let path = self.path.take()?;

        if path.distance < self.settings.min_distance_px {
            tracing::trace!(
                distance = path.distance,
                floor = self.settings.min_distance_px,
                "Movement too small, ignored"
            );
            return Some(GestureOutcome::Ignored {
                distance: path.distance,
            });
        }

        let straight_distance = path.origin.distance_to(&path.last);
        let deviation = (path.distance - straight_distance).abs();
        let straight = deviation < self.settings.sensibility;

        let mut contribution = 0.0;
        if path.speed > self.settings.max_speed_px_per_sec {
            contribution += FAST_BASE_PENALTY + path.speed / FAST_SPEED_DIVISOR;
        }
        if straight {
            contribution += STRAIGHT_BASE_PENALTY + deviation;
        }
        if deviation > self.settings.sensibility {
            contribution -= CURVED_BASE_REWARD + deviation.min(CURVED_DEVIATION_CAP);
        }

        let raw_score = self.score.value() + contribution;
        let alpha = self.settings.smoothing;
        self.smoothed = self.smoothed * (1.0 - alpha) + raw_score * alpha;
        self.score = Score::new(self.smoothed);

        let report = GestureReport {
            start: path.origin,
            end: path.last,
            total_distance: path.distance,
            straight_distance,
            deviation,
            speed: path.speed,
            straight,
            contribution,
            raw_score,
            score: self.score,
        };

        tracing::debug!(
            total_distance = %format!("{:.2}", report.total_distance),
            straight_distance = %format!("{:.2}", report.straight_distance),
            deviation = %format!("{:.2}", report.deviation),
            speed = %format!("{:.2}", report.speed),
            straight = report.straight,
            score = %report.score,
            "Pointer gesture analysed"
        );

        Some(GestureOutcome::Scored(report))
    }

    /// Drop any in-progress gesture (teardown)
    pub fn reset(&mut self) {
        self.path = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> PointerActivityMonitor {
        PointerActivityMonitor::new(PointerConfig::default())
    }

    fn gesture(monitor: &mut PointerActivityMonitor, points: &[(f64, f64, u64)]) -> GestureOutcome {
        for &(x, y, t) in points {
            monitor.on_pointer_move(x, y, t);
        }
        monitor.on_idle_timeout().expect("gesture pending")
    }

    fn scored(outcome: GestureOutcome) -> GestureReport {
        match outcome {
            GestureOutcome::Scored(report) => report,
            other => panic!("expected scored gesture, got {other:?}"),
        }
    }

    #[test]
    fn test_small_gesture_is_ignored() {
        let mut monitor = monitor();
        let outcome = gesture(&mut monitor, &[(0.0, 0.0, 0), (20.0, 0.0, 100), (40.0, 0.0, 200)]);
        assert!(matches!(outcome, GestureOutcome::Ignored { distance } if distance == 40.0));
        assert_eq!(monitor.current_score(), Score::ZERO);
        assert!(!monitor.gesture_in_progress());
    }

    #[test]
    fn test_straight_slow_gesture_adds_forty_before_smoothing() {
        let mut monitor = monitor();
        let report = scored(gesture(
            &mut monitor,
            &[(0.0, 0.0, 0), (30.0, 40.0, 250), (60.0, 80.0, 500)],
        ));

        assert!(report.straight);
        assert_eq!(report.deviation, 0.0);
        assert_eq!(report.speed, 200.0);
        assert_eq!(report.contribution, 40.0 + report.deviation);
        assert_eq!(report.raw_score, 40.0);
        // 0 * 0.9 + 40 * 0.1
        assert_eq!(monitor.current_score().value(), 4.0);
    }

    #[test]
    fn test_fast_straight_gesture() {
        let mut monitor = monitor();
        let report = scored(gesture(&mut monitor, &[(0.0, 0.0, 0), (1000.0, 0.0, 250)]));

        assert_eq!(report.speed, 4000.0);
        assert_eq!(report.contribution, 20.0 + 0.8 + 40.0);
        assert_eq!(monitor.current_score().value(), 6.08);
    }

    #[test]
    fn test_curved_gesture_lowers_score() {
        let mut monitor = monitor();
        for _ in 0..3 {
            gesture(&mut monitor, &[(0.0, 0.0, 0), (100.0, 0.0, 200)]);
        }
        let before = monitor.current_score().value();
        assert!(before > 0.0);

        let report = scored(gesture(
            &mut monitor,
            &[(0.0, 0.0, 1000), (50.0, 0.0, 1100), (50.0, 50.0, 1200)],
        ));
        assert!(!report.straight);
        assert_eq!(report.contribution, -15.0);
        assert!(monitor.current_score().value() < before);
    }

    #[test]
    fn test_smoothing_keeps_memory_below_zero() {
        let mut monitor = monitor();
        let report = scored(gesture(
            &mut monitor,
            &[(0.0, 0.0, 0), (50.0, 0.0, 100), (50.0, 50.0, 200)],
        ));
        assert_eq!(report.contribution, -15.0);
        assert_eq!(monitor.current_score(), Score::ZERO);

        // EMA state is -1.5 while the visible score stays at 0
        let report = scored(gesture(
            &mut monitor,
            &[(0.0, 0.0, 1000), (30.0, 40.0, 1250), (60.0, 80.0, 1500)],
        ));
        assert_eq!(report.raw_score, 40.0);
        // -1.5 * 0.9 + 40 * 0.1
        assert_eq!(monitor.current_score().value(), 2.65);
    }

    #[test]
    fn test_deviation_at_sensibility_is_neutral() {
        let mut monitor = monitor();
        // Overshoot by 0.125px and come back: deviation is exactly 0.25
        let report = scored(gesture(
            &mut monitor,
            &[(0.0, 0.0, 0), (100.125, 0.0, 300), (100.0, 0.0, 400)],
        ));
        assert_eq!(report.deviation, 0.25);
        assert!(!report.straight);
        assert!(report.speed < 2000.0);
        assert_eq!(report.contribution, 0.0);
        assert_eq!(monitor.current_score(), Score::ZERO);
    }

    #[test]
    fn test_zero_elapsed_time_gives_zero_speed() {
        let mut monitor = monitor();
        let report = scored(gesture(&mut monitor, &[(0.0, 0.0, 500), (80.0, 0.0, 500)]));
        assert_eq!(report.speed, 0.0);
        assert!(report.speed.is_finite());
    }

    #[test]
    fn test_timestamps_going_backwards_do_not_divide_by_zero() {
        let mut monitor = monitor();
        let report = scored(gesture(&mut monitor, &[(0.0, 0.0, 900), (80.0, 0.0, 100)]));
        assert_eq!(report.speed, 0.0);
    }

    #[test]
    fn test_score_stays_bounded() {
        let mut monitor = monitor();
        for i in 0..500u64 {
            let t = i * 1000;
            gesture(&mut monitor, &[(0.0, 0.0, t), (400.0, 0.0, t + 1)]);
            let score = monitor.current_score().value();
            assert!((0.0..=100.0).contains(&score));
        }
        assert!(monitor.current_score().value() > 90.0);

        for i in 0..500u64 {
            let t = 1_000_000 + i * 1000;
            gesture(&mut monitor, &[(0.0, 0.0, t), (60.0, 0.0, t + 100), (60.0, 60.0, t + 200)]);
            let score = monitor.current_score().value();
            assert!((0.0..=100.0).contains(&score));
        }
        assert_eq!(monitor.current_score(), Score::ZERO);
    }

    #[test]
    fn test_idle_timeout_without_gesture() {
        let mut monitor = monitor();
        assert!(monitor.on_idle_timeout().is_none());

        monitor.on_pointer_move(1.0, 1.0, 0);
        monitor.reset();
        assert!(monitor.on_idle_timeout().is_none());
    }

    #[test]
    fn test_each_gesture_starts_fresh() {
        let mut monitor = monitor();
        gesture(&mut monitor, &[(0.0, 0.0, 0), (30.0, 0.0, 100)]);
        // Would exceed the floor if the previous 30px carried over
        let outcome = gesture(&mut monitor, &[(0.0, 0.0, 500), (30.0, 0.0, 600)]);
        assert!(matches!(outcome, GestureOutcome::Ignored { distance } if distance == 30.0));
    }
}
