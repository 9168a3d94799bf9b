// Spin trajectories: forward-only travel to a target segment, eased over wall-clock time.
// Progress always comes from (now - start), never from summed frame deltas.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::effects::EffectHandle;
use crate::geometry::{angle_of_segment_center, normalize_angle, POINTER_ANGLE};
use crate::types::{SpinId, Timestamp};

/// Cubic ease-out: fast start, smooth stop at p = 1.
pub fn ease_out_cubic(p: f64) -> f64 {
    let p = p.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

/// Orientation at which segment `target` rests centred under the pointer,
/// before any whole turns are added.
pub fn resting_angle(target: usize, total: usize) -> f64 {
    POINTER_ANGLE - angle_of_segment_center(target, total)
}

/// One planned rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    /// Orientation at the start, already normalized into [0, 2π).
    pub start: f64,
    /// Total angular travel, always positive when `rounds >= 1`.
    pub travel: f64,
    pub duration_ms: f64,
}

impl Trajectory {
    pub fn plan(
        target: usize,
        total: usize,
        current_orientation: f64,
        rounds: u32,
        duration_ms: f64,
    ) -> Self {
        let start = normalize_angle(current_orientation);
        let mut target_angle = resting_angle(target, total);
        while target_angle < start {
            target_angle += TAU;
        }
        Trajectory {
            start,
            travel: TAU * rounds as f64 + (target_angle - start),
            duration_ms,
        }
    }

    pub fn progress_at(&self, elapsed_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }

    pub fn orientation_at(&self, elapsed_ms: f64) -> f64 {
        self.start + ease_out_cubic(self.progress_at(elapsed_ms)) * self.travel
    }

    /// Where the wheel stops, unnormalized.
    pub fn end(&self) -> f64 {
        self.start + self.travel
    }
}

/// Caps redraw work at a fixed rate no matter how often frame callbacks arrive.
#[derive(Debug, Clone)]
pub struct FrameThrottle {
    interval_ms: f64,
    last_frame: Option<Timestamp>,
}

impl FrameThrottle {
    pub fn new(interval_ms: f64) -> Self {
        FrameThrottle {
            interval_ms,
            last_frame: None,
        }
    }

    /// True (and records `now`) if enough time passed since the last admitted frame.
    pub fn admit(&mut self, now: Timestamp) -> bool {
        if let Some(last) = self.last_frame {
            if now.millis_since(last) < self.interval_ms {
                return false;
            }
        }
        self.last_frame = Some(now);
        true
    }
}

/// Which path ended a spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishPath {
    /// A frame observed progress 1.
    Animation,
    /// The fallback timer fired first.
    SafetyTimer,
    /// The host is shutting down.
    Teardown,
}

/// The spin currently animating.
#[derive(Debug, Clone)]
pub struct SpinJob {
    pub id: SpinId,
    pub target_index: usize,
    pub winner: String,
    pub trajectory: Trajectory,
    pub started_at: Timestamp,
    pub throttle: FrameThrottle,
    /// Ambient effects that live exactly as long as this spin.
    pub effects: Vec<EffectHandle>,
}

impl SpinJob {
    pub fn elapsed_ms(&self, now: Timestamp) -> f64 {
        now.millis_since(self.started_at)
    }

    pub fn is_complete(&self, now: Timestamp) -> bool {
        self.trajectory.progress_at(self.elapsed_ms(now)) >= 1.0
    }

    pub fn orientation_at(&self, now: Timestamp) -> f64 {
        self.trajectory.orientation_at(self.elapsed_ms(now))
    }
}

/// What the caller needs to drive a freshly admitted spin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinPlan {
    pub spin_id: SpinId,
    pub target_index: usize,
    pub duration_ms: f64,
    /// When to fire the safety timer, relative to the request.
    pub fallback_after_ms: f64,
}

/// Result of asking for a spin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum SpinRequest {
    Started(SpinPlan),
    /// Another spin is still animating.
    Busy,
    /// Nothing to spin.
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::segment_at_angle;
    use std::f64::consts::PI;

    #[test]
    fn easing_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_out_cubic(2.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-12);
    }

    #[test]
    fn easing_is_monotonic() {
        let samples: Vec<f64> = (0..=100).map(|i| ease_out_cubic(i as f64 / 100.0)).collect();
        assert!(samples.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn plan_adds_whole_turns() {
        let plan = Trajectory::plan(0, 4, 0.0, 8, 7000.0);
        // Segment 0 of 4 rests at 3π/2 - π/4 = 5π/4.
        assert!((plan.travel - (16.0 * PI + 5.0 * PI / 4.0)).abs() < 1e-9);
        assert_eq!(plan.start, 0.0);
    }

    #[test]
    fn plan_never_backtracks() {
        // Start just past the resting angle: must go almost a full extra turn forward.
        let rest = normalize_angle(resting_angle(1, 3));
        let plan = Trajectory::plan(1, 3, rest + 0.01, 8, 7000.0);
        assert!(plan.travel > 8.0 * TAU);
        assert!(plan.travel < 9.0 * TAU);
    }

    #[test]
    fn unbounded_start_is_normalized() {
        let plan = Trajectory::plan(2, 5, -7.0 * TAU + 1.0, 9, 7000.0);
        assert!((plan.start - 1.0).abs() < 1e-9);
    }

    #[test]
    fn orientation_reaches_end_exactly() {
        let plan = Trajectory::plan(3, 7, 2.0, 10, 7500.0);
        assert_eq!(plan.orientation_at(0.0), plan.start);
        assert_eq!(plan.orientation_at(7500.0), plan.end());
        assert_eq!(plan.orientation_at(99_999.0), plan.end());
        let final_orientation = normalize_angle(plan.end());
        assert_eq!(segment_at_angle(POINTER_ANGLE, 7, final_orientation), 3);
    }

    #[test]
    fn throttle_caps_rate() {
        let mut throttle = FrameThrottle::new(1000.0 / 60.0);
        assert!(throttle.admit(Timestamp::from_micros(0)));
        assert!(!throttle.admit(Timestamp::from_micros(10_000)));
        assert!(throttle.admit(Timestamp::from_micros(17_000)));
        assert!(!throttle.admit(Timestamp::from_micros(30_000)));
        assert!(throttle.admit(Timestamp::from_micros(40_000)));
    }

    #[test]
    fn elapsed_time_comes_from_clock() {
        let job = SpinJob {
            id: SpinId::new(1),
            target_index: 0,
            winner: "Alice".to_string(),
            trajectory: Trajectory::plan(0, 2, 0.0, 8, 7000.0),
            started_at: Timestamp::from_millis_f64(1000.0),
            throttle: FrameThrottle::new(16.0),
            effects: Vec::new(),
        };
        // No frames in between: a single late reading still lands on the end.
        assert!(job.is_complete(Timestamp::from_millis_f64(8000.0)));
        assert!(!job.is_complete(Timestamp::from_millis_f64(7999.0)));
        let half = job.orientation_at(Timestamp::from_millis_f64(4500.0));
        assert!((half - job.trajectory.travel * 0.875).abs() < 1e-9);
    }

    #[test]
    fn request_serializes_with_status() {
        let json = serde_json::to_string(&SpinRequest::Busy).unwrap();
        assert_eq!(json, r#"{"status":"Busy"}"#);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// The wheel always moves forward and comes to rest on the target.
            #[test]
            fn trajectory_lands_on_target(
                total in 1usize..400,
                offset in 0usize..400,
                current in -1000.0f64..1000.0,
                rounds in 8u32..=11,
            ) {
                let target = offset % total;
                let plan = Trajectory::plan(target, total, current, rounds, 7000.0);
                prop_assert!(plan.travel > 0.0);
                prop_assert!(plan.travel >= TAU * rounds as f64);
                prop_assert!(plan.travel < TAU * (rounds as f64 + 1.0));
                let rest = normalize_angle(plan.end());
                prop_assert_eq!(segment_at_angle(POINTER_ANGLE, total, rest), target);
            }

            #[test]
            fn orientation_is_monotonic(
                total in 1usize..50,
                offset in 0usize..50,
                t1 in 0.0f64..9000.0,
                t2 in 0.0f64..9000.0,
            ) {
                let plan = Trajectory::plan(offset % total, total, 0.3, 8, 7200.0);
                let (early, late) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
                prop_assert!(plan.orientation_at(early) <= plan.orientation_at(late));
            }
        }
    }
}
