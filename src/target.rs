use rand::Rng;
use std::f64::consts::{PI, TAU};

use crate::util::wrap_phase;

/// Logical plane the random target is dropped into, centred on the origin
pub const PLANE_WIDTH: f64 = 1200.0;
pub const PLANE_HEIGHT: f64 = 900.0;
/// Distance at which the target counts as reached
pub const REACH_THRESHOLD: f64 = 10.0;

const ANIM_RADIUS_STEP: f64 = 1.2;
const ANIM_PHASE_STEP: f64 = 0.03;
const RADIUS_TOLERANCE: f64 = 0.5;
const PHASE_TOLERANCE: f64 = 0.005;

pub fn random_target<R: Rng>(rng: &mut R) -> (f64, f64) {
    (
        rng.gen_range(-PLANE_WIDTH / 2.0..PLANE_WIDTH / 2.0),
        rng.gen_range(-PLANE_HEIGHT / 2.0..PLANE_HEIGHT / 2.0),
    )
}

pub fn is_within_reach(point: (f64, f64), target: (f64, f64)) -> bool {
    let (dx, dy) = (point.0 - target.0, point.1 - target.1);
    (dx * dx + dy * dy).sqrt() < REACH_THRESHOLD
}

/// "Go to" animation: glide the current point to a polar destination
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GotoAnimation {
    pub radius: f64,
    pub phase: f64,
}

impl GotoAnimation {
    pub fn new(radius: f64, angle_deg: f64) -> Self {
        Self {
            radius,
            phase: angle_deg.to_radians(),
        }
    }

    /// Move one tick towards the destination. Returns true when both residuals
    /// were already inside tolerance, i.e. the animation is over.
    pub fn step(&self, radius: &mut f64, phase: &mut f64) -> bool {
        let dr = (self.radius - *radius).abs();
        let radius_done = dr <= RADIUS_TOLERANCE;
        if !radius_done {
            *radius += (self.radius - *radius).signum() * dr.min(ANIM_RADIUS_STEP);
        }

        let dp = (self.phase - *phase).rem_euclid(TAU);
        let phase_done = dp <= PHASE_TOLERANCE || dp >= TAU - PHASE_TOLERANCE;
        if !phase_done {
            // shorter way round
            let delta = if dp < PI {
                dp.min(ANIM_PHASE_STEP)
            } else {
                -(TAU - dp).min(ANIM_PHASE_STEP)
            };
            *phase = wrap_phase(*phase + delta);
        }

        radius_done && phase_done
    }
}
