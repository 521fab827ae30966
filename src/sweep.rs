/// Speed used when the requested sweep speed is unusable (0.1°/tick)
pub const DEFAULT_SWEEP_STEP: f64 = 0.1 * std::f64::consts::PI / 180.0;

/// Upper bound on the samples one sweep may take
pub const MAX_SWEEP_SAMPLES: f64 = 100_000.0;

/// Phase accumulator that walks from `phi_from` towards `phi_to` one tick at a time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepClock {
    cursor: f64,
    phi_from: f64,
    phi_to: f64,
    step: f64,
    stalled: bool,
}

impl SweepClock {
    pub fn new(phi_from: f64, phi_to: f64, step: f64) -> Self {
        Self {
            cursor: phi_from,
            phi_from,
            phi_to,
            step: sanitize_step(step, phi_from, phi_to),
            stalled: false,
        }
    }

    pub fn reset(&mut self, phi_from: f64) {
        self.phi_from = phi_from;
        self.cursor = phi_from;
        self.stalled = false;
    }

    /// Advance by one step. Returns true once the cursor has reached or passed `phi_to`,
    /// or when the step is lost in rounding and the cursor can no longer move.
    pub fn tick(&mut self) -> bool {
        let next = self.cursor + self.step;
        if next == self.cursor {
            self.stalled = true;
            return true;
        }
        self.cursor = next;
        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.stalled || self.cursor >= self.phi_to
    }

    pub fn cursor(&self) -> f64 {
        self.cursor
    }

    pub fn phi_from(&self) -> f64 {
        self.phi_from
    }

    pub fn phi_to(&self) -> f64 {
        self.phi_to
    }

    pub fn step(&self) -> f64 {
        self.step
    }
}

/// Replace unusable steps with [`DEFAULT_SWEEP_STEP`].
///
/// A step is unusable when it is non-positive, non-finite, too small to move
/// `phi_from` in floating point, or would need more than [`MAX_SWEEP_SAMPLES`]
/// ticks to cover the range. Very wide ranges raise the fallback so the
/// sample count stays under the cap.
pub fn sanitize_step(step: f64, phi_from: f64, phi_to: f64) -> f64 {
    let span = phi_to - phi_from;
    let floor = if span.is_finite() && span > 0.0 {
        span / MAX_SWEEP_SAMPLES
    } else {
        0.0
    };
    let usable = step.is_finite() && step > 0.0 && step >= floor && phi_from + step != phi_from;
    if usable {
        step
    } else {
        DEFAULT_SWEEP_STEP.max(floor)
    }
}
