use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::expr::ExprError;
use crate::sweep::sanitize_step;

/// Countdown budget before an exercise starts sweeping
pub const COUNTDOWN_SECS: u64 = 3;
pub const COUNTDOWN_MESSAGE: &str = "Get ready! Use ↑ and ↓ to match ρ(φ)";
/// Radius change per tick when the requested step is unusable
pub const DEFAULT_RADIUS_STEP: f64 = 3.0;

/// Errors surfaced by discrete session actions. None of them end the session.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrainerError {
    #[error("Invalid ρ(φ) expression")]
    InvalidExpression(#[source] ExprError),

    #[error("Invalid number for {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}

impl From<ExprError> for TrainerError {
    fn from(e: ExprError) -> Self {
        TrainerError::InvalidExpression(e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display)]
pub enum Mode {
    Target,
    Exercise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionPhase {
    Idle,
    #[strum(serialize = "Counting down")]
    CountingDown,
    Running,
    Done,
}

/// Raw exercise inputs as the user typed them (angles in degrees)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseInputs {
    pub expression: String,
    pub phi_from_deg: String,
    pub phi_to_deg: String,
    pub speed_deg: String,
    pub radius_step: String,
}

impl Default for ExerciseInputs {
    fn default() -> Self {
        Self {
            expression: "200*sin(3*phi)".to_string(),
            phi_from_deg: "0".to_string(),
            phi_to_deg: "180".to_string(),
            speed_deg: "0.1".to_string(),
            radius_step: "3".to_string(),
        }
    }
}

/// Validated configuration of one exercise run (angles in radians)
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseConfig {
    pub expression: String,
    pub phi_from: f64,
    pub phi_to: f64,
    pub sweep_step: f64,
    pub radius_step: f64,
}

impl ExerciseConfig {
    /// Steps are sanitised here; bounds are taken as given
    pub fn new(
        expression: impl Into<String>,
        phi_from: f64,
        phi_to: f64,
        sweep_step: f64,
        radius_step: f64,
    ) -> Self {
        Self {
            expression: expression.into(),
            phi_from,
            phi_to,
            sweep_step: sanitize_step(sweep_step, phi_from, phi_to),
            radius_step: sanitize_radius_step(radius_step),
        }
    }

    /// Convert degree inputs, falling back to defaults for the two step fields.
    /// The phase bounds have no sensible default and are rejected instead.
    pub fn from_inputs(inputs: &ExerciseInputs) -> Result<Self, TrainerError> {
        let phi_from = parse_bound("φ from", &inputs.phi_from_deg)?;
        let phi_to = parse_bound("φ to", &inputs.phi_to_deg)?;
        let speed = parse_lenient(&inputs.speed_deg).to_radians();
        let radius_step = parse_lenient(&inputs.radius_step);

        Ok(Self::new(
            inputs.expression.clone(),
            phi_from.to_radians(),
            phi_to.to_radians(),
            speed,
            radius_step,
        ))
    }
}

pub fn sanitize_radius_step(step: f64) -> f64 {
    if step.is_finite() && step != 0.0 {
        step
    } else {
        DEFAULT_RADIUS_STEP
    }
}

fn parse_bound(field: &'static str, value: &str) -> Result<f64, TrainerError> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(TrainerError::InvalidNumber {
            field,
            value: value.to_string(),
        }),
    }
}

fn parse_lenient(value: &str) -> f64 {
    value.trim().parse::<f64>().unwrap_or(f64::NAN)
}

/// Wall-clock countdown, recomputed from its start instant on every tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Countdown {
    started_at: Instant,
    budget: Duration,
}

impl Countdown {
    pub fn start(now: Instant) -> Self {
        Self {
            started_at: now,
            budget: Duration::from_secs(COUNTDOWN_SECS),
        }
    }

    /// Whole seconds left, counting 3, 2, 1 and then 0
    pub fn remaining(&self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.started_at).as_secs();
        self.budget.as_secs().saturating_sub(elapsed)
    }

    pub fn is_over(&self, now: Instant) -> bool {
        self.remaining(now) == 0
    }

    pub fn message(&self) -> &'static str {
        COUNTDOWN_MESSAGE
    }
}
