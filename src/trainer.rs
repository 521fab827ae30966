use std::time::Instant;

use rand::{rngs::StdRng, SeedableRng};

use crate::celebration::Fireworks;
use crate::expr::{self, CompiledExpr};
use crate::input::{apply_impulses, HeldImpulses, Impulse};
use crate::scoring::{self, Score};
use crate::series::{reference_curve, Sample, SeriesRecorder};
use crate::session::{
    Countdown, ExerciseConfig, ExerciseInputs, Mode, SessionPhase, TrainerError,
    DEFAULT_RADIUS_STEP,
};
use crate::sweep::SweepClock;
use crate::target::{is_within_reach, random_target, GotoAnimation};
use crate::util::wrap_phase;

const INITIAL_RADIUS: f64 = 100.0;
const INITIAL_SWEEP_STEP: f64 = 0.005;

/// The live polar position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentPoint {
    pub radius: f64,
    pub phase: f64,
}

impl CurrentPoint {
    pub fn to_cartesian(self) -> (f64, f64) {
        Sample::new(self.phase, self.radius).to_cartesian()
    }
}

/// Whole trainer state: one point, two modes, one exercise run at a time.
///
/// Discrete actions (`start`, `reset`, `switch_mode`, ...) and `on_tick` are
/// the only ways to mutate it; a renderer reads it between ticks.
#[derive(Debug)]
pub struct Trainer {
    mode: Mode,
    phase: SessionPhase,
    point: CurrentPoint,
    config: ExerciseConfig,
    reference_fn: CompiledExpr,
    clock: SweepClock,
    reference: Vec<Sample>,
    series: SeriesRecorder,
    countdown: Option<Countdown>,
    score: Option<Score>,
    show_reference: bool,
    continue_moving: bool,
    held: HeldImpulses,
    target: (f64, f64),
    goto: Option<GotoAnimation>,
    fireworks: Fireworks,
    last_error: Option<TrainerError>,
    rng: StdRng,
}

impl Trainer {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic target placement and fireworks, for tests and replays
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(mut rng: StdRng) -> Self {
        let config = ExerciseConfig::new(
            INITIAL_RADIUS.to_string(),
            0.0,
            std::f64::consts::PI,
            INITIAL_SWEEP_STEP,
            DEFAULT_RADIUS_STEP,
        );
        let target = random_target(&mut rng);

        Self {
            mode: Mode::Target,
            phase: SessionPhase::Idle,
            point: CurrentPoint {
                radius: INITIAL_RADIUS,
                phase: 0.0,
            },
            clock: SweepClock::new(config.phi_from, config.phi_to, config.sweep_step),
            config,
            reference_fn: CompiledExpr::constant(INITIAL_RADIUS),
            reference: Vec::new(),
            series: SeriesRecorder::new(),
            countdown: None,
            score: None,
            show_reference: false,
            continue_moving: true,
            held: HeldImpulses::default(),
            target,
            goto: None,
            fireworks: Fireworks::new(),
            last_error: None,
            rng,
        }
    }

    pub fn start(&mut self, config: ExerciseConfig) -> Result<(), TrainerError> {
        self.start_at(config, Instant::now())
    }

    /// Compile the formula and begin the countdown at `now`.
    ///
    /// On failure nothing changes apart from `last_error`.
    pub fn start_at(&mut self, config: ExerciseConfig, now: Instant) -> Result<(), TrainerError> {
        let compiled = match expr::compile(&config.expression) {
            Ok(f) => f,
            Err(e) => {
                log::warn!("rejected ρ(φ) = '{}': {e}", config.expression);
                let err = TrainerError::from(e);
                self.last_error = Some(err.clone());
                return Err(err);
            }
        };

        if self.mode != Mode::Exercise {
            self.switch_mode(Mode::Exercise);
        }

        self.reference = reference_curve(
            |p| compiled.eval(p),
            config.phi_from,
            config.phi_to,
            config.sweep_step,
        );
        self.clock = SweepClock::new(config.phi_from, config.phi_to, config.sweep_step);
        self.reference_fn = compiled;
        self.config = config;
        self.rewind();
        self.countdown = Some(Countdown::start(now));
        self.phase = SessionPhase::CountingDown;
        self.last_error = None;

        log::debug!(
            "exercise armed: ρ(φ) = {}, φ {:.3}..{:.3} rad, step {:.5} rad, {} reference samples",
            self.config.expression,
            self.config.phi_from,
            self.config.phi_to,
            self.config.sweep_step,
            self.reference.len()
        );
        Ok(())
    }

    /// Parse the raw drawer inputs, then [`Trainer::start`]
    pub fn start_from_inputs(&mut self, inputs: &ExerciseInputs) -> Result<(), TrainerError> {
        self.start_from_inputs_at(inputs, Instant::now())
    }

    pub fn start_from_inputs_at(
        &mut self,
        inputs: &ExerciseInputs,
        now: Instant,
    ) -> Result<(), TrainerError> {
        match ExerciseConfig::from_inputs(inputs) {
            Ok(config) => self.start_at(config, now),
            Err(e) => {
                log::warn!("rejected exercise inputs: {e}");
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Back to Idle from any state, keeping the configured curve
    pub fn reset(&mut self) {
        log::debug!("exercise reset from {}", self.phase);
        self.countdown = None;
        self.rewind();
        self.phase = SessionPhase::Idle;
    }

    pub fn switch_mode(&mut self, mode: Mode) {
        log::debug!("switching mode {} -> {mode}", self.mode);
        self.countdown = None;
        self.series.clear();
        self.score = None;
        self.phase = SessionPhase::Idle;
        self.goto = None;
        self.fireworks.extinguish();
        self.mode = mode;
    }

    pub fn toggle_mode(&mut self) {
        let next = match self.mode {
            Mode::Target => Mode::Exercise,
            Mode::Exercise => Mode::Target,
        };
        self.switch_mode(next);
    }

    pub fn set_show_reference(&mut self, show: bool) {
        self.show_reference = show;
    }

    pub fn set_continue(&mut self, moving: bool) {
        self.continue_moving = moving;
    }

    /// Start gliding towards a polar destination. Only meaningful in Target mode.
    pub fn go_to_target(&mut self, radius: f64, angle_deg: f64) -> bool {
        if self.mode != Mode::Target || !radius.is_finite() || !angle_deg.is_finite() {
            return false;
        }
        self.goto = Some(GotoAnimation::new(radius, angle_deg));
        true
    }

    pub fn reset_target_position(&mut self) {
        self.target = random_target(&mut self.rng);
        self.fireworks.extinguish();
        log::debug!("target moved to ({:.1}, {:.1})", self.target.0, self.target.1);
    }

    pub fn press(&mut self, impulse: Impulse) {
        self.held.press(impulse);
    }

    pub fn on_tick(&mut self) {
        self.on_tick_at(Instant::now());
    }

    /// Advance everything that moves by one tick
    pub fn on_tick_at(&mut self, now: Instant) {
        if self.mode == Mode::Target && self.continue_moving {
            if let Some(anim) = self.goto {
                if anim.step(&mut self.point.radius, &mut self.point.phase) {
                    self.goto = None;
                }
            }
        }

        if self.mode == Mode::Exercise {
            match self.phase {
                SessionPhase::CountingDown => {
                    if self.countdown.is_some_and(|c| c.is_over(now)) {
                        self.begin_running();
                    }
                    // no movement while counting down, including the tick that says go
                    self.held.take();
                    return;
                }
                SessionPhase::Running => self.sweep_step(),
                SessionPhase::Idle | SessionPhase::Done => {}
            }
        }

        self.point.phase = wrap_phase(self.point.phase);

        if self.mode == Mode::Target {
            if is_within_reach(self.point.to_cartesian(), self.target) {
                self.fireworks.ignite(self.target, &mut self.rng);
            } else if self.fireworks.is_active {
                self.fireworks.extinguish();
            }
        }

        let held = self.held.take();
        if self.continue_moving {
            let allow_rotation = self.phase != SessionPhase::Running;
            apply_impulses(
                &held,
                &mut self.point.radius,
                &mut self.point.phase,
                self.config.radius_step,
                allow_rotation,
            );
        }
    }

    fn begin_running(&mut self) {
        self.countdown = None;
        self.rewind();
        self.phase = SessionPhase::Running;
        log::debug!("countdown over, sweeping");
    }

    // Record at the cursor, then advance; the run ends once the advanced cursor reaches φ to
    fn sweep_step(&mut self) {
        let cursor = self.clock.cursor();
        self.series
            .record(cursor, self.reference_fn.eval(cursor), self.point.radius);
        let finished = self.clock.tick();
        self.point.phase = self.clock.cursor();

        if finished {
            self.phase = SessionPhase::Done;
            self.score = scoring::score(self.series.true_pts(), self.series.user_pts());
            match self.score {
                Some(s) => log::info!(
                    "exercise done: {} samples, accuracy {:.1}%",
                    self.series.len(),
                    s.percent
                ),
                None => log::info!("exercise done with no samples"),
            }
        }
    }

    fn rewind(&mut self) {
        self.clock.reset(self.config.phi_from);
        self.point.radius = self.reference_fn.eval(self.config.phi_from);
        self.point.phase = wrap_phase(self.config.phi_from);
        self.series.clear();
        self.score = None;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn point(&self) -> CurrentPoint {
        self.point
    }

    pub fn config(&self) -> &ExerciseConfig {
        &self.config
    }

    pub fn cursor(&self) -> f64 {
        self.clock.cursor()
    }

    /// Pre-sweep snapshot of the whole reference curve
    pub fn reference(&self) -> &[Sample] {
        &self.reference
    }

    /// The part of the reference curve the sweep has reached so far
    pub fn revealed_reference(&self) -> &[Sample] {
        let end = match self.phase {
            SessionPhase::Done => return &self.reference,
            SessionPhase::Running => self.clock.cursor(),
            _ => return &[],
        };
        let n = self.reference.partition_point(|s| s.phase <= end);
        &self.reference[..n]
    }

    pub fn true_pts(&self) -> &[Sample] {
        self.series.true_pts()
    }

    pub fn user_pts(&self) -> &[Sample] {
        self.series.user_pts()
    }

    pub fn series(&self) -> &SeriesRecorder {
        &self.series
    }

    pub fn countdown_remaining(&self, now: Instant) -> Option<u64> {
        self.countdown.map(|c| c.remaining(now))
    }

    pub fn countdown_message(&self) -> Option<&'static str> {
        self.countdown.map(|c| c.message())
    }

    /// Accuracy of the finished run; `None` until Done or if nothing was recorded
    pub fn score(&self) -> Option<Score> {
        match self.phase {
            SessionPhase::Done => self.score,
            _ => None,
        }
    }

    pub fn last_error(&self) -> Option<&TrainerError> {
        self.last_error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn target(&self) -> (f64, f64) {
        self.target
    }

    pub fn fireworks(&self) -> &Fireworks {
        &self.fireworks
    }

    pub fn is_animating(&self) -> bool {
        self.goto.is_some()
    }

    pub fn show_reference(&self) -> bool {
        self.show_reference
    }

    pub fn continue_moving(&self) -> bool {
        self.continue_moving
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn is_finished(&self) -> bool {
        self.phase == SessionPhase::Done
    }
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new()
    }
}
