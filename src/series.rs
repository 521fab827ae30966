use itertools::Itertools;

/// One polar sample: phase in radians, radius in plane units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub phase: f64,
    pub radius: f64,
}

impl Sample {
    pub fn new(phase: f64, radius: f64) -> Self {
        Self { phase, radius }
    }

    pub fn to_cartesian(self) -> (f64, f64) {
        (
            self.radius * self.phase.cos(),
            self.radius * self.phase.sin(),
        )
    }
}

impl From<(f64, f64)> for Sample {
    fn from(v: (f64, f64)) -> Self {
        Sample {
            phase: v.0,
            radius: v.1,
        }
    }
}

impl From<Sample> for (f64, f64) {
    fn from(s: Sample) -> Self {
        (s.phase, s.radius)
    }
}

/// Snapshot of the whole reference curve, taken before a sweep begins.
///
/// Phases are accumulated step by step from `phi_from` so they line up bit
/// for bit with the cursor of a [`crate::sweep::SweepClock`] using the same
/// step: `phi_from` itself, then every later phase strictly below `phi_to`.
/// That is exactly the set of cursors a sweep records, and it never passes
/// `phi_to`.
pub fn reference_curve<F>(f: F, phi_from: f64, phi_to: f64, step: f64) -> Vec<Sample>
where
    F: Fn(f64) -> f64,
{
    let mut pts = Vec::new();
    if !(step.is_finite() && step > 0.0) || phi_from > phi_to {
        return pts;
    }

    let mut phase = phi_from;
    loop {
        pts.push(Sample::new(phase, f(phase)));
        let next = phase + step;
        // a step lost in rounding would never reach phi_to
        if next == phase || next >= phi_to {
            break;
        }
        phase = next;
    }
    pts
}

/// Paired reference/user traces captured while an exercise runs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesRecorder {
    true_pts: Vec<Sample>,
    user_pts: Vec<Sample>,
}

impl SeriesRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one tick's worth of samples; both traces grow together
    pub fn record(&mut self, phase: f64, reference_radius: f64, user_radius: f64) {
        self.true_pts.push(Sample::new(phase, reference_radius));
        self.user_pts.push(Sample::new(phase, user_radius));
    }

    pub fn clear(&mut self) {
        self.true_pts.clear();
        self.user_pts.clear();
    }

    pub fn true_pts(&self) -> &[Sample] {
        &self.true_pts
    }

    pub fn user_pts(&self) -> &[Sample] {
        &self.user_pts
    }

    pub fn len(&self) -> usize {
        self.true_pts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.true_pts.is_empty()
    }

    /// Largest |radius| seen across both traces
    pub fn max_abs_radius(&self) -> Option<f64> {
        self.true_pts
            .iter()
            .chain(self.user_pts.iter())
            .map(|s| s.radius.abs())
            .filter(|r| r.is_finite())
            .fold(None, |acc, r| Some(acc.map_or(r, |m: f64| m.max(r))))
    }

    /// Iterate index-aligned (true, user) pairs
    pub fn pairs(&self) -> impl Iterator<Item = (&Sample, &Sample)> {
        self.true_pts.iter().zip_eq(self.user_pts.iter())
    }
}
