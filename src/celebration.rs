use rand::Rng;
use std::f64::consts::TAU;

pub const CELEBRATION_MESSAGE: &str = "Hooora!";
const SPARKS_PER_BURST: usize = 30;
/// Intensity gained per tick while the target stays reached
const SPARKLE_GAIN: f64 = 0.5;

/// One spark of the burst drawn around a reached target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spark {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

impl Spark {
    fn around<R: Rng>(center: (f64, f64), rng: &mut R) -> Self {
        let angle = rng.gen_range(0.0..TAU);
        let dist = rng.gen_range(20.0..50.0);
        Self {
            x: center.0 + dist * angle.cos(),
            y: center.1 + dist * angle.sin(),
            size: rng.gen_range(2.0..5.0),
        }
    }
}

/// Success effect shown while the point sits on the target.
///
/// Every tick inside the reach threshold re-scatters the sparks and bumps
/// `sparkle`; the sparks fade as `sparkle` grows. Leaving the target resets it.
#[derive(Debug, Clone, Default)]
pub struct Fireworks {
    pub sparks: Vec<Spark>,
    pub sparkle: f64,
    pub is_active: bool,
}

impl Fireworks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignite<R: Rng>(&mut self, center: (f64, f64), rng: &mut R) {
        if !self.is_active {
            log::debug!("target reached at ({:.1}, {:.1})", center.0, center.1);
        }
        self.is_active = true;
        self.sparkle += SPARKLE_GAIN;
        self.sparks.clear();
        for _ in 0..SPARKS_PER_BURST {
            self.sparks.push(Spark::around(center, rng));
        }
    }

    pub fn extinguish(&mut self) {
        self.is_active = false;
        self.sparkle = 0.0;
        self.sparks.clear();
    }

    /// Spark opacity on a 0..=255 scale
    pub fn alpha(&self) -> f64 {
        (200.0 - self.sparkle * 10.0).clamp(0.0, 255.0)
    }

    pub fn is_faded(&self) -> bool {
        self.alpha() <= 0.0
    }
}
