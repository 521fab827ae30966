use ratatui::layout::Rect;

/// Radius spacing of the polar grid rings
pub const RING_SPACING: f64 = 50.0;
/// Angle between polar grid spokes, degrees
pub const SPOKE_SPACING_DEG: f64 = 30.0;
/// Most rings drawn before the spacing widens
pub const MAX_GRID_RINGS: f64 = 12.0;
/// Smallest radius the polar grid ever covers
pub const MIN_GRID_RADIUS: f64 = 300.0;
/// Above this the strip plot switches to a log scale
pub const LOG_SCALE_THRESHOLD: f64 = 600.0;

/// Outer ring of the polar grid for traces peaking at `max_radius`
pub fn grid_radius(max_radius: Option<f64>) -> f64 {
    let peak = max_radius
        .filter(|r| r.is_finite())
        .map_or(MIN_GRID_RADIUS, |r| r.max(MIN_GRID_RADIUS));
    (peak / RING_SPACING).ceil() * RING_SPACING + RING_SPACING
}

/// Ring spacing for a grid reaching `outer`: [`RING_SPACING`] while that gives at
/// most [`MAX_GRID_RINGS`] rings, then the next 1-2-5 step that does.
pub fn ring_spacing(outer: f64) -> f64 {
    let wanted = outer / MAX_GRID_RINGS;
    if !wanted.is_finite() || wanted <= RING_SPACING {
        return RING_SPACING;
    }
    let decade = 10f64.powi(wanted.log10().floor() as i32);
    [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * decade)
        .find(|&s| s >= wanted)
        .unwrap_or(10.0 * decade)
}

/// Ring radii from the first ring out to `outer`
pub fn ring_radii(outer: f64) -> Vec<f64> {
    if !outer.is_finite() || outer <= 0.0 {
        return Vec::new();
    }
    let spacing = ring_spacing(outer);
    let rings = ((outer / spacing).floor() as usize).min(MAX_GRID_RINGS as usize);
    (1..=rings).map(|i| i as f64 * spacing).collect()
}

/// Spoke angles in degrees, 0 through 330
pub fn spoke_angles() -> Vec<f64> {
    let n = (360.0 / SPOKE_SPACING_DEG) as usize;
    (0..n).map(|i| i as f64 * SPOKE_SPACING_DEG).collect()
}

/// Canvas bounds that keep circles round in terminal cells.
///
/// Cells are roughly twice as tall as they are wide, so the shorter plane
/// axis gets `half_w`/`half_h` and the other axis is widened to match the
/// area's aspect.
pub fn plane_bounds(area: Rect, half_w: f64, half_h: f64) -> ([f64; 2], [f64; 2]) {
    let cols = f64::from(area.width.max(1));
    let rows = f64::from(area.height.max(1)) * 2.0;

    let (mut hw, mut hh) = (half_w, half_h);
    if hw / hh < cols / rows {
        hw = hh * cols / rows;
    } else {
        hh = hw * rows / cols;
    }
    ([-hw, hw], [-hh, hh])
}

/// Y scale of the ρ-over-φ strip plot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripScale {
    pub min: f64,
    pub max: f64,
    pub log: bool,
}

impl StripScale {
    /// Scale spanning all finite values; `None` when there are none
    pub fn new<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| {
                Some(acc.map_or((v, v), |(lo, hi)| (lo.min(v), hi.max(v))))
            })?;
        Some(Self {
            min,
            max,
            log: max > LOG_SCALE_THRESHOLD,
        })
    }

    /// Map a radius onto the plotted axis
    pub fn project(&self, r: f64) -> f64 {
        if self.log {
            (r - self.min + 1.0).max(1.0).log10()
        } else {
            r
        }
    }

    /// Axis bounds in projected units; a flat trace gets a unit band
    pub fn bounds(&self) -> [f64; 2] {
        let (lo, hi) = (self.project(self.min), self.project(self.max));
        if hi - lo < f64::EPSILON {
            [lo - 1.0, hi + 1.0]
        } else {
            [lo, hi]
        }
    }

    /// `n + 1` evenly spaced axis labels, expressed as radii
    pub fn tick_values(&self, n: usize) -> Vec<f64> {
        let n = n.max(1);
        let [lo, hi] = self.bounds();
        (0..=n)
            .map(|i| {
                let y = lo + (hi - lo) * i as f64 / n as f64;
                if self.log {
                    10f64.powf(y) + self.min - 1.0
                } else {
                    y
                }
            })
            .collect()
    }
}

/// X bounds of the strip plot in degrees
pub fn strip_x_bounds(phi_from_deg: f64, phi_to_deg: f64) -> [f64; 2] {
    if phi_to_deg - phi_from_deg > f64::EPSILON {
        [phi_from_deg, phi_to_deg]
    } else {
        [phi_from_deg, phi_from_deg + 1.0]
    }
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
