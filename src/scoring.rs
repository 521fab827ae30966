use crate::series::Sample;
use crate::util::{mean_abs, root_mean_square};
use itertools::Itertools;

/// Displayed accuracy at or above this counts as a good run
pub const GOOD_THRESHOLD: f64 = 80.0;

/// Accuracy of one finished exercise run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub percent: f64,
}

impl Score {
    /// Percentage rounded to the one decimal shown on screen
    pub fn display_percent(&self) -> f64 {
        (self.percent * 10.0).round() / 10.0
    }

    /// The threshold is applied to the displayed value, so 79.96 counts as 80.0
    pub fn is_good(&self) -> bool {
        self.display_percent() >= GOOD_THRESHOLD
    }

    pub fn verdict(&self) -> &'static str {
        if self.is_good() {
            "Great job!"
        } else {
            "Try again for better precision."
        }
    }
}

/// Score a run: RMSE between the traces normalised by the mean |reference|.
///
/// Returns `None` when nothing was recorded. A reference whose mean magnitude
/// is exactly zero is normalised by 1 instead. Only the lower end is clamped.
///
/// Panics if the two slices differ in length.
pub fn score(true_pts: &[Sample], user_pts: &[Sample]) -> Option<Score> {
    let errors = true_pts
        .iter()
        .zip_eq(user_pts.iter())
        .map(|(t, u)| u.radius - t.radius)
        .collect::<Vec<f64>>();
    let references = true_pts.iter().map(|t| t.radius).collect::<Vec<f64>>();

    let rmse = root_mean_square(&errors)?;
    let mean_r = match mean_abs(&references)? {
        m if m == 0.0 => 1.0,
        m => m,
    };

    let accuracy = 1.0 - rmse / mean_r;
    // f64::max drops NaN, so a poisoned trace scores 0 rather than NaN
    Some(Score {
        percent: accuracy.max(0.0) * 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(radii: &[f64]) -> Vec<Sample> {
        radii
            .iter()
            .enumerate()
            .map(|(i, &r)| Sample::new(i as f64 * 0.1, r))
            .collect()
    }

    #[test]
    fn test_empty_series_has_no_score() {
        assert_eq!(score(&[], &[]), None);
    }

    #[test]
    fn test_perfect_tracking_scores_100() {
        let t = trace(&[100.0, 100.0, 100.0]);
        let s = score(&t, &t).unwrap();
        assert_eq!(s.percent, 100.0);
        assert!(s.is_good());
        assert_eq!(s.verdict(), "Great job!");
    }

    #[test]
    fn test_known_error() {
        // rmse = 10, mean |r| = 100 -> 90%
        let t = trace(&[100.0, 100.0]);
        let u = trace(&[110.0, 90.0]);
        let s = score(&t, &u).unwrap();
        assert!((s.percent - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamped_at_zero() {
        let t = trace(&[1.0, 1.0]);
        let u = trace(&[500.0, -500.0]);
        assert_eq!(score(&t, &u).unwrap().percent, 0.0);
    }

    #[test]
    fn test_zero_reference_normalised_by_one() {
        let t = trace(&[0.0, 0.0, 0.0, 0.0]);
        let u = trace(&[0.5, -0.5, 0.5, -0.5]);
        let s = score(&t, &u).unwrap();
        assert!((s.percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_reference_large_error_clamps() {
        let t = trace(&[0.0, 0.0]);
        let u = trace(&[3.0, 3.0]);
        assert_eq!(score(&t, &u).unwrap().percent, 0.0);
    }

    #[test]
    fn test_nan_trace_scores_zero() {
        let t = trace(&[f64::NAN, 1.0]);
        let u = trace(&[1.0, 1.0]);
        assert_eq!(score(&t, &u).unwrap().percent, 0.0);
    }

    #[test]
    fn test_score_is_idempotent() {
        let t = trace(&[200.0, -120.0, 33.0, 5.0]);
        let u = trace(&[190.0, -100.0, 0.0, 9.0]);
        assert_eq!(score(&t, &u), score(&t, &u));
    }

    #[test]
    fn test_good_threshold_uses_displayed_value() {
        assert!(Score { percent: 79.96 }.is_good());
        assert!(!Score { percent: 79.94 }.is_good());
        assert_eq!(Score { percent: 79.94 }.verdict(), "Try again for better precision.");
    }

    #[test]
    #[should_panic]
    fn test_misaligned_series_panics() {
        let _ = score(&trace(&[1.0, 2.0]), &trace(&[1.0]));
    }
}
