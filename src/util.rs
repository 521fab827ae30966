use std::f64::consts::TAU;

pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

pub fn root_mean_square(data: &[f64]) -> Option<f64> {
    let squares = data.iter().map(|v| v * v).collect::<Vec<f64>>();
    mean(&squares).map(f64::sqrt)
}

pub fn mean_abs(data: &[f64]) -> Option<f64> {
    let magnitudes = data.iter().map(|v| v.abs()).collect::<Vec<f64>>();
    mean(&magnitudes)
}

/// Wrap an angle into [0, 2π)
pub fn wrap_phase(phase: f64) -> f64 {
    let wrapped = phase.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}
