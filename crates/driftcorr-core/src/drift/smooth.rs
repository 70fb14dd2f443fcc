//! Temporal smoothing of an absolute offset sequence.
//!
//! Each axis is median filtered to drop single-frame registration failures,
//! then Gaussian blurred with clamped ends. Clamping flattens the first and
//! last few frames, so the blurred signal is blended back towards the raw
//! offsets with a weight that is exactly 1 at both endpoints and decays
//! towards 0 in the interior.

use tracing::debug;

use crate::error::Result;
use crate::filters::gaussian_blur::gaussian_blur_1d;
use crate::filters::median::median_filter_1d;
use crate::frame::{Axis3, Offset3D, ShiftSequence};
use crate::pipeline::config::SmoothingConfig;

/// Smooth `offsets` frame-wise. Endpoints keep their raw values exactly.
pub fn smooth(offsets: &ShiftSequence, config: &SmoothingConfig) -> Result<ShiftSequence> {
    config.validate()?;
    let n = offsets.len();
    if n < 3 {
        return Ok(offsets.clone());
    }

    let weights = boundary_weights(n, config.mask_sigma, config.mask_cut);
    let mut axes: Vec<Vec<f64>> = Vec::with_capacity(3);
    for axis in [Axis3::X, Axis3::Y, Axis3::Z] {
        let raw = offsets.axis(axis);
        let median = median_filter_1d(&raw, config.median_window);
        let blurred = gaussian_blur_1d(&median, config.blur_sigma, config.blur_cut);
        let blended: Vec<f64> = raw
            .iter()
            .zip(&blurred)
            .zip(&weights)
            .map(|((&r, &b), &w)| lerp(w, b, r))
            .collect();
        axes.push(blended);
    }

    let smoothed: Vec<Offset3D> = (0..n)
        .map(|i| Offset3D::new(axes[0][i], axes[1][i], axes[2][i]))
        .collect();
    debug!(frames = n, "Offsets smoothed");
    Ok(ShiftSequence::from_vec(smoothed))
}

/// Per-frame weight of the raw signal: a blurred endpoint indicator,
/// rescaled so its minimum is 0 and its maximum (the endpoints) is 1.
pub fn boundary_weights(n: usize, sigma: f64, cut: f64) -> Vec<f64> {
    let mut mask = vec![0.0f64; n];
    if let Some(first) = mask.first_mut() {
        *first = 1.0;
    }
    if let Some(last) = mask.last_mut() {
        *last = 1.0;
    }

    // The indicator is symmetric, so is its blur; mirror the first half so
    // both ends carry bit-identical weights.
    let half = gaussian_blur_1d(&mask, sigma, cut);
    let blurred: Vec<f64> = (0..n).map(|i| half[i.min(n - 1 - i)]).collect();
    let lo = blurred.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = blurred.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if hi - lo <= 0.0 {
        return vec![1.0; n];
    }
    blurred.iter().map(|&v| (v - lo) / (hi - lo)).collect()
}

/// `(1 - w) * a + w * b`; exact at `w == 0` and `w == 1`.
fn lerp(w: f64, a: f64, b: f64) -> f64 {
    (1.0 - w) * a + w * b
}
