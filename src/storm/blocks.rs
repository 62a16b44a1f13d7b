/// Alternating block method.
///
/// Cumulative IDF depths at every multiple of dt are differenced into
/// blocks; the blocks are sorted and laid out around the peak, largest
/// first, alternating left and right. The result reproduces the IDF depth
/// for every duration centred on the peak.

use crate::error::{HydroError, HydroResult, require_within};
use crate::idf::IdfCurve;

/// Relative slack allowed when an IDF curve's cumulative depth dips
/// between consecutive durations through floating-point noise.
const DEPTH_NOISE: f64 = 1.0e-9;
const POSITION_NOISE: f64 = 1.0e-9;

/// Incremental depths (mm) in chronological IDF order for `n` blocks of `dt_min`.
pub fn idf_increments(curve: &IdfCurve, return_period: f64, n: usize, dt_min: f64) -> HydroResult<Vec<f64>> {
    let mut increments = Vec::with_capacity(n);
    let mut previous = 0.0;
    for k in 1..=n {
        let depth = curve.depth(return_period, k as f64 * dt_min / 60.0)?;
        let block = depth - previous;
        if block < -DEPTH_NOISE * depth.max(1.0) {
            return Err(HydroError::series(format!(
                "IDF depth decreases between {} and {} min; the curve cannot feed alternating blocks",
                (k - 1) as f64 * dt_min,
                k as f64 * dt_min
            )));
        }
        increments.push(block.max(0.0));
        previous = depth;
    }
    Ok(increments)
}

/// Lays `blocks` out around `peak_position` ∈ [0, 1].
///
/// The largest block lands in the interval that contains p·D (the first
/// one when p = 0), the next goes right of it, then left, and so on. When
/// one side runs out the remaining blocks fill the other side.
pub fn arrange_alternating(blocks: &[f64], peak_position: f64) -> HydroResult<Vec<f64>> {
    require_within("peak position", peak_position, 0.0, 1.0, "0 <= p <= 1")?;
    let n = blocks.len();
    if n == 0 {
        return Err(HydroError::series("no blocks to arrange"));
    }

    let mut sorted = blocks.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let peak = peak_index(peak_position, n);
    let mut out = vec![0.0; n];
    out[peak] = sorted[0];

    let mut left = peak as isize - 1;
    let mut right = peak + 1;
    let mut go_right = true;
    for &block in &sorted[1..] {
        let right_free = right < n;
        let left_free = left >= 0;
        if (go_right && right_free) || !left_free {
            out[right] = block;
            right += 1;
        } else {
            out[left as usize] = block;
            left -= 1;
        }
        go_right = !go_right;
    }
    Ok(out)
}

/// Index of the interval containing `peak_position · n` steps.
pub fn peak_index(peak_position: f64, n: usize) -> usize {
    let steps = (peak_position * n as f64 - POSITION_NOISE).ceil();
    (steps.max(1.0) as usize - 1).min(n.saturating_sub(1))
}

/// Alternating-block hyetograph depths on any IDF curve.
pub fn alternating_blocks(
    curve: &IdfCurve,
    return_period: f64,
    n: usize,
    dt_min: f64,
    peak_position: f64,
) -> HydroResult<Vec<f64>> {
    let blocks = idf_increments(curve, return_period, n, dt_min)?;
    arrange_alternating(&blocks, peak_position)
}
