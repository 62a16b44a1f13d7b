/// SCS curve number method (metric).
///
/// S = 25400/CN − 254 (mm), Ia = λ·S, Q = (P − Ia)²/(P − Ia + S) for P > Ia.

use crate::error::{HydroResult, require_curve_number, require_within};
use crate::model::AntecedentMoisture;

/// Default initial abstraction ratio.
pub const DEFAULT_LAMBDA: f64 = 0.2;

pub fn potential_retention(cn: f64) -> HydroResult<f64> {
    require_curve_number(cn)?;
    Ok(25400.0 / cn - 254.0)
}

pub fn initial_abstraction(retention_mm: f64, lambda: f64) -> HydroResult<f64> {
    require_within("lambda", lambda, 0.0, 1.0, "0 <= lambda <= 1")?;
    Ok(lambda * retention_mm)
}

/// Direct runoff (mm) for a cumulative rainfall depth `p_mm`.
pub fn scs_runoff(p_mm: f64, cn: f64, lambda: f64) -> HydroResult<f64> {
    let s = potential_retention(cn)?;
    let ia = initial_abstraction(s, lambda)?;
    Ok(runoff_depth(p_mm, s, ia))
}

fn runoff_depth(p_mm: f64, s: f64, ia: f64) -> f64 {
    if p_mm <= ia {
        0.0
    } else {
        (p_mm - ia).powi(2) / (p_mm - ia + s)
    }
}

/// CN for the requested moisture class from the average-condition CN,
/// clamped to [30, 100].
pub fn adjust_cn_for_amc(cn: f64, amc: AntecedentMoisture) -> HydroResult<f64> {
    require_curve_number(cn)?;
    let adjusted = match amc {
        AntecedentMoisture::Average => cn,
        AntecedentMoisture::Dry => cn / (2.281 - 0.01281 * cn),
        AntecedentMoisture::Wet => cn / (0.427 + 0.00573 * cn),
    };
    Ok(adjusted.clamp(30.0, 100.0))
}

/// Incremental excess for each interval from the cumulative rainfall curve.
///
/// Cumulative runoff is differenced step by step; each increment is bounded
/// by the rainfall of its own interval.
pub fn excess_from_cumulative(cumulative_mm: &[f64], cn: f64, lambda: f64) -> HydroResult<Vec<f64>> {
    let s = potential_retention(cn)?;
    let ia = initial_abstraction(s, lambda)?;

    let mut excess = Vec::with_capacity(cumulative_mm.len());
    let (mut previous_p, mut previous_q) = (0.0, 0.0);
    for &p in cumulative_mm {
        let q = runoff_depth(p, s, ia);
        let rain = (p - previous_p).max(0.0);
        excess.push((q - previous_q).clamp(0.0, rain));
        previous_p = p;
        previous_q = q;
    }
    Ok(excess)
}
