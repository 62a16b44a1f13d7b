/// Intensity-duration-frequency engine.
///
/// Submodules:
/// - `regional`      — DINAGUA regional curve (P3,10 with CT and CA factors)
/// - `international` — Sherman, Bernard and Koutsoyiannis formulas
///
/// `IdfCurve` is the single entry point used by the storm generator: it
/// evaluates any supported curve in hours and returns an `IdfResult`.

pub mod international;
pub mod regional;

use serde::{Deserialize, Serialize};

use crate::error::{HydroError, HydroResult, require_positive};
use crate::model::{CatchmentParameters, IdfResult};

pub use international::{
    BernardCoefficients, IdfCoefficients, IdfFormula, KoutsoyiannisCoefficients,
    ShermanCoefficients,
};
pub use regional::{area_factor, p3_10_for_department, regional_intensity, return_period_factor};

/// Durations (h) of a standard IDF table, 5 minutes to 24 hours.
pub const STANDARD_DURATIONS_HR: [f64; 10] = [0.083, 0.167, 0.25, 0.5, 1.0, 2.0, 3.0, 6.0, 12.0, 24.0];
/// Return periods (years) of a standard IDF table.
pub const STANDARD_RETURN_PERIODS: [f64; 6] = [2.0, 5.0, 10.0, 25.0, 50.0, 100.0];

// ---------------------------------------------------------------------------
// Curve selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IdfCurve {
    /// Regional curve; `area_km2 = None` evaluates point rainfall.
    Regional {
        p3_10: f64,
        #[serde(default)]
        area_km2: Option<f64>,
    },
    /// Generic fitted formula.
    International { coefficients: IdfCoefficients },
}

impl IdfCurve {
    pub fn regional(p3_10: f64, area_km2: Option<f64>) -> Self {
        IdfCurve::Regional { p3_10, area_km2 }
    }

    /// Regional curve with areal reduction for the catchment's area.
    pub fn for_catchment(catchment: &CatchmentParameters) -> Self {
        IdfCurve::Regional {
            p3_10: catchment.p3_10,
            area_km2: Some(catchment.area_km2()),
        }
    }

    /// Generic curve, checked against the requested formula.
    pub fn international(formula: IdfFormula, coefficients: IdfCoefficients) -> HydroResult<Self> {
        if coefficients.formula() != formula {
            return Err(HydroError::MethodMismatch {
                expected: formula.as_str(),
                found: coefficients.formula().as_str(),
            });
        }
        Ok(IdfCurve::International { coefficients })
    }

    pub fn label(&self) -> &'static str {
        match self {
            IdfCurve::Regional { .. } => "regional",
            IdfCurve::International { coefficients } => coefficients.formula().as_str(),
        }
    }

    /// Sherman coefficients, when this curve is a Sherman fit.
    pub fn sherman(&self) -> Option<&ShermanCoefficients> {
        match self {
            IdfCurve::International { coefficients: IdfCoefficients::Sherman(c) } => Some(c),
            _ => None,
        }
    }

    pub fn evaluate(&self, return_period: f64, duration_hr: f64) -> HydroResult<IdfResult> {
        match self {
            IdfCurve::Regional { p3_10, area_km2 } => {
                regional_intensity(*p3_10, return_period, duration_hr, *area_km2)
            }
            IdfCurve::International { coefficients } => {
                require_positive("duration (h)", duration_hr)?;
                let intensity = coefficients.intensity(return_period, duration_hr * 60.0)?;
                Ok(IdfResult {
                    return_period,
                    duration_hr,
                    intensity_mmhr: intensity,
                    depth_mm: intensity * duration_hr,
                    ct: 1.0,
                    ca: 1.0,
                })
            }
        }
    }

    pub fn depth(&self, return_period: f64, duration_hr: f64) -> HydroResult<f64> {
        self.evaluate(return_period, duration_hr).map(|r| r.depth_mm)
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Intensity and depth matrices, one row per duration, one column per return period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdfTable {
    pub curve: String,
    pub durations_hr: Vec<f64>,
    pub return_periods: Vec<f64>,
    pub intensities_mmhr: Vec<Vec<f64>>,
    pub depths_mm: Vec<Vec<f64>>,
}

impl IdfTable {
    /// Intensity at (duration index, return period index).
    pub fn intensity(&self, row: usize, col: usize) -> Option<f64> {
        self.intensities_mmhr.get(row).and_then(|r| r.get(col)).copied()
    }
}

/// Evaluates `curve` over every duration × return period pair.
///
/// Fails if any cell is not strictly positive.
pub fn idf_table(curve: &IdfCurve, durations_hr: &[f64], return_periods: &[f64]) -> HydroResult<IdfTable> {
    if durations_hr.is_empty() || return_periods.is_empty() {
        return Err(HydroError::series("IDF table needs at least one duration and one return period"));
    }

    let mut intensities = Vec::with_capacity(durations_hr.len());
    let mut depths = Vec::with_capacity(durations_hr.len());
    for &d in durations_hr {
        let mut i_row = Vec::with_capacity(return_periods.len());
        let mut p_row = Vec::with_capacity(return_periods.len());
        for &tr in return_periods {
            let r = curve.evaluate(tr, d)?;
            if !(r.intensity_mmhr > 0.0 && r.intensity_mmhr.is_finite()) {
                return Err(HydroError::out_of_range(
                    "IDF intensity (mm/h)",
                    r.intensity_mmhr,
                    "> 0 for every table cell",
                ));
            }
            i_row.push(r.intensity_mmhr);
            p_row.push(r.depth_mm);
        }
        intensities.push(i_row);
        depths.push(p_row);
    }

    Ok(IdfTable {
        curve: curve.label().to_string(),
        durations_hr: durations_hr.to_vec(),
        return_periods: return_periods.to_vec(),
        intensities_mmhr: intensities,
        depths_mm: depths,
    })
}

/// Standard table (5 min to 24 h, Tr 2 to 100).
pub fn standard_table(curve: &IdfCurve) -> HydroResult<IdfTable> {
    idf_table(curve, &STANDARD_DURATIONS_HR, &STANDARD_RETURN_PERIODS)
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Depth (mm) of a constant intensity (mm/h) held for `duration_min`.
pub fn depth_from_intensity(intensity_mmhr: f64, duration_min: f64) -> HydroResult<f64> {
    require_positive("intensity (mm/h)", intensity_mmhr)?;
    require_positive("duration (min)", duration_min)?;
    Ok(intensity_mmhr * duration_min / 60.0)
}

/// Mean intensity (mm/h) of `depth_mm` spread over `duration_min`.
pub fn intensity_from_depth(depth_mm: f64, duration_min: f64) -> HydroResult<f64> {
    require_positive("depth (mm)", depth_mm)?;
    require_positive("duration (min)", duration_min)?;
    Ok(depth_mm * 60.0 / duration_min)
}
