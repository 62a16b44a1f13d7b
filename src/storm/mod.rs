/// Temporal storm generator.
///
/// Turns a design depth into a hyetograph at a fixed step. Submodules:
/// - `blocks`   — alternating blocks on any IDF curve
/// - `chicago`  — Keifer & Chu storm and its two-peak variant
/// - `curves`   — SCS 24 h and Huff cumulative-mass tables
/// - `bimodal`  — two triangular peaks with a volume split
/// - `custom`   — shapes for a given total depth, measured events
///
/// Every generated series sums to the target depth (IDF depth or the
/// caller's override) and its cumulative curve never decreases.

pub mod bimodal;
pub mod blocks;
pub mod chicago;
pub mod curves;
pub mod custom;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{HydroError, HydroResult, require_positive};
use crate::idf::{IdfCurve, ShermanCoefficients};
use crate::model::Hyetograph;

pub use blocks::{alternating_blocks, arrange_alternating};
pub use curves::{HuffProbability, HuffQuartile, ScsType};
pub use custom::measured_event;

/// Fixed duration of a GZ storm (h).
pub const GZ_DURATION_HR: f64 = 6.0;
/// GZ places the peak block in the first hour of six.
pub const GZ_PEAK_POSITION: f64 = 1.0 / 6.0;
/// Duration of the SCS dimensionless distributions (h).
pub const SCS_DURATION_HR: f64 = 24.0;
/// Default duration of two-peak storms (h).
pub const BIMODAL_DURATION_HR: f64 = 6.0;

/// Relative tolerance on the generated total against the target depth.
const CONSERVATION_TOLERANCE: f64 = 1.0e-6;

fn default_peak_position() -> f64 {
    0.5
}
fn default_advancement() -> f64 {
    chicago::DEFAULT_ADVANCEMENT
}
fn default_first_peak() -> f64 {
    bimodal::DEFAULT_FIRST_PEAK
}
fn default_second_peak() -> f64 {
    bimodal::DEFAULT_SECOND_PEAK
}
fn default_volume_split() -> f64 {
    bimodal::DEFAULT_VOLUME_SPLIT
}
fn default_peak_width() -> f64 {
    bimodal::DEFAULT_PEAK_WIDTH
}

// ---------------------------------------------------------------------------
// Methods
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum StormMethod {
    /// DINAGUA 6 h storm, alternating blocks with the peak in the first hour.
    Gz,
    AlternatingBlocks {
        #[serde(default = "default_peak_position")]
        peak_position: f64,
    },
    Chicago {
        #[serde(default = "default_advancement")]
        advancement: f64,
    },
    Scs { distribution: ScsType },
    Huff {
        quartile: HuffQuartile,
        #[serde(default)]
        probability: HuffProbability,
    },
    Bimodal {
        #[serde(default = "default_first_peak")]
        first_peak: f64,
        #[serde(default = "default_second_peak")]
        second_peak: f64,
        #[serde(default = "default_volume_split")]
        volume_split: f64,
        #[serde(default = "default_peak_width")]
        peak_width: f64,
    },
    BimodalChicago {
        #[serde(default = "default_first_peak")]
        first_peak: f64,
        #[serde(default = "default_second_peak")]
        second_peak: f64,
        #[serde(default = "default_volume_split")]
        volume_split: f64,
    },
    Uniform,
    Triangular {
        #[serde(default = "default_peak_position")]
        peak_position: f64,
    },
}

impl StormMethod {
    pub fn label(&self) -> String {
        match self {
            StormMethod::Gz => "gz".to_string(),
            StormMethod::AlternatingBlocks { .. } => "alternating_blocks".to_string(),
            StormMethod::Chicago { .. } => "chicago".to_string(),
            StormMethod::Scs { distribution } => distribution.as_str().to_string(),
            StormMethod::Huff { quartile, probability } => {
                format!("huff_{}_p{}", quartile.as_str(), probability.percent())
            }
            StormMethod::Bimodal { .. } => "bimodal".to_string(),
            StormMethod::BimodalChicago { .. } => "bimodal_chicago".to_string(),
            StormMethod::Uniform => "uniform".to_string(),
            StormMethod::Triangular { .. } => "triangular".to_string(),
        }
    }

    pub fn is_scs(&self) -> bool {
        matches!(self, StormMethod::Scs { .. })
    }

    /// Minimum time step (min) the method is run at.
    pub fn min_step_min(&self, min_dt_min: f64, min_dt_scs_min: f64) -> f64 {
        if self.is_scs() { min_dt_scs_min } else { min_dt_min }
    }
}

/// Parses bare method names with default parameters: `gz`, `blocks`,
/// `chicago`, `scs_type_ii`, `huff_q2`, `huff_q3_p90`, `bimodal`, ...
impl FromStr for StormMethod {
    type Err = HydroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        let method = match key.as_str() {
            "gz" => StormMethod::Gz,
            "blocks" | "alternating_blocks" => StormMethod::AlternatingBlocks {
                peak_position: default_peak_position(),
            },
            "chicago" => StormMethod::Chicago { advancement: default_advancement() },
            "bimodal" => StormMethod::Bimodal {
                first_peak: default_first_peak(),
                second_peak: default_second_peak(),
                volume_split: default_volume_split(),
                peak_width: default_peak_width(),
            },
            "bimodal_chicago" => StormMethod::BimodalChicago {
                first_peak: default_first_peak(),
                second_peak: default_second_peak(),
                volume_split: default_volume_split(),
            },
            "uniform" => StormMethod::Uniform,
            "triangular" => StormMethod::Triangular { peak_position: default_peak_position() },
            other if other.starts_with("scs") => StormMethod::Scs {
                distribution: other.parse().map_err(|_| HydroError::unknown("storm method", s))?,
            },
            other if other.starts_with("huff_q") => parse_huff(other)
                .ok_or_else(|| HydroError::unknown("storm method", s))?,
            _ => return Err(HydroError::unknown("storm method", s)),
        };
        Ok(method)
    }
}

fn parse_huff(key: &str) -> Option<StormMethod> {
    let mut parts = key.trim_start_matches("huff_").split('_');
    let quartile = parts.next()?.strip_prefix('q')?.parse::<u8>().ok()?;
    let probability = match parts.next() {
        Some(p) => HuffProbability::from_percent(p.strip_prefix('p')?.parse().ok()?).ok()?,
        None => HuffProbability::default(),
    };
    if parts.next().is_some() {
        return None;
    }
    Some(StormMethod::Huff {
        quartile: HuffQuartile::from_number(quartile).ok()?,
        probability,
    })
}

impl fmt::Display for StormMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StormRequest {
    pub storm: StormMethod,
    pub return_period: f64,
    pub duration_hr: f64,
    pub dt_min: f64,
    /// Use this depth instead of the IDF depth for the duration.
    #[serde(default)]
    pub total_depth_mm: Option<f64>,
}

/// Number of `dt_min` steps in `duration_hr`; the duration must be a whole
/// number of steps.
pub fn interval_count(duration_hr: f64, dt_min: f64) -> HydroResult<usize> {
    require_positive("duration (h)", duration_hr)?;
    require_positive("time step dt (min)", dt_min)?;
    let steps = duration_hr * 60.0 / dt_min;
    let rounded = steps.round();
    if rounded < 1.0 || (steps - rounded).abs() > 1.0e-6 {
        return Err(HydroError::series(format!(
            "duration {duration_hr} h is not a whole number of {dt_min} min steps"
        )));
    }
    Ok(rounded as usize)
}

/// Builds the hyetograph for `request` on `curve`.
pub fn generate(curve: &IdfCurve, request: &StormRequest) -> HydroResult<Hyetograph> {
    let StormRequest { storm: method, return_period, duration_hr, dt_min, total_depth_mm } = *request;
    let n = interval_count(duration_hr, dt_min)?;

    if method == StormMethod::Gz && (duration_hr - GZ_DURATION_HR).abs() > 1.0e-9 {
        return Err(HydroError::out_of_range("GZ duration (h)", duration_hr, "6 h"));
    }

    let total = match total_depth_mm {
        Some(depth) => require_positive("total depth (mm)", depth)?,
        None => curve.depth(return_period, duration_hr)?,
    };

    let depths = match method {
        StormMethod::Gz => blocks_for(curve, request, n, GZ_PEAK_POSITION, total)?,
        StormMethod::AlternatingBlocks { peak_position } => {
            blocks_for(curve, request, n, peak_position, total)?
        }
        StormMethod::Chicago { advancement } => {
            let sherman = sherman_for(curve)?;
            chicago::chicago(sherman, return_period, total, n, dt_min, advancement)?
        }
        StormMethod::Scs { distribution } => {
            curves::mass_curve_depths(total, n, |t| distribution.fraction(t))
        }
        StormMethod::Huff { quartile, probability } => {
            curves::mass_curve_depths(total, n, |t| curves::huff_fraction(quartile, probability, t))
        }
        StormMethod::Bimodal { first_peak, second_peak, volume_split, peak_width } => {
            bimodal::bimodal(total, n, dt_min, first_peak, second_peak, volume_split, peak_width)?
        }
        StormMethod::BimodalChicago { first_peak, second_peak, volume_split } => {
            let sherman = sherman_for(curve)?;
            chicago::bimodal_chicago(
                sherman,
                return_period,
                total,
                n,
                dt_min,
                first_peak,
                second_peak,
                volume_split,
            )?
        }
        StormMethod::Uniform => custom::uniform(total, n)?,
        StormMethod::Triangular { peak_position } => custom::triangular(total, n, peak_position)?,
    };

    let hyetograph = Hyetograph::from_depths(&method.label(), dt_min, &depths)?;
    let generated = hyetograph.total_depth();
    if (generated - total).abs() > CONSERVATION_TOLERANCE * total.max(1.0) {
        return Err(HydroError::series(format!(
            "{} storm sums to {generated:.6} mm instead of {total:.6} mm",
            method.label()
        )));
    }

    debug!(
        method = %method,
        return_period,
        duration_hr,
        dt_min,
        total_mm = generated,
        peak_mmhr = hyetograph.peak_intensity(),
        "storm generated"
    );
    Ok(hyetograph)
}

/// Alternating blocks from the curve, scaled to `total` when the request
/// overrides the depth.
fn blocks_for(curve: &IdfCurve, request: &StormRequest, n: usize, peak_position: f64, total: f64) -> HydroResult<Vec<f64>> {
    let blocks = alternating_blocks(curve, request.return_period, n, request.dt_min, peak_position)?;
    if request.total_depth_mm.is_none() {
        return Ok(blocks);
    }
    let idf_total: f64 = blocks.iter().sum();
    require_positive("IDF depth (mm)", idf_total)?;
    let scale = total / idf_total;
    Ok(blocks.iter().map(|b| b * scale).collect())
}

fn sherman_for(curve: &IdfCurve) -> HydroResult<&ShermanCoefficients> {
    curve.sherman().ok_or(HydroError::MethodMismatch {
        expected: "sherman",
        found: curve.label(),
    })
}

// ---------------------------------------------------------------------------
// Duration and step selection
// ---------------------------------------------------------------------------

/// Steps (min) the pipeline picks from when no dt is requested.
pub const STANDARD_STEPS_MIN: [f64; 6] = [5.0, 10.0, 15.0, 20.0, 30.0, 60.0];

/// Storm duration (h) for `method` given Tc, rounded up to whole steps.
///
/// GZ runs 6 h, SCS 24 h, Huff max(2·Tc, 2 h), two-peak storms 6 h and
/// everything else max(Tc, 1 h).
pub fn select_duration(method: &StormMethod, tc_hr: f64, dt_min: f64) -> HydroResult<f64> {
    require_positive("Tc (h)", tc_hr)?;
    require_positive("time step dt (min)", dt_min)?;
    let base = match method {
        StormMethod::Gz => GZ_DURATION_HR,
        StormMethod::Scs { .. } => SCS_DURATION_HR,
        StormMethod::Huff { .. } => (2.0 * tc_hr).max(2.0),
        StormMethod::Bimodal { .. } | StormMethod::BimodalChicago { .. } => BIMODAL_DURATION_HR,
        _ => tc_hr.max(1.0),
    };
    let steps = (base * 60.0 / dt_min - 1.0e-9).ceil().max(1.0);
    Ok(steps * dt_min / 60.0)
}

/// Recommended step (min): the largest standard step not above 0.133·Tc,
/// never below `min_step_min`.
pub fn recommended_dt(tc_hr: f64, min_step_min: f64) -> HydroResult<f64> {
    require_positive("Tc (h)", tc_hr)?;
    require_positive("minimum step (min)", min_step_min)?;
    let target = (0.133 * tc_hr * 60.0).max(min_step_min);
    let step = STANDARD_STEPS_MIN
        .iter()
        .copied()
        .filter(|s| *s <= target && *s >= min_step_min)
        .fold(min_step_min, f64::max);
    Ok(step)
}
