/// Unit hydrographs and the convolution that turns excess rainfall into a
/// discharge hydrograph.
///
/// Submodules:
/// - `shapes`      — triangular (X factor), SCS curvilinear, gamma, Snyder
/// - `clark`       — time-area curve routed through a linear reservoir
/// - `convolution` — excess ⊛ unit hydrograph and the derived peak/volume
///
/// Every shape is sampled at k·dt and rescaled so that its ordinates hold
/// exactly 1 mm of runoff over the catchment: Σu·dt·3600 = A_km²·1000 m³.

pub mod clark;
pub mod convolution;
pub mod shapes;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{HydroError, HydroResult, require_positive};
use crate::model::{CatchmentParameters, UnitHydrograph};

pub use convolution::{build_hydrograph, convolve, trapezoid_volume};
pub use shapes::{DEFAULT_GAMMA_M, DEFAULT_SNYDER_CP, DEFAULT_SNYDER_CT, STANDARD_X, Shape};

fn default_x() -> f64 {
    STANDARD_X
}
fn default_gamma_m() -> f64 {
    DEFAULT_GAMMA_M
}
fn default_ct() -> f64 {
    DEFAULT_SNYDER_CT
}
fn default_cp() -> f64 {
    DEFAULT_SNYDER_CP
}

// ---------------------------------------------------------------------------
// Methods
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum UnitHydrographMethod {
    /// Triangle with time base (1 + X)·tp; X = 1.67 is the SCS triangle.
    Triangular {
        #[serde(default = "default_x")]
        x: f64,
    },
    Curvilinear,
    Gamma {
        #[serde(default = "default_gamma_m")]
        m: f64,
    },
    Snyder {
        #[serde(default = "default_ct")]
        ct: f64,
        #[serde(default = "default_cp")]
        cp: f64,
    },
    /// `storage_hr = None` uses R = 2·Tc.
    Clark {
        #[serde(default)]
        storage_hr: Option<f64>,
    },
}

impl Default for UnitHydrographMethod {
    fn default() -> Self {
        UnitHydrographMethod::Triangular { x: STANDARD_X }
    }
}

impl UnitHydrographMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitHydrographMethod::Triangular { .. } => "triangular",
            UnitHydrographMethod::Curvilinear => "curvilinear",
            UnitHydrographMethod::Gamma { .. } => "gamma",
            UnitHydrographMethod::Snyder { .. } => "snyder",
            UnitHydrographMethod::Clark { .. } => "clark",
        }
    }

    /// The X factor, for triangular shapes.
    pub fn shape_factor(&self) -> Option<f64> {
        match self {
            UnitHydrographMethod::Triangular { x } => Some(*x),
            _ => None,
        }
    }
}

impl FromStr for UnitHydrographMethod {
    type Err = HydroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "triangular" | "scs_triangular" => Ok(UnitHydrographMethod::Triangular { x: STANDARD_X }),
            "curvilinear" | "scs_curvilinear" => Ok(UnitHydrographMethod::Curvilinear),
            "gamma" => Ok(UnitHydrographMethod::Gamma { m: DEFAULT_GAMMA_M }),
            "snyder" => Ok(UnitHydrographMethod::Snyder { ct: DEFAULT_SNYDER_CT, cp: DEFAULT_SNYDER_CP }),
            "clark" => Ok(UnitHydrographMethod::Clark { storage_hr: None }),
            _ => Err(HydroError::unknown("unit hydrograph method", s)),
        }
    }
}

impl fmt::Display for UnitHydrographMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Catchment quantities a unit hydrograph is built from, in km and hours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UhContext {
    pub area_km2: f64,
    pub tc_hr: f64,
    pub dt_hr: f64,
    /// Main channel length, Snyder.
    pub length_km: Option<f64>,
    /// Outlet-to-centroid distance, Snyder.
    pub centroid_km: Option<f64>,
}

impl UhContext {
    /// Converts the catchment's ha and m to km² and km.
    pub fn for_catchment(catchment: &CatchmentParameters, tc_hr: f64, dt_hr: f64) -> Self {
        UhContext {
            area_km2: catchment.area_km2(),
            tc_hr,
            dt_hr,
            length_km: Some(catchment.length_km()),
            centroid_km: catchment.centroid_length_m.map(|m| m / 1000.0),
        }
    }
}

fn continuous_shape(method: UnitHydrographMethod, ctx: &UhContext) -> HydroResult<Shape> {
    match method {
        UnitHydrographMethod::Triangular { x } => shapes::triangular(ctx.area_km2, ctx.tc_hr, ctx.dt_hr, x),
        UnitHydrographMethod::Curvilinear => shapes::curvilinear(ctx.area_km2, ctx.tc_hr, ctx.dt_hr),
        UnitHydrographMethod::Gamma { m } => shapes::gamma(ctx.area_km2, ctx.tc_hr, ctx.dt_hr, m),
        UnitHydrographMethod::Snyder { ct, cp } => {
            let length = ctx.length_km.ok_or(HydroError::missing("length_m", "Snyder unit hydrograph"))?;
            let centroid = ctx
                .centroid_km
                .ok_or(HydroError::missing("centroid_length_m", "Snyder unit hydrograph"))?;
            shapes::snyder(ctx.area_km2, length, centroid, ct, cp)
        }
        UnitHydrographMethod::Clark { storage_hr } => {
            let r = storage_hr.unwrap_or(clark::DEFAULT_STORAGE_RATIO * ctx.tc_hr);
            clark::clark(ctx.area_km2, ctx.tc_hr, r, ctx.dt_hr)
        }
    }
}

/// Samples `method` at k·dt and rescales the ordinates to 1 mm of runoff.
pub fn unit_hydrograph(method: UnitHydrographMethod, ctx: &UhContext) -> HydroResult<UnitHydrograph> {
    require_positive("area (km²)", ctx.area_km2)?;
    require_positive("time step (h)", ctx.dt_hr)?;
    let shape = continuous_shape(method, ctx)?;

    // the last sample falls at or past the time base, where q = 0
    let last = (shape.time_base_hr / ctx.dt_hr - 1.0e-9).ceil().max(1.0) as usize;
    let mut ordinates: Vec<f64> = (0..=last).map(|k| shape.discharge(k as f64 * ctx.dt_hr)).collect();
    if let Some(tail) = ordinates.last_mut() {
        *tail = 0.0;
    }

    let sampled_m3 = ordinates.iter().sum::<f64>() * ctx.dt_hr * 3600.0;
    if sampled_m3 <= 0.0 {
        return Err(HydroError::series(format!(
            "{} unit hydrograph has no ordinates at a {} h step (time base {:.3} h)",
            method.as_str(),
            ctx.dt_hr,
            shape.time_base_hr
        )));
    }
    let one_mm_m3 = ctx.area_km2 * 1000.0;
    let scale = one_mm_m3 / sampled_m3;
    for u in ordinates.iter_mut() {
        *u *= scale;
    }

    let peak = ordinates.iter().copied().fold(0.0, f64::max);
    debug!(
        method = method.as_str(),
        tp_hr = shape.time_to_peak_hr,
        peak_m3s_per_mm = peak,
        rescale = scale,
        "unit hydrograph"
    );

    Ok(UnitHydrograph {
        method: method.as_str().to_string(),
        step_hr: ctx.dt_hr,
        area_km2: ctx.area_km2,
        time_to_peak_hr: shape.time_to_peak_hr,
        time_base_hr: (ordinates.len() - 1) as f64 * ctx.dt_hr,
        peak_m3s_per_mm: peak,
        ordinates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> UhContext {
        UhContext {
            area_km2: 10.0,
            tc_hr: 1.5,
            dt_hr: 0.25,
            length_km: Some(6.0),
            centroid_km: Some(2.5),
        }
    }

    fn all_methods() -> Vec<UnitHydrographMethod> {
        vec![
            UnitHydrographMethod::Triangular { x: STANDARD_X },
            UnitHydrographMethod::Triangular { x: 1.0 },
            UnitHydrographMethod::Curvilinear,
            UnitHydrographMethod::Gamma { m: DEFAULT_GAMMA_M },
            UnitHydrographMethod::Snyder { ct: DEFAULT_SNYDER_CT, cp: DEFAULT_SNYDER_CP },
            UnitHydrographMethod::Clark { storage_hr: None },
        ]
    }

    #[test]
    fn test_every_shape_holds_exactly_one_mm() {
        for method in all_methods() {
            let uh = unit_hydrograph(method, &ctx()).unwrap();
            assert!((uh.volume_m3() - 10_000.0).abs() < 1e-6, "{method}: {}", uh.volume_m3());
            assert_eq!(uh.ordinates[0], 0.0, "{method}");
            assert_eq!(*uh.ordinates.last().unwrap(), 0.0, "{method}");
            assert!(uh.ordinates.iter().all(|u| *u >= 0.0), "{method}");
        }
    }

    #[test]
    fn test_reported_peak_is_largest_ordinate() {
        let uh = unit_hydrograph(UnitHydrographMethod::Curvilinear, &ctx()).unwrap();
        let max = uh.ordinates.iter().copied().fold(0.0, f64::max);
        assert_eq!(uh.peak_m3s_per_mm, max);
        assert_eq!(uh.times_hr().len(), uh.ordinates.len());
    }

    #[test]
    fn test_snyder_needs_centroid() {
        let mut c = ctx();
        c.centroid_km = None;
        let err = unit_hydrograph(UnitHydrographMethod::Snyder { ct: 2.0, cp: 0.6 }, &c).unwrap_err();
        assert!(matches!(err, HydroError::MissingParameter { parameter: "centroid_length_m", .. }));
    }

    #[test]
    fn test_context_from_catchment_converts_units() {
        let mut c = CatchmentParameters::new("c", 250.0, 2.0, 3200.0, 80.0);
        c.centroid_length_m = Some(1500.0);
        let ctx = UhContext::for_catchment(&c, 1.0, 0.25);
        assert_eq!(ctx.area_km2, 2.5);
        assert_eq!(ctx.length_km, Some(3.2));
        assert_eq!(ctx.centroid_km, Some(1.5));
    }

    #[test]
    fn test_method_names() {
        assert_eq!("scs_triangular".parse::<UnitHydrographMethod>().unwrap(), UnitHydrographMethod::default());
        assert_eq!("Clark".parse::<UnitHydrographMethod>().unwrap().as_str(), "clark");
        assert!("nash".parse::<UnitHydrographMethod>().is_err());
        let parsed: UnitHydrographMethod = serde_json::from_str(r#"{"method":"gamma"}"#).unwrap();
        assert_eq!(parsed, UnitHydrographMethod::Gamma { m: DEFAULT_GAMMA_M });
        assert_eq!(UnitHydrographMethod::Triangular { x: 2.0 }.shape_factor(), Some(2.0));
        assert_eq!(UnitHydrographMethod::Curvilinear.shape_factor(), None);
    }
}
