/// Time-of-concentration estimators.
///
/// Submodules:
/// - `empirical` — Kirpich, Témez, California Culverts, FAA, Desbordes
/// - `kinematic` — kinematic wave (closed form and IDF-iterated)
/// - `nrcs`      — TR-55 velocity method over flow segments
///
/// Each formula takes the unit it was fitted in and returns hours;
/// `calculate_tc` does the conversion from `CatchmentParameters`.

pub mod empirical;
pub mod kinematic;
pub mod nrcs;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{HydroError, HydroResult};
use crate::idf::IdfCurve;
use crate::model::{CatchmentParameters, TcResult};

pub use empirical::{KirpichSurface, california_culverts, desbordes, faa, kirpich, temez};
pub use kinematic::{kinematic_wave, kinematic_wave_with_idf};
pub use nrcs::{FlowSegment, ShallowSurface, velocity_method};

/// Entry time added by Desbordes when the catchment does not give one (min).
pub const DEFAULT_ENTRY_TIME_MIN: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TcMethod {
    Kirpich,
    Temez,
    California,
    Faa,
    Desbordes,
    Kinematic,
    Nrcs,
}

impl TcMethod {
    pub const ALL: [TcMethod; 7] = [
        TcMethod::Kirpich,
        TcMethod::Temez,
        TcMethod::California,
        TcMethod::Faa,
        TcMethod::Desbordes,
        TcMethod::Kinematic,
        TcMethod::Nrcs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TcMethod::Kirpich => "kirpich",
            TcMethod::Temez => "temez",
            TcMethod::California => "california",
            TcMethod::Faa => "faa",
            TcMethod::Desbordes => "desbordes",
            TcMethod::Kinematic => "kinematic",
            TcMethod::Nrcs => "nrcs",
        }
    }
}

impl FromStr for TcMethod {
    type Err = HydroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        TcMethod::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == key)
            .ok_or_else(|| HydroError::unknown("Tc method", s))
    }
}

impl fmt::Display for TcMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computes Tc for `catchment` with `method`.
///
/// Kinematic wave here needs `design_intensity_mmhr`; use
/// `calculate_tc_with_idf` to solve it against a rainfall curve instead.
pub fn calculate_tc(method: TcMethod, catchment: &CatchmentParameters) -> HydroResult<TcResult> {
    estimate(method, catchment, None)
}

/// Same as `calculate_tc`, but the kinematic wave falls back to iterating
/// on `curve` when no design intensity is given.
pub fn calculate_tc_with_idf(
    method: TcMethod,
    catchment: &CatchmentParameters,
    curve: &IdfCurve,
    return_period: f64,
) -> HydroResult<TcResult> {
    estimate(method, catchment, Some((curve, return_period)))
}

fn estimate(
    method: TcMethod,
    catchment: &CatchmentParameters,
    idf: Option<(&IdfCurve, f64)>,
) -> HydroResult<TcResult> {
    let mut params = BTreeMap::new();
    let context = method.as_str();

    let tc_hr = match method {
        TcMethod::Kirpich => {
            params.insert("length_m".to_string(), catchment.length_m);
            params.insert("slope_m_m".to_string(), catchment.slope_ratio());
            params.insert("surface_factor".to_string(), catchment.kirpich_surface.factor());
            kirpich(catchment.length_m, catchment.slope_ratio(), catchment.kirpich_surface)?
        }
        TcMethod::Temez => {
            params.insert("length_km".to_string(), catchment.length_km());
            params.insert("slope_m_m".to_string(), catchment.slope_ratio());
            temez(catchment.length_km(), catchment.slope_ratio())?
        }
        TcMethod::California => {
            let drop = catchment
                .elevation_drop_m
                .ok_or(HydroError::missing("elevation_drop_m", "California Culverts Tc"))?;
            params.insert("length_km".to_string(), catchment.length_km());
            params.insert("elevation_drop_m".to_string(), drop);
            california_culverts(catchment.length_km(), drop)?
        }
        TcMethod::Faa => {
            let c = catchment
                .runoff_coefficient
                .ok_or(HydroError::missing("runoff_coefficient", "FAA Tc"))?;
            params.insert("length_m".to_string(), catchment.length_m);
            params.insert("slope_pct".to_string(), catchment.slope_pct);
            params.insert("c".to_string(), c);
            faa(catchment.length_m, catchment.slope_pct, c)?
        }
        TcMethod::Desbordes => {
            let c = catchment
                .runoff_coefficient
                .ok_or(HydroError::missing("runoff_coefficient", "Desbordes Tc"))?;
            let t0 = catchment.entry_time_min.unwrap_or(DEFAULT_ENTRY_TIME_MIN);
            params.insert("area_ha".to_string(), catchment.area_ha);
            params.insert("slope_pct".to_string(), catchment.slope_pct);
            params.insert("c".to_string(), c);
            params.insert("t0_min".to_string(), t0);
            desbordes(catchment.area_ha, catchment.slope_pct, c, t0)?
        }
        TcMethod::Kinematic => {
            let n = catchment
                .manning_n
                .ok_or(HydroError::missing("manning_n", "kinematic wave Tc"))?;
            params.insert("length_m".to_string(), catchment.length_m);
            params.insert("slope_m_m".to_string(), catchment.slope_ratio());
            params.insert("manning_n".to_string(), n);
            match (catchment.design_intensity_mmhr, idf) {
                (Some(i), _) => {
                    params.insert("intensity_mmhr".to_string(), i);
                    kinematic_wave(catchment.length_m, n, catchment.slope_ratio(), i)?
                }
                (None, Some((curve, tr))) => {
                    kinematic_wave_with_idf(catchment.length_m, n, catchment.slope_ratio(), curve, tr)?
                }
                (None, None) => {
                    return Err(HydroError::missing("design_intensity_mmhr", "kinematic wave Tc"));
                }
            }
        }
        TcMethod::Nrcs => {
            for (i, segment) in catchment.flow_segments.iter().enumerate() {
                let key = format!("{}_{}_hr", i + 1, segment.regime());
                params.insert(key, segment.travel_time()?);
            }
            velocity_method(&catchment.flow_segments)?
        }
    };

    debug!(method = context, tc_hr, "time of concentration");
    Ok(TcResult::from_hours(context, tc_hr, params))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urban() -> CatchmentParameters {
        CatchmentParameters::new("urban", 25.0, 2.5, 800.0, 45.0).with_coefficient(0.65)
    }

    #[test]
    fn test_method_from_str_rejects_unknown() {
        assert_eq!("Kirpich".parse::<TcMethod>().unwrap(), TcMethod::Kirpich);
        assert_eq!("nrcs".parse::<TcMethod>().unwrap(), TcMethod::Nrcs);
        let err = "bransby".parse::<TcMethod>().unwrap_err();
        assert!(matches!(err, HydroError::UnknownMethod { .. }));
    }

    #[test]
    fn test_kirpich_and_desbordes_on_urban_catchment() {
        let k = calculate_tc(TcMethod::Kirpich, &urban()).unwrap();
        let d = calculate_tc(TcMethod::Desbordes, &urban()).unwrap();
        assert!(k.tc_hr.is_finite() && k.tc_hr > 0.0);
        assert!(d.tc_hr.is_finite() && d.tc_hr > 0.0);
        assert!((k.tc_min - k.tc_hr * 60.0).abs() < 1e-12);
        assert_eq!(d.parameters["t0_min"], DEFAULT_ENTRY_TIME_MIN);
    }

    #[test]
    fn test_missing_geometry_is_reported() {
        let bare = CatchmentParameters::new("bare", 25.0, 2.5, 800.0, 45.0);
        assert!(matches!(
            calculate_tc(TcMethod::Desbordes, &bare),
            Err(HydroError::MissingParameter { parameter: "runoff_coefficient", .. })
        ));
        assert!(matches!(
            calculate_tc(TcMethod::California, &bare),
            Err(HydroError::MissingParameter { parameter: "elevation_drop_m", .. })
        ));
        assert!(matches!(
            calculate_tc(TcMethod::Nrcs, &bare),
            Err(HydroError::MissingParameter { .. })
        ));
    }

    #[test]
    fn test_non_positive_slope_is_a_range_error() {
        let mut c = urban();
        c.slope_pct = 0.0;
        for method in [TcMethod::Kirpich, TcMethod::Temez, TcMethod::Desbordes, TcMethod::Faa] {
            assert!(matches!(
                calculate_tc(method, &c),
                Err(HydroError::OutOfRange { .. })
            ));
        }
    }

    #[test]
    fn test_kinematic_uses_idf_when_no_intensity() {
        let mut c = urban();
        c.manning_n = Some(0.15);
        c.length_m = 120.0;
        assert!(calculate_tc(TcMethod::Kinematic, &c).is_err());
        let curve = IdfCurve::for_catchment(&c);
        let tc = calculate_tc_with_idf(TcMethod::Kinematic, &c, &curve, 10.0).unwrap();
        assert!(tc.tc_hr > 0.0);
    }

    #[test]
    fn test_nrcs_reports_each_segment() {
        let mut c = urban();
        c.flow_segments = vec![
            FlowSegment::Sheet { length_m: 60.0, manning_n: 0.15, slope: 0.02, p2_mm: None },
            FlowSegment::Shallow { length_m: 300.0, slope: 0.02, surface: ShallowSurface::Paved },
        ];
        let tc = calculate_tc(TcMethod::Nrcs, &c).unwrap();
        assert!(tc.parameters.contains_key("1_sheet_hr"));
        assert!(tc.parameters.contains_key("2_shallow_hr"));
        let sum = tc.parameters["1_sheet_hr"] + tc.parameters["2_shallow_hr"];
        assert!((sum - tc.tc_hr).abs() < 1e-12);
    }
}
