/// Runoff engine: rainfall → excess rainfall.
///
/// Submodules:
/// - `rational`  — coefficient model and rational peak flow
/// - `scs`       — curve number model with AMC adjustment
/// - `weighting` — area-weighted composite C and CN
/// - `tables`    — Chow/FHWA C tables, TR-55 CN table, soil groups
///
/// Whatever the model, excess in an interval never exceeds the rainfall of
/// that interval.

pub mod rational;
pub mod scs;
pub mod tables;
pub mod weighting;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HydroError, HydroResult, require_coefficient, require_curve_number, require_within};
use crate::model::{AntecedentMoisture, CatchmentParameters, Hyetograph};

pub use rational::rational_peak_flow;
pub use scs::{DEFAULT_LAMBDA, adjust_cn_for_amc, scs_runoff};
pub use tables::SoilGroup;
pub use weighting::{SubArea, sub_areas, weighted_c, weighted_cn};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum RunoffModel {
    Rational { c: f64 },
    CurveNumber {
        cn: f64,
        #[serde(default = "default_lambda")]
        lambda: f64,
        #[serde(default)]
        amc: AntecedentMoisture,
    },
}

fn default_lambda() -> f64 {
    DEFAULT_LAMBDA
}

/// Which catchment parameter drives runoff when both are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunoffPreference {
    /// Coefficient if the catchment has one, otherwise curve number.
    #[default]
    Auto,
    Rational,
    CurveNumber,
}

impl RunoffModel {
    pub fn label(&self) -> &'static str {
        match self {
            RunoffModel::Rational { .. } => "rational",
            RunoffModel::CurveNumber { .. } => "scs_cn",
        }
    }

    /// Picks the model from what the catchment carries.
    pub fn from_catchment(
        catchment: &CatchmentParameters,
        preference: RunoffPreference,
        lambda: f64,
    ) -> HydroResult<Self> {
        let rational = catchment.runoff_coefficient.map(|c| RunoffModel::Rational { c });
        let curve_number = catchment.curve_number.map(|cn| RunoffModel::CurveNumber {
            cn,
            lambda,
            amc: catchment.amc,
        });

        match preference {
            RunoffPreference::Auto => rational
                .or(curve_number)
                .ok_or(HydroError::missing("runoff_coefficient or curve_number", "runoff")),
            RunoffPreference::Rational => {
                rational.ok_or(HydroError::missing("runoff_coefficient", "rational runoff"))
            }
            RunoffPreference::CurveNumber => {
                curve_number.ok_or(HydroError::missing("curve_number", "SCS curve number runoff"))
            }
        }
    }
}

/// Excess rainfall series and the parameters that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcessSeries {
    pub method: String,
    pub step_min: f64,
    pub excess_mm: Vec<f64>,
    pub rainfall_mm: f64,
    pub total_excess_mm: f64,
    /// Total excess over total rainfall.
    pub runoff_ratio: f64,
    pub coefficient: Option<f64>,
    /// CN after the moisture adjustment.
    pub curve_number: Option<f64>,
    pub retention_mm: Option<f64>,
    pub initial_abstraction_mm: Option<f64>,
    /// Saturated infiltration rate of the soil group, when known (mm/h).
    pub min_infiltration_mmhr: Option<f64>,
}

/// Applies `model` to every interval of `hyetograph`.
pub fn excess_series(model: &RunoffModel, hyetograph: &Hyetograph) -> HydroResult<ExcessSeries> {
    let depths = hyetograph.depths();
    let rainfall = hyetograph.total_depth();

    let mut series = ExcessSeries {
        method: model.label().to_string(),
        step_min: hyetograph.step_min,
        excess_mm: Vec::new(),
        rainfall_mm: rainfall,
        total_excess_mm: 0.0,
        runoff_ratio: 0.0,
        coefficient: None,
        curve_number: None,
        retention_mm: None,
        initial_abstraction_mm: None,
        min_infiltration_mmhr: None,
    };

    match *model {
        RunoffModel::Rational { c } => {
            require_coefficient(c)?;
            series.excess_mm = rational::coefficient_excess(&depths, c)?;
            series.coefficient = Some(c);
        }
        RunoffModel::CurveNumber { cn, lambda, amc } => {
            require_curve_number(cn)?;
            require_within("lambda", lambda, 0.0, 1.0, "0 <= lambda <= 1")?;
            let adjusted = adjust_cn_for_amc(cn, amc)?;
            let s = scs::potential_retention(adjusted)?;
            series.excess_mm = scs::excess_from_cumulative(&hyetograph.cumulative(), adjusted, lambda)?;
            series.curve_number = Some(adjusted);
            series.retention_mm = Some(s);
            series.initial_abstraction_mm = Some(scs::initial_abstraction(s, lambda)?);
        }
    }

    series.total_excess_mm = series.excess_mm.iter().sum();
    series.runoff_ratio = if rainfall > 0.0 { series.total_excess_mm / rainfall } else { 0.0 };

    debug!(
        model = model.label(),
        rainfall_mm = rainfall,
        excess_mm = series.total_excess_mm,
        "excess rainfall"
    );
    Ok(series)
}

/// `excess_series` for a catchment, reporting its soil group's
/// saturated infiltration rate alongside curve-number results.
pub fn catchment_excess(
    catchment: &CatchmentParameters,
    model: &RunoffModel,
    hyetograph: &Hyetograph,
) -> HydroResult<ExcessSeries> {
    let mut series = excess_series(model, hyetograph)?;
    if matches!(model, RunoffModel::CurveNumber { .. }) {
        series.min_infiltration_mmhr = catchment.soil_group.map(|g| g.min_infiltration_rate());
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storm() -> Hyetograph {
        Hyetograph::from_depths("test", 10.0, &[4.0, 12.0, 40.0, 30.0, 10.0, 4.0]).unwrap()
    }

    #[test]
    fn test_rational_excess_scales_each_interval() {
        let series = excess_series(&RunoffModel::Rational { c: 0.65 }, &storm()).unwrap();
        assert!((series.total_excess_mm - 0.65 * 100.0).abs() < 1e-9);
        assert!((series.runoff_ratio - 0.65).abs() < 1e-12);
        assert_eq!(series.coefficient, Some(0.65));
    }

    #[test]
    fn test_curve_number_excess_is_bounded() {
        let h = storm();
        let model = RunoffModel::CurveNumber { cn: 80.0, lambda: 0.2, amc: AntecedentMoisture::Wet };
        let series = excess_series(&model, &h).unwrap();
        let mut cum_rain = 0.0;
        let mut cum_excess = 0.0;
        for (e, d) in series.excess_mm.iter().zip(h.depths()) {
            assert!(*e <= d + 1e-12);
            cum_rain += d;
            cum_excess += e;
            assert!(cum_excess <= cum_rain + 1e-12);
        }
        let cn = series.curve_number.unwrap();
        assert!(cn > 80.0);
        let expected = scs_runoff(100.0, cn, 0.2).unwrap();
        assert!((series.total_excess_mm - expected).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        assert!(excess_series(&RunoffModel::Rational { c: 1.2 }, &storm()).is_err());
        let model = RunoffModel::CurveNumber { cn: 25.0, lambda: 0.2, amc: AntecedentMoisture::Average };
        assert!(excess_series(&model, &storm()).is_err());
    }

    #[test]
    fn test_model_selection_from_catchment() {
        let base = CatchmentParameters::new("c", 25.0, 2.5, 800.0, 45.0);
        assert!(matches!(
            RunoffModel::from_catchment(&base, RunoffPreference::Auto, 0.2),
            Err(HydroError::MissingParameter { .. })
        ));

        let both = base.clone().with_coefficient(0.5).with_curve_number(70.0, AntecedentMoisture::Dry);
        assert_eq!(
            RunoffModel::from_catchment(&both, RunoffPreference::Auto, 0.2).unwrap(),
            RunoffModel::Rational { c: 0.5 }
        );
        assert_eq!(
            RunoffModel::from_catchment(&both, RunoffPreference::CurveNumber, 0.05).unwrap(),
            RunoffModel::CurveNumber { cn: 70.0, lambda: 0.05, amc: AntecedentMoisture::Dry }
        );

        let cn_only = base.with_curve_number(70.0, AntecedentMoisture::Average);
        assert!(RunoffModel::from_catchment(&cn_only, RunoffPreference::Rational, 0.2).is_err());
    }

    #[test]
    fn test_soil_group_rate_reported_for_curve_number() {
        let mut c = CatchmentParameters::new("c", 25.0, 2.5, 800.0, 45.0)
            .with_curve_number(75.0, AntecedentMoisture::Average);
        c.soil_group = Some(SoilGroup::A);
        let model = RunoffModel::from_catchment(&c, RunoffPreference::Auto, 0.2).unwrap();
        let series = catchment_excess(&c, &model, &storm()).unwrap();
        assert_eq!(series.min_infiltration_mmhr, Some(2.4));
    }
}
