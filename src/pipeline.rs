/// End-to-end design-storm analysis for one catchment.
///
/// Tc → time step and duration → IDF depth → hyetograph → excess rainfall →
/// unit hydrograph → convolved hydrograph. Each stage validates its own
/// inputs; the first error aborts the analysis and nothing partial is
/// returned.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::HydroResult;
use crate::hydrograph::{self, STANDARD_X, UhContext, UnitHydrographMethod};
use crate::idf::IdfCurve;
use crate::model::{CatchmentParameters, HydrographResult, IdfResult, StormResult, TcResult};
use crate::runoff::{self, DEFAULT_LAMBDA, ExcessSeries, RunoffModel, RunoffPreference};
use crate::storm::{self, StormMethod, StormRequest};
use crate::tc::{self, DEFAULT_ENTRY_TIME_MIN, TcMethod};

/// Defaults the pipeline falls back on when a request leaves them open.
/// Normally filled from `hydrology.toml` (see `config::Defaults`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineSettings {
    pub lambda: f64,
    pub shape_factor_x: f64,
    pub min_dt_min: f64,
    pub min_dt_scs_min: f64,
    pub desbordes_t0_min: f64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        PipelineSettings {
            lambda: DEFAULT_LAMBDA,
            shape_factor_x: STANDARD_X,
            min_dt_min: 5.0,
            min_dt_scs_min: 15.0,
            desbordes_t0_min: DEFAULT_ENTRY_TIME_MIN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub catchment: CatchmentParameters,
    pub tc_method: TcMethod,
    pub storm: StormMethod,
    pub return_period: f64,
    /// Rainfall curve; the catchment's regional curve when absent.
    #[serde(default)]
    pub idf: Option<IdfCurve>,
    #[serde(default)]
    pub duration_hr: Option<f64>,
    #[serde(default)]
    pub dt_min: Option<f64>,
    /// Fixed storm depth instead of the IDF depth.
    #[serde(default)]
    pub total_depth_mm: Option<f64>,
    #[serde(default)]
    pub runoff: RunoffPreference,
    #[serde(default)]
    pub lambda: Option<f64>,
    /// Triangular with the configured X factor when absent.
    #[serde(default)]
    pub unit_hydrograph: Option<UnitHydrographMethod>,
}

impl AnalysisRequest {
    pub fn new(catchment: CatchmentParameters, tc_method: TcMethod, storm: StormMethod, return_period: f64) -> Self {
        AnalysisRequest {
            catchment,
            tc_method,
            storm,
            return_period,
            idf: None,
            duration_hr: None,
            dt_min: None,
            total_depth_mm: None,
            runoff: RunoffPreference::Auto,
            lambda: None,
            unit_hydrograph: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub catchment: String,
    pub tc: TcResult,
    /// Design rainfall for the storm duration.
    pub idf: IdfResult,
    pub storm: StormResult,
    pub runoff: ExcessSeries,
    pub hydrograph: HydrographResult,
    /// Rational-method peak at duration Tc, when the catchment has a C.
    pub rational_peak_m3s: Option<f64>,
}

pub fn run_analysis(request: &AnalysisRequest) -> HydroResult<AnalysisResult> {
    run_analysis_with(request, &PipelineSettings::default())
}

pub fn run_analysis_with(request: &AnalysisRequest, settings: &PipelineSettings) -> HydroResult<AnalysisResult> {
    let mut catchment = request.catchment.clone();
    catchment.validate()?;
    if catchment.entry_time_min.is_none() {
        catchment.entry_time_min = Some(settings.desbordes_t0_min);
    }
    let curve = request.idf.clone().unwrap_or_else(|| IdfCurve::for_catchment(&catchment));
    let tr = request.return_period;

    // Tc
    let tc = tc::calculate_tc_with_idf(request.tc_method, &catchment, &curve, tr)?;

    // step and duration
    let dt_min = match request.dt_min {
        Some(dt) => dt,
        None => storm::recommended_dt(
            tc.tc_hr,
            request.storm.min_step_min(settings.min_dt_min, settings.min_dt_scs_min),
        )?,
    };
    let duration_hr = match request.duration_hr {
        Some(d) => d,
        None => storm::select_duration(&request.storm, tc.tc_hr, dt_min)?,
    };
    debug!(tc_hr = tc.tc_hr, dt_min, duration_hr, "analysis timing");

    // rainfall
    let idf = curve.evaluate(tr, duration_hr)?;
    let hyetograph = storm::generate(
        &curve,
        &StormRequest {
            storm: request.storm,
            return_period: tr,
            duration_hr,
            dt_min,
            total_depth_mm: request.total_depth_mm,
        },
    )?;

    // runoff
    let lambda = request.lambda.unwrap_or(settings.lambda);
    let model = RunoffModel::from_catchment(&catchment, request.runoff, lambda)?;
    let excess = runoff::catchment_excess(&catchment, &model, &hyetograph)?;

    // hydrograph
    let uh_method = request
        .unit_hydrograph
        .unwrap_or(UnitHydrographMethod::Triangular { x: settings.shape_factor_x });
    let ctx = UhContext::for_catchment(&catchment, tc.tc_hr, dt_min / 60.0);
    let unit = hydrograph::unit_hydrograph(uh_method, &ctx)?;
    let result = hydrograph::build_hydrograph(&excess, &unit, tr, catchment.area_ha, uh_method.shape_factor())?;

    let rational_peak_m3s = match catchment.runoff_coefficient {
        Some(c) => {
            let at_tc = curve.evaluate(tr, tc.tc_hr)?;
            Some(runoff::rational_peak_flow(c, at_tc.intensity_mmhr, catchment.area_ha, tr)?)
        }
        None => None,
    };

    info!(
        catchment = %catchment.name,
        tc = %tc.method,
        storm = %request.storm,
        return_period = tr,
        depth_mm = hyetograph.total_depth(),
        peak_m3s = result.peak_flow_m3s,
        "analysis complete"
    );

    Ok(AnalysisResult {
        catchment: catchment.name.clone(),
        tc,
        idf,
        storm: StormResult::from_hyetograph(&hyetograph, tr),
        runoff: excess,
        hydrograph: result,
        rational_peak_m3s,
    })
}
