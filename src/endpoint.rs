/// HTTP endpoint for running analyses
///
/// A small JSON API so external tools (spreadsheets, report generators,
/// scripts) can run the hydrologic core without linking against it.
///
/// Endpoints:
/// - GET  /health   - Service health check
/// - POST /idf      - Single IDF value, or a table when Tr/d are omitted
/// - POST /tc       - Time of concentration by one or more methods
/// - POST /storm    - Design hyetograph
/// - POST /analysis - Full pipeline for one catchment
/// - POST /sweep    - Full pipeline over a list of return periods
///
/// Input errors come back as 400 with `{"error": "..."}`.

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::io::Read;
use tracing::{debug, warn};

use crate::batch::{run_sweep, sweep_return_periods};
use crate::config::HydroConfig;
use crate::error::{HydroError, HydroResult};
use crate::idf::{IdfCurve, idf_table};
use crate::model::{CatchmentParameters, StormResult};
use crate::pipeline::{AnalysisRequest, run_analysis_with};
use crate::storm::{self, StormMethod, StormRequest};
use crate::tc::{self, TcMethod};

type JsonResponse = tiny_http::Response<std::io::Cursor<Vec<u8>>>;

// ---------------------------------------------------------------------------
// Request Types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct IdfQuery {
    pub curve: IdfCurve,
    #[serde(default)]
    pub return_period: Option<f64>,
    #[serde(default)]
    pub duration_hr: Option<f64>,
    /// Table rows; configured durations when absent.
    #[serde(default)]
    pub durations_hr: Option<Vec<f64>>,
    /// Table columns; configured return periods when absent.
    #[serde(default)]
    pub return_periods: Option<Vec<f64>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TcQuery {
    pub catchment: CatchmentParameters,
    /// Every method when empty.
    #[serde(default)]
    pub methods: Vec<TcMethod>,
    /// Return period for kinematic wave iteration on the regional curve.
    #[serde(default)]
    pub return_period: Option<f64>,
}

/// Per-method outcome; a method whose inputs are missing reports an error
/// without failing the others.
#[derive(Debug, Serialize, Deserialize)]
pub struct TcEntry {
    pub method: TcMethod,
    pub tc_hr: Option<f64>,
    pub tc_min: Option<f64>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StormQuery {
    pub curve: IdfCurve,
    pub storm: StormMethod,
    pub return_period: f64,
    pub duration_hr: f64,
    pub dt_min: f64,
    #[serde(default)]
    pub total_depth_mm: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SweepQuery {
    pub request: AnalysisRequest,
    /// Configured return periods when absent.
    #[serde(default)]
    pub return_periods: Option<Vec<f64>>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn handle_idf(query: IdfQuery, config: &HydroConfig) -> HydroResult<serde_json::Value> {
    match (query.return_period, query.duration_hr) {
        (Some(tr), Some(d)) => to_json(&query.curve.evaluate(tr, d)?),
        _ => {
            let durations = query.durations_hr.unwrap_or_else(|| config.defaults.durations_hr.clone());
            let periods = query.return_periods.unwrap_or_else(|| config.defaults.return_periods.clone());
            to_json(&idf_table(&query.curve, &durations, &periods)?)
        }
    }
}

fn handle_tc(query: TcQuery) -> HydroResult<serde_json::Value> {
    query.catchment.validate()?;
    let methods = if query.methods.is_empty() { TcMethod::ALL.to_vec() } else { query.methods };
    let curve = IdfCurve::for_catchment(&query.catchment);
    let tr = query.return_period.unwrap_or(10.0);

    let entries: Vec<TcEntry> = methods
        .into_iter()
        .map(|method| match tc::calculate_tc_with_idf(method, &query.catchment, &curve, tr) {
            Ok(r) => TcEntry { method, tc_hr: Some(r.tc_hr), tc_min: Some(r.tc_min), error: None },
            Err(e) => TcEntry { method, tc_hr: None, tc_min: None, error: Some(e.to_string()) },
        })
        .collect();
    to_json(&entries)
}

fn handle_storm(query: StormQuery) -> HydroResult<serde_json::Value> {
    let request = StormRequest {
        storm: query.storm,
        return_period: query.return_period,
        duration_hr: query.duration_hr,
        dt_min: query.dt_min,
        total_depth_mm: query.total_depth_mm,
    };
    let hyetograph = storm::generate(&query.curve, &request)?;
    to_json(&StormResult::from_hyetograph(&hyetograph, query.return_period))
}

fn to_json<T: Serialize>(value: &T) -> HydroResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| HydroError::series(e.to_string()))
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, (u16, serde_json::Value)> {
    serde_json::from_str(body).map_err(|e| (400, serde_json::json!({ "error": format!("invalid request body: {e}") })))
}

fn respond_with(result: HydroResult<serde_json::Value>) -> (u16, serde_json::Value) {
    match result {
        Ok(json) => (200, json),
        Err(e) => (400, serde_json::json!({ "error": e.to_string() })),
    }
}

/// Dispatches one request; returns status and JSON body.
pub fn route(method: &str, url: &str, body: &str, config: &HydroConfig) -> (u16, serde_json::Value) {
    let path = url.split('?').next().unwrap_or(url);
    let settings = config.defaults.settings();

    let outcome = match (method, path) {
        ("GET", "/health") => Ok(handle_health()),
        ("POST", "/idf") => parse_body(body).map(|q| respond_with(handle_idf(q, config))),
        ("POST", "/tc") => parse_body(body).map(|q| respond_with(handle_tc(q))),
        ("POST", "/storm") => parse_body(body).map(|q| respond_with(handle_storm(q))),
        ("POST", "/analysis") => parse_body::<AnalysisRequest>(body)
            .map(|q| respond_with(run_analysis_with(&q, &settings).and_then(|r| to_json(&r)))),
        ("POST", "/sweep") => parse_body::<SweepQuery>(body).map(|q| {
            let periods = q.return_periods.unwrap_or_else(|| config.defaults.return_periods.clone());
            let report = run_sweep(
                sweep_return_periods(&q.request, &periods),
                config.defaults.sweep_workers,
                settings,
            );
            respond_with(to_json(&report))
        }),
        _ => Ok((
            404,
            serde_json::json!({
                "error": "Not found",
                "available_endpoints": [
                    "GET /health", "POST /idf", "POST /tc", "POST /storm", "POST /analysis", "POST /sweep"
                ]
            }),
        )),
    };

    match outcome {
        Ok(response) | Err(response) => response,
    }
}

fn handle_health() -> (u16, serde_json::Value) {
    (
        200,
        serde_json::json!({
            "status": "ok",
            "service": "hidropluvial",
            "version": env!("CARGO_PKG_VERSION")
        }),
    )
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Start HTTP endpoint server on the specified port
pub fn start_endpoint_server(port: u16, config: HydroConfig) -> Result<(), String> {
    let server = tiny_http::Server::http(format!("0.0.0.0:{}", port))
        .map_err(|e| format!("Failed to start HTTP server: {}", e))?;

    println!("📡 HTTP endpoint listening on http://0.0.0.0:{}", port);
    println!("   GET  /health   - Service health check");
    println!("   POST /idf      - IDF value or table");
    println!("   POST /tc       - Time of concentration");
    println!("   POST /storm    - Design hyetograph");
    println!("   POST /analysis - Full design-storm analysis");
    println!("   POST /sweep    - Analysis over return periods\n");

    for mut request in server.incoming_requests() {
        let method = request.method().to_string();
        let url = request.url().to_string();

        let mut body = String::new();
        let (status, json) = match request.as_reader().read_to_string(&mut body) {
            Ok(_) => route(&method, &url, &body, &config),
            Err(e) => (400, serde_json::json!({ "error": format!("unreadable body: {e}") })),
        };
        debug!(%method, %url, status, "request");

        if let Err(e) = request.respond(create_response(status, json)) {
            warn!(error = %e, "failed to send response");
        }
    }

    Ok(())
}

/// Create HTTP response with JSON body
fn create_response(status_code: u16, json: serde_json::Value) -> JsonResponse {
    let body = serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string());
    let response = tiny_http::Response::from_data(body.into_bytes())
        .with_status_code(tiny_http::StatusCode::from(status_code));

    match tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
