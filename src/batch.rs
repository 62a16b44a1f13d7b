/// Parallel sweeps over independent analyses.
///
/// Analyses share nothing, so each request runs on its own pool worker;
/// results come back over a channel and are put back in request order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::mpsc;
use threadpool::ThreadPool;
use tracing::{info, warn};

use crate::pipeline::{AnalysisRequest, AnalysisResult, PipelineSettings, run_analysis_with};

/// Outcome of one request in a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepEntry {
    pub index: usize,
    pub catchment: String,
    pub return_period: f64,
    pub storm: String,
    pub result: Option<AnalysisResult>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub workers: usize,
    pub entries: Vec<SweepEntry>,
}

impl SweepReport {
    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.result.is_some()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.len() - self.succeeded()
    }
}

/// Runs every request on a pool of `workers` threads (at least one).
pub fn run_sweep(requests: Vec<AnalysisRequest>, workers: usize, settings: PipelineSettings) -> SweepReport {
    let started_at = Utc::now();
    let workers = workers.max(1);
    let pool = ThreadPool::new(workers);
    let (tx, rx) = mpsc::channel();
    let total = requests.len();

    for (index, request) in requests.into_iter().enumerate() {
        let tx = tx.clone();
        pool.execute(move || {
            let outcome = run_analysis_with(&request, &settings);
            let entry = match outcome {
                Ok(result) => SweepEntry {
                    index,
                    catchment: request.catchment.name.clone(),
                    return_period: request.return_period,
                    storm: request.storm.label(),
                    result: Some(result),
                    error: None,
                },
                Err(e) => SweepEntry {
                    index,
                    catchment: request.catchment.name.clone(),
                    return_period: request.return_period,
                    storm: request.storm.label(),
                    result: None,
                    error: Some(e.to_string()),
                },
            };
            // the receiver is alive until every job has run
            let _ = tx.send(entry);
        });
    }
    drop(tx);

    let mut entries: Vec<SweepEntry> = rx.iter().collect();
    pool.join();
    entries.sort_by_key(|e| e.index);

    if entries.len() != total {
        warn!(expected = total, received = entries.len(), "sweep lost results (worker panic)");
    }

    let report = SweepReport {
        started_at,
        finished_at: Utc::now(),
        workers,
        entries,
    };
    info!(
        analyses = total,
        succeeded = report.succeeded(),
        failed = report.failed(),
        "sweep complete"
    );
    report
}

/// One request per return period, everything else copied from `base`.
pub fn sweep_return_periods(base: &AnalysisRequest, return_periods: &[f64]) -> Vec<AnalysisRequest> {
    return_periods
        .iter()
        .map(|&tr| AnalysisRequest { return_period: tr, ..base.clone() })
        .collect()
}
