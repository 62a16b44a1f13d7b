//! Hidropluvial - design-storm hydrograph runner
//!
//! Without `--endpoint`, runs a return-period sweep for every catchment in
//! `hydrology.toml` (or just the one named by `--catchment`) and prints a
//! summary table. With `--endpoint`, serves the JSON API instead.
//!
//! Usage:
//!   cargo run --release                          # Sweep all configured catchments
//!   cargo run --release -- --catchment NAME      # Sweep one catchment
//!   cargo run --release -- --endpoint 8080       # Serve the HTTP API on port 8080
//!   cargo run --release -- --verbose             # Per-stage debug logging
//!
//! Environment:
//!   HIDRO_CONFIG - path to the configuration file (default hydrology.toml)
//!   HIDRO_LOG    - log level (trace, debug, info, warn, error)

use hidropluvial::batch::{run_sweep, sweep_return_periods};
use hidropluvial::config::{self, HydroConfig};
use hidropluvial::endpoint;
use hidropluvial::pipeline::AnalysisRequest;
use std::env;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() {
    println!("🌧️  Hidropluvial design-storm analysis");
    println!("======================================\n");

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let mut endpoint_port: Option<u16> = None;
    let mut catchment_filter: Option<String> = None;
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--endpoint" => {
                match args.get(i + 1).and_then(|p| p.parse().ok()) {
                    Some(port) => endpoint_port = Some(port),
                    None => {
                        eprintln!("Error: --endpoint requires a port number");
                        std::process::exit(1);
                    }
                }
                i += 2;
            }
            "--catchment" => {
                match args.get(i + 1) {
                    Some(name) => catchment_filter = Some(name.clone()),
                    None => {
                        eprintln!("Error: --catchment requires a name");
                        std::process::exit(1);
                    }
                }
                i += 2;
            }
            "--verbose" | "-v" => {
                verbose = true;
                i += 1;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                eprintln!("Usage: {} [--endpoint PORT] [--catchment NAME] [--verbose]", args[0]);
                std::process::exit(1);
            }
        }
    }

    dotenv::dotenv().ok();
    init_logging(verbose);

    println!("📋 Loading configuration...");
    let config = match config::load_default_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n❌ Configuration error: {}\n", e);
            std::process::exit(1);
        }
    };
    println!("✓ {} catchments configured\n", config.catchments.len());

    if let Some(port) = endpoint_port {
        println!("🚀 Starting HTTP endpoint server...");
        if let Err(e) = endpoint::start_endpoint_server(port, config) {
            eprintln!("❌ Endpoint server error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    if let Err(e) = run_configured_sweeps(&config, catchment_filter.as_deref()) {
        eprintln!("\n❌ {}\n", e);
        std::process::exit(1);
    }
}

/// `--verbose` wins over `HIDRO_LOG`; INFO otherwise.
fn init_logging(verbose: bool) {
    let level = if verbose {
        Level::DEBUG
    } else {
        match env::var("HIDRO_LOG").unwrap_or_default().to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: logging was already initialized");
    }
}

fn run_configured_sweeps(config: &HydroConfig, only: Option<&str>) -> Result<(), String> {
    let selected: Vec<_> = match only {
        Some(name) => vec![config
            .find_catchment(name)
            .ok_or_else(|| format!("Catchment '{}' is not in the configuration", name))?],
        None => config.catchments.iter().collect(),
    };

    if selected.is_empty() {
        println!("Nothing to do: no [[catchment]] entries in the configuration.");
        return Ok(());
    }

    for entry in selected {
        let catchment = entry.to_parameters().map_err(|e| e.to_string())?;
        let storm = entry.storm_method().map_err(|e| e.to_string())?;
        let base = AnalysisRequest::new(catchment, entry.tc_method, storm, 2.0);
        let requests = sweep_return_periods(&base, &config.defaults.return_periods);

        println!("📊 {} ({} Tc, {} storm)", entry.name, entry.tc_method, storm);
        if let Some(description) = &entry.description {
            println!("   {}", description);
        }

        let report = run_sweep(requests, config.defaults.sweep_workers, config.defaults.settings());
        println!(
            "   {:>6} {:>8} {:>9} {:>9} {:>10} {:>8} {:>12}",
            "Tr", "Tc (min)", "P (mm)", "Pe (mm)", "Qp (m³/s)", "tp (h)", "Vol (m³)"
        );
        for row in &report.entries {
            match (&row.result, &row.error) {
                (Some(r), _) => println!(
                    "   {:>6.0} {:>8.1} {:>9.1} {:>9.1} {:>10.3} {:>8.2} {:>12.0}",
                    row.return_period,
                    r.tc.tc_min,
                    r.storm.total_depth_mm,
                    r.runoff.total_excess_mm,
                    r.hydrograph.peak_flow_m3s,
                    r.hydrograph.time_to_peak_hr,
                    r.hydrograph.volume_m3,
                ),
                (None, Some(e)) => println!("   {:>6.0} ✗ {}", row.return_period, e),
                (None, None) => println!("   {:>6.0} ✗ no result", row.return_period),
            }
        }
        println!(
            "   ✓ {} succeeded, {} failed in {} ms\n",
            report.succeeded(),
            report.failed(),
            (report.finished_at - report.started_at).num_milliseconds()
        );
    }
    Ok(())
}
