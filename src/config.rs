/// Analysis configuration loader - parses hydrology.toml
///
/// Keeps analysis defaults and the catchments a sweep runs over out of the
/// code, so a new catchment or a different step policy does not need a
/// rebuild.
///
/// # File Location
/// `hydrology.toml` in the working directory, or whatever `HIDRO_CONFIG`
/// points at (read from the environment or a `.env` file).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::error::HydroError;
use crate::hydrograph::STANDARD_X;
use crate::idf::{STANDARD_DURATIONS_HR, STANDARD_RETURN_PERIODS, p3_10_for_department};
use crate::model::{AntecedentMoisture, CatchmentParameters};
use crate::pipeline::PipelineSettings;
use crate::runoff::{DEFAULT_LAMBDA, SoilGroup};
use crate::storm::StormMethod;
use crate::tc::{DEFAULT_ENTRY_TIME_MIN, TcMethod};

pub const DEFAULT_CONFIG_PATH: &str = "hydrology.toml";
pub const CONFIG_PATH_VAR: &str = "HIDRO_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("catchment '{name}': {source}")]
    Catchment {
        name: String,
        #[source]
        source: HydroError,
    },
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// `[defaults]` - analysis policy applied when a request leaves it open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Initial abstraction ratio for curve-number runoff.
    pub lambda: f64,
    /// X factor of the triangular unit hydrograph.
    pub shape_factor_x: f64,
    pub return_periods: Vec<f64>,
    pub durations_hr: Vec<f64>,
    pub min_dt_min: f64,
    /// SCS 24 h distributions are never run below this step.
    pub min_dt_scs_min: f64,
    pub desbordes_t0_min: f64,
    pub sweep_workers: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            lambda: DEFAULT_LAMBDA,
            shape_factor_x: STANDARD_X,
            return_periods: STANDARD_RETURN_PERIODS.to_vec(),
            durations_hr: STANDARD_DURATIONS_HR.to_vec(),
            min_dt_min: 5.0,
            min_dt_scs_min: 15.0,
            desbordes_t0_min: DEFAULT_ENTRY_TIME_MIN,
            sweep_workers: 4,
        }
    }
}

impl Defaults {
    pub fn settings(&self) -> PipelineSettings {
        PipelineSettings {
            lambda: self.lambda,
            shape_factor_x: self.shape_factor_x,
            min_dt_min: self.min_dt_min,
            min_dt_scs_min: self.min_dt_scs_min,
            desbordes_t0_min: self.desbordes_t0_min,
        }
    }
}

/// `[server]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig { port: 8080 }
    }
}

fn default_tc_method() -> TcMethod {
    TcMethod::Kirpich
}

fn default_storm() -> String {
    "gz".to_string()
}

/// One `[[catchment]]` table.
///
/// Either `p3_10` or `department` must be given; the department is looked
/// up in the embedded P3,10 table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchmentConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub area_ha: f64,
    pub slope_pct: f64,
    pub length_m: f64,
    #[serde(default)]
    pub p3_10: Option<f64>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub c: Option<f64>,
    #[serde(default)]
    pub cn: Option<f64>,
    #[serde(default)]
    pub amc: AntecedentMoisture,
    #[serde(default)]
    pub soil_group: Option<SoilGroup>,
    #[serde(default)]
    pub elevation_drop_m: Option<f64>,
    #[serde(default)]
    pub centroid_length_m: Option<f64>,
    #[serde(default)]
    pub manning_n: Option<f64>,
    #[serde(default = "default_tc_method")]
    pub tc_method: TcMethod,
    /// Storm method name as accepted by `StormMethod::from_str`.
    #[serde(default = "default_storm")]
    pub storm: String,
}

impl CatchmentConfig {
    fn error(&self, source: HydroError) -> ConfigError {
        ConfigError::Catchment { name: self.name.clone(), source }
    }

    pub fn p3_10(&self) -> Result<f64, ConfigError> {
        match (self.p3_10, &self.department) {
            (Some(p), _) => Ok(p),
            (None, Some(dept)) => p3_10_for_department(dept).map_err(|e| self.error(e)),
            (None, None) => Err(self.error(HydroError::missing("p3_10 or department", "catchment config"))),
        }
    }

    /// Builds the model catchment; geometry is validated here.
    pub fn to_parameters(&self) -> Result<CatchmentParameters, ConfigError> {
        let mut params = CatchmentParameters::new(&self.name, self.area_ha, self.slope_pct, self.length_m, self.p3_10()?);
        params.runoff_coefficient = self.c;
        params.curve_number = self.cn;
        params.amc = self.amc;
        params.soil_group = self.soil_group;
        params.elevation_drop_m = self.elevation_drop_m;
        params.centroid_length_m = self.centroid_length_m;
        params.manning_n = self.manning_n;
        params.validate().map_err(|e| self.error(e))?;
        Ok(params)
    }

    pub fn storm_method(&self) -> Result<StormMethod, ConfigError> {
        self.storm.parse().map_err(|e| self.error(e))
    }
}

/// Root configuration structure for TOML parsing
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HydroConfig {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default, rename = "catchment")]
    pub catchments: Vec<CatchmentConfig>,
}

impl HydroConfig {
    pub fn find_catchment(&self, name: &str) -> Option<&CatchmentConfig> {
        self.catchments.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Range checks that TOML types alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.defaults;
        if !(d.lambda > 0.0 && d.lambda < 1.0) {
            return Err(ConfigError::Invalid(format!("lambda = {} must be in (0, 1)", d.lambda)));
        }
        if !(d.shape_factor_x > 0.0) {
            return Err(ConfigError::Invalid(format!("shape_factor_x = {} must be > 0", d.shape_factor_x)));
        }
        if d.return_periods.is_empty() || d.return_periods.iter().any(|tr| !(*tr >= 2.0)) {
            return Err(ConfigError::Invalid("return_periods must be non-empty and all >= 2".to_string()));
        }
        if d.durations_hr.iter().any(|h| !(*h > 0.0)) {
            return Err(ConfigError::Invalid("durations_hr must all be > 0".to_string()));
        }
        if !(d.min_dt_min > 0.0 && d.min_dt_scs_min > 0.0 && d.desbordes_t0_min >= 0.0) {
            return Err(ConfigError::Invalid("time steps must be > 0 and t0 >= 0".to_string()));
        }
        if d.sweep_workers == 0 {
            return Err(ConfigError::Invalid("sweep_workers must be >= 1".to_string()));
        }

        let mut seen = HashSet::new();
        for catchment in &self.catchments {
            if !seen.insert(catchment.name.to_lowercase()) {
                return Err(ConfigError::Invalid(format!("duplicate catchment '{}'", catchment.name)));
            }
            catchment.to_parameters()?;
            catchment.storm_method()?;
        }
        Ok(())
    }
}

/// Parses TOML text and validates it.
pub fn parse_config(contents: &str, path: &Path) -> Result<HydroConfig, ConfigError> {
    let config: HydroConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<HydroConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&contents, path)
}

/// Loads `.env`, then the file named by `HIDRO_CONFIG` or `hydrology.toml`.
pub fn load_default_config() -> Result<HydroConfig, ConfigError> {
    dotenv::dotenv().ok();
    let path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_config(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<HydroConfig, ConfigError> {
        parse_config(text, Path::new("test.toml"))
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.defaults, Defaults::default());
        assert_eq!(config.server.port, 8080);
        assert!(config.catchments.is_empty());
    }

    #[test]
    fn test_catchment_with_department() {
        let config = parse(
            r#"
            [[catchment]]
            name = "arroyo"
            area_ha = 120.0
            slope_pct = 1.5
            length_m = 2100.0
            department = "Montevideo"
            cn = 78.0
            amc = "wet"
            storm = "huff_q2"
            "#,
        )
        .unwrap();
        let c = config.find_catchment("ARROYO").unwrap();
        let params = c.to_parameters().unwrap();
        assert_eq!(params.p3_10, p3_10_for_department("montevideo").unwrap());
        assert_eq!(params.amc, AntecedentMoisture::Wet);
        assert_eq!(c.tc_method, TcMethod::Kirpich);
        assert_eq!(c.storm_method().unwrap().label(), "huff_q2_p50");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(parse("[defaults]\nlambda = 1.5"), Err(ConfigError::Invalid(_))));
        assert!(matches!(parse("[defaults]\nreturn_periods = [1.0, 10.0]"), Err(ConfigError::Invalid(_))));
        assert!(matches!(parse("[defaults]\nsweep_workers = 0"), Err(ConfigError::Invalid(_))));
        assert!(matches!(parse("[defaults\n"), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_catchment_without_depth_source_fails() {
        let err = parse("[[catchment]]\nname = \"x\"\narea_ha = 1.0\nslope_pct = 1.0\nlength_m = 100.0").unwrap_err();
        assert!(matches!(err, ConfigError::Catchment { .. }));
        let err = parse(
            "[[catchment]]\nname = \"x\"\narea_ha = 1.0\nslope_pct = 1.0\nlength_m = 100.0\np3_10 = 80.0\nstorm = \"monsoon\"",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Catchment { source: HydroError::UnknownMethod { .. }, .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(load_config("no/such/hydrology.toml"), Err(ConfigError::Io { .. })));
    }
}
