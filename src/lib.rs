/// hidropluvial: design-storm hydrograph analysis for small and medium catchments.
///
/// # Module structure
///
/// ```text
/// hidropluvial
/// ├── error       — HydroError taxonomy shared by every formula
/// ├── model       — shared value types (CatchmentParameters, Hyetograph, UnitHydrograph, …)
/// ├── config      — analysis defaults and sample catchments (hydrology.toml)
/// ├── idf         — regional and international intensity-duration-frequency curves
/// ├── tc          — time-of-concentration estimators
/// ├── storm       — design hyetographs (alternating blocks, GZ, Chicago, SCS, Huff, bimodal, …)
/// ├── runoff      — rational coefficient and SCS curve number excess rainfall
/// ├── hydrograph  — unit hydrographs and convolution
/// ├── pipeline    — Tc → storm → excess → hydrograph for one catchment
/// ├── batch       — parallel sweeps of independent analyses
/// └── endpoint    — JSON HTTP API
/// ```

/// Public modules
pub mod batch;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod hydrograph;
pub mod idf;
pub mod model;
pub mod pipeline;
pub mod runoff;
pub mod storm;
pub mod tc;

pub use error::{HydroError, HydroResult};
