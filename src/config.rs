//! Run configuration for scenario and sensitivity analysis
//!
//! Defaults can be overridden from a JSON file and then from environment
//! variables:
//! - `SIM_SCENARIO_DOWNSIDE`, `SIM_SCENARIO_UPSIDE`
//! - `SIM_GRID_POINTS`, `SIM_GRID_SPAN`
//! - `SIM_PARALLEL` (`true`/`false`)

use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::scenario::{SensitivityMetric, SensitivityVariable};

/// Default shift applied to sale price and construction cost for the
/// pessimistic/optimistic scenarios
pub const DEFAULT_SCENARIO_SHIFT: f64 = 0.15;

/// Default number of grid points per axis
pub const DEFAULT_GRID_POINTS: usize = 5;

/// Default half-width of each grid axis around the baseline value
pub const DEFAULT_GRID_SPAN: f64 = 0.20;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub scenarios: ScenarioConfig,
    pub grid: GridConfig,
    /// Evaluate scenarios and grid cells on the rayon pool
    pub parallel: bool,
}

/// Named scenario shifts (fractions, 0.15 = 15%)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Sale price falls and cost rises by this fraction in the pessimistic case
    pub downside: f64,
    /// Sale price rises and cost falls by this fraction in the optimistic case
    pub upside: f64,
}

/// Sensitivity grid shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub points: usize,
    pub span: f64,
    pub row: SensitivityVariable,
    pub column: SensitivityVariable,
    pub metric: SensitivityMetric,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            scenarios: ScenarioConfig::default(),
            grid: GridConfig::default(),
            parallel: true,
        }
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            downside: DEFAULT_SCENARIO_SHIFT,
            upside: DEFAULT_SCENARIO_SHIFT,
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            points: DEFAULT_GRID_POINTS,
            span: DEFAULT_GRID_SPAN,
            row: SensitivityVariable::SalePricePerArea,
            column: SensitivityVariable::ConstructionCostPerArea,
            metric: SensitivityMetric::RoiAnnualized,
        }
    }
}

fn env_override<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => {
            debug!("Config override from {}={}", name, raw);
            Some(value)
        }
        Err(_) => {
            warn!("Ignoring unparseable {}={:?}", name, raw);
            None
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a JSON file; missing fields take defaults
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `SIM_*` environment overrides on top of this configuration
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(v) = env_override("SIM_SCENARIO_DOWNSIDE") {
            self.scenarios.downside = v;
        }
        if let Some(v) = env_override("SIM_SCENARIO_UPSIDE") {
            self.scenarios.upside = v;
        }
        if let Some(v) = env_override("SIM_GRID_POINTS") {
            self.grid.points = v;
        }
        if let Some(v) = env_override("SIM_GRID_SPAN") {
            self.grid.span = v;
        }
        if let Some(v) = env_override("SIM_PARALLEL") {
            self.parallel = v;
        }
        self
    }
}
