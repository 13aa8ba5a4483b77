//! Scenario runner for what-if and sensitivity analysis
//!
//! Each scenario re-evaluates the investor return from scratch with
//! perturbed project parameters. No state is shared between runs, so results
//! do not depend on evaluation order.

mod sensitivity;

pub use sensitivity::{
    linspace, sensitivity_grid, SensitivityGrid, SensitivityMetric, SensitivityVariable,
};

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::contribution::Contribution;
use crate::project::ProjectParameters;
use crate::projection::{compute_return, SimulationResult};

pub const PESSIMISTIC: &str = "Pessimistic";
pub const REALISTIC: &str = "Realistic";
pub const OPTIMISTIC: &str = "Optimistic";

/// Multiplicative shift applied to the baseline parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAdjustment {
    pub name: String,
    pub sale_price_factor: f64,
    pub construction_cost_factor: f64,
}

impl ScenarioAdjustment {
    pub fn new(name: impl Into<String>, sale_price_factor: f64, construction_cost_factor: f64) -> Self {
        Self {
            name: name.into(),
            sale_price_factor,
            construction_cost_factor,
        }
    }

    /// Sale price down and cost up by `shift`
    pub fn pessimistic(shift: f64) -> Self {
        Self::new(PESSIMISTIC, 1.0 - shift, 1.0 + shift)
    }

    pub fn realistic() -> Self {
        Self::new(REALISTIC, 1.0, 1.0)
    }

    /// Sale price up and cost down by `shift`
    pub fn optimistic(shift: f64) -> Self {
        Self::new(OPTIMISTIC, 1.0 + shift, 1.0 - shift)
    }

    /// Copy of `params` with this adjustment applied
    pub fn apply(&self, params: &ProjectParameters) -> ProjectParameters {
        let mut adjusted = params.clone();
        adjusted.sale_price_per_area *= self.sale_price_factor;
        adjusted.construction_cost_per_area *= self.construction_cost_factor;
        adjusted
    }
}

/// Result of one named scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name: String,
    /// Parameters after the adjustment
    pub parameters: ProjectParameters,
    pub result: SimulationResult,
}

/// Custom override compared against the baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhatIfOutcome {
    pub baseline: SimulationResult,
    pub adjusted: SimulationResult,
    pub delta_net_result: f64,
    pub delta_roi: f64,
    pub delta_roi_annualized: f64,
}

/// Runs named scenarios, what-if overrides and sensitivity grids
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new();
/// let outcomes = runner.run_default_scenarios(&params, &contributions);
/// let grid = runner.sensitivity_grid(&params, &contributions);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ScenarioRunner {
    config: SimulationConfig,
}

impl ScenarioRunner {
    /// Runner with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SimulationConfig {
        &mut self.config
    }

    /// Pessimistic, Realistic and Optimistic adjustments from the configured shifts
    pub fn default_adjustments(&self) -> Vec<ScenarioAdjustment> {
        vec![
            ScenarioAdjustment::pessimistic(self.config.scenarios.downside),
            ScenarioAdjustment::realistic(),
            ScenarioAdjustment::optimistic(self.config.scenarios.upside),
        ]
    }

    /// Run a single scenario
    pub fn run(
        &self,
        params: &ProjectParameters,
        contributions: &[Contribution],
        adjustment: &ScenarioAdjustment,
    ) -> ScenarioOutcome {
        let adjusted = adjustment.apply(params);
        debug!(
            "Scenario {}: sale/area {:.2}, cost/area {:.2}",
            adjustment.name, adjusted.sale_price_per_area, adjusted.construction_cost_per_area
        );
        let result = compute_return(&adjusted, contributions);
        ScenarioOutcome {
            name: adjustment.name.clone(),
            parameters: adjusted,
            result,
        }
    }

    /// Run several scenarios; output order follows `adjustments`
    pub fn run_scenarios(
        &self,
        params: &ProjectParameters,
        contributions: &[Contribution],
        adjustments: &[ScenarioAdjustment],
    ) -> Vec<ScenarioOutcome> {
        if self.config.parallel {
            adjustments
                .par_iter()
                .map(|adj| self.run(params, contributions, adj))
                .collect()
        } else {
            adjustments
                .iter()
                .map(|adj| self.run(params, contributions, adj))
                .collect()
        }
    }

    pub fn run_default_scenarios(
        &self,
        params: &ProjectParameters,
        contributions: &[Contribution],
    ) -> Vec<ScenarioOutcome> {
        self.run_scenarios(params, contributions, &self.default_adjustments())
    }

    /// Recompute with explicit sale price and construction cost per area
    pub fn what_if(
        &self,
        params: &ProjectParameters,
        contributions: &[Contribution],
        sale_price_per_area: f64,
        construction_cost_per_area: f64,
    ) -> WhatIfOutcome {
        let baseline = compute_return(params, contributions);

        let mut overridden = params.clone();
        overridden.sale_price_per_area = sale_price_per_area;
        overridden.construction_cost_per_area = construction_cost_per_area;
        let adjusted = compute_return(&overridden, contributions);

        WhatIfOutcome {
            delta_net_result: adjusted.net_result - baseline.net_result,
            delta_roi: adjusted.roi - baseline.roi,
            delta_roi_annualized: adjusted.roi_annualized - baseline.roi_annualized,
            baseline,
            adjusted,
        }
    }

    /// Sensitivity grid using the configured axes, span and point count
    pub fn sensitivity_grid(
        &self,
        params: &ProjectParameters,
        contributions: &[Contribution],
    ) -> SensitivityGrid {
        sensitivity_grid(params, contributions, &self.config.grid, self.config.parallel)
    }
}
