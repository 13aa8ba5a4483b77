//! Two-way sensitivity grid over project parameters
//!
//! Every cell is a full, independent recomputation of the investor return,
//! so the grid is identical whether evaluated sequentially or in parallel.

use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::GridConfig;
use crate::contribution::Contribution;
use crate::project::ProjectParameters;
use crate::projection::{compute_return, SimulationResult};

/// Project parameter that can be swept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityVariable {
    SalePricePerArea,
    ConstructionCostPerArea,
    LandSize,
    AreaExchangePercentage,
    SpePercentage,
    AnnualInterestRate,
}

impl SensitivityVariable {
    pub const ALL: [SensitivityVariable; 6] = [
        SensitivityVariable::SalePricePerArea,
        SensitivityVariable::ConstructionCostPerArea,
        SensitivityVariable::LandSize,
        SensitivityVariable::AreaExchangePercentage,
        SensitivityVariable::SpePercentage,
        SensitivityVariable::AnnualInterestRate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SensitivityVariable::SalePricePerArea => "sale_price_per_area",
            SensitivityVariable::ConstructionCostPerArea => "construction_cost_per_area",
            SensitivityVariable::LandSize => "land_size",
            SensitivityVariable::AreaExchangePercentage => "area_exchange_percentage",
            SensitivityVariable::SpePercentage => "spe_percentage",
            SensitivityVariable::AnnualInterestRate => "annual_interest_rate",
        }
    }

    /// Current value of this parameter
    pub fn value_of(&self, params: &ProjectParameters) -> f64 {
        match self {
            SensitivityVariable::SalePricePerArea => params.sale_price_per_area,
            SensitivityVariable::ConstructionCostPerArea => params.construction_cost_per_area,
            SensitivityVariable::LandSize => params.land_size,
            SensitivityVariable::AreaExchangePercentage => params.area_exchange_percentage,
            SensitivityVariable::SpePercentage => params.spe_percentage,
            SensitivityVariable::AnnualInterestRate => params.annual_interest_rate,
        }
    }

    /// Copy of `params` with this parameter replaced
    pub fn with_value(&self, params: &ProjectParameters, value: f64) -> ProjectParameters {
        let mut out = params.clone();
        match self {
            SensitivityVariable::SalePricePerArea => out.sale_price_per_area = value,
            SensitivityVariable::ConstructionCostPerArea => out.construction_cost_per_area = value,
            SensitivityVariable::LandSize => out.land_size = value,
            SensitivityVariable::AreaExchangePercentage => out.area_exchange_percentage = value,
            SensitivityVariable::SpePercentage => out.spe_percentage = value,
            SensitivityVariable::AnnualInterestRate => out.annual_interest_rate = value,
        }
        out
    }
}

impl fmt::Display for SensitivityVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensitivityVariable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == normalized)
            .ok_or_else(|| format!("Unknown sensitivity variable: {}", s))
    }
}

/// Output figure recorded in each grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityMetric {
    #[default]
    RoiAnnualized,
    Roi,
    NetResult,
}

impl SensitivityMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensitivityMetric::RoiAnnualized => "roi_annualized",
            SensitivityMetric::Roi => "roi",
            SensitivityMetric::NetResult => "net_result",
        }
    }

    pub fn extract(&self, result: &SimulationResult) -> f64 {
        match self {
            SensitivityMetric::RoiAnnualized => result.roi_annualized,
            SensitivityMetric::Roi => result.roi,
            SensitivityMetric::NetResult => result.net_result,
        }
    }
}

impl fmt::Display for SensitivityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensitivityMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "roi_annualized" => Ok(SensitivityMetric::RoiAnnualized),
            "roi" => Ok(SensitivityMetric::Roi),
            "net_result" => Ok(SensitivityMetric::NetResult),
            other => Err(format!("Unknown sensitivity metric: {}", other)),
        }
    }
}

/// `points` evenly spaced values from `center*(1-span)` to `center*(1+span)`
pub fn linspace(center: f64, span: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![center],
        n => {
            let low = center * (1.0 - span);
            let high = center * (1.0 + span);
            let step = (high - low) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { high } else { low + step * i as f64 })
                .collect()
        }
    }
}

/// Result of a two-way sweep
///
/// `matrix[i][j]` holds the metric for `row_values[i]` and `column_values[j]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityGrid {
    pub row_variable: SensitivityVariable,
    pub column_variable: SensitivityVariable,
    pub metric: SensitivityMetric,
    pub row_values: Vec<f64>,
    pub column_values: Vec<f64>,
    pub matrix: Vec<Vec<f64>>,
    /// Metric at the unperturbed parameters
    pub baseline_value: f64,
}

impl SensitivityGrid {
    pub fn dimensions(&self) -> (usize, usize) {
        (self.row_values.len(), self.column_values.len())
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<f64> {
        self.matrix.get(row)?.get(column).copied()
    }
}

/// Sweep two parameters around their baseline values
pub fn sensitivity_grid(
    params: &ProjectParameters,
    contributions: &[Contribution],
    grid: &GridConfig,
    parallel: bool,
) -> SensitivityGrid {
    if grid.row == grid.column {
        warn!(
            "Row and column both sweep {}; column values take precedence",
            grid.row
        );
    }

    let row_values = linspace(grid.row.value_of(params), grid.span, grid.points);
    let column_values = linspace(grid.column.value_of(params), grid.span, grid.points);
    debug!(
        "Sensitivity grid {}x{} over {} / {} ({})",
        row_values.len(),
        column_values.len(),
        grid.row,
        grid.column,
        grid.metric
    );

    let evaluate_row = |row_value: &f64| -> Vec<f64> {
        let row_params = grid.row.with_value(params, *row_value);
        column_values
            .iter()
            .map(|&column_value| {
                let cell_params = grid.column.with_value(&row_params, column_value);
                grid.metric.extract(&compute_return(&cell_params, contributions))
            })
            .collect()
    };

    let matrix: Vec<Vec<f64>> = if parallel {
        row_values.par_iter().map(&evaluate_row).collect()
    } else {
        row_values.iter().map(&evaluate_row).collect()
    };

    SensitivityGrid {
        row_variable: grid.row,
        column_variable: grid.column,
        metric: grid.metric,
        baseline_value: grid.metric.extract(&compute_return(params, contributions)),
        row_values,
        column_values,
        matrix,
    }
}
