//! Simulation output structures

use serde::{Deserialize, Serialize};

use super::compounding::ContributionGrowth;
use crate::contribution::Contribution;
use crate::project::{ProjectEconomics, ProjectParameters};

/// Complete result of one simulation
///
/// Built fresh on every call; echoes the inputs alongside every derived
/// figure. Ratios (`roi`, `roi_annualized`) are decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Opaque correlation id assigned by the caller
    pub simulation_id: Option<String>,

    // Inputs
    pub parameters: ProjectParameters,
    /// Contributions sorted by date
    pub contributions: Vec<Contribution>,

    // Capital
    pub total_contribution: f64,
    pub corrected_principal: f64,
    pub investor_interest_cost: f64,

    // Project
    pub vgv: f64,
    pub construction_cost_physical: f64,
    pub area_exchange_value: f64,
    pub total_construction_cost: f64,
    pub operational_result: f64,

    // Investor
    pub investor_profit_share: f64,
    pub gross_return: f64,
    pub net_result: f64,
    pub roi: f64,
    pub roi_annualized: f64,

    // Holding period
    pub elapsed_days: i64,
    pub num_months: u32,

    /// Per-contribution growth to the horizon
    pub contribution_rows: Vec<ContributionGrowth>,
}

impl SimulationResult {
    /// Copy tagged with a caller-assigned id
    pub fn with_simulation_id(mut self, simulation_id: impl Into<String>) -> Self {
        self.simulation_id = Some(simulation_id.into());
        self
    }

    pub fn economics(&self) -> ProjectEconomics {
        ProjectEconomics {
            vgv: self.vgv,
            construction_cost_physical: self.construction_cost_physical,
            area_exchange_value: self.area_exchange_value,
            investor_interest_cost: self.investor_interest_cost,
            total_construction_cost: self.total_construction_cost,
            operational_result: self.operational_result,
        }
    }

    pub fn roi_percent(&self) -> f64 {
        self.roi * 100.0
    }

    pub fn roi_annualized_percent(&self) -> f64 {
        self.roi_annualized * 100.0
    }
}
