//! Project economics: gross sale value, cost breakdown and operating result
//!
//! Pure function of the project parameters plus the investor's cost of
//! capital. No time dependency.

use serde::{Deserialize, Serialize};

use super::ProjectParameters;

/// Cost and revenue breakdown for the project
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectEconomics {
    /// Gross sale value (VGV)
    pub vgv: f64,

    /// Physical construction cost
    pub construction_cost_physical: f64,

    /// Value of area ceded in lieu of cash, charged as a cost
    pub area_exchange_value: f64,

    /// Investor's cost of capital charged back to the project
    pub investor_interest_cost: f64,

    /// Physical cost + area exchange + investor interest
    pub total_construction_cost: f64,

    /// VGV minus total construction cost
    pub operational_result: f64,
}

/// Compute the project's economics
pub fn compute_economics(params: &ProjectParameters, investor_interest_cost: f64) -> ProjectEconomics {
    let vgv = params.land_size * params.sale_price_per_area;
    let construction_cost_physical = params.land_size * params.construction_cost_per_area;
    let area_exchange_value = vgv * params.area_exchange_percentage / 100.0;
    let total_construction_cost =
        construction_cost_physical + area_exchange_value + investor_interest_cost;

    ProjectEconomics {
        vgv,
        construction_cost_physical,
        area_exchange_value,
        investor_interest_cost,
        total_construction_cost,
        operational_result: vgv - total_construction_cost,
    }
}
