//! Project parameters, interest rate conventions and project economics

mod economics;
pub mod rates;

pub use economics::{compute_economics, ProjectEconomics};
pub use rates::{annual_from_monthly, daily_rate, monthly_from_annual, InterestRate, DAYS_PER_YEAR};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inputs describing the real-estate project and the investment terms
///
/// Percentages are expressed in percent (20.0 for 20%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectParameters {
    /// Sellable area
    pub land_size: f64,

    /// Expected sale price per unit of area
    pub sale_price_per_area: f64,

    /// Physical construction cost per unit of area
    pub construction_cost_per_area: f64,

    /// Share of VGV ceded to the landowner in exchange for the land [0, 100]
    pub area_exchange_percentage: f64,

    /// Investor's share of the operational result [0, 100]
    pub spe_percentage: f64,

    /// Effective annual interest rate paid on contributed capital (percent)
    pub annual_interest_rate: f64,

    pub start_date: NaiveDate,

    /// Horizon to which contributions are compounded
    pub project_end_date: NaiveDate,
}

impl ProjectParameters {
    /// Annual interest rate as a decimal
    pub fn annual_rate(&self) -> f64 {
        self.annual_interest_rate / 100.0
    }

    /// Copy with the interest rate taken from a caller-supplied rate
    pub fn with_interest_rate(mut self, rate: InterestRate) -> Self {
        self.annual_interest_rate = rate.annual_percent();
        self
    }
}

#[cfg(test)]
pub(crate) fn test_parameters() -> ProjectParameters {
    ProjectParameters {
        land_size: 1000.0,
        sale_price_per_area: 10_000.0,
        construction_cost_per_area: 3_500.0,
        area_exchange_percentage: 20.0,
        spe_percentage: 65.0,
        annual_interest_rate: 12.0,
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        project_end_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
    }
}
