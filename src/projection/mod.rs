//! Compounding engine and investor return calculator

mod compounding;
mod engine;
mod result;

pub use compounding::{compound_contributions, future_value, CompoundingOutcome, ContributionGrowth};
pub use engine::{
    annualize_roi, compute_return, elapsed_days, whole_months_between, MAX_ANNUALIZED_ROI,
};
pub use result::SimulationResult;
