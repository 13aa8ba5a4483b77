//! Investment Simulator - investor return engine for real-estate development projects
//!
//! This library provides:
//! - Daily compounding of dated contributions to the project horizon
//! - Project economics (VGV, construction cost, operational result)
//! - Investor profit share, net result, ROI and annualized ROI
//! - Named scenarios, what-if overrides and two-way sensitivity grids
//! - Persisted row schema with tolerant CSV loading, history and portfolio aggregates
//! - Plain-text reporting

pub mod config;
pub mod contribution;
pub mod error;
pub mod persistence;
pub mod project;
pub mod projection;
pub mod report;
pub mod scenario;

// Re-export commonly used types
pub use config::SimulationConfig;
pub use contribution::{Contribution, ContributionSchedule};
pub use error::{Result, SimulationError};
pub use project::{InterestRate, ProjectParameters};
pub use projection::{compute_return, SimulationResult};
pub use scenario::ScenarioRunner;
