//! Error type for the construction and I/O boundaries
//!
//! The calculation engine itself never fails; degenerate inputs resolve to
//! fallback values. Errors only arise when building inputs or moving data
//! in and out of the process.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid contribution amount: {amount} (must be positive and finite)")]
    InvalidContribution { amount: f64 },

    #[error("Invalid installment schedule: {0}")]
    InvalidSchedule(String),

    #[error("Simulation not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimulationError>;
