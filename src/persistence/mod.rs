//! Persistence boundary: row schema, tolerant parsing, CSV codec, history
//! and portfolio aggregates, and the storage collaborator trait

mod csv_io;
pub mod parse;
mod portfolio;
mod record;
mod store;

pub use csv_io::{read_simulations, write_simulations};
pub use parse::{parse_date, parse_date_or, parse_date_or_today, parse_datetime, parse_number};
pub use portfolio::{
    client_names, history, roi_histogram, PortfolioSummary, RoiBin, DEFAULT_ROI_BINS,
};
pub use record::{
    rebuild_simulations, ClientInfo, Simulation, SimulationRecord, CREATED_AT_FORMAT, SIMULATION_COLUMNS,
};
pub use store::{InMemoryStore, SimulationStore};

#[cfg(test)]
pub(crate) fn sample_simulation() -> Simulation {
    use crate::contribution::Contribution;
    use chrono::NaiveDate;

    Simulation {
        simulation_id: "sim-42".into(),
        created_at: NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 15, 0)
            .unwrap(),
        client: ClientInfo {
            name: "Ana Souza".into(),
            code: "C-001".into(),
        },
        parameters: crate::project::test_parameters(),
        contributions: vec![
            Contribution::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 100_000.0).unwrap(),
        ],
    }
}
