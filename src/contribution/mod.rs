//! Contribution data structures and persisted-row loading

mod data;
pub mod loader;

pub use data::{sorted_by_date, total_amount, Contribution, ContributionSchedule};
pub use loader::{
    group_by_simulation, read_contribution_records, records_for, write_contribution_records,
    ContributionRecord,
};
