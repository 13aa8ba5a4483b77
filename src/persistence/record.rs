//! Row schema shared with storage collaborators
//!
//! `SimulationRecord` is one row of the simulations table, in the fixed
//! column order below. Contributions live in a child table keyed by
//! `simulation_id` (see `contribution::ContributionRecord`).

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::contribution::{group_by_simulation, records_for, Contribution, ContributionRecord};
use crate::project::ProjectParameters;
use crate::projection::{compute_return, SimulationResult};

/// Timestamp layout used in persisted rows
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column order of the simulations table
pub const SIMULATION_COLUMNS: [&str; 22] = [
    "simulation_id",
    "created_at",
    "client_name",
    "client_code",
    "total_contribution",
    "num_months",
    "annual_interest_rate",
    "spe_percentage",
    "land_size",
    "construction_cost_per_area",
    "sale_price_per_area",
    "area_exchange_percentage",
    "vgv",
    "total_construction_cost",
    "operational_result",
    "investor_profit_share",
    "net_result",
    "roi",
    "roi_annualized",
    "corrected_principal",
    "start_date",
    "project_end_date",
];

mod created_at_format {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    use super::CREATED_AT_FORMAT;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(CREATED_AT_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, CREATED_AT_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Client identification carried alongside a simulation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub code: String,
}

/// Caller-side aggregate: identity plus engine inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    pub simulation_id: String,
    pub created_at: NaiveDateTime,
    pub client: ClientInfo,
    pub parameters: ProjectParameters,
    pub contributions: Vec<Contribution>,
}

impl Simulation {
    /// Run the engine on this simulation's inputs
    pub fn run(&self) -> SimulationResult {
        compute_return(&self.parameters, &self.contributions).with_simulation_id(&self.simulation_id)
    }

    /// Row for the simulations table
    pub fn to_record(&self, result: &SimulationResult) -> SimulationRecord {
        SimulationRecord {
            simulation_id: self.simulation_id.clone(),
            created_at: self.created_at,
            client_name: self.client.name.clone(),
            client_code: self.client.code.clone(),
            total_contribution: result.total_contribution,
            num_months: result.num_months,
            annual_interest_rate: result.parameters.annual_interest_rate,
            spe_percentage: result.parameters.spe_percentage,
            land_size: result.parameters.land_size,
            construction_cost_per_area: result.parameters.construction_cost_per_area,
            sale_price_per_area: result.parameters.sale_price_per_area,
            area_exchange_percentage: result.parameters.area_exchange_percentage,
            vgv: result.vgv,
            total_construction_cost: result.total_construction_cost,
            operational_result: result.operational_result,
            investor_profit_share: result.investor_profit_share,
            net_result: result.net_result,
            roi: result.roi_percent(),
            roi_annualized: result.roi_annualized_percent(),
            corrected_principal: result.corrected_principal,
            start_date: result.parameters.start_date,
            project_end_date: result.parameters.project_end_date,
        }
    }

    /// Rows for the contributions table
    pub fn contribution_records(&self) -> Vec<ContributionRecord> {
        records_for(&self.simulation_id, &self.contributions)
    }

    /// Rebuild engine inputs from a persisted row and its contributions
    ///
    /// Derived columns of the row are ignored; they are recomputed by `run`.
    pub fn from_records(record: &SimulationRecord, contributions: Vec<Contribution>) -> Self {
        Self {
            simulation_id: record.simulation_id.clone(),
            created_at: record.created_at,
            client: ClientInfo {
                name: record.client_name.clone(),
                code: record.client_code.clone(),
            },
            parameters: ProjectParameters {
                land_size: record.land_size,
                sale_price_per_area: record.sale_price_per_area,
                construction_cost_per_area: record.construction_cost_per_area,
                area_exchange_percentage: record.area_exchange_percentage,
                spe_percentage: record.spe_percentage,
                annual_interest_rate: record.annual_interest_rate,
                start_date: record.start_date,
                project_end_date: record.project_end_date,
            },
            contributions,
        }
    }
}

/// Rebuild every simulation from persisted rows, in row order
///
/// Rows sharing an id each receive that id's full contribution list.
pub fn rebuild_simulations(
    records: &[SimulationRecord],
    contribution_rows: &[ContributionRecord],
) -> Vec<Simulation> {
    let contributions = group_by_simulation(contribution_rows);
    let mut seen = BTreeSet::new();

    let simulations = records
        .iter()
        .map(|record| {
            if !seen.insert(record.simulation_id.as_str()) {
                warn!("Duplicate simulation id {}", record.simulation_id);
            }
            let owned = contributions
                .get(&record.simulation_id)
                .cloned()
                .unwrap_or_default();
            if owned.is_empty() {
                warn!("Simulation {} has no contributions", record.simulation_id);
            }
            Simulation::from_records(record, owned)
        })
        .collect();

    for orphan in contributions.keys().filter(|id| !seen.contains(id.as_str())) {
        warn!("Contributions for unknown simulation {} ignored", orphan);
    }
    simulations
}

/// One row of the simulations table
///
/// Percent-valued columns (`annual_interest_rate`, `spe_percentage`,
/// `area_exchange_percentage`, `roi`, `roi_annualized`) hold percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    pub simulation_id: String,
    #[serde(with = "created_at_format")]
    pub created_at: NaiveDateTime,
    pub client_name: String,
    pub client_code: String,
    pub total_contribution: f64,
    pub num_months: u32,
    pub annual_interest_rate: f64,
    pub spe_percentage: f64,
    pub land_size: f64,
    pub construction_cost_per_area: f64,
    pub sale_price_per_area: f64,
    pub area_exchange_percentage: f64,
    pub vgv: f64,
    pub total_construction_cost: f64,
    pub operational_result: f64,
    pub investor_profit_share: f64,
    pub net_result: f64,
    pub roi: f64,
    pub roi_annualized: f64,
    pub corrected_principal: f64,
    pub start_date: NaiveDate,
    pub project_end_date: NaiveDate,
}
