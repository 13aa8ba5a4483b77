//! Storage collaborator interface
//!
//! The engine never touches storage. Callers inject a `SimulationStore`
//! and move `Simulation`s and results through it explicitly.

use std::collections::BTreeMap;

use log::debug;

use super::portfolio::{history, PortfolioSummary};
use super::record::{Simulation, SimulationRecord};
use crate::contribution::{group_by_simulation, ContributionRecord};
use crate::error::{Result, SimulationError};
use crate::projection::SimulationResult;

pub trait SimulationStore {
    /// Persist a simulation's inputs and its computed row
    fn save(&mut self, simulation: &Simulation, result: &SimulationResult) -> Result<()>;

    /// Load the inputs of a saved simulation
    fn load(&self, simulation_id: &str) -> Result<Simulation>;

    /// Ids of all saved simulations, in id order
    fn list(&self) -> Vec<String>;

    fn delete(&mut self, simulation_id: &str) -> Result<()>;

    /// Saved rows, newest first, optionally limited to one client
    fn list_by_client(&self, client_name: Option<&str>) -> Vec<SimulationRecord>;

    /// Portfolio aggregates over every saved row
    fn summary(&self) -> PortfolioSummary {
        PortfolioSummary::from_records(&self.list_by_client(None))
    }
}

/// Row-oriented in-memory store
///
/// Keeps data in the persisted row schema, so a save/load cycle goes through
/// the same mapping as an external table would.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    simulations: BTreeMap<String, SimulationRecord>,
    contributions: Vec<ContributionRecord>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored row for a simulation
    pub fn record(&self, simulation_id: &str) -> Option<&SimulationRecord> {
        self.simulations.get(simulation_id)
    }

    pub fn contribution_rows(&self) -> &[ContributionRecord] {
        &self.contributions
    }
}

impl SimulationStore for InMemoryStore {
    fn save(&mut self, simulation: &Simulation, result: &SimulationResult) -> Result<()> {
        debug!("Saving simulation {}", simulation.simulation_id);
        self.contributions
            .retain(|c| c.simulation_id != simulation.simulation_id);
        self.contributions.extend(simulation.contribution_records());
        self.simulations
            .insert(simulation.simulation_id.clone(), simulation.to_record(result));
        Ok(())
    }

    fn load(&self, simulation_id: &str) -> Result<Simulation> {
        let record = self
            .simulations
            .get(simulation_id)
            .ok_or_else(|| SimulationError::NotFound(simulation_id.to_string()))?;

        let owned: Vec<ContributionRecord> = self
            .contributions
            .iter()
            .filter(|c| c.simulation_id == simulation_id)
            .cloned()
            .collect();
        let contributions = group_by_simulation(&owned)
            .remove(simulation_id)
            .unwrap_or_default();

        Ok(Simulation::from_records(record, contributions))
    }

    fn list(&self) -> Vec<String> {
        self.simulations.keys().cloned().collect()
    }

    fn delete(&mut self, simulation_id: &str) -> Result<()> {
        if self.simulations.remove(simulation_id).is_none() {
            return Err(SimulationError::NotFound(simulation_id.to_string()));
        }
        self.contributions.retain(|c| c.simulation_id != simulation_id);
        Ok(())
    }

    fn list_by_client(&self, client_name: Option<&str>) -> Vec<SimulationRecord> {
        let records: Vec<SimulationRecord> = self.simulations.values().cloned().collect();
        history(&records, client_name).into_iter().cloned().collect()
    }
}
