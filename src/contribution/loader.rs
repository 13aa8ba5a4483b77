//! Load and write the persisted contribution rows
//!
//! Row layout: `simulation_id, contribution_date, contribution_amount`.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim, Writer};
use log::warn;
use serde::{Deserialize, Serialize};

use super::Contribution;
use crate::error::Result;
use crate::persistence::parse::{parse_date_or_today, parse_number};

/// One persisted contribution, keyed by its simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionRecord {
    pub simulation_id: String,
    pub contribution_date: NaiveDate,
    pub contribution_amount: f64,
}

impl ContributionRecord {
    pub fn new(simulation_id: impl Into<String>, contribution: &Contribution) -> Self {
        Self {
            simulation_id: simulation_id.into(),
            contribution_date: contribution.date(),
            contribution_amount: contribution.amount(),
        }
    }

    /// Rebuild the contribution; `None` when the stored amount is not positive
    pub fn to_contribution(&self) -> Option<Contribution> {
        match Contribution::new(self.contribution_date, self.contribution_amount) {
            Ok(c) => Some(c),
            Err(e) => {
                warn!(
                    "Dropping contribution row for simulation {}: {}",
                    self.simulation_id, e
                );
                None
            }
        }
    }
}

/// Raw CSV row; every column read as text and coerced afterwards
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    simulation_id: String,
    #[serde(default)]
    contribution_date: String,
    #[serde(default)]
    contribution_amount: String,
}

impl CsvRow {
    fn to_record(self) -> ContributionRecord {
        ContributionRecord {
            simulation_id: self.simulation_id.trim().to_string(),
            contribution_date: parse_date_or_today(&self.contribution_date),
            contribution_amount: parse_number(&self.contribution_amount),
        }
    }
}

/// Records for every contribution of one simulation
pub fn records_for(simulation_id: &str, contributions: &[Contribution]) -> Vec<ContributionRecord> {
    contributions
        .iter()
        .map(|c| ContributionRecord::new(simulation_id, c))
        .collect()
}

/// Read contribution rows from any reader, coercing malformed values
pub fn read_contribution_records<R: Read>(reader: R) -> Result<Vec<ContributionRecord>> {
    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut records = Vec::new();

    for result in csv_reader.deserialize() {
        let row: CsvRow = match result {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                warn!("Skipping undecodable contribution row: {}", e);
                continue;
            }
        };
        if row.simulation_id.trim().is_empty() {
            warn!("Skipping contribution row without simulation_id");
            continue;
        }
        records.push(row.to_record());
    }

    Ok(records)
}

/// Write contribution rows with a header
pub fn write_contribution_records<W: Write>(writer: W, records: &[ContributionRecord]) -> Result<()> {
    let mut csv_writer = Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Group valid contributions by simulation id
pub fn group_by_simulation(records: &[ContributionRecord]) -> BTreeMap<String, Vec<Contribution>> {
    let mut grouped: BTreeMap<String, Vec<Contribution>> = BTreeMap::new();
    for record in records {
        if let Some(contribution) = record.to_contribution() {
            grouped
                .entry(record.simulation_id.clone())
                .or_default()
                .push(contribution);
        }
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_write_then_read() {
        let contributions = vec![
            Contribution::new(date(2024, 1, 5), 10_000.0).unwrap(),
            Contribution::new(date(2024, 2, 5), 12_500.5).unwrap(),
        ];
        let records = records_for("sim-1", &contributions);

        let mut buffer = Vec::new();
        write_contribution_records(&mut buffer, &records).unwrap();
        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("simulation_id,contribution_date,contribution_amount"));

        let loaded = read_contribution_records(buffer.as_slice()).unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_tolerant_read() {
        let data = "\
simulation_id , contribution_date , contribution_amount
sim-1,2024-01-05,\"10.000,50\"
sim-1,05/02/2024,2500
sim-2,2024-03-01,abc
,2024-03-01,100
";
        let records = read_contribution_records(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].contribution_amount, 10_000.5);
        assert_eq!(records[1].contribution_date, date(2024, 2, 5));
        // Unreadable amount coerced to zero
        assert_eq!(records[2].contribution_amount, 0.0);

        let grouped = group_by_simulation(&records);
        assert_eq!(grouped["sim-1"].len(), 2);
        // Zero-amount row dropped
        assert!(!grouped.contains_key("sim-2"));
    }

    #[test]
    fn test_undecodable_row_skipped() {
        let mut data = b"simulation_id,contribution_date,contribution_amount\n".to_vec();
        data.extend_from_slice(b"sim-1,2024-01-05,1000\n");
        data.extend_from_slice(b"sim-\xff,2024-01-06,2000\n");
        data.extend_from_slice(b"sim-1,2024-01-07,3000\n");

        let records = read_contribution_records(data.as_slice()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].contribution_amount, 3000.0);
    }
}
