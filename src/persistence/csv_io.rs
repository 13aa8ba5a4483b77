//! CSV codec for the simulations table

use std::io::{Read, Write};

use csv::{ReaderBuilder, Trim, Writer};
use log::{info, warn};
use serde::Deserialize;

use super::parse::{parse_date_or_today, parse_datetime, parse_number};
use super::record::SimulationRecord;
use crate::error::Result;

/// Raw CSV row; every column read as text and coerced afterwards
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CsvRow {
    simulation_id: String,
    created_at: String,
    client_name: String,
    client_code: String,
    total_contribution: String,
    num_months: String,
    annual_interest_rate: String,
    spe_percentage: String,
    land_size: String,
    construction_cost_per_area: String,
    sale_price_per_area: String,
    area_exchange_percentage: String,
    vgv: String,
    total_construction_cost: String,
    operational_result: String,
    investor_profit_share: String,
    net_result: String,
    roi: String,
    roi_annualized: String,
    corrected_principal: String,
    start_date: String,
    project_end_date: String,
}

impl CsvRow {
    /// Coerce to a record; rows without a readable `created_at` are dropped
    fn to_record(self) -> Option<SimulationRecord> {
        let created_at = match parse_datetime(&self.created_at) {
            Some(ts) => ts,
            None => {
                warn!(
                    "Dropping simulation row {:?}: unreadable created_at {:?}",
                    self.simulation_id, self.created_at
                );
                return None;
            }
        };

        Some(SimulationRecord {
            simulation_id: self.simulation_id,
            created_at,
            client_name: self.client_name,
            client_code: self.client_code,
            total_contribution: parse_number(&self.total_contribution),
            num_months: parse_number(&self.num_months).max(0.0).round() as u32,
            annual_interest_rate: parse_number(&self.annual_interest_rate),
            spe_percentage: parse_number(&self.spe_percentage),
            land_size: parse_number(&self.land_size),
            construction_cost_per_area: parse_number(&self.construction_cost_per_area),
            sale_price_per_area: parse_number(&self.sale_price_per_area),
            area_exchange_percentage: parse_number(&self.area_exchange_percentage),
            vgv: parse_number(&self.vgv),
            total_construction_cost: parse_number(&self.total_construction_cost),
            operational_result: parse_number(&self.operational_result),
            investor_profit_share: parse_number(&self.investor_profit_share),
            net_result: parse_number(&self.net_result),
            roi: parse_number(&self.roi),
            roi_annualized: parse_number(&self.roi_annualized),
            corrected_principal: parse_number(&self.corrected_principal),
            start_date: parse_date_or_today(&self.start_date),
            project_end_date: parse_date_or_today(&self.project_end_date),
        })
    }
}

/// Read simulation rows from any reader, coercing malformed values
pub fn read_simulations<R: Read>(reader: R) -> Result<Vec<SimulationRecord>> {
    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for result in csv_reader.deserialize() {
        let row: CsvRow = match result {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                warn!("Skipping undecodable simulation row: {}", e);
                dropped += 1;
                continue;
            }
        };
        match row.to_record() {
            Some(record) => records.push(record),
            None => dropped += 1,
        }
    }

    info!("Loaded {} simulation rows ({} dropped)", records.len(), dropped);
    Ok(records)
}

/// Write simulation rows with a header, in the fixed column order
pub fn write_simulations<W: Write>(writer: W, records: &[SimulationRecord]) -> Result<()> {
    let mut csv_writer = Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contribution::Contribution;
    use crate::persistence::sample_simulation;
    use crate::projection::MAX_ANNUALIZED_ROI;
    use chrono::NaiveDate;

    #[test]
    fn test_write_then_read() {
        let simulation = sample_simulation();
        let record = simulation.to_record(&simulation.run());

        let mut buffer = Vec::new();
        write_simulations(&mut buffer, std::slice::from_ref(&record)).unwrap();
        let loaded = read_simulations(buffer.as_slice()).unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].simulation_id, record.simulation_id);
        assert_eq!(loaded[0].created_at, record.created_at);
        assert_eq!(loaded[0].num_months, record.num_months);
        assert_eq!(loaded[0].start_date, record.start_date);
        assert!((loaded[0].net_result - record.net_result).abs() < 1e-6);
        assert!((loaded[0].roi_annualized - record.roi_annualized).abs() < 1e-9);
    }

    #[test]
    fn test_tolerant_read() {
        let data = "\
simulation_id,created_at,client_name,client_code,total_contribution,num_months,annual_interest_rate,spe_percentage,land_size,construction_cost_per_area,sale_price_per_area,area_exchange_percentage,vgv,total_construction_cost,operational_result,investor_profit_share,net_result,roi,roi_annualized,corrected_principal,start_date,project_end_date
a1,2024-05-01 10:00:00,Ana,C1,\"100.000,00\",24,\"12,5\",65,1000,\"3.500,00\",10000,20,0,0,0,0,0,0,0,0,01/05/2024,2026-05-01
a2,,Bruno,C2,1,1,1,1,1,1,1,1,0,0,0,0,0,0,0,0,2024-05-01,2026-05-01
a3,2024-05-02,Carla,C3,oops,x,,,,,,,,,,,,,,,bad-date,2026-05-01
";
        let records = read_simulations(data.as_bytes()).unwrap();

        // Row without created_at is dropped
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].total_contribution, 100_000.0);
        assert_eq!(records[0].annual_interest_rate, 12.5);
        assert_eq!(records[0].construction_cost_per_area, 3_500.0);
        assert_eq!(records[0].start_date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());

        assert_eq!(records[1].simulation_id, "a3");
        assert_eq!(records[1].total_contribution, 0.0);
        assert_eq!(records[1].num_months, 0);
        assert_eq!(records[1].land_size, 0.0);
    }

    #[test]
    fn test_undecodable_row_skipped() {
        let simulation = sample_simulation();
        let record = simulation.to_record(&simulation.run());
        let mut buffer = Vec::new();
        write_simulations(&mut buffer, &[record.clone(), record]).unwrap();

        // Corrupt the client name of the first data row
        let first_row = buffer.iter().position(|&b| b == b'\n').unwrap() + 1;
        let name_at = first_row + buffer[first_row..].windows(3).position(|w| w == b"Ana").unwrap();
        buffer[name_at] = 0xff;

        let loaded = read_simulations(buffer.as_slice()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].client_name, "Ana Souza");
    }

    #[test]
    fn test_capped_annualized_roi_survives_reload() {
        let mut simulation = sample_simulation();
        simulation.contributions =
            vec![Contribution::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(), 80_000.0).unwrap()];
        let record = simulation.to_record(&simulation.run());
        assert_eq!(record.roi_annualized, MAX_ANNUALIZED_ROI * 100.0);

        let mut buffer = Vec::new();
        write_simulations(&mut buffer, std::slice::from_ref(&record)).unwrap();
        let loaded = read_simulations(buffer.as_slice()).unwrap();
        assert_eq!(loaded[0].roi_annualized, record.roi_annualized);
    }
}
