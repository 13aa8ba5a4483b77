//! Simulation history and portfolio aggregates over persisted rows

use serde::{Deserialize, Serialize};

use super::record::SimulationRecord;

/// Number of annualized-ROI buckets in a portfolio summary
pub const DEFAULT_ROI_BINS: usize = 20;

/// Saved simulations, newest `created_at` first
///
/// With `client_name`, only that client's simulations are kept. Ties keep
/// row order.
pub fn history<'a>(records: &'a [SimulationRecord], client_name: Option<&str>) -> Vec<&'a SimulationRecord> {
    let mut selected: Vec<&SimulationRecord> = records
        .iter()
        .filter(|r| client_name.map_or(true, |name| r.client_name == name))
        .collect();
    selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    selected
}

/// Distinct client names in first-seen order
pub fn client_names(records: &[SimulationRecord]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for record in records {
        if !names.contains(&record.client_name.as_str()) {
            names.push(&record.client_name);
        }
    }
    names
}

/// Equal-width bucket of annualized ROI (percent)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u32,
}

/// Portfolio-wide figures over a set of saved simulations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub simulation_count: usize,
    pub total_vgv: f64,
    pub total_contribution: f64,
    /// Mean of the persisted annualized ROI (percent); 0 with no rows
    pub mean_roi_annualized: f64,
    pub roi_distribution: Vec<RoiBin>,
}

impl PortfolioSummary {
    pub fn from_records(records: &[SimulationRecord]) -> Self {
        Self::with_bins(records, DEFAULT_ROI_BINS)
    }

    pub fn with_bins(records: &[SimulationRecord], bins: usize) -> Self {
        let rois: Vec<f64> = records.iter().map(|r| r.roi_annualized).collect();
        let mean_roi_annualized = if rois.is_empty() {
            0.0
        } else {
            rois.iter().sum::<f64>() / rois.len() as f64
        };

        Self {
            simulation_count: records.len(),
            total_vgv: records.iter().map(|r| r.vgv).sum(),
            total_contribution: records.iter().map(|r| r.total_contribution).sum(),
            mean_roi_annualized,
            roi_distribution: roi_histogram(&rois, bins),
        }
    }
}

/// Bucket values into `bins` equal-width bins spanning their range
///
/// The last bin is closed on the right. Identical values share one bin.
pub fn roi_histogram(values: &[f64], bins: usize) -> Vec<RoiBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max - min < f64::EPSILON {
        return vec![RoiBin {
            lower: min,
            upper: max,
            count: values.len() as u32,
        }];
    }

    let width = (max - min) / bins as f64;
    let mut histogram: Vec<RoiBin> = (0..bins)
        .map(|i| RoiBin {
            lower: min + i as f64 * width,
            upper: if i + 1 == bins { max } else { min + (i + 1) as f64 * width },
            count: 0,
        })
        .collect();

    for &value in values {
        let index = (((value - min) / width) as usize).min(bins - 1);
        histogram[index].count += 1;
    }
    histogram
}
