//! Recompute a batch of persisted simulations
//!
//! Usage: run_batch <simulations.csv> <contributions.csv> [--output <csv>]
//!
//! Loads both tables tolerantly, rebuilds every simulation from its stored
//! inputs, recomputes all of them in parallel and writes refreshed rows.

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;

use investment_simulator::contribution::read_contribution_records;
use investment_simulator::persistence::{
    read_simulations, rebuild_simulations, write_simulations, PortfolioSummary, SimulationRecord,
};

#[derive(Parser)]
#[command(name = "run_batch", about = "Recompute a batch of persisted simulations")]
struct Cli {
    /// Simulations table (CSV)
    simulations: PathBuf,
    /// Contributions table (CSV)
    contributions: PathBuf,
    /// Refreshed simulations table
    #[arg(long, default_value = "simulations_recomputed.csv")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let simulations_path = cli.simulations.display();
    let contributions_path = cli.contributions.display();

    let start = Instant::now();
    println!("Loading simulations from {}...", simulations_path);
    let records = read_simulations(
        File::open(&cli.simulations).with_context(|| format!("Failed to open {}", simulations_path))?,
    )?;
    let contribution_rows = read_contribution_records(
        File::open(&cli.contributions).with_context(|| format!("Failed to open {}", contributions_path))?,
    )?;
    println!(
        "Loaded {} simulations and {} contributions in {:?}",
        records.len(),
        contribution_rows.len(),
        start.elapsed()
    );

    let simulations = rebuild_simulations(&records, &contribution_rows);

    println!("Recomputing...");
    let proj_start = Instant::now();

    // Run simulations in parallel
    let refreshed: Vec<SimulationRecord> = simulations
        .par_iter()
        .map(|simulation| simulation.to_record(&simulation.run()))
        .collect();

    println!("Recomputed {} simulations in {:?}", refreshed.len(), proj_start.elapsed());

    let changed = records
        .iter()
        .zip(&refreshed)
        .filter(|(old, new)| (old.net_result - new.net_result).abs() > 0.005)
        .count();

    let file = File::create(&cli.output)
        .with_context(|| format!("Failed to create {}", cli.output.display()))?;
    write_simulations(file, &refreshed)?;
    println!("Output written to {}", cli.output.display());

    let summary = PortfolioSummary::from_records(&refreshed);
    println!("\nBatch Summary:");
    println!("  Simulations:          {}", summary.simulation_count);
    println!("  Net result changed:   {}", changed);
    println!("  Total VGV:            {:.2}", summary.total_vgv);
    println!("  Total contribution:   {:.2}", summary.total_contribution);
    println!("  Mean annualized ROI:  {:.2}%", summary.mean_roi_annualized);

    println!("\nAnnualized ROI distribution:");
    for bin in &summary.roi_distribution {
        println!("  {:>12.2}% .. {:>12.2}%  {:>6}", bin.lower, bin.upper, bin.count);
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
