//! Investment Simulator CLI
//!
//! Runs a single simulation, the named scenarios, or a sensitivity grid for
//! the inputs described in a JSON file.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use log::info;
use serde::Deserialize;

use investment_simulator::contribution::write_contribution_records;
use investment_simulator::persistence::{write_simulations, ClientInfo, Simulation};
use investment_simulator::report::{ReportRenderer, TextReportRenderer};
use investment_simulator::scenario::{SensitivityMetric, SensitivityVariable};
use investment_simulator::{
    Contribution, ContributionSchedule, InterestRate, ProjectParameters, ScenarioRunner,
    SimulationConfig, SimulationResult,
};

#[derive(Parser)]
#[command(name = "investment-simulator", version, about = "Real-estate investor return simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the investor return for one simulation
    Simulate {
        #[command(flatten)]
        common: CommonArgs,
        /// Write the simulation row to this CSV (contributions go to <stem>_contributions.csv)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Print the full text report
        #[arg(long)]
        report: bool,
    },
    /// Run the pessimistic, realistic and optimistic scenarios
    Scenarios {
        #[command(flatten)]
        common: CommonArgs,
        /// Pessimistic shift (fraction)
        #[arg(long)]
        downside: Option<f64>,
        /// Optimistic shift (fraction)
        #[arg(long)]
        upside: Option<f64>,
        /// What-if sale price per area, compared against the baseline
        #[arg(long, requires = "construction_cost")]
        sale_price: Option<f64>,
        /// What-if construction cost per area, compared against the baseline
        #[arg(long, requires = "sale_price")]
        construction_cost: Option<f64>,
    },
    /// Two-way sensitivity grid
    Grid {
        #[command(flatten)]
        common: CommonArgs,
        #[arg(long)]
        points: Option<usize>,
        /// Half-width of each axis (fraction of the baseline value)
        #[arg(long)]
        span: Option<f64>,
        #[arg(long)]
        row: Option<SensitivityVariable>,
        #[arg(long)]
        column: Option<SensitivityVariable>,
        #[arg(long)]
        metric: Option<SensitivityMetric>,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Simulation input (JSON)
    #[arg(long)]
    input: PathBuf,
    /// Configuration file (JSON); SIM_* environment variables apply on top
    #[arg(long)]
    config: Option<PathBuf>,
    /// Evaluate sequentially instead of on the thread pool
    #[arg(long)]
    sequential: bool,
}

/// Generated installment plan in the input file
#[derive(Debug, Deserialize)]
struct InstallmentPlan {
    total: f64,
    count: u32,
    first_due: NaiveDate,
}

/// Simulation input file
#[derive(Debug, Deserialize)]
struct SimulationInput {
    #[serde(default)]
    simulation_id: Option<String>,
    #[serde(default)]
    client: ClientInfo,
    parameters: ProjectParameters,
    /// Overrides `parameters.annual_interest_rate` when present
    #[serde(default)]
    interest_rate: Option<InterestRate>,
    #[serde(default)]
    contributions: Vec<Contribution>,
    #[serde(default)]
    installments: Option<InstallmentPlan>,
}

impl SimulationInput {
    fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
        serde_json::from_reader(file).with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn into_simulation(self) -> Result<Simulation> {
        let mut schedule = ContributionSchedule::from(self.contributions);
        if let Some(plan) = &self.installments {
            schedule
                .add_installments(plan.total, plan.count, plan.first_due)
                .context("Invalid installment plan")?;
        }

        let parameters = match self.interest_rate {
            Some(rate) => self.parameters.with_interest_rate(rate),
            None => self.parameters,
        };

        let created_at = Local::now().naive_local();
        Ok(Simulation {
            simulation_id: self
                .simulation_id
                .unwrap_or_else(|| format!("sim-{}", created_at.format("%Y%m%d%H%M%S"))),
            created_at,
            client: self.client,
            parameters,
            contributions: schedule.contributions(),
        })
    }
}

fn load_config(common: &CommonArgs) -> Result<SimulationConfig> {
    let mut config = match &common.config {
        Some(path) => SimulationConfig::from_json_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?
            .with_env_overrides(),
        None => SimulationConfig::from_env(),
    };
    if common.sequential {
        config.parallel = false;
    }
    Ok(config)
}

fn print_summary(result: &SimulationResult) {
    println!("  Total contribution:      {:>16.2}", result.total_contribution);
    println!("  Corrected principal:     {:>16.2}", result.corrected_principal);
    println!("  Investor interest cost:  {:>16.2}", result.investor_interest_cost);
    println!("  VGV:                     {:>16.2}", result.vgv);
    println!("  Total construction cost: {:>16.2}", result.total_construction_cost);
    println!("  Operational result:      {:>16.2}", result.operational_result);
    println!("  Investor profit share:   {:>16.2}", result.investor_profit_share);
    println!("  Net result:              {:>16.2}", result.net_result);
    println!("  ROI:                     {:>15.2}%", result.roi_percent());
    println!("  Annualized ROI:          {:>15.2}%", result.roi_annualized_percent());
    println!("  Holding period:          {:>10} days ({} months)", result.elapsed_days, result.num_months);
}

fn contributions_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "simulation".to_string());
    output.with_file_name(format!("{}_contributions.csv", stem))
}

fn simulate(common: &CommonArgs, output: Option<&Path>, report: bool) -> Result<()> {
    let simulation = SimulationInput::load(&common.input)?.into_simulation()?;
    let result = simulation.run();

    if report {
        print!("{}", TextReportRenderer.render(&result, &simulation.client));
    } else {
        println!("Simulation {}", simulation.simulation_id);
        print_summary(&result);

        println!();
        println!("{:>4} {:>12} {:>14} {:>6} {:>10} {:>14}",
            "No.", "Date", "Amount", "Days", "Factor", "Future value");
        println!("{}", "-".repeat(66));
        for row in &result.contribution_rows {
            println!("{:>4} {:>12} {:>14.2} {:>6} {:>10.6} {:>14.2}",
                row.installment,
                row.date.to_string(),
                row.amount,
                row.days_active,
                row.growth_factor,
                row.future_value);
        }
    }

    if let Some(path) = output {
        let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        write_simulations(file, &[simulation.to_record(&result)])?;

        let child_path = contributions_path(path);
        let file = File::create(&child_path)
            .with_context(|| format!("Failed to create {}", child_path.display()))?;
        write_contribution_records(file, &simulation.contribution_records())?;
        info!("Wrote {} and {}", path.display(), child_path.display());
        println!("\nOutput written to {}", path.display());
    }
    Ok(())
}

fn scenarios(
    common: &CommonArgs,
    downside: Option<f64>,
    upside: Option<f64>,
    what_if: Option<(f64, f64)>,
) -> Result<()> {
    let mut config = load_config(common)?;
    if let Some(v) = downside {
        config.scenarios.downside = v;
    }
    if let Some(v) = upside {
        config.scenarios.upside = v;
    }

    let simulation = SimulationInput::load(&common.input)?.into_simulation()?;
    let runner = ScenarioRunner::with_config(config);
    let outcomes = runner.run_default_scenarios(&simulation.parameters, &simulation.contributions);

    println!("{:<12} {:>12} {:>12} {:>16} {:>10} {:>12}",
        "Scenario", "Sale/area", "Cost/area", "Net result", "ROI", "Ann. ROI");
    println!("{}", "-".repeat(78));
    for outcome in &outcomes {
        println!("{:<12} {:>12.2} {:>12.2} {:>16.2} {:>9.2}% {:>11.2}%",
            outcome.name,
            outcome.parameters.sale_price_per_area,
            outcome.parameters.construction_cost_per_area,
            outcome.result.net_result,
            outcome.result.roi_percent(),
            outcome.result.roi_annualized_percent());
    }

    if let Some((sale_price, construction_cost)) = what_if {
        let outcome = runner.what_if(
            &simulation.parameters,
            &simulation.contributions,
            sale_price,
            construction_cost,
        );
        println!("\nWhat-if (sale/area {:.2}, cost/area {:.2}):", sale_price, construction_cost);
        print_summary(&outcome.adjusted);
        println!("  Change in net result:    {:>16.2}", outcome.delta_net_result);
        println!("  Change in ROI:           {:>15.2}%", outcome.delta_roi * 100.0);
        println!("  Change in annualized ROI:{:>15.2}%", outcome.delta_roi_annualized * 100.0);
    }
    Ok(())
}

struct GridOverrides {
    points: Option<usize>,
    span: Option<f64>,
    row: Option<SensitivityVariable>,
    column: Option<SensitivityVariable>,
    metric: Option<SensitivityMetric>,
}

fn grid(common: &CommonArgs, overrides: GridOverrides) -> Result<()> {
    let mut config = load_config(common)?;
    if let Some(v) = overrides.points {
        config.grid.points = v;
    }
    if let Some(v) = overrides.span {
        config.grid.span = v;
    }
    if let Some(v) = overrides.row {
        config.grid.row = v;
    }
    if let Some(v) = overrides.column {
        config.grid.column = v;
    }
    if let Some(v) = overrides.metric {
        config.grid.metric = v;
    }

    let simulation = SimulationInput::load(&common.input)?.into_simulation()?;
    let runner = ScenarioRunner::with_config(config);
    let grid = runner.sensitivity_grid(&simulation.parameters, &simulation.contributions);

    println!("Sensitivity of {} ({} rows x {} columns)", grid.metric, grid.row_variable, grid.column_variable);
    println!("Baseline: {:.4}", grid.baseline_value);
    println!();

    print!("{:>14}", "");
    for value in &grid.column_values {
        print!(" {:>12.2}", value);
    }
    println!();
    for (row_value, cells) in grid.row_values.iter().zip(&grid.matrix) {
        print!("{:>14.2}", row_value);
        for cell in cells {
            print!(" {:>12.4}", cell);
        }
        println!();
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Simulate { common, output, report } => simulate(&common, output.as_deref(), report),
        Command::Scenarios {
            common,
            downside,
            upside,
            sale_price,
            construction_cost,
        } => scenarios(&common, downside, upside, sale_price.zip(construction_cost)),
        Command::Grid {
            common,
            points,
            span,
            row,
            column,
            metric,
        } => grid(
            &common,
            GridOverrides {
                points,
                span,
                row,
                column,
                metric,
            },
        ),
    }
}
