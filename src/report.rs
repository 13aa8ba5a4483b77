//! Report rendering collaborator
//!
//! Rendering to a concrete medium (PDF, HTML) is left to implementations of
//! `ReportRenderer`. `TextReportRenderer` produces a plain-text report with
//! two-decimal numbers and no locale formatting.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::persistence::ClientInfo;
use crate::project::monthly_from_annual;
use crate::projection::SimulationResult;

/// Titled group of label/value lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    pub heading: String,
    pub lines: Vec<(String, String)>,
}

impl ReportSection {
    fn new(heading: &str) -> Self {
        Self {
            heading: heading.to_string(),
            lines: Vec::new(),
        }
    }

    fn line(mut self, label: &str, value: String) -> Self {
        self.lines.push((label.to_string(), value));
        self
    }
}

/// One row of the installment plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentLine {
    pub number: u32,
    pub due_date: NaiveDate,
    pub base_amount: f64,
    /// One month of interest on the base amount
    pub monthly_interest: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub sections: Vec<ReportSection>,
    pub installments: Vec<InstallmentLine>,
}

impl Report {
    pub fn section(&self, heading: &str) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.heading == heading)
    }
}

pub trait ReportRenderer {
    fn render(&self, result: &SimulationResult, client: &ClientInfo) -> Report;
}

pub const SECTION_CLIENT: &str = "Client and Investment";
pub const SECTION_PROJECT: &str = "Project Analysis";
pub const SECTION_INVESTOR: &str = "Investor Results";

#[derive(Debug, Clone, Copy, Default)]
pub struct TextReportRenderer;

fn amount(value: f64) -> String {
    format!("{:.2}", value)
}

fn percent(value: f64) -> String {
    format!("{:.2}%", value)
}

impl ReportRenderer for TextReportRenderer {
    fn render(&self, result: &SimulationResult, client: &ClientInfo) -> Report {
        let params = &result.parameters;

        let client_section = ReportSection::new(SECTION_CLIENT)
            .line("Client", format!("{} (code: {})", client.name, client.code))
            .line("Total contribution", amount(result.total_contribution))
            .line("Duration", format!("{} months", result.num_months))
            .line("Annual interest rate", percent(params.annual_interest_rate))
            .line("SPE share", percent(params.spe_percentage))
            .line("Project end date", params.project_end_date.to_string());

        let project_section = ReportSection::new(SECTION_PROJECT)
            .line("VGV", amount(result.vgv))
            .line("Physical construction cost", amount(result.construction_cost_physical))
            .line("Area exchange value", amount(result.area_exchange_value))
            .line("Investor interest cost", amount(result.investor_interest_cost))
            .line("Total construction cost", amount(result.total_construction_cost))
            .line("Operational result", amount(result.operational_result));

        let investor_section = ReportSection::new(SECTION_INVESTOR)
            .line("Corrected principal", amount(result.corrected_principal))
            .line("Profit share", amount(result.investor_profit_share))
            .line("Gross return", amount(result.gross_return))
            .line("Net result", amount(result.net_result))
            .line("ROI", percent(result.roi_percent()))
            .line("Annualized ROI", percent(result.roi_annualized_percent()));

        let monthly_rate = monthly_from_annual(params.annual_rate());
        let installments = result
            .contributions
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let monthly_interest = c.amount() * monthly_rate;
                InstallmentLine {
                    number: i as u32 + 1,
                    due_date: c.date(),
                    base_amount: c.amount(),
                    monthly_interest,
                    total: c.amount() + monthly_interest,
                }
            })
            .collect();

        Report {
            title: "Financial Simulation Report".to_string(),
            sections: vec![client_section, project_section, investor_section],
            installments,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.len()))?;

        for section in &self.sections {
            writeln!(f)?;
            writeln!(f, "{}", section.heading)?;
            for (label, value) in &section.lines {
                writeln!(f, "  {:<30} {:>20}", label, value)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Installment Plan")?;
        if self.installments.is_empty() {
            return writeln!(f, "  (no installments)");
        }
        writeln!(
            f,
            "  {:>4} {:>12} {:>16} {:>16} {:>16}",
            "No.", "Due", "Base", "Monthly int.", "Total"
        )?;
        for line in &self.installments {
            writeln!(
                f,
                "  {:>4} {:>12} {:>16.2} {:>16.2} {:>16.2}",
                line.number,
                line.due_date.format("%d/%m/%Y").to_string(),
                line.base_amount,
                line.monthly_interest,
                line.total
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contribution::ContributionSchedule;
    use crate::persistence::sample_simulation;
    use crate::project::test_parameters;
    use crate::projection::compute_return;
    use approx::assert_relative_eq;

    #[test]
    fn test_sections_and_values() {
        let simulation = sample_simulation();
        let report = TextReportRenderer.render(&simulation.run(), &simulation.client);

        assert_eq!(report.sections.len(), 3);
        let project = report.section(SECTION_PROJECT).unwrap();
        assert_eq!(project.lines[0], ("VGV".to_string(), "10000000.00".to_string()));

        let client = report.section(SECTION_CLIENT).unwrap();
        assert_eq!(client.lines[0].1, "Ana Souza (code: C-001)");
        assert_eq!(client.lines[2].1, "12 months");
    }

    #[test]
    fn test_installment_plan() {
        let schedule = ContributionSchedule::installments(
            30_000.0,
            3,
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
        )
        .unwrap();
        let result = compute_return(&test_parameters(), &schedule.contributions());
        let report = TextReportRenderer.render(&result, &ClientInfo::default());

        assert_eq!(report.installments.len(), 3);
        let monthly = 1.12_f64.powf(1.0 / 12.0) - 1.0;
        let first = &report.installments[0];
        assert_eq!(first.number, 1);
        assert_relative_eq!(first.base_amount, 10_000.0);
        assert_relative_eq!(first.monthly_interest, 10_000.0 * monthly, max_relative = 1e-12);
        assert_relative_eq!(first.total, first.base_amount + first.monthly_interest);
        assert_eq!(report.installments[2].due_date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());

        let text = report.to_string();
        assert!(text.contains("Installment Plan"));
        assert!(text.contains("10/03/2024"));
    }

    #[test]
    fn test_empty_plan_renders() {
        let result = compute_return(&test_parameters(), &[]);
        let text = TextReportRenderer.render(&result, &ClientInfo::default()).to_string();
        assert!(text.contains("(no installments)"));
        assert!(text.contains("0.00%"));
    }
}
