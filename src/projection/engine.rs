//! Investor return calculation
//!
//! Combines contribution compounding with project economics to derive the
//! investor's net result, ROI and annualized ROI. Deterministic and free of
//! side effects; degenerate inputs resolve to neutral values instead of
//! errors.

use chrono::{Datelike, Months, NaiveDate};
use log::{debug, warn};

use super::compounding::compound_contributions;
use super::result::SimulationResult;
use crate::contribution::{sorted_by_date, Contribution};
use crate::project::{compute_economics, ProjectParameters, DAYS_PER_YEAR};

/// Days from the earliest contribution to the horizon, never below 1
pub fn elapsed_days(contributions: &[Contribution], end_date: NaiveDate) -> i64 {
    contributions
        .iter()
        .map(|c| c.date())
        .min()
        .map(|first| (end_date - first).num_days().max(1))
        .unwrap_or(1)
}

/// Largest `m` such that `start` stepped `m` calendar months (month-end
/// clamped) does not pass `end`. Never below 1.
pub fn whole_months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    let mut months =
        ((end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32).max(0) as u32;
    while months > 0 {
        match start.checked_add_months(Months::new(months)) {
            Some(stepped) if stepped <= end => break,
            _ => months -= 1,
        }
    }
    months.max(1)
}

/// Ceiling for annualized ROI (decimal)
///
/// Very short holding periods with a large gain overflow the exponential
/// scaling; those results are reported at this value.
pub const MAX_ANNUALIZED_ROI: f64 = 1.0e12;

/// Annualize a period ROI with exponential scaling over `elapsed_days`
///
/// A period loss beyond -100% has no real fractional power; it clamps to
/// exactly -100%. Gains that scale past `MAX_ANNUALIZED_ROI` are capped there.
pub fn annualize_roi(roi: f64, elapsed_days: i64) -> f64 {
    let base = 1.0 + roi;
    if base < 0.0 {
        warn!(
            "Period ROI {:.4} implies a loss beyond total capital; annualized ROI clamped to -100%",
            roi
        );
        return -1.0;
    }
    let annualized = base.powf(DAYS_PER_YEAR / elapsed_days.max(1) as f64) - 1.0;
    if !(annualized <= MAX_ANNUALIZED_ROI) {
        warn!(
            "Annualized ROI for period ROI {:.4} over {} days exceeds {:e}; capped",
            roi, elapsed_days, MAX_ANNUALIZED_ROI
        );
        return MAX_ANNUALIZED_ROI;
    }
    annualized
}

/// Compute the investor's return for a project and contribution list
pub fn compute_return(params: &ProjectParameters, contributions: &[Contribution]) -> SimulationResult {
    let sorted = sorted_by_date(contributions);

    let compounding = compound_contributions(&sorted, params.annual_rate(), params.project_end_date);
    let economics = compute_economics(params, compounding.investor_interest_cost);

    let elapsed_days = elapsed_days(&sorted, params.project_end_date);
    let num_months = sorted
        .first()
        .map(|first| whole_months_between(first.date(), params.project_end_date))
        .unwrap_or(1);

    let total_contribution = compounding.total_contribution;
    let investor_profit_share = economics.operational_result * params.spe_percentage / 100.0;
    let gross_return = compounding.corrected_principal + investor_profit_share;
    let net_result = gross_return - total_contribution;

    let (roi, roi_annualized) = if total_contribution > 0.0 {
        let roi = net_result / total_contribution;
        (roi, annualize_roi(roi, elapsed_days))
    } else {
        debug!("No contributed capital; ROI reported as zero");
        (0.0, 0.0)
    };

    SimulationResult {
        simulation_id: None,
        parameters: params.clone(),
        contributions: sorted,
        total_contribution,
        corrected_principal: compounding.corrected_principal,
        investor_interest_cost: compounding.investor_interest_cost,
        vgv: economics.vgv,
        construction_cost_physical: economics.construction_cost_physical,
        area_exchange_value: economics.area_exchange_value,
        total_construction_cost: economics.total_construction_cost,
        operational_result: economics.operational_result,
        investor_profit_share,
        gross_return,
        net_result,
        roi,
        roi_annualized,
        elapsed_days,
        num_months,
        contribution_rows: compounding.rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::test_parameters;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn contribution(y: i32, m: u32, d: u32, amount: f64) -> Contribution {
        Contribution::new(date(y, m, d), amount).unwrap()
    }

    /// Parameters whose operational result is exactly zero
    fn break_even_parameters() -> ProjectParameters {
        ProjectParameters {
            land_size: 0.0,
            sale_price_per_area: 0.0,
            construction_cost_per_area: 0.0,
            area_exchange_percentage: 0.0,
            spe_percentage: 0.0,
            annual_interest_rate: 9.5,
            start_date: date(2023, 3, 1),
            project_end_date: date(2024, 2, 29),
        }
    }

    #[test]
    fn test_worked_example() {
        let params = test_parameters();
        let result = compute_return(&params, &[contribution(2024, 1, 1, 100_000.0)]);

        let corrected = 100_000.0 * 1.12_f64.powf(366.0 / 365.0);
        let interest = corrected - 100_000.0;

        assert_relative_eq!(result.vgv, 10_000_000.0);
        assert_relative_eq!(result.construction_cost_physical, 3_500_000.0);
        assert_relative_eq!(result.corrected_principal, corrected, max_relative = 1e-12);
        assert_relative_eq!(result.investor_interest_cost, interest, max_relative = 1e-9);
        assert_relative_eq!(result.total_construction_cost, 5_500_000.0 + interest, max_relative = 1e-12);

        let operational = 4_500_000.0 - interest;
        assert_relative_eq!(result.operational_result, operational, max_relative = 1e-12);
        assert_relative_eq!(result.investor_profit_share, operational * 0.65, max_relative = 1e-12);

        let net = corrected + operational * 0.65 - 100_000.0;
        assert_relative_eq!(result.net_result, net, max_relative = 1e-12);
        assert_relative_eq!(result.roi, net / 100_000.0, max_relative = 1e-12);
        assert_eq!(result.elapsed_days, 366);
        assert_eq!(result.num_months, 12);
        assert_relative_eq!(
            result.roi_annualized,
            (1.0 + net / 100_000.0).powf(365.0 / 366.0) - 1.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_annualized_roi_round_trips_interest_rate() {
        // 2023-03-01 to 2024-02-29 is exactly 365 days
        let params = break_even_parameters();
        let result = compute_return(&params, &[contribution(2023, 3, 1, 250_000.0)]);

        assert_eq!(result.elapsed_days, 365);
        assert_eq!(result.operational_result, -result.investor_interest_cost);
        assert_eq!(result.investor_profit_share, 0.0);
        assert_abs_diff_eq!(result.roi_annualized, 0.095, epsilon = 1e-12);
        assert_abs_diff_eq!(result.roi, 0.095, epsilon = 1e-12);
    }

    #[test]
    fn test_order_independent() {
        let params = test_parameters();
        let a = contribution(2024, 1, 10, 33_333.33);
        let b = contribution(2024, 3, 5, 12_500.10);
        let c = contribution(2024, 3, 5, 7_000.0);
        let d = contribution(2024, 8, 20, 91_000.7);

        let forward = compute_return(&params, &[a, b, c, d]);
        let shuffled = compute_return(&params, &[d, b, a, c]);
        let reversed = compute_return(&params, &[d, c, b, a]);

        assert_eq!(forward, shuffled);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_contribution_on_horizon() {
        let params = test_parameters();
        let result = compute_return(&params, &[contribution(2025, 1, 1, 80_000.0)]);

        assert_eq!(result.corrected_principal, 80_000.0);
        assert_eq!(result.investor_interest_cost, 0.0);
        assert_eq!(result.elapsed_days, 1);
        assert_eq!(result.num_months, 1);
        // One-day holding period: 1 + roi raised to the 365th power overflows
        assert!(result.roi > 30.0);
        assert_eq!(result.roi_annualized, MAX_ANNUALIZED_ROI);
        assert!(result.roi_annualized_percent().is_finite());

        let json = serde_json::to_string(&result).unwrap();
        let reparsed: SimulationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(reparsed.roi_annualized, MAX_ANNUALIZED_ROI);
    }

    #[test]
    fn test_no_contributions_is_neutral() {
        let params = test_parameters();
        let result = compute_return(&params, &[]);

        assert_eq!(result.total_contribution, 0.0);
        assert_eq!(result.roi, 0.0);
        assert_eq!(result.roi_annualized, 0.0);
        assert_eq!(result.elapsed_days, 1);
        assert_eq!(result.num_months, 1);
        // Profit share still derived from the project
        assert_relative_eq!(result.investor_profit_share, 4_500_000.0 * 0.65);
    }

    #[test]
    fn test_total_loss_clamps_annualized_roi() {
        // Operational loss large enough to drive 1 + roi below zero
        let mut params = test_parameters();
        params.sale_price_per_area = 1_000.0;
        params.spe_percentage = 100.0;

        let result = compute_return(&params, &[contribution(2024, 6, 1, 100_000.0)]);

        assert!(1.0 + result.roi < 0.0);
        assert_eq!(result.roi_annualized, -1.0);
        assert!(result.roi.is_finite());
    }

    #[test]
    fn test_annualize_roi_boundaries() {
        assert_eq!(annualize_roi(-1.0, 200), -1.0);
        assert_eq!(annualize_roi(-1.5, 200), -1.0);
        assert_eq!(annualize_roi(0.0, 10), 0.0);
        assert_relative_eq!(annualize_roi(0.21, 730), 0.1, max_relative = 1e-12);
        // Zero elapsed days treated as one day
        assert_relative_eq!(annualize_roi(0.001, 0), 1.001_f64.powf(365.0) - 1.0);
        assert_eq!(annualize_roi(1_000.0, 1), MAX_ANNUALIZED_ROI);
        assert_eq!(annualize_roi(f64::INFINITY, 30), MAX_ANNUALIZED_ROI);
    }

    #[test]
    fn test_elapsed_days_clamped() {
        let end = date(2024, 1, 1);
        assert_eq!(elapsed_days(&[], end), 1);
        assert_eq!(elapsed_days(&[contribution(2024, 5, 1, 1.0)], end), 1);
        assert_eq!(
            elapsed_days(&[contribution(2023, 12, 1, 1.0), contribution(2023, 6, 1, 1.0)], end),
            214
        );
    }

    #[test]
    fn test_whole_months_between() {
        assert_eq!(whole_months_between(date(2024, 1, 15), date(2026, 1, 15)), 24);
        assert_eq!(whole_months_between(date(2024, 1, 15), date(2026, 1, 14)), 23);
        assert_eq!(whole_months_between(date(2024, 1, 31), date(2024, 2, 29)), 1);
        assert_eq!(whole_months_between(date(2024, 1, 31), date(2024, 4, 30)), 3);
        assert_eq!(whole_months_between(date(2024, 1, 31), date(2024, 4, 29)), 2);
        assert_eq!(whole_months_between(date(2024, 3, 31), date(2024, 4, 30)), 1);
        assert_eq!(whole_months_between(date(2024, 5, 1), date(2024, 1, 1)), 1);
    }

    #[test]
    fn test_inputs_not_mutated() {
        let params = test_parameters();
        let contributions = vec![contribution(2024, 9, 1, 5_000.0), contribution(2024, 2, 1, 5_000.0)];
        let snapshot = contributions.clone();

        let result = compute_return(&params, &contributions);

        assert_eq!(contributions, snapshot);
        assert_eq!(result.parameters, params);
        assert_eq!(result.contributions[0].date(), date(2024, 2, 1));
    }
}
