//! Compounding of dated contributions to the project horizon
//!
//! Daily rate is the 365th root of `(1 + annual rate)`, applied over whole
//! days between the contribution date and the horizon. Contributions dated
//! on or after the horizon are carried at face value; they are never
//! discounted backward.

use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::contribution::{sorted_by_date, Contribution};
use crate::project::daily_rate;

/// Growth of a single contribution to the horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionGrowth {
    /// 1-based position in the date-sorted schedule
    pub installment: u32,
    pub date: NaiveDate,
    pub amount: f64,
    /// Whole days compounded (0 when dated on/after the horizon)
    pub days_active: i64,
    pub growth_factor: f64,
    pub future_value: f64,
    pub accrued_interest: f64,
}

/// Aggregate outcome of compounding every contribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompoundingOutcome {
    /// Sum of contribution amounts
    pub total_contribution: f64,

    /// Sum of future values at the horizon
    pub corrected_principal: f64,

    /// `max(0, corrected_principal - total_contribution)`
    pub investor_interest_cost: f64,

    pub rows: Vec<ContributionGrowth>,
}

/// Growth factor over `days` for a precomputed daily rate
///
/// `None` marks a degenerate annual rate (≤ -100%) and yields face value.
fn growth_factor(r_day: Option<f64>, days: i64) -> f64 {
    match r_day {
        Some(r) if days > 0 => (1.0 + r).powf(days as f64),
        _ => 1.0,
    }
}

fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Value of one contribution at `end_date`
pub fn future_value(contribution: &Contribution, annual_rate: f64, end_date: NaiveDate) -> f64 {
    let r_day = daily_rate(annual_rate);
    if r_day.is_none() {
        warn!(
            "Annual rate {:.4} is at or below -100%; carrying contribution at face value",
            annual_rate
        );
    }
    let days = days_between(contribution.date(), end_date);
    contribution.amount() * growth_factor(r_day, days)
}

/// Compound every contribution to `end_date` and aggregate
pub fn compound_contributions(
    contributions: &[Contribution],
    annual_rate: f64,
    end_date: NaiveDate,
) -> CompoundingOutcome {
    let r_day = daily_rate(annual_rate);
    if r_day.is_none() && !contributions.is_empty() {
        warn!(
            "Annual rate {:.4} is at or below -100%; contributions carried at face value",
            annual_rate
        );
    }

    let mut total_contribution = 0.0;
    let mut corrected_principal = 0.0;
    let mut rows = Vec::with_capacity(contributions.len());

    for (i, contribution) in sorted_by_date(contributions).iter().enumerate() {
        let days = days_between(contribution.date(), end_date);
        if days < 0 {
            debug!(
                "Contribution on {} is after horizon {}; no backward discounting",
                contribution.date(),
                end_date
            );
        }

        let factor = growth_factor(r_day, days);
        let future = contribution.amount() * factor;

        total_contribution += contribution.amount();
        corrected_principal += future;

        rows.push(ContributionGrowth {
            installment: i as u32 + 1,
            date: contribution.date(),
            amount: contribution.amount(),
            days_active: days.max(0),
            growth_factor: factor,
            future_value: future,
            accrued_interest: future - contribution.amount(),
        });
    }

    CompoundingOutcome {
        total_contribution,
        corrected_principal,
        // Floored: rounding across many same-day entries can go slightly negative
        investor_interest_cost: (corrected_principal - total_contribution).max(0.0),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn contribution(y: i32, m: u32, d: u32, amount: f64) -> Contribution {
        Contribution::new(date(y, m, d), amount).unwrap()
    }

    #[test]
    fn test_single_contribution_matches_closed_form() {
        let c = contribution(2023, 3, 15, 50_000.0);
        let end = date(2025, 9, 30);
        let days = (end - c.date()).num_days() as f64;

        let fv = future_value(&c, 0.10, end);
        assert_relative_eq!(fv, 50_000.0 * 1.10_f64.powf(days / 365.0), max_relative = 1e-12);
    }

    #[test]
    fn test_worked_example_leap_year() {
        // 2024 is a leap year: 366 days to the horizon
        let c = contribution(2024, 1, 1, 100_000.0);
        let outcome = compound_contributions(&[c], 0.12, date(2025, 1, 1));

        assert_eq!(outcome.rows[0].days_active, 366);
        let expected = 100_000.0 * 1.12_f64.powf(366.0 / 365.0);
        assert_relative_eq!(outcome.corrected_principal, expected, max_relative = 1e-12);
        assert!((outcome.corrected_principal - 112_034.78).abs() < 0.05);
        assert_relative_eq!(outcome.investor_interest_cost, expected - 100_000.0, max_relative = 1e-9);
    }

    #[test]
    fn test_contribution_on_horizon_is_face_value() {
        let c = contribution(2025, 1, 1, 42_000.0);
        let outcome = compound_contributions(&[c], 0.12, date(2025, 1, 1));

        assert_eq!(outcome.corrected_principal, 42_000.0);
        assert_eq!(outcome.investor_interest_cost, 0.0);
        assert_eq!(outcome.rows[0].growth_factor, 1.0);
    }

    #[test]
    fn test_contribution_after_horizon_not_discounted() {
        let c = contribution(2025, 6, 1, 10_000.0);
        let outcome = compound_contributions(&[c], 0.12, date(2025, 1, 1));

        assert_eq!(outcome.corrected_principal, 10_000.0);
        assert_eq!(outcome.rows[0].days_active, 0);
    }

    #[test]
    fn test_degenerate_rate_falls_back_to_face_value() {
        let c = contribution(2024, 1, 1, 10_000.0);
        assert_eq!(future_value(&c, -1.0, date(2025, 1, 1)), 10_000.0);

        let outcome = compound_contributions(&[c], -2.5, date(2025, 1, 1));
        assert_eq!(outcome.corrected_principal, 10_000.0);
        assert!(outcome.corrected_principal.is_finite());
    }

    #[test]
    fn test_negative_rate_gives_zero_interest_cost() {
        let c = contribution(2024, 1, 1, 10_000.0);
        let outcome = compound_contributions(&[c], -0.05, date(2025, 1, 1));

        assert!(outcome.corrected_principal < 10_000.0);
        assert_eq!(outcome.investor_interest_cost, 0.0);
    }

    #[test]
    fn test_rows_follow_date_order() {
        let late = contribution(2024, 6, 1, 1_000.0);
        let early = contribution(2024, 1, 1, 2_000.0);
        let outcome = compound_contributions(&[late, early], 0.08, date(2025, 1, 1));

        assert_eq!(outcome.rows[0].date, date(2024, 1, 1));
        assert_eq!(outcome.rows[0].installment, 1);
        assert_eq!(outcome.rows[1].installment, 2);
        assert!(outcome.rows[0].growth_factor > outcome.rows[1].growth_factor);
        assert_relative_eq!(outcome.total_contribution, 3_000.0);
    }

    #[test]
    fn test_empty_contributions() {
        let outcome = compound_contributions(&[], 0.12, date(2025, 1, 1));
        assert_eq!(outcome.total_contribution, 0.0);
        assert_eq!(outcome.corrected_principal, 0.0);
        assert!(outcome.rows.is_empty());
    }
}
