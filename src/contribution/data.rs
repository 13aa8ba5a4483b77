//! Contribution value type and schedule builders

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// A single dated cash contribution made by the investor
///
/// Immutable once created. The amount is always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawContribution")]
pub struct Contribution {
    date: NaiveDate,
    amount: f64,
}

#[derive(Deserialize)]
struct RawContribution {
    date: NaiveDate,
    amount: f64,
}

impl TryFrom<RawContribution> for Contribution {
    type Error = SimulationError;

    fn try_from(raw: RawContribution) -> Result<Self> {
        Contribution::new(raw.date, raw.amount)
    }
}

impl Contribution {
    pub fn new(date: NaiveDate, amount: f64) -> Result<Self> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(SimulationError::InvalidContribution { amount });
        }
        Ok(Self { date, amount })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }
}

/// Sort contributions by date, breaking ties by amount.
///
/// The tie-break keeps every downstream sum in a fixed order, so permuting
/// the input never changes a single bit of the output.
pub fn sorted_by_date(contributions: &[Contribution]) -> Vec<Contribution> {
    let mut sorted = contributions.to_vec();
    sorted.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| a.amount.total_cmp(&b.amount))
    });
    sorted
}

/// Total contributed capital, independent of ordering
pub fn total_amount(contributions: &[Contribution]) -> f64 {
    sorted_by_date(contributions).iter().map(|c| c.amount).sum()
}

/// Ordered list of contributions built from manual entries and/or
/// generated installment plans
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributionSchedule {
    entries: Vec<Contribution>,
}

impl ContributionSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule with one manual entry
    pub fn single(date: NaiveDate, amount: f64) -> Result<Self> {
        let mut schedule = Self::new();
        schedule.add(date, amount)?;
        Ok(schedule)
    }

    /// Equal-installment plan: `count` payments of `total / count`, one per
    /// calendar month starting at `first_due`
    pub fn installments(total: f64, count: u32, first_due: NaiveDate) -> Result<Self> {
        let mut schedule = Self::new();
        schedule.add_installments(total, count, first_due)?;
        Ok(schedule)
    }

    /// Append a manual entry
    pub fn add(&mut self, date: NaiveDate, amount: f64) -> Result<()> {
        self.entries.push(Contribution::new(date, amount)?);
        Ok(())
    }

    /// Append a generated installment plan to the existing entries
    pub fn add_installments(&mut self, total: f64, count: u32, first_due: NaiveDate) -> Result<()> {
        if count == 0 {
            return Err(SimulationError::InvalidSchedule(
                "installment count must be at least 1".into(),
            ));
        }
        if !total.is_finite() || total <= 0.0 {
            return Err(SimulationError::InvalidSchedule(format!(
                "installment total must be positive, got {}",
                total
            )));
        }

        let installment = total / count as f64;
        let mut generated = Vec::with_capacity(count as usize);
        for i in 0..count {
            let due = first_due.checked_add_months(Months::new(i)).ok_or_else(|| {
                SimulationError::InvalidSchedule(format!(
                    "installment {} falls outside the supported date range",
                    i + 1
                ))
            })?;
            generated.push(Contribution::new(due, installment)?);
        }

        self.entries.extend(generated);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Contributions sorted by date
    pub fn contributions(&self) -> Vec<Contribution> {
        sorted_by_date(&self.entries)
    }

    pub fn total(&self) -> f64 {
        total_amount(&self.entries)
    }
}

impl From<Vec<Contribution>> for ContributionSchedule {
    fn from(entries: Vec<Contribution>) -> Self {
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_rejects_non_positive_amounts() {
        assert!(Contribution::new(date(2024, 1, 1), 0.0).is_err());
        assert!(Contribution::new(date(2024, 1, 1), -10.0).is_err());
        assert!(Contribution::new(date(2024, 1, 1), f64::NAN).is_err());
        assert!(Contribution::new(date(2024, 1, 1), 0.01).is_ok());
    }

    #[test]
    fn test_deserialize_validates_amount() {
        let ok: std::result::Result<Contribution, _> =
            serde_json::from_str(r#"{"date":"2024-03-01","amount":5000.0}"#);
        assert_eq!(ok.unwrap().amount(), 5000.0);

        let bad: std::result::Result<Contribution, _> =
            serde_json::from_str(r#"{"date":"2024-03-01","amount":-1.0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_installments_monthly_steps() {
        let schedule = ContributionSchedule::installments(120_000.0, 12, date(2024, 1, 31)).unwrap();
        let contributions = schedule.contributions();

        assert_eq!(contributions.len(), 12);
        assert_eq!(contributions[0].date(), date(2024, 1, 31));
        // Month-end clamped
        assert_eq!(contributions[1].date(), date(2024, 2, 29));
        assert_eq!(contributions[11].date(), date(2024, 12, 31));
        for c in &contributions {
            assert_relative_eq!(c.amount(), 10_000.0);
        }
        assert_relative_eq!(schedule.total(), 120_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_installments_reject_bad_input() {
        assert!(ContributionSchedule::installments(1000.0, 0, date(2024, 1, 1)).is_err());
        assert!(ContributionSchedule::installments(0.0, 3, date(2024, 1, 1)).is_err());
    }

    #[test]
    fn test_manual_and_generated_entries_are_sorted() {
        let mut schedule = ContributionSchedule::installments(3000.0, 3, date(2024, 2, 1)).unwrap();
        schedule.add(date(2024, 1, 15), 500.0).unwrap();

        let dates: Vec<_> = schedule.contributions().iter().map(|c| c.date()).collect();
        assert_eq!(
            dates,
            vec![date(2024, 1, 15), date(2024, 2, 1), date(2024, 3, 1), date(2024, 4, 1)]
        );
        assert_relative_eq!(schedule.total(), 3500.0);

        schedule.clear();
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_total_is_order_independent() {
        let a = Contribution::new(date(2024, 1, 1), 0.1).unwrap();
        let b = Contribution::new(date(2024, 6, 1), 0.2).unwrap();
        let c = Contribution::new(date(2023, 6, 1), 0.3).unwrap();

        let forward = total_amount(&[a, b, c]);
        let backward = total_amount(&[c, b, a]);
        assert_eq!(forward.to_bits(), backward.to_bits());
    }
}
