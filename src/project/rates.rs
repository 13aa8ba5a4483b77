//! Interest rate conversions
//!
//! All functions take and return decimal rates (0.12 for 12%).

use serde::{Deserialize, Serialize};

/// Day-count basis for the actual/365 exponential convention
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Effective annual rate from a nominal monthly rate: `(1+m)^12 - 1`
pub fn annual_from_monthly(monthly_rate: f64) -> f64 {
    (1.0 + monthly_rate).powi(12) - 1.0
}

/// Monthly rate equivalent to an effective annual rate: `(1+a)^(1/12) - 1`
pub fn monthly_from_annual(annual_rate: f64) -> f64 {
    if annual_rate <= -1.0 {
        return -1.0;
    }
    (1.0 + annual_rate).powf(1.0 / 12.0) - 1.0
}

/// Exponential daily rate: `(1+a)^(1/365) - 1`
///
/// Returns `None` when `annual_rate <= -100%`, where the fractional power of a
/// non-positive base is undefined.
pub fn daily_rate(annual_rate: f64) -> Option<f64> {
    if !annual_rate.is_finite() || annual_rate <= -1.0 {
        return None;
    }
    Some((1.0 + annual_rate).powf(1.0 / DAYS_PER_YEAR) - 1.0)
}

/// Interest rate as supplied by a caller, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestRate {
    /// Effective annual rate (percent)
    Annual(f64),
    /// Nominal monthly rate (percent), compounded to an annual rate once
    Monthly(f64),
}

impl InterestRate {
    /// Effective annual rate in percent
    pub fn annual_percent(&self) -> f64 {
        match *self {
            InterestRate::Annual(pct) => pct,
            InterestRate::Monthly(pct) => annual_from_monthly(pct / 100.0) * 100.0,
        }
    }
}
