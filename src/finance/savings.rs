//! Savings projection

use serde::Serialize;

use crate::error::{FinanceMcpError, Result};
use crate::finance::utils::{ensure_finite, round2};

/// Balance at the end of one month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySnapshot {
    pub month: u32,
    pub contribution: f64,
    pub interest: f64,
    pub balance: f64,
}

/// Month-by-month savings projection
#[derive(Debug, Clone, Serialize)]
pub struct SavingsProjection {
    pub net_monthly: f64,
    pub annual_rate: f64,
    pub months: Vec<MonthlySnapshot>,
    /// Final balance rounded to cents
    pub total_savings: f64,
}

impl SavingsProjection {
    /// `Month n: <balance>` lines
    pub fn breakdowns(&self) -> Vec<String> {
        self.months
            .iter()
            .map(|m| format!("Month {}: {}", m.month, round2(m.balance)))
            .collect()
    }

    pub fn total_interest(&self) -> f64 {
        self.months.iter().map(|m| m.interest).sum()
    }

    pub fn total_contributions(&self) -> f64 {
        self.net_monthly * self.months.len() as f64
    }
}

/// Project savings over `months`.
///
/// Each month the net amount (`income - monthly_expenses`) is deposited, then
/// one twelfth of `annual_rate` is credited on the running balance.
pub fn project_savings(
    income: f64,
    monthly_expenses: f64,
    months: u32,
    annual_rate: f64,
    max_months: u32,
) -> Result<SavingsProjection> {
    if income.is_nan() || income < 0.0 {
        return Err(FinanceMcpError::invalid_parameter(
            "income",
            "must be zero or greater",
        ));
    }
    if monthly_expenses.is_nan() || monthly_expenses < 0.0 {
        return Err(FinanceMcpError::invalid_parameter(
            "monthly_expenses",
            "must be zero or greater",
        ));
    }
    if annual_rate.is_nan() || annual_rate < 0.0 {
        return Err(FinanceMcpError::invalid_parameter(
            "interest_rate",
            "must be zero or greater",
        ));
    }
    if months == 0 || months > max_months {
        return Err(FinanceMcpError::invalid_parameter(
            "months",
            format!("must be between 1 and {}", max_months),
        ));
    }

    let net_monthly = income - monthly_expenses;
    let monthly_rate = annual_rate / 12.0;

    let mut balance = 0.0_f64;
    let mut snapshots = Vec::with_capacity(months as usize);
    for month in 1..=months {
        balance += net_monthly;
        let interest = balance * monthly_rate;
        balance = ensure_finite(balance + interest, "savings balance")?;
        snapshots.push(MonthlySnapshot {
            month,
            contribution: net_monthly,
            interest,
            balance,
        });
    }

    Ok(SavingsProjection {
        net_monthly,
        annual_rate,
        months: snapshots,
        total_savings: round2(balance),
    })
}
