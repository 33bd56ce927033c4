//! Interest calculations

use serde::Serialize;

use crate::error::{FinanceMcpError, Result};
use crate::finance::utils::ensure_finite;

/// How interest accrues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestKind {
    Simple,
    Compound,
}

impl InterestKind {
    pub fn from_compound_flag(compound: bool) -> Self {
        if compound {
            InterestKind::Compound
        } else {
            InterestKind::Simple
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InterestKind::Simple => "simple",
            InterestKind::Compound => "compound",
        }
    }
}

/// Outcome of an interest calculation
#[derive(Debug, Clone, Serialize)]
pub struct InterestResult {
    pub principal: f64,
    pub rate: f64,
    pub years: u32,
    pub compounds_per_year: u32,
    pub kind: InterestKind,
    /// Interest earned, excluding the principal
    pub interest: f64,
    /// Principal plus interest
    pub final_amount: f64,
}

/// Calculate simple or compound interest on a principal.
///
/// `rate` is the annual rate as a decimal (0.05 for 5%). Compound interest is
/// `P * (1 + r/n)^(n*t) - P`; with `n = 1` this is annual compounding.
/// `compounds_per_year` is ignored for simple interest.
pub fn calculate_interest(
    principal: f64,
    rate: f64,
    years: u32,
    kind: InterestKind,
    compounds_per_year: u32,
) -> Result<InterestResult> {
    if principal.is_nan() || principal < 0.0 {
        return Err(FinanceMcpError::invalid_parameter(
            "principal",
            "must be zero or greater",
        ));
    }
    if rate.is_nan() || rate < 0.0 {
        return Err(FinanceMcpError::invalid_parameter(
            "rate",
            "must be zero or greater",
        ));
    }
    if compounds_per_year == 0 {
        return Err(FinanceMcpError::invalid_parameter(
            "compounds_per_year",
            "must be at least 1",
        ));
    }

    let interest = match kind {
        InterestKind::Simple => principal * rate * f64::from(years),
        InterestKind::Compound => {
            let n = f64::from(compounds_per_year);
            let periods = n * f64::from(years);
            principal * (1.0 + rate / n).powf(periods) - principal
        }
    };
    let interest = ensure_finite(interest, "interest")?;
    let final_amount = ensure_finite(principal + interest, "final amount")?;

    tracing::debug!(
        kind = kind.as_str(),
        principal,
        rate,
        years,
        interest,
        "calculated interest"
    );

    Ok(InterestResult {
        principal,
        rate,
        years,
        compounds_per_year: match kind {
            InterestKind::Simple => 1,
            InterestKind::Compound => compounds_per_year,
        },
        kind,
        interest,
        final_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_compound_matches_closed_form() {
        let result = calculate_interest(1000.0, 0.05, 10, InterestKind::Compound, 1).unwrap();
        let expected = 1000.0 * 1.05_f64.powi(10) - 1000.0;
        assert!(approx(result.interest, expected));
        assert!(approx(result.final_amount, 1000.0 * 1.05_f64.powi(10)));
    }

    #[test]
    fn test_simple_interest() {
        let result = calculate_interest(1000.0, 0.05, 10, InterestKind::Simple, 1).unwrap();
        assert!(approx(result.interest, 500.0));
        assert!(approx(result.final_amount, 1500.0));
    }

    #[test]
    fn test_monthly_compounding_beats_annual() {
        let annual = calculate_interest(1000.0, 0.06, 5, InterestKind::Compound, 1).unwrap();
        let monthly = calculate_interest(1000.0, 0.06, 5, InterestKind::Compound, 12).unwrap();
        let expected = 1000.0 * (1.0 + 0.06 / 12.0_f64).powi(60) - 1000.0;
        assert!(approx(monthly.interest, expected));
        assert!(monthly.interest > annual.interest);
    }

    #[test]
    fn test_zero_years_earns_nothing() {
        let result = calculate_interest(2500.0, 0.07, 0, InterestKind::Compound, 4).unwrap();
        assert!(approx(result.interest, 0.0));
        assert!(approx(result.final_amount, 2500.0));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let err = calculate_interest(1000.0, -0.01, 1, InterestKind::Compound, 1).unwrap_err();
        assert!(err.to_string().contains("rate"));
    }

    #[test]
    fn test_negative_principal_rejected() {
        assert!(calculate_interest(-1.0, 0.05, 1, InterestKind::Simple, 1).is_err());
    }

    #[test]
    fn test_zero_compounding_periods_rejected() {
        assert!(calculate_interest(100.0, 0.05, 1, InterestKind::Compound, 0).is_err());
    }

    #[test]
    fn test_overflow_is_reported() {
        let err = calculate_interest(1e300, 10.0, 1000, InterestKind::Compound, 1).unwrap_err();
        assert!(matches!(err, FinanceMcpError::Calculation(_)));
    }
}
