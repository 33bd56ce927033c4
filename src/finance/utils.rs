//! Finance utility functions
//!
//! Rounding, formatting and numeric guards shared by the calculators.

use crate::error::{FinanceMcpError, Result};

/// Round to two decimal places (cents)
///
/// Values too large to scale by 100 are returned unchanged; they carry no
/// fractional cents anyway.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        value
    }
}

/// Format an amount with two decimals and thousands separators
pub fn format_amount(value: f64) -> String {
    let rounded = round2(value);
    let negative = rounded < 0.0;
    let fixed = format!("{:.2}", rounded.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if negative {
        format!("-{}.{}", grouped, frac)
    } else {
        format!("{}.{}", grouped, frac)
    }
}

/// Format a fraction (0.05) as a percentage ("5.00%")
pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Reject NaN and infinite results
pub fn ensure_finite(value: f64, operation: &str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FinanceMcpError::overflow(operation))
    }
}

/// Parse a user-supplied amount, tolerating surrounding whitespace and a leading `$`
pub fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed).trim();
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}
