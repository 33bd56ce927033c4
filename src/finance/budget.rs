//! Budget plan generation
//!
//! Combines expense categorization and savings projection into a report with
//! improvement tips.

use serde::Serialize;

use crate::error::{FinanceMcpError, Result};
use crate::finance::expenses::{categorize, ExpenseSummary, SkippedEntry};
use crate::finance::rules::CategoryRules;
use crate::finance::savings::{project_savings, SavingsProjection};
use crate::finance::utils::{format_amount, format_percent};

/// Savings rate the 50/30/20 guideline aims for
pub const TARGET_SAVINGS_RATE: f64 = 0.20;

/// A single category is flagged above this share of income
pub const CATEGORY_SHARE_LIMIT: f64 = 0.30;

/// One line of the expense breakdown
#[derive(Debug, Clone, Serialize)]
pub struct BudgetLine {
    pub category: String,
    pub amount: f64,
    /// Fraction of monthly income
    pub share_of_income: f64,
}

/// A complete budget plan
#[derive(Debug, Clone, Serialize)]
pub struct BudgetReport {
    pub income: f64,
    /// Largest category first
    pub breakdown: Vec<BudgetLine>,
    pub total_expenses: f64,
    pub net_monthly: f64,
    pub savings_rate: f64,
    pub projection: SavingsProjection,
    pub skipped: Vec<SkippedEntry>,
    pub tips: Vec<String>,
}

/// Build a budget plan for a monthly `income` and an expense list
pub fn build_budget_plan(
    income: f64,
    expenses: &str,
    months: u32,
    annual_rate: f64,
    max_months: u32,
    rules: &CategoryRules,
) -> Result<BudgetReport> {
    if income.is_nan() || income <= 0.0 {
        return Err(FinanceMcpError::invalid_parameter(
            "income",
            "must be greater than zero",
        ));
    }

    let summary = categorize(expenses, rules)?;
    let total_expenses = summary.total;
    let net_monthly = income - total_expenses;

    // The projection takes income and expenses separately; feed the net so a
    // negative expense total (refunds) still projects correctly.
    let projection = if net_monthly >= 0.0 {
        project_savings(net_monthly, 0.0, months, annual_rate, max_months)?
    } else {
        project_savings(0.0, -net_monthly, months, annual_rate, max_months)?
    };

    let breakdown: Vec<BudgetLine> = summary
        .sorted_by_total()
        .into_iter()
        .map(|c| BudgetLine {
            category: c.category.clone(),
            amount: c.total,
            share_of_income: c.total / income,
        })
        .collect();

    let savings_rate = net_monthly / income;
    let tips = budget_tips(&summary, &breakdown, net_monthly, savings_rate, income);

    Ok(BudgetReport {
        income,
        breakdown,
        total_expenses,
        net_monthly,
        savings_rate,
        projection,
        skipped: summary.skipped,
        tips,
    })
}

fn budget_tips(
    summary: &ExpenseSummary,
    breakdown: &[BudgetLine],
    net_monthly: f64,
    savings_rate: f64,
    income: f64,
) -> Vec<String> {
    let mut tips = Vec::new();

    if summary.is_empty() {
        tips.push(
            "No expenses were recognized. Provide them as 'label:amount' pairs separated by commas, e.g. 'rent:1200,food:400'."
                .to_string(),
        );
    }

    if net_monthly < 0.0 {
        tips.push(format!(
            "Expenses exceed income by {} per month. Cut spending or raise income before saving is possible.",
            format_amount(-net_monthly)
        ));
    } else if savings_rate < TARGET_SAVINGS_RATE {
        tips.push(format!(
            "You are saving {} of income. The 50/30/20 rule suggests aiming for 20% ({} per month).",
            format_percent(savings_rate),
            format_amount(income * TARGET_SAVINGS_RATE)
        ));
    }

    for line in breakdown
        .iter()
        .filter(|l| l.share_of_income > CATEGORY_SHARE_LIMIT)
    {
        tips.push(format!(
            "'{}' takes {} of income. Look for ways to reduce it below 30%.",
            line.category,
            format_percent(line.share_of_income)
        ));
    }

    if tips.is_empty() {
        tips.push(format!(
            "Your plan is on track: saving {} of income. Consider automating transfers to savings.",
            format_percent(savings_rate)
        ));
    }

    tips
}

impl BudgetReport {
    /// Human-readable report
    pub fn render(&self) -> String {
        let mut text = format!("Budget plan for monthly income {}\n\n", format_amount(self.income));

        text.push_str("Expense breakdown:\n");
        if self.breakdown.is_empty() {
            text.push_str("- (none)\n");
        }
        for line in &self.breakdown {
            text.push_str(&format!(
                "- {}: {} ({} of income)\n",
                line.category,
                format_amount(line.amount),
                format_percent(line.share_of_income)
            ));
        }
        text.push_str(&format!(
            "Total monthly expenses: {}\n",
            format_amount(self.total_expenses)
        ));

        if !self.skipped.is_empty() {
            text.push_str(&format!("\nSkipped entries ({}):\n", self.skipped.len()));
            for s in &self.skipped {
                text.push_str(&format!("- '{}': {}\n", s.raw, s.reason));
            }
        }

        text.push_str(&format!(
            "\nNet monthly savings: {} ({} of income)\n",
            format_amount(self.net_monthly),
            format_percent(self.savings_rate)
        ));
        text.push_str(&format!(
            "Projected savings after {} months at {} annual interest: {}\n",
            self.projection.months.len(),
            format_percent(self.projection.annual_rate),
            format_amount(self.projection.total_savings)
        ));

        text.push_str("\nTips:\n");
        for tip in &self.tips {
            text.push_str(&format!("- {}\n", tip));
        }

        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: u32 = 600;

    #[test]
    fn test_budget_plan_figures() {
        let report = build_budget_plan(
            5000.0,
            "rent:2000,food:800,entertainment:300",
            12,
            0.0,
            MAX,
            &CategoryRules::builtin(),
        )
        .unwrap();

        assert_eq!(report.total_expenses, 3100.0);
        assert_eq!(report.net_monthly, 1900.0);
        assert_eq!(report.projection.total_savings, 22800.0);
        assert_eq!(report.breakdown[0].category, "rent");
        assert!((report.breakdown[0].share_of_income - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_flags_large_category() {
        let report =
            build_budget_plan(5000.0, "rent:2000,food:500", 6, 0.03, MAX, &CategoryRules::builtin())
                .unwrap();
        assert!(report.tips.iter().any(|t| t.contains("'rent'")));
        assert!(!report.tips.iter().any(|t| t.contains("'food'")));
    }

    #[test]
    fn test_deficit_warning() {
        let report =
            build_budget_plan(1000.0, "rent:1500", 3, 0.03, MAX, &CategoryRules::builtin()).unwrap();
        assert!(report.net_monthly < 0.0);
        assert!(report.tips[0].contains("exceed income"));
        assert!(report.projection.total_savings < 0.0);
    }

    #[test]
    fn test_low_savings_rate_tip() {
        let report =
            build_budget_plan(4000.0, "rent:1000,food:1000,travel:1000,misc:500", 6, 0.03, MAX, &CategoryRules::builtin())
                .unwrap();
        assert!(report.tips.iter().any(|t| t.contains("50/30/20")));
    }

    #[test]
    fn test_on_track_plan() {
        let report =
            build_budget_plan(6000.0, "rent:1500,food:600", 6, 0.03, MAX, &CategoryRules::builtin())
                .unwrap();
        assert_eq!(report.tips.len(), 1);
        assert!(report.tips[0].contains("on track"));
    }

    #[test]
    fn test_no_expenses_tip() {
        let report = build_budget_plan(3000.0, "garbage", 6, 0.03, MAX, &CategoryRules::builtin())
            .unwrap();
        assert!(report.tips[0].contains("label:amount"));
        assert_eq!(report.skipped.len(), 1);
    }

    #[test]
    fn test_income_must_be_positive() {
        assert!(build_budget_plan(0.0, "rent:1", 6, 0.03, MAX, &CategoryRules::builtin()).is_err());
    }

    #[test]
    fn test_render_contains_sections() {
        let report =
            build_budget_plan(5000.0, "rent:2000,starbucks:40", 12, 0.03, MAX, &CategoryRules::builtin())
                .unwrap();
        let text = report.render();
        assert!(text.contains("Expense breakdown:"));
        assert!(text.contains("- rent: 2,000.00 (40.00% of income)"));
        assert!(text.contains("- food: 40.00"));
        assert!(text.contains("Net monthly savings: 2,960.00"));
        assert!(text.contains("Tips:"));
    }
}
