//! Expense categorization
//!
//! Parses `label:amount` lists such as `rent:2000,food:800,starbucks:45` and
//! sums them per category.

use serde::Serialize;

use crate::error::Result;
use crate::finance::rules::CategoryRules;
use crate::finance::utils::{ensure_finite, parse_amount};

/// A parsed `label:amount` entry
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseEntry {
    pub label: String,
    pub amount: f64,
}

/// An entry that could not be parsed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedEntry {
    pub raw: String,
    pub reason: String,
}

/// Total for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// Result of categorizing an expense list
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExpenseSummary {
    /// Category totals in order of first appearance
    pub categories: Vec<CategoryTotal>,
    pub skipped: Vec<SkippedEntry>,
    pub total: f64,
}

impl ExpenseSummary {
    pub fn get(&self, category: &str) -> Option<f64> {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.total)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Categories ordered from largest to smallest total
    pub fn sorted_by_total(&self) -> Vec<&CategoryTotal> {
        let mut sorted: Vec<&CategoryTotal> = self.categories.iter().collect();
        sorted.sort_by(|a, b| b.total.total_cmp(&a.total));
        sorted
    }
}

/// Split a comma-separated expense list into entries and rejects
pub fn parse_entries(input: &str) -> (Vec<ExpenseEntry>, Vec<SkippedEntry>) {
    let mut entries = Vec::new();
    let mut skipped = Vec::new();

    for item in input.split(',') {
        if item.trim().is_empty() {
            continue;
        }

        let parts: Vec<&str> = item.split(':').collect();
        if parts.len() != 2 {
            skipped.push(SkippedEntry {
                raw: item.trim().to_string(),
                reason: "expected exactly one 'label:amount' pair".to_string(),
            });
            continue;
        }

        let label = parts[0].trim().to_lowercase();
        if label.is_empty() {
            skipped.push(SkippedEntry {
                raw: item.trim().to_string(),
                reason: "missing label".to_string(),
            });
            continue;
        }

        match parse_amount(parts[1]) {
            Some(amount) => entries.push(ExpenseEntry { label, amount }),
            None => skipped.push(SkippedEntry {
                raw: item.trim().to_string(),
                reason: format!("'{}' is not a number", parts[1].trim()),
            }),
        }
    }

    (entries, skipped)
}

/// Group and sum expenses by category.
///
/// Each label is resolved through `rules`; unmatched labels are their own category.
/// Fails when a category total or the grand total overflows.
pub fn categorize(input: &str, rules: &CategoryRules) -> Result<ExpenseSummary> {
    let (entries, skipped) = parse_entries(input);

    let mut summary = ExpenseSummary {
        skipped,
        ..Default::default()
    };

    for entry in entries {
        let category = rules
            .classify(&entry.label)
            .map(str::to_string)
            .unwrap_or(entry.label);

        match summary.categories.iter().position(|c| c.category == category) {
            Some(i) => {
                let total = &mut summary.categories[i].total;
                *total = ensure_finite(*total + entry.amount, "category total")?;
            }
            None => summary.categories.push(CategoryTotal {
                category,
                total: entry.amount,
            }),
        }
        summary.total = ensure_finite(summary.total + entry.amount, "expense total")?;
    }

    if !summary.skipped.is_empty() {
        tracing::debug!("Skipped {} invalid expense entries", summary.skipped.len());
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FinanceMcpError;

    #[test]
    fn test_categorize_sums_by_label() {
        let summary = categorize(
            "rent:2000,food:800,entertainment:300,Food: 50",
            &CategoryRules::builtin(),
        )
        .unwrap();
        assert_eq!(summary.get("rent"), Some(2000.0));
        assert_eq!(summary.get("food"), Some(850.0));
        assert_eq!(summary.get("entertainment"), Some(300.0));
        assert_eq!(summary.total, 3150.0);
        assert!(summary.skipped.is_empty());
    }

    #[test]
    fn test_merchants_fold_into_categories() {
        let summary = categorize(
            "food:100,Starbucks:12.5,Netflix:15.99,uber eats:30",
            &CategoryRules::builtin(),
        )
        .unwrap();
        assert_eq!(summary.get("food"), Some(142.5));
        assert_eq!(summary.get("entertainment"), Some(15.99));
        assert!(summary.get("starbucks").is_none());
    }

    #[test]
    fn test_invalid_entries_are_skipped() {
        let summary = categorize("rent:abc,food:800,nocolon,a:b:c,:20,,", &CategoryRules::builtin())
            .unwrap();
        assert_eq!(summary.categories.len(), 1);
        assert_eq!(summary.get("food"), Some(800.0));
        assert_eq!(summary.skipped.len(), 4);
        assert_eq!(summary.skipped[0].raw, "rent:abc");
    }

    #[test]
    fn test_empty_input() {
        let summary = categorize("", &CategoryRules::builtin()).unwrap();
        assert!(summary.is_empty());
        assert_eq!(summary.total, 0.0);
    }

    #[test]
    fn test_sorted_by_total() {
        let summary = categorize("a:1,b:3,c:2", &CategoryRules::builtin()).unwrap();
        let order: Vec<&str> = summary
            .sorted_by_total()
            .into_iter()
            .map(|c| c.category.as_str())
            .collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_overflowing_totals_are_calculation_errors() {
        let rules = CategoryRules::builtin();

        let err = categorize("a:1e308,b:1e308", &rules).unwrap_err();
        assert!(matches!(err, FinanceMcpError::Calculation(_)));

        let err = categorize("a:1e308,a:1e308", &rules).unwrap_err();
        assert!(err.to_string().contains("category total"));
    }

    #[test]
    fn test_parse_entries_keeps_dollar_amounts() {
        let (entries, skipped) = parse_entries(" Groceries : $120.40 ");
        assert!(skipped.is_empty());
        assert_eq!(
            entries,
            vec![ExpenseEntry {
                label: "groceries".to_string(),
                amount: 120.4
            }]
        );
    }
}
