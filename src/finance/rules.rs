//! Category rules
//!
//! Keyword rules that map merchant names and free-form expense labels to
//! spending categories. User rules are loaded from a JSON file and always
//! take precedence over the built-in merchant table.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, FinanceMcpError, Result};

/// A single keyword rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Case-insensitive pattern. `*` is a wildcard; without one the pattern
    /// must appear as a whole word (or phrase) in the label.
    pub pattern: String,

    /// Category assigned on match
    pub category: String,

    /// Higher priority rules are tried first
    #[serde(default)]
    pub priority: i32,
}

impl CategoryRule {
    pub fn new(pattern: impl Into<String>, category: impl Into<String>, priority: i32) -> Self {
        Self {
            pattern: pattern.into(),
            category: category.into(),
            priority,
        }
    }

    /// Check if the rule matches an (already lowercased or not) label
    pub fn matches(&self, text: &str) -> bool {
        let pattern = self.pattern.trim().to_lowercase();
        let text = text.trim().to_lowercase();

        if pattern.is_empty() {
            return false;
        }

        if pattern.contains('*') {
            wildcard_match(&pattern, &text)
        } else {
            contains_word(&text, &pattern)
        }
    }
}

/// Anchored wildcard match: `mcdonald*` matches labels starting with "mcdonald",
/// `*coffee*` matches anywhere.
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    let (first, last) = (parts[0], parts[parts.len() - 1]);

    if !text.starts_with(first) {
        return false;
    }
    if text.len() < first.len() + last.len() || !text.ends_with(last) {
        return false;
    }

    // Middle parts must appear in order between the anchors
    let mut pos = first.len();
    let end = text.len() - last.len();
    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        match text[pos..end].find(*part) {
            Some(found) => pos += found + part.len(),
            None => return false,
        }
    }
    true
}

/// Substring match that only accepts hits bounded by non-alphanumeric characters
fn contains_word(text: &str, needle: &str) -> bool {
    let mut start = 0;
    while let Some(found) = text[start..].find(needle) {
        let begin = start + found;
        let end = begin + needle.len();

        let before_ok = text[..begin]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = text[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());

        if before_ok && after_ok {
            return true;
        }

        // Advance past the first char of this hit
        start = begin + text[begin..].chars().next().map_or(1, char::len_utf8);
    }
    false
}

/// Ordered rule set used for categorization
#[derive(Debug, Clone)]
pub struct CategoryRules {
    rules: Vec<CategoryRule>,
}

impl CategoryRules {
    /// Built-in merchant rules only
    pub fn builtin() -> Self {
        Self::with_user_rules(Vec::new())
    }

    /// User rules (sorted by priority) followed by the built-in rules
    pub fn with_user_rules(mut user_rules: Vec<CategoryRule>) -> Self {
        user_rules.sort_by(|a, b| b.priority.cmp(&a.priority));

        let mut builtin = builtin_rules();
        builtin.sort_by(|a, b| b.priority.cmp(&a.priority));

        user_rules.extend(builtin);
        Self { rules: user_rules }
    }

    /// Load user rules from a JSON file, falling back to built-ins when it is absent
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No category rules file at {}, using built-in rules", path.display());
            return Ok(Self::builtin());
        }

        let content = std::fs::read_to_string(path)?;
        let user_rules: Vec<CategoryRule> = serde_json::from_str(&content).map_err(|e| {
            FinanceMcpError::Config(ConfigError::InvalidRules {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        })?;

        if let Some(bad) = user_rules
            .iter()
            .find(|r| r.pattern.trim().is_empty() || r.category.trim().is_empty())
        {
            return Err(FinanceMcpError::Config(ConfigError::InvalidRules {
                path: path.display().to_string(),
                message: format!(
                    "rule with pattern '{}' must have a non-empty pattern and category",
                    bad.pattern
                ),
            }));
        }

        tracing::info!(
            "Loaded {} category rules from {}",
            user_rules.len(),
            path.display()
        );
        Ok(Self::with_user_rules(user_rules))
    }

    /// Write the built-in rules as a starting point for customization
    pub fn write_builtin(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            return Err(FinanceMcpError::Config(ConfigError::RulesFileExists {
                path: path.display().to_string(),
            }));
        }

        let json = serde_json::to_string_pretty(&builtin_rules())?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Category of the first matching rule
    pub fn classify(&self, label: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(label))
            .map(|rule| rule.category.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Common merchants. Generic category words ("rent", "food") are left alone
/// so they stay their own category.
fn builtin_rules() -> Vec<CategoryRule> {
    const TABLE: &[(&str, &[&str])] = &[
        (
            "food",
            &[
                "starbucks",
                "mcdonald*",
                "chipotle",
                "subway",
                "doordash",
                "grubhub",
                "whole foods",
                "trader joe*",
                "safeway",
                "kroger",
                "aldi",
            ],
        ),
        (
            "transportation",
            &["uber", "lyft", "shell", "chevron", "exxon", "bp", "amtrak"],
        ),
        (
            "entertainment",
            &["netflix", "spotify", "hulu", "disney*", "steam", "amc", "ticketmaster"],
        ),
        (
            "utilities",
            &["comcast", "xfinity", "verizon", "at&t", "t-mobile", "pg&e"],
        ),
        ("housing", &["landlord", "mortgage", "hoa"]),
        ("shopping", &["amazon", "target", "ebay", "ikea", "best buy"]),
        ("health", &["cvs", "walgreens", "planet fitness"]),
    ];

    let mut rules: Vec<CategoryRule> = TABLE
        .iter()
        .flat_map(|(category, patterns)| {
            patterns
                .iter()
                .map(move |pattern| CategoryRule::new(*pattern, *category, 0))
        })
        .collect();

    // More specific than "uber"
    rules.push(CategoryRule::new("uber eats", "food", 10));
    rules
}
