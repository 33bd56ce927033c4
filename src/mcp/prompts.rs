//! MCP Prompt definitions
//!
//! The `budget_plan` prompt walks the client model through building a budget
//! with the finance tools.

use std::collections::HashMap;

use crate::config::Config;
use crate::error::{FinanceMcpError, McpError, Result};
use crate::finance::utils::{format_amount, parse_amount};
use crate::mcp::tools::{CALCULATE_INTEREST, CATEGORIZE_EXPENSES, PROJECT_SAVINGS};
use crate::mcp::types::{Content, GetPromptResult, Prompt, PromptArgument, PromptMessage, Role};

pub const BUDGET_PLAN_PROMPT: &str = "budget_plan";

const BUDGET_PLAN_DESCRIPTION: &str =
    "Create a simple budget plan from income, expenses and a time horizon";

/// Prompt handler
#[derive(Debug)]
pub struct PromptHandler {
    max_projection_months: u32,
}

impl PromptHandler {
    pub fn new(config: &Config) -> Self {
        Self {
            max_projection_months: config.max_projection_months,
        }
    }

    /// List all available prompts
    pub fn list_prompts(&self) -> Vec<Prompt> {
        vec![Prompt {
            name: BUDGET_PLAN_PROMPT.to_string(),
            description: Some(BUDGET_PLAN_DESCRIPTION.to_string()),
            arguments: vec![
                prompt_arg("income", "Monthly income"),
                prompt_arg(
                    "expenses",
                    "Comma-separated 'label:amount' monthly expenses, e.g. 'rent:2000,food:800'",
                ),
                prompt_arg("months", "Number of months to plan for"),
            ],
        }]
    }

    /// Render a prompt by name
    pub fn get_prompt(&self, name: &str, arguments: &HashMap<String, String>) -> Result<GetPromptResult> {
        match name {
            BUDGET_PLAN_PROMPT => budget_plan_prompt(arguments, self.max_projection_months),
            _ => Err(FinanceMcpError::Mcp(McpError::UnknownPrompt {
                name: name.to_string(),
            })),
        }
    }
}

fn prompt_arg(name: &str, description: &str) -> PromptArgument {
    PromptArgument {
        name: name.to_string(),
        description: Some(description.to_string()),
        required: true,
    }
}

fn required_arg<'a>(arguments: &'a HashMap<String, String>, name: &str) -> Result<&'a str> {
    arguments
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            FinanceMcpError::Mcp(McpError::InvalidArguments {
                message: format!("missing required argument '{}'", name),
            })
        })
}

fn budget_plan_prompt(
    arguments: &HashMap<String, String>,
    max_months: u32,
) -> Result<GetPromptResult> {
    let income_raw = required_arg(arguments, "income")?;
    let income = parse_amount(income_raw)
        .filter(|v| *v > 0.0)
        .ok_or_else(|| {
            FinanceMcpError::Mcp(McpError::InvalidArguments {
                message: format!("income must be a positive number, got '{}'", income_raw),
            })
        })?;

    let expenses = required_arg(arguments, "expenses")?;

    let months_raw = required_arg(arguments, "months")?;
    let months: u32 = months_raw
        .parse()
        .ok()
        .filter(|m| (1..=max_months).contains(m))
        .ok_or_else(|| {
            FinanceMcpError::Mcp(McpError::InvalidArguments {
                message: format!(
                    "months must be a whole number between 1 and {}, got '{}'",
                    max_months, months_raw
                ),
            })
        })?;

    let text = format!(
        "You are a personal finance assistant. Your goal is to create a simple budget plan \
based on the user's income, expenses, and time horizon.

Follow these steps:
1. Use the '{categorize}' tool to group and sum the expenses.
2. Calculate total monthly expenses from the categorized sums.
3. Use the '{project}' tool with the income, the total monthly expenses, the number of months, and the default interest rate.
4. Optionally, use '{interest}' if the user mentions specific savings goals (but default to projections).
5. Provide a structured report with:
   - Expense breakdown
   - Net monthly savings
   - Projected savings over the months
   - Tips for improvement (e.g., reduce high categories)

Be helpful, professional, and encouraging.

User details:
- Monthly income: {income}
- Expenses: {expenses}
- Time horizon: {months} months",
        categorize = CATEGORIZE_EXPENSES,
        project = PROJECT_SAVINGS,
        interest = CALCULATE_INTEREST,
        income = format_amount(income),
        expenses = expenses,
        months = months,
    );

    Ok(GetPromptResult {
        description: Some(BUDGET_PLAN_DESCRIPTION.to_string()),
        messages: vec![PromptMessage {
            role: Role::User,
            content: Content::Text { text },
        }],
    })
}
