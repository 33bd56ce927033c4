//! MCP Tool definitions and handlers
//!
//! Defines all available tools and their implementations.

use std::sync::Arc;

use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::config::Config;
use crate::error::{FinanceMcpError, McpError};
use crate::finance::budget::build_budget_plan;
use crate::finance::expenses::categorize;
use crate::finance::interest::{calculate_interest, InterestKind};
use crate::finance::rules::CategoryRules;
use crate::finance::savings::project_savings;
use crate::finance::utils::{format_amount, format_percent, round2};
use crate::mcp::types::{CallToolResult, Tool};

pub const CALCULATE_INTEREST: &str = "calculate_interest";
pub const CATEGORIZE_EXPENSES: &str = "categorize_expenses";
pub const PROJECT_SAVINGS: &str = "project_savings";
pub const BUDGET_PLAN: &str = "budget_plan";

// ==================== Tool Arguments ====================

/// Arguments for `calculate_interest`
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct CalculateInterestArgs {
    /// The initial amount
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub principal: f64,

    /// Annual interest rate as a decimal, e.g. 0.05 for 5%
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub rate: f64,

    /// Number of years
    pub time: u32,

    /// Compound interest when true, simple interest when false
    #[serde(default = "default_true")]
    pub compound: bool,

    /// Compounding periods per year (1 = annually, 12 = monthly)
    #[validate(range(min = 1, max = 365, message = "must be between 1 and 365"))]
    pub compounds_per_year: Option<u32>,
}

/// Arguments for `categorize_expenses`
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct CategorizeExpensesArgs {
    /// Comma-separated 'label:amount' pairs, e.g. 'rent:2000,food:800,starbucks:45'
    pub expenses: String,
}

/// Arguments for `project_savings`
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct ProjectSavingsArgs {
    /// Monthly income
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub income: f64,

    /// Total monthly expenses
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub monthly_expenses: f64,

    /// Number of months to project
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub months: u32,

    /// Annual interest rate on savings as a decimal (default 0.03)
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub interest_rate: Option<f64>,
}

/// Arguments for `budget_plan`
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct BudgetPlanArgs {
    /// Monthly income, must be greater than zero
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub income: f64,

    /// Comma-separated 'label:amount' monthly expenses, e.g. 'rent:2000,food:800'
    pub expenses: String,

    /// Number of months to project savings over
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub months: u32,

    /// Annual interest rate on savings as a decimal (default 0.03)
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub interest_rate: Option<f64>,
}

fn default_true() -> bool {
    true
}

// ==================== Tool Handler ====================

/// Tool handler
pub struct ToolHandler {
    rules: Arc<CategoryRules>,
    default_interest_rate: f64,
    max_projection_months: u32,
}

impl ToolHandler {
    /// Create a new tool handler
    pub fn new(config: &Config, rules: Arc<CategoryRules>) -> Self {
        Self {
            rules,
            default_interest_rate: config.default_interest_rate,
            max_projection_months: config.max_projection_months,
        }
    }

    /// List all available tools
    pub fn list_tools(&self) -> Vec<Tool> {
        vec![
            tool_def(
                CALCULATE_INTEREST,
                "Calculates simple or compound interest earned on a principal amount",
                schema_for::<CalculateInterestArgs>(),
            ),
            tool_def(
                CATEGORIZE_EXPENSES,
                "Categorizes and sums expenses from a comma-separated 'label:amount' list; known merchants are mapped to categories",
                schema_for::<CategorizeExpensesArgs>(),
            ),
            tool_def(
                PROJECT_SAVINGS,
                "Projects savings month by month from income and expenses, applying monthly interest",
                schema_for::<ProjectSavingsArgs>(),
            ),
            tool_def(
                BUDGET_PLAN,
                "Builds a budget plan: expense breakdown, net monthly savings, savings projection and improvement tips",
                schema_for::<BudgetPlanArgs>(),
            ),
        ]
    }

    /// Call a tool by name
    pub async fn call_tool(&self, name: &str, args: Value) -> CallToolResult {
        tracing::info!("Calling tool {}", name);

        let result = match name {
            CALCULATE_INTEREST => self.handle_calculate_interest(args),
            CATEGORIZE_EXPENSES => self.handle_categorize_expenses(args),
            PROJECT_SAVINGS => self.handle_project_savings(args),
            BUDGET_PLAN => self.handle_budget_plan(args),
            _ => Err(FinanceMcpError::Mcp(McpError::UnknownTool {
                name: name.to_string(),
            })),
        };

        result.unwrap_or_else(|e| {
            tracing::warn!("Tool {} failed: {}", name, e);
            CallToolResult::error(e.to_string())
        })
    }

    // ==================== Tool Handlers ====================

    fn handle_calculate_interest(&self, args: Value) -> Result<CallToolResult, FinanceMcpError> {
        let args: CalculateInterestArgs = parse_args(args)?;

        let kind = InterestKind::from_compound_flag(args.compound);
        let result = calculate_interest(
            args.principal,
            args.rate,
            args.time,
            kind,
            args.compounds_per_year.unwrap_or(1),
        )?;

        let mut text = match kind {
            InterestKind::Compound => format!(
                "Compound interest (compounded {}x per year) on {} at {} for {} years: {}\n",
                result.compounds_per_year,
                format_amount(result.principal),
                format_percent(result.rate),
                result.years,
                format_amount(result.interest)
            ),
            InterestKind::Simple => format!(
                "Simple interest on {} at {} for {} years: {}\n",
                format_amount(result.principal),
                format_percent(result.rate),
                result.years,
                format_amount(result.interest)
            ),
        };
        text.push_str(&format!("Final amount: {}", format_amount(result.final_amount)));

        Ok(CallToolResult::with_structured(
            text,
            json!({
                "interest": round2(result.interest),
                "final_amount": round2(result.final_amount),
                "kind": result.kind,
                "compounds_per_year": result.compounds_per_year,
            }),
        ))
    }

    fn handle_categorize_expenses(&self, args: Value) -> Result<CallToolResult, FinanceMcpError> {
        let args: CategorizeExpensesArgs = parse_args(args)?;

        let summary = categorize(&args.expenses, &self.rules)?;

        let mut text = if summary.is_empty() {
            "No valid expenses found.\n".to_string()
        } else {
            format!("Expenses by category ({}):\n", summary.categories.len())
        };
        for c in summary.sorted_by_total() {
            text.push_str(&format!("- {}: {}\n", c.category, format_amount(c.total)));
        }
        text.push_str(&format!("Total: {}\n", format_amount(summary.total)));

        if !summary.skipped.is_empty() {
            text.push_str(&format!("\nSkipped entries ({}):\n", summary.skipped.len()));
            for s in &summary.skipped {
                text.push_str(&format!("- '{}': {}\n", s.raw, s.reason));
            }
        }

        let categories: serde_json::Map<String, Value> = summary
            .categories
            .iter()
            .map(|c| (c.category.clone(), json!(c.total)))
            .collect();

        Ok(CallToolResult::with_structured(
            text,
            json!({
                "categories": categories,
                "total": summary.total,
                "skipped": summary.skipped,
            }),
        ))
    }

    fn handle_project_savings(&self, args: Value) -> Result<CallToolResult, FinanceMcpError> {
        let args: ProjectSavingsArgs = parse_args(args)?;

        let rate = args.interest_rate.unwrap_or(self.default_interest_rate);
        let projection = project_savings(
            args.income,
            args.monthly_expenses,
            args.months,
            rate,
            self.max_projection_months,
        )?;

        let breakdowns = projection.breakdowns();
        let mut text = format!(
            "Net monthly savings: {}\nAnnual interest rate: {}\nTotal savings after {} months: {}\n",
            format_amount(projection.net_monthly),
            format_percent(rate),
            args.months,
            format_amount(projection.total_savings)
        );
        text.push_str(&format!(
            "Contributions: {}, interest earned: {}\n\n",
            format_amount(projection.total_contributions()),
            format_amount(projection.total_interest())
        ));
        text.push_str(&breakdowns.join("\n"));

        Ok(CallToolResult::with_structured(
            text,
            json!({
                "total_savings": projection.total_savings,
                "breakdowns": breakdowns,
            }),
        ))
    }

    fn handle_budget_plan(&self, args: Value) -> Result<CallToolResult, FinanceMcpError> {
        let args: BudgetPlanArgs = parse_args(args)?;

        let report = build_budget_plan(
            args.income,
            &args.expenses,
            args.months,
            args.interest_rate.unwrap_or(self.default_interest_rate),
            self.max_projection_months,
            &self.rules,
        )?;

        let structured = serde_json::to_value(&report)?;
        Ok(CallToolResult::with_structured(report.render(), structured))
    }
}

// ==================== Schema Definitions ====================

fn tool_def(name: &str, description: &str, input_schema: Value) -> Tool {
    Tool {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema,
    }
}

/// JSON Schema for a tool's argument struct, inlined and without `$schema`
fn schema_for<T: JsonSchema>() -> Value {
    let settings = SchemaSettings::draft07().with(|s| {
        s.option_nullable = false;
        s.option_add_null_type = false;
        s.inline_subschemas = true;
        s.meta_schema = None;
    });
    let schema = settings.into_generator().into_root_schema_for::<T>();
    serde_json::to_value(schema).unwrap_or_else(|_| json!({"type": "object", "properties": {}}))
}

/// Deserialize and validate tool arguments
fn parse_args<T: DeserializeOwned + Validate>(args: Value) -> Result<T, FinanceMcpError> {
    // Clients may send `null` or omit arguments entirely
    let args = if args.is_null() { json!({}) } else { args };

    let parsed: T = serde_json::from_value(args).map_err(|e| {
        FinanceMcpError::Mcp(McpError::InvalidArguments {
            message: e.to_string(),
        })
    })?;
    parsed.validate()?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> ToolHandler {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_config_dir(dir.path().to_path_buf()).unwrap();
        ToolHandler::new(&config, Arc::new(CategoryRules::builtin()))
    }

    #[test]
    fn test_list_tools_names() {
        let names: Vec<String> = handler().list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![CALCULATE_INTEREST, CATEGORIZE_EXPENSES, PROJECT_SAVINGS, BUDGET_PLAN]
        );
    }

    #[test]
    fn test_schema_from_args() {
        let schema = schema_for::<ProjectSavingsArgs>();
        assert_eq!(schema["type"], "object");
        assert!(schema.get("$schema").is_none());
        assert_eq!(schema["properties"]["months"]["minimum"], 1.0);
        assert_eq!(schema["properties"]["income"]["minimum"], 0.0);

        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert!(required.contains(&"income"));
        assert!(!required.contains(&"interest_rate"));
    }

    #[test]
    fn test_interest_schema_defaults_compound() {
        let schema = schema_for::<CalculateInterestArgs>();
        assert_eq!(schema["properties"]["compound"]["default"], true);
    }

    #[tokio::test]
    async fn test_calculate_interest_tool() {
        let result = handler()
            .call_tool(
                CALCULATE_INTEREST,
                json!({"principal": 1000, "rate": 0.05, "time": 10}),
            )
            .await;
        assert!(!result.is_error);
        assert!(result.text_content().contains("628.89"));
        assert_eq!(result.structured_content.unwrap()["interest"], 628.89);
    }

    #[tokio::test]
    async fn test_simple_interest_tool() {
        let result = handler()
            .call_tool(
                CALCULATE_INTEREST,
                json!({"principal": 1000, "rate": 0.05, "time": 10, "compound": false}),
            )
            .await;
        assert!(result.text_content().starts_with("Simple interest"));
        assert_eq!(result.structured_content.unwrap()["final_amount"], 1500.0);
    }

    #[tokio::test]
    async fn test_negative_rate_is_tool_error() {
        let result = handler()
            .call_tool(
                CALCULATE_INTEREST,
                json!({"principal": 1000, "rate": -0.05, "time": 10}),
            )
            .await;
        assert!(result.is_error);
        let text = result.text_content();
        assert!(text.starts_with("Error:"));
        assert!(text.contains("rate"));
    }

    #[tokio::test]
    async fn test_wrong_type_is_tool_error() {
        let result = handler()
            .call_tool(PROJECT_SAVINGS, json!({"income": "lots", "monthly_expenses": 1, "months": 1}))
            .await;
        assert!(result.is_error);
        assert!(result.text_content().contains("Invalid arguments"));
    }

    #[tokio::test]
    async fn test_categorize_tool_structured_totals() {
        let result = handler()
            .call_tool(
                CATEGORIZE_EXPENSES,
                json!({"expenses": "rent:2000,food:800,entertainment:300,netflix:20,bogus"}),
            )
            .await;
        assert!(!result.is_error);
        let structured = result.structured_content.clone().unwrap();
        assert_eq!(structured["categories"]["entertainment"], 320.0);
        assert_eq!(structured["categories"]["rent"], 2000.0);
        assert_eq!(structured["skipped"].as_array().unwrap().len(), 1);
        assert!(result.text_content().contains("Skipped entries (1)"));
    }

    #[tokio::test]
    async fn test_project_savings_uses_default_rate() {
        let result = handler()
            .call_tool(
                PROJECT_SAVINGS,
                json!({"income": 5000, "monthly_expenses": 3000, "months": 3}),
            )
            .await;
        assert!(!result.is_error);
        let structured = result.structured_content.unwrap();
        assert_eq!(structured["breakdowns"].as_array().unwrap().len(), 3);
        assert_eq!(structured["breakdowns"][0], "Month 1: 2005");
    }

    #[tokio::test]
    async fn test_project_savings_month_limit() {
        let result = handler()
            .call_tool(
                PROJECT_SAVINGS,
                json!({"income": 5000, "monthly_expenses": 3000, "months": 100000}),
            )
            .await;
        assert!(result.is_error);
        assert!(result.text_content().contains("months"));
    }

    #[tokio::test]
    async fn test_budget_plan_tool() {
        let result = handler()
            .call_tool(
                BUDGET_PLAN,
                json!({"income": 5000, "expenses": "rent:2000,food:800", "months": 12, "interest_rate": 0.0}),
            )
            .await;
        assert!(!result.is_error);
        let structured = result.structured_content.clone().unwrap();
        assert_eq!(structured["net_monthly"], 2200.0);
        assert_eq!(structured["projection"]["total_savings"], 26400.0);
        assert!(result.text_content().contains("Tips:"));
    }

    #[tokio::test]
    async fn test_categorize_overflow_is_tool_error() {
        let result = handler()
            .call_tool(CATEGORIZE_EXPENSES, json!({"expenses": "a:1e308,b:1e308"}))
            .await;
        assert!(result.is_error);
        assert!(result.text_content().contains("too large"));
        assert!(!result.text_content().contains("inf"));
    }

    #[tokio::test]
    async fn test_budget_plan_accepts_small_positive_income() {
        let result = handler()
            .call_tool(
                BUDGET_PLAN,
                json!({"income": 0.005, "expenses": "", "months": 1}),
            )
            .await;
        assert!(!result.is_error, "{}", result.text_content());

        let result = handler()
            .call_tool(BUDGET_PLAN, json!({"income": 0, "expenses": "", "months": 1}))
            .await;
        assert!(result.is_error);
        assert!(result.text_content().contains("income"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let result = handler().call_tool("delete_everything", json!({})).await;
        assert!(result.is_error);
        assert!(result.text_content().contains("Unknown tool: delete_everything"));
    }

    #[tokio::test]
    async fn test_missing_arguments() {
        let result = handler().call_tool(CATEGORIZE_EXPENSES, Value::Null).await;
        assert!(result.is_error);
        assert!(result.text_content().contains("expenses"));
    }
}
