//! MCP Server implementation
//!
//! Implements the Model Context Protocol server. Message handling is
//! transport-agnostic; `run_stdio` drives it over stdin/stdout and the
//! `http` module drives it over HTTP.

use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;

use crate::config::Config;
use crate::error::{FinanceMcpError, McpError, Result};
use crate::finance::rules::CategoryRules;
use crate::mcp::prompts::PromptHandler;
use crate::mcp::tools::ToolHandler;
use crate::mcp::types::*;

/// MCP Server info
pub const SERVER_NAME: &str = "finance-assistant";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

const INSTRUCTIONS: &str = "Personal finance tools: calculate_interest, categorize_expenses, \
project_savings and budget_plan. Rates are decimals (0.05 = 5%). Expenses are \
comma-separated 'label:amount' pairs.";

/// MCP Server for the finance tools
pub struct McpServer {
    /// Tool handler
    tool_handler: ToolHandler,

    /// Prompt handler
    prompt_handler: PromptHandler,

    /// Whether the client sent `notifications/initialized`
    initialized: AtomicBool,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(config: &Config, rules: Arc<CategoryRules>) -> Self {
        Self {
            tool_handler: ToolHandler::new(config, rules),
            prompt_handler: PromptHandler::new(config),
            initialized: AtomicBool::new(false),
        }
    }

    /// Whether the initialize handshake has completed
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Run the server on stdio
    pub async fn run_stdio(&self) -> Result<()> {
        tracing::info!("MCP server started (stdio mode)");

        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        self.serve(stdin.lock(), stdout).await?;

        tracing::info!("stdin closed, shutting down");
        Ok(())
    }

    /// Serve newline-delimited JSON-RPC messages until the reader is exhausted
    pub async fn serve<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> Result<()> {
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            tracing::debug!("Received: {}", line);

            if let Some(response) = self.handle_message(&line).await {
                let response_str = serde_json::to_string(&response)?;
                tracing::debug!("Sending: {}", response_str);
                writeln!(writer, "{}", response_str)?;
                writer.flush()?;
            }
        }

        Ok(())
    }

    /// Handle an incoming JSON-RPC message. Returns `None` for notifications.
    pub async fn handle_message(&self, message: &str) -> Option<JsonRpcResponse> {
        let raw: Value = match serde_json::from_str(message) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Unparseable message: {}", e);
                return Some(JsonRpcResponse::error(
                    None,
                    JsonRpcError::parse_error(format!("Parse error: {}", e)),
                ));
            }
        };

        let raw_id = raw
            .get("id")
            .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok());

        let request: JsonRpcRequest = match serde_json::from_value(raw) {
            Ok(req) => req,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    raw_id,
                    JsonRpcError::invalid_request(format!("Invalid request: {}", e)),
                ));
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                request.id,
                JsonRpcError::invalid_request(format!(
                    "Unsupported jsonrpc version: {}",
                    request.jsonrpc
                )),
            ));
        }

        if request.is_notification() {
            self.handle_notification(&request);
            return None;
        }

        let id = request.id.clone();
        match self.dispatch(&request).await {
            Ok(result) => Some(JsonRpcResponse::success(id, result)),
            Err(error) => Some(JsonRpcResponse::error(id, error)),
        }
    }

    /// Handle JSON-RPC notifications (no response expected)
    fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            methods::INITIALIZED => {
                self.initialized.store(true, Ordering::SeqCst);
                tracing::info!("Client initialized");
            }
            methods::CANCELLED => {
                let request_id = request
                    .params
                    .as_ref()
                    .and_then(|p| p.get("requestId"))
                    .cloned()
                    .unwrap_or(Value::Null);
                tracing::debug!("Client cancelled request: {}", request_id);
            }
            other => {
                tracing::debug!("Unhandled notification: {}", other);
            }
        }
    }

    /// Route a request to its handler
    async fn dispatch(&self, request: &JsonRpcRequest) -> std::result::Result<Value, JsonRpcError> {
        match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(request),
            methods::PING => Ok(serde_json::json!({})),
            methods::LIST_TOOLS => to_value(ListToolsResult {
                tools: self.tool_handler.list_tools(),
            }),
            methods::CALL_TOOL => Ok(self.handle_call_tool(request).await),
            methods::LIST_PROMPTS => to_value(ListPromptsResult {
                prompts: self.prompt_handler.list_prompts(),
            }),
            methods::GET_PROMPT => self.handle_get_prompt(request),
            other => {
                tracing::debug!("Method not found: {}", other);
                Err(JsonRpcError::method_not_found(other))
            }
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self, request: &JsonRpcRequest) -> std::result::Result<Value, JsonRpcError> {
        let params: InitializeParams = request
            .params
            .clone()
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();

        if let Some(client) = &params.client_info {
            tracing::info!("Initialize from {} {}", client.name, client.version);
        }

        let result = InitializeResult {
            protocol_version: negotiate_version(params.protocol_version.as_deref()).to_string(),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability::default()),
                prompts: Some(PromptsCapability::default()),
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        };

        to_value(result)
    }

    /// Handle call tool request; failures become error tool results
    async fn handle_call_tool(&self, request: &JsonRpcRequest) -> Value {
        let result = match request.params.as_ref() {
            Some(p) => match serde_json::from_value::<CallToolParams>(p.clone()) {
                Ok(params) => self.tool_handler.call_tool(&params.name, params.arguments).await,
                Err(e) => CallToolResult::error(format!("Invalid tool parameters: {}", e)),
            },
            None => CallToolResult::error("Missing tool parameters"),
        };

        serde_json::to_value(&result).unwrap_or_else(|e| {
            serde_json::json!({
                "content": [{"type": "text", "text": format!("Error: {}", e)}],
                "isError": true,
            })
        })
    }

    /// Handle get prompt request
    fn handle_get_prompt(&self, request: &JsonRpcRequest) -> std::result::Result<Value, JsonRpcError> {
        let params: GetPromptParams = request
            .params
            .clone()
            .ok_or_else(|| JsonRpcError::invalid_params("Missing prompt parameters"))
            .and_then(|p| {
                serde_json::from_value(p)
                    .map_err(|e| JsonRpcError::invalid_params(format!("Invalid prompt parameters: {}", e)))
            })?;

        match self.prompt_handler.get_prompt(&params.name, &params.arguments) {
            Ok(result) => to_value(result),
            Err(FinanceMcpError::Mcp(e @ (McpError::UnknownPrompt { .. } | McpError::InvalidArguments { .. }))) => {
                Err(JsonRpcError::invalid_params(e.to_string()))
            }
            Err(e) => Err(JsonRpcError::internal_error(e.to_string())),
        }
    }
}

fn to_value<T: serde::Serialize>(value: T) -> std::result::Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> McpServer {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_config_dir(dir.path().to_path_buf()).unwrap();
        McpServer::new(&config, Arc::new(CategoryRules::builtin()))
    }

    #[test]
    fn test_server_info() {
        assert_eq!(SERVER_NAME, "finance-assistant");
    }

    #[test]
    fn test_initialized_notification_sets_flag() {
        let server = server();
        assert!(!server.is_initialized());
        let response = tokio_test::block_on(
            server.handle_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#),
        );
        assert!(response.is_none());
        assert!(server.is_initialized());
    }

    #[test]
    fn test_wrong_jsonrpc_version() {
        let response = tokio_test::block_on(
            server().handle_message(r#"{"jsonrpc":"1.0","id":3,"method":"ping"}"#),
        )
        .unwrap();
        assert_eq!(response.error.unwrap().code, -32600);
        assert_eq!(response.id, Some(RequestId::Number(3)));
    }

    #[test]
    fn test_invalid_request_keeps_id() {
        let response =
            tokio_test::block_on(server().handle_message(r#"{"jsonrpc":"2.0","id":"x"}"#)).unwrap();
        assert_eq!(response.error.unwrap().code, -32600);
        assert_eq!(response.id, Some(RequestId::String("x".to_string())));
    }

    #[test]
    fn test_serve_skips_notifications_and_blank_lines() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n"
        );
        let mut output = Vec::new();
        tokio_test::block_on(server().serve(input.as_bytes(), &mut output)).unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 1);
        assert_eq!(lines[1]["result"]["tools"].as_array().unwrap().len(), 4);
    }
}
