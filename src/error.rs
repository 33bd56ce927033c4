//! Error types for the Finance MCP Server
//!
//! This module defines the error hierarchy for all operations in the server.

use thiserror::Error;

/// Main error type for the Finance MCP Server
#[derive(Error, Debug)]
pub enum FinanceMcpError {
    /// Input validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Arithmetic errors (overflow, non-finite results)
    #[error("Calculation error: {0}")]
    Calculation(#[from] CalculationError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// MCP protocol errors
    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Input validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid parameter: {name} - {message}")]
    InvalidParameter { name: String, message: String },

    #[error("{0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Arithmetic errors
#[derive(Error, Debug)]
pub enum CalculationError {
    #[error("Result of {operation} is too large to represent")]
    Overflow { operation: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found: {path}")]
    DirNotFound { path: String },

    #[error("Failed to create config directory: {path}")]
    DirCreationFailed { path: String },

    #[error("Invalid value for {var}: {value}")]
    InvalidEnvVar { var: String, value: String },

    #[error("Invalid category rules file {path}: {message}")]
    InvalidRules { path: String, message: String },

    #[error("Category rules file already exists: {path} (use --force to overwrite)")]
    RulesFileExists { path: String },
}

/// MCP protocol errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Unknown prompt: {name}")]
    UnknownPrompt { name: String },

    #[error("Invalid arguments: {message}")]
    InvalidArguments { message: String },

    #[error("Transport error: {message}")]
    TransportError { message: String },
}

/// Result type alias for Finance MCP operations
pub type Result<T> = std::result::Result<T, FinanceMcpError>;

impl From<validator::ValidationErrors> for FinanceMcpError {
    fn from(err: validator::ValidationErrors) -> Self {
        FinanceMcpError::Validation(ValidationError::from(err))
    }
}

impl FinanceMcpError {
    /// Shorthand for an `InvalidParameter` validation failure
    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        FinanceMcpError::Validation(ValidationError::InvalidParameter {
            name: name.into(),
            message: message.into(),
        })
    }

    /// Shorthand for an overflow in the named operation
    pub fn overflow(operation: impl Into<String>) -> Self {
        FinanceMcpError::Calculation(CalculationError::Overflow {
            operation: operation.into(),
        })
    }
}
