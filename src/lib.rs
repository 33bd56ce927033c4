//! Finance Assistant MCP Server Library
//!
//! A Model Context Protocol (MCP) server exposing personal finance tools:
//! interest calculation, expense categorization, savings projection and
//! budget planning.

pub mod config;
pub mod error;
pub mod finance;
pub mod mcp;

pub use config::Config;
pub use error::{FinanceMcpError, Result};
