//! Finance calculations
//!
//! Pure, stateless computations behind the MCP tools: interest, expense
//! categorization, savings projection and budget planning.

pub mod budget;
pub mod expenses;
pub mod interest;
pub mod rules;
pub mod savings;
pub mod utils;
