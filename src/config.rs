//! Configuration management for the Finance MCP Server
//!
//! Handles paths, environment variables, and configuration loading.

use std::path::PathBuf;

use crate::error::{ConfigError, FinanceMcpError, Result};

/// Transport the server listens on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Transport {
    /// Newline-delimited JSON-RPC over stdin/stdout
    #[default]
    Stdio,
    /// JSON-RPC over HTTP POST
    Http,
}

/// Configuration for the Finance MCP Server
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for storing configuration files
    pub config_dir: PathBuf,

    /// Path to user-defined category rules (JSON)
    pub rules_path: PathBuf,

    /// Transport to serve on
    pub transport: Transport,

    /// HTTP bind host
    pub host: String,

    /// HTTP bind port
    pub port: u16,

    /// Annual interest rate used when a caller omits one
    pub default_interest_rate: f64,

    /// Upper bound on projection length, in months
    pub max_projection_months: u32,
}

impl Config {
    /// Create a new configuration from the environment with default paths
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        Self::with_config_dir(config_dir)
    }

    /// Create a configuration rooted at an explicit directory
    pub fn with_config_dir(config_dir: PathBuf) -> Result<Self> {
        let rules_path = std::env::var("FINANCE_MCP_RULES_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir.join(defaults::RULES_FILE));

        let host = std::env::var("FINANCE_MCP_HOST").unwrap_or_else(|_| defaults::HOST.to_string());

        let port = env_parse("FINANCE_MCP_PORT")?.unwrap_or(defaults::PORT);

        let default_interest_rate =
            env_parse("FINANCE_MCP_DEFAULT_RATE")?.unwrap_or(defaults::INTEREST_RATE);
        if !default_interest_rate.is_finite() || default_interest_rate < 0.0 {
            return Err(FinanceMcpError::Config(ConfigError::InvalidEnvVar {
                var: "FINANCE_MCP_DEFAULT_RATE".to_string(),
                value: default_interest_rate.to_string(),
            }));
        }

        let max_projection_months =
            env_parse("FINANCE_MCP_MAX_MONTHS")?.unwrap_or(defaults::MAX_PROJECTION_MONTHS);
        if max_projection_months == 0 {
            return Err(FinanceMcpError::Config(ConfigError::InvalidEnvVar {
                var: "FINANCE_MCP_MAX_MONTHS".to_string(),
                value: "0".to_string(),
            }));
        }

        Ok(Self {
            config_dir,
            rules_path,
            transport: Transport::default(),
            host,
            port,
            default_interest_rate,
            max_projection_months,
        })
    }

    /// Get the configuration directory (not created until something is written)
    fn get_config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| {
            FinanceMcpError::Config(ConfigError::DirNotFound {
                path: "~".to_string(),
            })
        })?;

        Ok(home.join(defaults::CONFIG_DIR_NAME))
    }

    /// Create the configuration directory if it doesn't exist
    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir).map_err(|_| {
                FinanceMcpError::Config(ConfigError::DirCreationFailed {
                    path: self.config_dir.display().to_string(),
                })
            })?;
        }
        Ok(())
    }

    /// Check if a user rules file exists
    pub fn rules_file_exists(&self) -> bool {
        self.rules_path.exists()
    }

    /// Socket address string for the HTTP transport
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Read and parse an optional environment variable
fn env_parse<T: std::str::FromStr>(var: &str) -> Result<Option<T>> {
    match std::env::var(var) {
        Ok(value) => value.trim().parse().map(Some).map_err(|_| {
            FinanceMcpError::Config(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                value,
            })
        }),
        Err(_) => Ok(None),
    }
}

/// Built-in defaults
pub mod defaults {
    /// Directory name under the user's home
    pub const CONFIG_DIR_NAME: &str = ".finance-mcp";

    /// Category rules file name inside the config directory
    pub const RULES_FILE: &str = "category_rules.json";

    pub const HOST: &str = "127.0.0.1";
    pub const PORT: u16 = 8080;

    /// Annual rate applied to savings projections
    pub const INTEREST_RATE: f64 = 0.03;

    /// Fifty years
    pub const MAX_PROJECTION_MONTHS: u32 = 600;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_with_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_config_dir(dir.path().to_path_buf()).unwrap();
        assert_eq!(config.config_dir, dir.path());
        assert_eq!(config.transport, Transport::Stdio);
        assert!(config.max_projection_months > 0);
    }

    #[test]
    fn test_ensure_config_dir_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("finance");
        let config = Config::with_config_dir(nested.clone()).unwrap();
        assert!(!nested.exists());
        config.ensure_config_dir().unwrap();
        assert!(nested.exists());
    }

    #[test]
    fn test_bind_addr_format() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_config_dir(dir.path().to_path_buf()).unwrap();
        config.host = "0.0.0.0".to_string();
        config.port = 9000;
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
    }
}
