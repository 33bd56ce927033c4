//! Finance Assistant MCP Server
//!
//! A Model Context Protocol (MCP) server exposing personal finance tools to
//! AI assistant clients.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use finance_mcp_server::config::{Config, Transport};
use finance_mcp_server::error::Result;
use finance_mcp_server::finance::rules::CategoryRules;
use finance_mcp_server::mcp::http::run_http;
use finance_mcp_server::mcp::server::McpServer;

/// Finance Assistant MCP Server
#[derive(Parser)]
#[command(name = "finance-mcp-server")]
#[command(author, version, about = "Finance Assistant MCP Server - personal finance tools over the Model Context Protocol")]
struct Cli {
    /// Transport to serve on
    #[arg(long, value_enum)]
    transport: Option<Transport>,

    /// HTTP bind host (http transport)
    #[arg(long)]
    host: Option<String>,

    /// HTTP bind port (http transport)
    #[arg(long)]
    port: Option<u16>,

    /// Path to a category rules JSON file
    #[arg(long)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the built-in category rules to the rules file for editing
    InitRules {
        /// Overwrite an existing rules file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; stdout is reserved for the stdio transport
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load configuration, CLI flags override the environment
    let mut config = Config::new()?;
    if let Some(transport) = cli.transport {
        config.transport = transport;
    }
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(rules) = cli.rules {
        config.rules_path = rules;
    }

    match cli.command {
        Some(Commands::InitRules { force }) => {
            if config.rules_path.parent() == Some(config.config_dir.as_path()) {
                config.ensure_config_dir()?;
            }
            CategoryRules::write_builtin(&config.rules_path, force)?;
            eprintln!("Category rules written to {}", config.rules_path.display());
        }
        None => {
            run_server(config).await?;
        }
    }

    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    let rules = Arc::new(CategoryRules::load(&config.rules_path)?);
    if !config.rules_file_exists() {
        tracing::info!(
            "Using built-in category rules (run 'finance-mcp-server init-rules' to customize)"
        );
    }

    let server = McpServer::new(&config, rules);

    match config.transport {
        Transport::Stdio => server.run_stdio().await?,
        Transport::Http => run_http(Arc::new(server), &config.bind_addr()).await?,
    }

    Ok(())
}
