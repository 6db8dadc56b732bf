use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

/// MetaTrader 5 MCP server
///
/// Exposes account and optimization REST APIs as MCP tools over stdio.
#[derive(Parser, Debug)]
#[command(name = "mt5-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Account API base address (overrides MT5_API_ENDPOINT)
    #[arg(long)]
    account_endpoint: Option<String>,

    /// Optimization API base address (overrides MT5_FLASK_API)
    #[arg(long)]
    optimization_endpoint: Option<String>,

    /// Config file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Answer a single request and exit
    #[arg(long)]
    once: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Log to file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn setup_logging(log_level: &str, log_file: Option<PathBuf>) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // stdout carries protocol frames only
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true);

    if let Some(log_path) = log_file {
        let file = std::fs::File::create(log_path)?;
        subscriber.with_writer(file).init();
    } else {
        subscriber.with_writer(std::io::stderr).init();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(&args.log_level, args.log_file)?;

    info!("Starting MT5 MCP v{}", env!("CARGO_PKG_VERSION"));

    let overrides = mt5_mcp::config::Overrides {
        account_endpoint: args.account_endpoint,
        optimization_endpoint: args.optimization_endpoint,
        config_path: args.config,
    };

    let config = match mt5_mcp::ConfigLoader::load(&overrides) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let dispatcher = match mt5_mcp::Dispatcher::with_http(config) {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return Err(e.into());
        }
    };

    let server = mt5_mcp::McpServer::new(dispatcher);
    let mode = if args.once {
        mt5_mcp::ServeMode::Once
    } else {
        mt5_mcp::ServeMode::Stream
    };

    info!("MT5 MCP server ready - accepting MCP requests on stdio");

    if let Err(e) = server.run(mode).await {
        error!("MCP server error: {:#}", e);
        return Err(e);
    }

    info!("MT5 MCP shut down");

    // The stdin reader may still be parked on a blocking read
    std::process::exit(0);
}
