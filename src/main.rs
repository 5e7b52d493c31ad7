//! static-alias
//!
//! Serves a directory over HTTP, rewriting request paths through ordered
//! alias rules first.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request           ┌──────────────────────────────────────────────┐
//!     ─────────────────────────┼─▶ http server ─▶ routing (alias router)      │
//!                              │                   params → match → serve     │
//!                              │                   → containment guard        │
//!                              │                          │                   │
//!     Client Response          │                          ▼                   │
//!     ◀────────────────────────┼── response (file / index / 403 / 404 / 500)  │
//!                              │                                              │
//!                              │  config · observability · lifecycle          │
//!                              └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use static_alias::config::{finalize_config, load_config, ServerConfig};
use static_alias::lifecycle::{signals, startup, Shutdown};
use static_alias::observability::logging;

/// Static file server with alias rules.
#[derive(Debug, Parser)]
#[command(name = "static-alias", version, about)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory to serve (overrides `root`).
    #[arg(short, long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Bind address (overrides `listener.bind_address`).
    #[arg(short, long, value_name = "ADDR")]
    bind: Option<String>,

    /// Log level (overrides `observability.log_level`).
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };
    if let Some(root) = cli.root {
        config.root = root;
    }
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }
    let config = finalize_config(config)?;

    logging::init(&config.observability.log_level)?;
    tracing::info!("static-alias v{} starting", env!("CARGO_PKG_VERSION"));

    let shutdown = Arc::new(Shutdown::new());
    signals::forward_to(shutdown.clone());

    startup::run(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
