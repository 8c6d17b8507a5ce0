//! mcprops server binary.
//!
//! ```text
//! mcprops --config /etc/mcprops.toml
//! RUST_LOG=mcprops=debug mcprops -c mcprops.toml --bind 0.0.0.0:9000
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mcprops::{Config, Server, app};

/// Serves server.properties editing for a game-server panel.
#[derive(Parser)]
#[command(name = "mcprops")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "mcprops.toml")]
    config: PathBuf,

    /// Listen address, overriding `server.bind`
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), mcprops::Error> {
    let cli = Cli::parse();

    let fallback = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = Config::load(&cli.config)?;
    if let Some(bind) = cli.bind {
        config = config.with_bind(bind);
    }
    info!(
        config = %cli.config.display(),
        nodes = config.nodes.len(),
        servers = config.servers.len(),
        "configuration loaded"
    );

    let router = app::daemon_router(&config);
    Server::bind(config.server.bind).await?.serve(router).await
}
