use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// PivotHire chat relay
#[derive(Debug, Parser)]
#[command(name = "pivothire", about = "Streams the PivotHire requirements assistant to browsers over SSE")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "pivothire.toml", env = "PIVOTHIRE_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "PIVOTHIRE_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Log filter directive, e.g. `info,pivothire_chat=debug`
    #[arg(long, default_value = "info", env = "PIVOTHIRE_LOG")]
    pub log_filter: String,
}
