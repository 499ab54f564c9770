//! rivalbat: battery indicator for rivalcfg-supported mice.
//!
//! Run with:  `RUST_LOG=info rivalbat`

use anyhow::Result;
use clap::{Parser, ValueEnum};
use rivalbat_daemon::{OutputFormat, Options};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rivalbat", version, about = "Mouse battery indicator for status bars")]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print a single reading and exit
    #[arg(long)]
    once: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Override `refresh-seconds` from the config file
    #[arg(long, value_name = "SECONDS")]
    interval: Option<u64>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Json,
    Plain,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json  => OutputFormat::Json,
            Format::Plain => OutputFormat::Plain,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Structured logging goes to stderr; stdout carries the indicator output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("rivalbat v{} starting", env!("CARGO_PKG_VERSION"));

    let opts = Options {
        config_path: cli.config.unwrap_or_else(rivalbat_config::default_path),
        once:        cli.once,
        format:      cli.format.into(),
        interval:    cli.interval,
    };

    rivalbat_daemon::run(opts).await.map_err(Into::into)
}
