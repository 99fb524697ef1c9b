//! # formscout: survey metadata from the command line
//!
//! Thin entrypoint; all logic lives in the `formscout_cli` library crate.

use anyhow::Result;
use clap::Parser;
use formscout_cli::{run, Cli};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so `--json` output stays parseable.
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive("formscout=info".parse()?))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("[formscout error] {e:#}");
        std::process::exit(1);
    }

    Ok(())
}
