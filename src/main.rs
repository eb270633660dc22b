//! appdriver CLI - mobile device-session bootstrapper
//!
//! Operates the harness by hand: inspect resolved configuration, probe
//! device readiness, and smoke-test the full session lifecycle against the
//! configured automation server.

use std::path::PathBuf;

use appdriver::commands::Commands;
use appdriver::{cli, common};
use clap::Parser;

#[derive(Parser)]
#[command(name = "appdriver", about = "Mobile device-session bootstrapper")]
#[command(version, long_about = None)]
struct Cli {
    /// Config file path (default: ./appdriver.toml, then the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    common::logging::init();

    let cli = Cli::parse();

    let result = run(cli).await;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> appdriver::Result<()> {
    let config = common::CONFIG.load_from(cli.config.as_deref())?;
    cli::dispatch(cli.command, config).await
}
