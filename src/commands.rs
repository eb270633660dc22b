//! CLI command definitions
//!
//! Defines the clap commands for the appdriver CLI.

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Print resolved configuration values
    Config {
        /// Key to print; all keys when omitted
        key: Option<String>,
    },

    /// Probe device readiness over the device bridge
    Probe {
        /// Package to check for (default: app.package from config)
        #[arg(long)]
        package: Option<String>,
    },

    /// Open a driver session against the configured server and tear it down
    Smoke,
}
