//! CLI command handling
//!
//! Dispatches CLI commands against a loaded configuration and formats
//! output.

use colored::Colorize;

use crate::commands::Commands;
use crate::common::{Config, Result};
use crate::device::{AdbClient, DeviceProber};
use crate::session::DriverManager;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Config { key } => {
            match key {
                Some(key) => {
                    println!("{}", config.require(&key)?);
                }
                None => {
                    let mut keys: Vec<&str> = config.keys().collect();
                    keys.sort_unstable();
                    for key in keys {
                        if let Some(value) = config.get(key) {
                            println!("{key} = {value}");
                        }
                    }
                }
            }
            Ok(())
        }

        Commands::Probe { package } => {
            let adb = AdbClient::new();

            let booted = adb.boot_completed().await;
            print_check("device booted", booted);

            let package = package.or_else(|| config.get("app.package"));
            if let Some(package) = package {
                let installed = adb.package_installed(&package).await;
                print_check(&format!("{package} installed"), installed);
            } else {
                println!("no package to check (set app.package or pass --package)");
            }

            Ok(())
        }

        Commands::Smoke => {
            let mut manager = DriverManager::new(config.clone());
            manager.initialize().await?;
            let session = manager.get()?;
            println!("Session {} is {}", session.id, "active".green());

            manager.quit().await?;
            println!("Session closed");
            Ok(())
        }
    }
}

fn print_check(label: &str, ok: bool) {
    if ok {
        println!("{} {label}", "ok".green());
    } else {
        println!("{} {label}", "no".red());
    }
}
