//! Readiness probes via ADB (Android Debug Bridge)
//!
//! ADB must be installed; it is resolved from PATH once at construction and
//! probes degrade to "not ready" when it is missing or fails.

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;

use super::DeviceProber;

/// Client for the `adb` device bridge
pub struct AdbClient {
    adb: PathBuf,
}

impl Default for AdbClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AdbClient {
    /// Create a client, resolving `adb` from PATH
    pub fn new() -> Self {
        let adb = which::which("adb").unwrap_or_else(|_| PathBuf::from("adb"));
        Self { adb }
    }

    /// Create a client with an explicit adb binary
    pub fn with_binary(adb: impl Into<PathBuf>) -> Self {
        Self { adb: adb.into() }
    }

    /// Run an adb command and return stdout
    async fn run(&self, args: &[&str]) -> io::Result<String> {
        let output = Command::new(&self.adb).args(args).output().await?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(io::Error::other(format!(
                "adb exited with {}: {}",
                output.status,
                stderr.trim()
            )))
        }
    }
}

#[async_trait]
impl DeviceProber for AdbClient {
    async fn boot_completed(&self) -> bool {
        match self.run(&["shell", "getprop", "sys.boot_completed"]).await {
            Ok(output) => is_boot_completed(&output),
            Err(e) => {
                tracing::debug!(error = %e, "Boot probe failed");
                false
            }
        }
    }

    async fn package_installed(&self, package: &str) -> bool {
        match self.run(&["shell", "pm", "list", "packages", package]).await {
            Ok(output) => lists_package(&output, package),
            Err(e) => {
                tracing::warn!(package, error = %e, "Install probe failed");
                false
            }
        }
    }
}

/// The boot property query reports "1" once the device is fully booted;
/// anything else means not yet.
fn is_boot_completed(output: &str) -> bool {
    output.trim_end_matches(['\r', '\n']) == "1"
}

/// True when any package-list line mentions the package name
fn lists_package(output: &str, package: &str) -> bool {
    output.lines().any(|line| line.contains(package))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boot_output_must_be_exactly_one() {
        assert!(is_boot_completed("1"));
        assert!(is_boot_completed("1\n"));
        assert!(is_boot_completed("1\r\n"));

        assert!(!is_boot_completed(""));
        assert!(!is_boot_completed("0"));
        assert!(!is_boot_completed("0\n"));
        assert!(!is_boot_completed("1\n1\n"));
        assert!(!is_boot_completed("error: no devices found"));
        assert!(!is_boot_completed(" 1"));
    }

    #[test]
    fn package_listing_matches_on_any_line() {
        let output = "package:com.android.shell\npackage:com.example.demo\n";
        assert!(lists_package(output, "com.example.demo"));
        assert!(lists_package(output, "com.android.shell"));
        assert!(!lists_package(output, "com.example.other"));
        assert!(!lists_package("", "com.example.demo"));
    }

    #[tokio::test]
    async fn probes_degrade_to_false_without_adb() {
        let client = AdbClient::with_binary("/nonexistent/adb");
        assert!(!client.boot_completed().await);
        assert!(!client.package_installed("com.example.demo").await);
    }
}
