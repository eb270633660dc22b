//! Device readiness probes and emulator control
//!
//! Everything here shells out to the Android device bridge (`adb`) or the
//! emulator binary; failures degrade to negative results rather than
//! propagating, so the caller decides how long to keep asking.

pub mod adb;
pub mod emulator;

use async_trait::async_trait;

pub use adb::AdbClient;
pub use emulator::EmulatorLauncher;

/// Readiness checks against a connected device or emulator
#[async_trait]
pub trait DeviceProber: Send + Sync {
    /// Whether the device has completed booting
    async fn boot_completed(&self) -> bool;

    /// Whether a package is already installed on the device
    async fn package_installed(&self, package: &str) -> bool;
}
