//! appdriver - mobile device-session bootstrapper
//!
//! This library reads key/value configuration, assembles platform-specific
//! capabilities, optionally boots an Android emulator, and manages the one
//! driver session a test run holds against an Appium-compatible automation
//! server.

pub mod cli;
pub mod commands;
pub mod common;
pub mod device;
pub mod session;
pub mod testing;

// Re-export commonly used types for tests
pub use common::{Config, ConfigStore, Error, Result, CONFIG};
pub use device::{AdbClient, DeviceProber, EmulatorLauncher};
pub use session::{Capabilities, DriverManager, SessionHandle, SessionState};
