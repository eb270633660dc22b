//! Driver session assembly and lifecycle

pub mod capabilities;
pub mod client;
pub mod manager;

pub use capabilities::{AndroidCapabilities, Capabilities, IosCapabilities};
pub use client::{AutomationClient, SessionHandle};
pub use manager::{DriverManager, SessionState};
