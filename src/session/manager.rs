//! Driver session lifecycle
//!
//! Owns the single active session handle for a test run. The manager is an
//! explicit value the run threads through its setup and teardown; nothing
//! here is process-global, so two runs with two managers never share state.

use std::time::{Duration, Instant};

use crate::common::{Config, Error, Result};
use crate::device::{AdbClient, DeviceProber, EmulatorLauncher};

use super::{AutomationClient, Capabilities, SessionHandle};

/// Interval between boot probes while waiting for an emulator
const BOOT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Config key bounding the emulator boot wait
const BOOT_TIMEOUT_KEY: &str = "android.boot.timeout.secs";

const DEFAULT_BOOT_TIMEOUT_SECS: u64 = 180;

/// Driver session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session handle present
    Idle,
    /// A session is open against the automation server
    Active,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Active => write!(f, "active"),
        }
    }
}

struct ActiveSession {
    client: AutomationClient,
    handle: SessionHandle,
}

/// Manager for the one driver session of a test run
pub struct DriverManager {
    config: Config,
    prober: Box<dyn DeviceProber>,
    launcher: EmulatorLauncher,
    session: Option<ActiveSession>,
}

impl DriverManager {
    /// Create a manager using the real device bridge and emulator binary
    pub fn new(config: Config) -> Self {
        Self::with_devices(config, Box::new(AdbClient::new()), EmulatorLauncher::new())
    }

    /// Create a manager with explicit device tooling
    pub fn with_devices(
        config: Config,
        prober: Box<dyn DeviceProber>,
        launcher: EmulatorLauncher,
    ) -> Self {
        Self {
            config,
            prober,
            launcher,
            session: None,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.session.is_some() {
            SessionState::Active
        } else {
            SessionState::Idle
        }
    }

    /// Open the driver session, booting the emulator first when configured
    ///
    /// Idempotent: a second call while the session is active is a no-op. Any
    /// failure leaves the manager idle.
    pub async fn initialize(&mut self) -> Result<()> {
        if let Some(active) = &self.session {
            tracing::debug!(session = %active.handle.id, "Driver session already active");
            return Ok(());
        }

        let server_url = self.config.require("appium.server.url")?;
        let client = AutomationClient::new(&server_url)?;

        let platform = self.config.require("platform.name")?;
        if platform.eq_ignore_ascii_case("android") && self.android_emulator_configured() {
            let avd = self.config.require("android.emulator.name")?;
            self.launcher.start(&avd)?;
            self.wait_for_boot().await?;
        }

        let capabilities = Capabilities::build(&self.config, self.prober.as_ref()).await?;

        tracing::info!(platform = %platform, server = %server_url, "Opening driver session");
        let handle = client.new_session(&capabilities).await?;
        tracing::info!(session = %handle.id, "Driver session active");

        self.session = Some(ActiveSession { client, handle });
        Ok(())
    }

    /// Get the active session handle
    pub fn get(&self) -> Result<&SessionHandle> {
        self.session
            .as_ref()
            .map(|active| &active.handle)
            .ok_or(Error::SessionNotInitialized)
    }

    /// Close the session and return to idle
    ///
    /// The handle is cleared even when the server-side close fails; a failed
    /// close is logged and not propagated.
    pub async fn quit(&mut self) -> Result<()> {
        let Some(active) = self.session.take() else {
            tracing::debug!("No driver session active, nothing to quit");
            return Ok(());
        };

        if let Err(e) = active.client.delete_session(&active.handle).await {
            tracing::warn!(
                session = %active.handle.id,
                error = %e,
                "Failed to close driver session cleanly"
            );
        }
        Ok(())
    }

    fn android_emulator_configured(&self) -> bool {
        self.config
            .get("android.device.type")
            .is_some_and(|t| t.eq_ignore_ascii_case("emulator"))
    }

    /// Poll the boot probe until the emulator reports booted or the deadline
    /// passes
    async fn wait_for_boot(&self) -> Result<()> {
        let timeout_secs = match self.config.get(BOOT_TIMEOUT_KEY) {
            Some(value) => value.parse::<u64>().map_err(|_| {
                Error::ConfigParse(format!("invalid value for '{BOOT_TIMEOUT_KEY}': {value}"))
            })?,
            None => DEFAULT_BOOT_TIMEOUT_SECS,
        };
        let deadline = Instant::now() + Duration::from_secs(timeout_secs);

        loop {
            if self.prober.boot_completed().await {
                tracing::info!("Emulator is fully booted");
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(Error::BootTimeout(timeout_secs));
            }
            tracing::info!("Waiting for emulator to boot...");
            tokio::time::sleep(BOOT_POLL_INTERVAL).await;
        }
    }
}
