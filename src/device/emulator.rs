//! Emulator launching
//!
//! The emulator is started as a fully detached background process and never
//! waited on; readiness is observed separately through the boot probe.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::common::{Error, Result};

/// Launcher for named Android virtual devices
pub struct EmulatorLauncher {
    emulator: PathBuf,
}

impl Default for EmulatorLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl EmulatorLauncher {
    /// Create a launcher, resolving `emulator` from PATH
    pub fn new() -> Self {
        let emulator = which::which("emulator").unwrap_or_else(|_| PathBuf::from("emulator"));
        Self { emulator }
    }

    /// Create a launcher with an explicit emulator binary
    pub fn with_binary(emulator: impl Into<PathBuf>) -> Self {
        Self { emulator: emulator.into() }
    }

    /// Start a named AVD in the background, without waiting on it
    ///
    /// Spawn failures are logged and swallowed; an empty name is the one
    /// fatal input, since nothing could ever boot.
    pub fn start(&self, avd_name: &str) -> Result<()> {
        if avd_name.is_empty() {
            return Err(Error::EmulatorNameMissing);
        }

        tracing::info!(avd = avd_name, "Starting emulator");

        let mut cmd = Command::new(&self.emulator);
        cmd.arg("-avd")
            .arg(avd_name)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Detach from our process group so the emulator outlives the harness
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            const DETACHED_PROCESS: u32 = 0x00000008;
            const CREATE_NEW_PROCESS_GROUP: u32 = 0x00000200;
            cmd.creation_flags(DETACHED_PROCESS | CREATE_NEW_PROCESS_GROUP);
        }

        match cmd.spawn() {
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(avd = avd_name, error = %e, "Failed to start emulator");
            }
        }

        Ok(())
    }
}
