//! Session capability assembly
//!
//! Builds the platform-specific capability set sent to the automation server
//! from configuration values plus one readiness check (whether the app is
//! already installed). Everything Appium-specific goes out under the
//! `appium:` extension prefix of the W3C new-session payload.

use std::time::Duration;

use serde_json::{json, Map, Value};

use crate::common::{Config, Error, Result};
use crate::device::DeviceProber;

/// Automation engine used for Android sessions
pub const ANDROID_AUTOMATION: &str = "UiAutomator2";

/// Automation engine used for iOS sessions
pub const IOS_AUTOMATION: &str = "XCUITest";

/// Fixed AVD launch timeout sent with emulator sessions
const AVD_LAUNCH_TIMEOUT: Duration = Duration::from_secs(180);

/// Fixed AVD ready timeout sent with emulator sessions
const AVD_READY_TIMEOUT: Duration = Duration::from_secs(60);

/// Platform-tagged capability set for a driver session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capabilities {
    Android(AndroidCapabilities),
    Ios(IosCapabilities),
}

/// Capabilities for a UiAutomator2 session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidCapabilities {
    pub platform_name: String,
    pub device_name: String,
    pub app_package: String,
    pub app_wait_activity: String,
    /// APK to install, attached only when the package is not yet installed
    pub app: Option<String>,
    pub avd: Option<String>,
    pub avd_launch_timeout: Option<Duration>,
    pub avd_ready_timeout: Option<Duration>,
    pub udid: Option<String>,
}

/// Capabilities for an XCUITest session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IosCapabilities {
    pub platform_name: String,
    pub device_name: String,
    pub app: String,
    pub udid: Option<String>,
}

impl Capabilities {
    /// Build capabilities for the configured platform
    ///
    /// Branches case-insensitively on `platform.name`; anything outside
    /// android/ios is an unsupported-platform error.
    pub async fn build(config: &Config, prober: &dyn DeviceProber) -> Result<Self> {
        let platform = config.require("platform.name")?;
        match platform.to_lowercase().as_str() {
            "android" => Ok(Self::Android(
                AndroidCapabilities::from_config(config, prober).await?,
            )),
            "ios" => Ok(Self::Ios(IosCapabilities::from_config(config)?)),
            _ => Err(Error::UnsupportedPlatform(platform)),
        }
    }

    /// Render the W3C `alwaysMatch` capability object
    pub fn to_json(&self) -> Value {
        match self {
            Self::Android(caps) => caps.to_json(),
            Self::Ios(caps) => caps.to_json(),
        }
    }
}

impl AndroidCapabilities {
    async fn from_config(config: &Config, prober: &dyn DeviceProber) -> Result<Self> {
        let device_type = config.require("android.device.type")?;

        // The display name and the lifecycle branch use separate selectors:
        // android.device.name says which name to report, android.device.type
        // drives AVD/UDID attachment.
        let device_name = if config.require("android.device.name")?.eq_ignore_ascii_case("emulator")
        {
            config.require("android.emulator.name")?
        } else {
            config.require("android.real.name")?
        };

        let app_package = config.require("app.package")?;
        let app_wait_activity = config.require("app.activity")?;

        // Skip the reinstall when the app is already on the device
        let app = if prober.package_installed(&app_package).await {
            tracing::debug!(package = %app_package, "App already installed, omitting app path");
            None
        } else {
            Some(config.require("android.app.path")?)
        };

        let is_emulator = device_type.eq_ignore_ascii_case("emulator");
        let (avd, avd_launch_timeout, avd_ready_timeout) = if is_emulator {
            (
                Some(config.require("android.emulator.name")?),
                Some(AVD_LAUNCH_TIMEOUT),
                Some(AVD_READY_TIMEOUT),
            )
        } else {
            (None, None, None)
        };

        let udid = if device_type.eq_ignore_ascii_case("real") {
            Some(config.require("android.device.udid")?)
        } else {
            None
        };

        Ok(Self {
            platform_name: config.require("platform.name")?,
            device_name,
            app_package,
            app_wait_activity,
            app,
            avd,
            avd_launch_timeout,
            avd_ready_timeout,
            udid,
        })
    }

    fn to_json(&self) -> Value {
        let mut caps = Map::new();
        caps.insert("platformName".into(), json!(self.platform_name));
        caps.insert("appium:automationName".into(), json!(ANDROID_AUTOMATION));
        caps.insert("appium:deviceName".into(), json!(self.device_name));
        caps.insert("appium:appPackage".into(), json!(self.app_package));
        caps.insert("appium:appWaitActivity".into(), json!(self.app_wait_activity));
        // Keep app data between runs and leave background tasks running
        caps.insert("appium:noReset".into(), json!(true));
        caps.insert("appium:dontStopAppOnReset".into(), json!(true));
        caps.insert("appium:ignoreHiddenApiPolicyError".into(), json!(true));

        if let Some(app) = &self.app {
            caps.insert("appium:app".into(), json!(app));
        }
        if let Some(avd) = &self.avd {
            caps.insert("appium:avd".into(), json!(avd));
        }
        if let Some(timeout) = self.avd_launch_timeout {
            caps.insert(
                "appium:avdLaunchTimeout".into(),
                json!(timeout.as_millis() as u64),
            );
        }
        if let Some(timeout) = self.avd_ready_timeout {
            caps.insert(
                "appium:avdReadyTimeout".into(),
                json!(timeout.as_millis() as u64),
            );
        }
        if let Some(udid) = &self.udid {
            caps.insert("appium:udid".into(), json!(udid));
        }

        Value::Object(caps)
    }
}

impl IosCapabilities {
    fn from_config(config: &Config) -> Result<Self> {
        let device_name = config.require("ios.device.name")?;
        let device_name = if device_name.eq_ignore_ascii_case("simulator") {
            config.require("ios.simulator.name")?
        } else {
            device_name
        };

        let udid = if config.require("ios.device.type")?.eq_ignore_ascii_case("real") {
            Some(config.require("ios.device.udid")?)
        } else {
            None
        };

        Ok(Self {
            platform_name: config.require("platform.name")?,
            device_name,
            app: config.require("ios.app.path")?,
            udid,
        })
    }

    fn to_json(&self) -> Value {
        let mut caps = Map::new();
        caps.insert("platformName".into(), json!(self.platform_name));
        caps.insert("appium:automationName".into(), json!(IOS_AUTOMATION));
        caps.insert("appium:deviceName".into(), json!(self.device_name));
        caps.insert("appium:app".into(), json!(self.app));
        if let Some(udid) = &self.udid {
            caps.insert("appium:udid".into(), json!(udid));
        }
        Value::Object(caps)
    }
}
