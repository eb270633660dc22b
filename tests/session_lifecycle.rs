//! End-to-end session lifecycle tests
//!
//! These tests run the driver manager against an in-process mock automation
//! server and assert on the requests the server actually saw: how many
//! sessions were created, what capabilities went over the wire, and what
//! happens when the server misbehaves.

use async_trait::async_trait;
use serde_json::Value;

use appdriver::testing::MockAutomationServer;
use appdriver::{Config, DeviceProber, DriverManager, EmulatorLauncher, Error, SessionState};

/// Prober with canned answers, so no adb is needed
struct StubProber {
    booted: bool,
    installed: bool,
}

#[async_trait]
impl DeviceProber for StubProber {
    async fn boot_completed(&self) -> bool {
        self.booted
    }

    async fn package_installed(&self, _package: &str) -> bool {
        self.installed
    }
}

fn android_config(server_url: &str, device_type: &str) -> Config {
    Config::parse(&format!(
        r#"
        "appium.server.url" = "{server_url}"
        "platform.name" = "Android"
        "android.device.type" = "{device_type}"
        "android.device.name" = "emulator"
        "android.emulator.name" = "Pixel_7_API_34"
        "android.real.name" = "Pixel 7"
        "android.device.udid" = "R5CT1098XYZ"
        "android.app.path" = "builds/app-debug.apk"
        "app.package" = "com.example.demo"
        "app.activity" = "com.example.demo.MainActivity"
        "#
    ))
    .unwrap()
}

fn ios_config(server_url: &str) -> Config {
    Config::parse(&format!(
        r#"
        "appium.server.url" = "{server_url}"
        "platform.name" = "iOS"
        "ios.device.type" = "simulator"
        "ios.device.name" = "simulator"
        "ios.simulator.name" = "iPhone 15"
        "ios.app.path" = "builds/Demo.app"
        "#
    ))
    .unwrap()
}

fn manager(config: Config, booted: bool, installed: bool) -> DriverManager {
    DriverManager::with_devices(
        config,
        Box::new(StubProber { booted, installed }),
        EmulatorLauncher::with_binary("/nonexistent/emulator"),
    )
}

/// Capabilities object out of the recorded new-session body
fn always_match(body: &str) -> Value {
    let body: Value = serde_json::from_str(body).unwrap();
    body.pointer("/capabilities/alwaysMatch").unwrap().clone()
}

#[tokio::test]
async fn full_lifecycle_creates_and_deletes_one_session() {
    let server = MockAutomationServer::start().await.unwrap();
    let mut manager = manager(android_config(&server.url(), "real"), true, true);

    manager.initialize().await.unwrap();
    assert_eq!(manager.state(), SessionState::Active);
    assert_eq!(manager.get().unwrap().id, "session-1");

    manager.quit().await.unwrap();
    assert_eq!(manager.state(), SessionState::Idle);
    assert!(matches!(manager.get(), Err(Error::SessionNotInitialized)));

    let requests = server.requests().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/session");
    assert_eq!(requests[1].method, "DELETE");
    assert_eq!(requests[1].path, "/session/session-1");
}

#[tokio::test]
async fn initialize_is_idempotent_while_active() {
    let server = MockAutomationServer::start().await.unwrap();
    let mut manager = manager(android_config(&server.url(), "real"), true, true);

    manager.initialize().await.unwrap();
    let first = manager.get().unwrap().clone();

    manager.initialize().await.unwrap();
    assert_eq!(manager.get().unwrap(), &first);

    assert_eq!(server.session_creations().await, 1);
}

#[tokio::test]
async fn quit_after_quit_stays_idle_and_quiet() {
    let server = MockAutomationServer::start().await.unwrap();
    let mut manager = manager(android_config(&server.url(), "real"), true, true);

    manager.initialize().await.unwrap();
    manager.quit().await.unwrap();
    manager.quit().await.unwrap();

    // One create, one delete; the second quit never reached the server
    assert_eq!(server.requests().await.len(), 2);
}

#[tokio::test]
async fn quit_clears_the_handle_even_when_teardown_fails() {
    let server = MockAutomationServer::start_failing_teardown().await.unwrap();
    let mut manager = manager(android_config(&server.url(), "real"), true, true);

    manager.initialize().await.unwrap();
    assert_eq!(manager.state(), SessionState::Active);

    manager.quit().await.unwrap();
    assert_eq!(manager.state(), SessionState::Idle);
}

#[tokio::test]
async fn a_new_session_can_follow_a_quit() {
    let server = MockAutomationServer::start().await.unwrap();
    let mut manager = manager(android_config(&server.url(), "real"), true, true);

    manager.initialize().await.unwrap();
    manager.quit().await.unwrap();
    manager.initialize().await.unwrap();

    assert_eq!(manager.get().unwrap().id, "session-2");
    assert_eq!(server.session_creations().await, 2);
}

#[tokio::test]
async fn server_rejection_surfaces_and_leaves_idle() {
    let server = MockAutomationServer::start_rejecting().await.unwrap();
    let mut manager = manager(android_config(&server.url(), "real"), true, true);

    let err = manager.initialize().await.unwrap_err();
    assert!(
        matches!(err, Error::SessionStart { status: 500, ref message }
            if message == "A new session could not be created")
    );
    assert_eq!(manager.state(), SessionState::Idle);
}

#[tokio::test]
async fn unsupported_platform_never_contacts_the_server() {
    let server = MockAutomationServer::start().await.unwrap();
    let config = Config::parse(&format!(
        r#"
        "appium.server.url" = "{}"
        "platform.name" = "blackberry"
        "#,
        server.url()
    ))
    .unwrap();
    let mut manager = manager(config, true, true);

    let err = manager.initialize().await.unwrap_err();
    assert!(matches!(err, Error::UnsupportedPlatform(_)));
    assert!(server.requests().await.is_empty());
}

#[tokio::test]
async fn real_device_capabilities_go_over_the_wire() {
    let server = MockAutomationServer::start().await.unwrap();
    let mut manager = manager(android_config(&server.url(), "real"), true, true);
    manager.initialize().await.unwrap();

    let requests = server.requests().await;
    let caps = always_match(&requests[0].body);

    assert_eq!(caps["platformName"], "Android");
    assert_eq!(caps["appium:automationName"], "UiAutomator2");
    assert_eq!(caps["appium:udid"], "R5CT1098XYZ");
    assert_eq!(caps["appium:appPackage"], "com.example.demo");
    assert_eq!(caps["appium:noReset"], true);
    assert!(caps.get("appium:avd").is_none());
    // App already installed, so no reinstall path was sent
    assert!(caps.get("appium:app").is_none());
}

#[tokio::test]
async fn emulator_flow_boots_and_sends_avd_capabilities() {
    let server = MockAutomationServer::start().await.unwrap();
    let mut manager = manager(android_config(&server.url(), "emulator"), true, false);
    manager.initialize().await.unwrap();

    let requests = server.requests().await;
    let caps = always_match(&requests[0].body);

    assert_eq!(caps["appium:avd"], "Pixel_7_API_34");
    assert_eq!(caps["appium:avdLaunchTimeout"], 180_000);
    assert_eq!(caps["appium:avdReadyTimeout"], 60_000);
    assert!(caps.get("appium:udid").is_none());
    // Not installed, so the APK path rode along
    assert_eq!(caps["appium:app"], "builds/app-debug.apk");
}

#[tokio::test]
async fn ios_simulator_session_uses_xcuitest() {
    let server = MockAutomationServer::start().await.unwrap();
    let mut manager = manager(ios_config(&server.url()), true, true);
    manager.initialize().await.unwrap();

    let requests = server.requests().await;
    let caps = always_match(&requests[0].body);

    assert_eq!(caps["platformName"], "iOS");
    assert_eq!(caps["appium:automationName"], "XCUITest");
    assert_eq!(caps["appium:deviceName"], "iPhone 15");
    assert_eq!(caps["appium:app"], "builds/Demo.app");
    assert!(caps.get("appium:udid").is_none());
}
