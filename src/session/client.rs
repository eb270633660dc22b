//! Automation server client
//!
//! Speaks the two W3C remote-session calls the harness needs: create a
//! session from a capability set, and delete it again. The server's wire
//! format is an external contract; this side only sends capabilities and
//! reads back `value.sessionId`.

use serde_json::{json, Value};

use crate::common::{Error, Result};

use super::Capabilities;

/// Handle to an active session on the automation server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    pub id: String,
}

/// HTTP client for an Appium-compatible automation server
#[derive(Debug)]
pub struct AutomationClient {
    http: reqwest::Client,
    base: reqwest::Url,
}

impl AutomationClient {
    /// Create a client for a server base URL
    ///
    /// The URL is validated here so a bad `appium.server.url` fails before
    /// any device work starts.
    pub fn new(server_url: &str) -> Result<Self> {
        let mut base = reqwest::Url::parse(server_url)
            .map_err(|e| Error::invalid_server_url(server_url, e))?;
        if base.cannot_be_a_base() {
            return Err(Error::invalid_server_url(server_url, "not an HTTP base URL"));
        }
        // A trailing slash keeps join() from eating the last path segment
        // when the server lives under a prefix like /wd/hub
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    pub fn base_url(&self) -> &reqwest::Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<reqwest::Url> {
        self.base
            .join(path)
            .map_err(|e| Error::invalid_server_url(self.base.as_str(), e))
    }

    /// Open a new session with the given capabilities
    pub async fn new_session(&self, capabilities: &Capabilities) -> Result<SessionHandle> {
        let payload = json!({
            "capabilities": {
                "alwaysMatch": capabilities.to_json(),
                "firstMatch": [{}],
            }
        });

        let response = self
            .http
            .post(self.endpoint("session")?)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(Error::session_start(
                status.as_u16(),
                rejection_message(&text),
            ));
        }

        let body: Value = serde_json::from_str(&text)?;
        let id = body
            .pointer("/value/sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::session_start(status.as_u16(), "response missing value.sessionId")
            })?;

        Ok(SessionHandle { id: id.to_string() })
    }

    /// Close a session on the server
    pub async fn delete_session(&self, session: &SessionHandle) -> Result<()> {
        let response = self
            .http
            .delete(self.endpoint(&format!("session/{}", session.id))?)
            .send()
            .await?;
        response.error_for_status()?;
        Ok(())
    }
}

/// Pull the human-readable message out of a W3C error payload, falling back
/// to the raw body
fn rejection_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/value/message")
                .or_else(|| v.pointer("/value/error"))
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_endpoint_joins_under_base_path() {
        let client = AutomationClient::new("http://127.0.0.1:4723").unwrap();
        assert_eq!(
            client.endpoint("session").unwrap().as_str(),
            "http://127.0.0.1:4723/session"
        );

        let client = AutomationClient::new("http://127.0.0.1:4723/wd/hub").unwrap();
        assert_eq!(
            client.endpoint("session").unwrap().as_str(),
            "http://127.0.0.1:4723/wd/hub/session"
        );
    }

    #[test]
    fn invalid_url_is_reported_with_the_value() {
        let err = AutomationClient::new("not a url").unwrap_err();
        assert!(matches!(err, Error::InvalidServerUrl { ref url, .. } if url == "not a url"));
    }

    #[test]
    fn rejection_message_prefers_w3c_fields() {
        let body = r#"{"value":{"error":"session not created","message":"no device"}}"#;
        assert_eq!(rejection_message(body), "no device");

        let body = r#"{"value":{"error":"session not created"}}"#;
        assert_eq!(rejection_message(body), "session not created");

        assert_eq!(rejection_message("plain failure"), "plain failure");
    }
}
