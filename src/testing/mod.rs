//! Mock automation server
//!
//! Serves just enough of the W3C remote-session protocol for the lifecycle
//! tests: `POST /session` hands out fresh session ids, `DELETE /session/{id}`
//! acknowledges teardown, and every request is recorded so assertions run
//! against structured data instead of log scraping. Failure modes cover a
//! server that rejects session creation and one that fails teardown.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::common::Result;

/// One request the mock server saw
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Accept session creation and teardown
    Accept,
    /// Refuse to create sessions
    RejectCreate,
    /// Create sessions but fail to tear them down
    FailTeardown,
}

/// In-process stand-in for an Appium-compatible server
pub struct MockAutomationServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    accept_task: JoinHandle<()>,
}

impl MockAutomationServer {
    /// Start a server that accepts everything
    pub async fn start() -> Result<Self> {
        Self::start_with(Mode::Accept).await
    }

    /// Start a server that rejects session creation with a W3C error payload
    pub async fn start_rejecting() -> Result<Self> {
        Self::start_with(Mode::RejectCreate).await
    }

    /// Start a server that creates sessions but fails their teardown
    pub async fn start_failing_teardown() -> Result<Self> {
        Self::start_with(Mode::FailTeardown).await
    }

    async fn start_with(mode: Mode) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let counter = Arc::new(AtomicUsize::new(0));

        let accept_task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let recorded = Arc::clone(&recorded);
                let counter = Arc::clone(&counter);
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, mode, recorded, counter).await {
                        tracing::debug!(error = %e, "Mock server connection error");
                    }
                });
            }
        });

        Ok(Self {
            addr,
            requests,
            accept_task,
        })
    }

    /// Base URL clients should point at
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Everything the server has seen, in order
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    /// How many session-creation requests arrived
    pub async fn session_creations(&self) -> usize {
        self.requests
            .lock()
            .await
            .iter()
            .filter(|r| r.method == "POST" && r.path == "/session")
            .count()
    }
}

impl Drop for MockAutomationServer {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

async fn handle_connection(
    stream: TcpStream,
    mode: Mode,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
    counter: Arc<AtomicUsize>,
) -> std::io::Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).await? == 0 {
        return Ok(());
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let path = parts.next().unwrap_or("").to_string();

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
            content_length = value.trim().parse().unwrap_or(0);
        }
    }

    let mut body = vec![0u8; content_length];
    reader.read_exact(&mut body).await?;
    let body = String::from_utf8_lossy(&body).into_owned();

    recorded.lock().await.push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        body,
    });

    let (status, payload) = respond(mode, &method, &path, &counter);
    let response = format!(
        "HTTP/1.1 {status}\r\n\
         Content-Type: application/json; charset=utf-8\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {payload}",
        payload.len()
    );
    write_half.write_all(response.as_bytes()).await?;
    write_half.shutdown().await?;
    Ok(())
}

fn respond(mode: Mode, method: &str, path: &str, counter: &AtomicUsize) -> (&'static str, String) {
    match (method, path) {
        ("POST", "/session") => {
            if mode == Mode::RejectCreate {
                (
                    "500 Internal Server Error",
                    json!({
                        "value": {
                            "error": "session not created",
                            "message": "A new session could not be created",
                        }
                    })
                    .to_string(),
                )
            } else {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                (
                    "200 OK",
                    json!({
                        "value": {
                            "sessionId": format!("session-{n}"),
                            "capabilities": {},
                        }
                    })
                    .to_string(),
                )
            }
        }
        ("DELETE", p) if p.starts_with("/session/") => {
            if mode == Mode::FailTeardown {
                (
                    "500 Internal Server Error",
                    json!({
                        "value": {
                            "error": "unknown error",
                            "message": "session teardown failed",
                        }
                    })
                    .to_string(),
                )
            } else {
                ("200 OK", json!({ "value": null }).to_string())
            }
        }
        _ => (
            "404 Not Found",
            json!({
                "value": {
                    "error": "unknown command",
                    "message": format!("{method} {path}"),
                }
            })
            .to_string(),
        ),
    }
}
