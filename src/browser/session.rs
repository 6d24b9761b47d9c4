//! A live page held open by the Playwright helper process.
//!
//! Requests go out as JSON lines on the helper's stdin and are matched to
//! replies by id. The session owns its semaphore permit, so a
//! [`super::BrowserManager`] slot stays taken until the session is closed
//! or dropped.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::{oneshot, Mutex, OwnedSemaphorePermit, RwLock};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::dom::{convert_raw_snapshot, RawPageSnapshot};
use super::manager::BrowserOptions;
use super::playwright::{map_method_error, map_spawn_error, CAPTURED_PROPERTIES, SESSION_SCRIPT};
use crate::bridge::{PageBridge, PAGE_CONTEXT_SCRIPT};
use crate::error::REFRESH_PAGE_MESSAGE;
use crate::inspector::ScreenshotSource;
use crate::protocol::BridgeMessage;
use crate::types::{GsapTrigger, PageSnapshot};
use crate::{InspectError, Result};

#[derive(Debug, Serialize)]
struct SessionRequest<'a> {
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: u64,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<SessionErrorBody>,
}

#[derive(Debug, Deserialize)]
struct SessionErrorBody {
    message: String,
}

type Pending = HashMap<u64, oneshot::Sender<std::result::Result<Value, String>>>;

pub struct BrowserSession {
    url: String,
    child: Mutex<Option<Child>>,
    stdin: Mutex<Option<ChildStdin>>,
    next_id: AtomicU64,
    pending: Arc<RwLock<Pending>>,
    call_timeout: Duration,
    _permit: Option<OwnedSemaphorePermit>,
}

impl BrowserSession {
    /// Spawns the helper, navigates to `url` and waits for network idle.
    pub(crate) async fn open(
        url: &str,
        options: &BrowserOptions,
        permit: Option<OwnedSemaphorePermit>,
    ) -> Result<Self> {
        let mut child = Command::new(&options.node_command)
            .arg("-e")
            .arg(SESSION_SCRIPT)
            .arg(if options.headless { "1" } else { "0" })
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| map_spawn_error(err, &options.node_command))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| InspectError::browser("Playwright helper has no stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| InspectError::browser("Playwright helper has no stdout"))?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_stderr(stderr));
        }

        let pending: Arc<RwLock<Pending>> = Arc::new(RwLock::new(HashMap::new()));
        let replies = pending.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<SessionResponse>(&line) {
                    Ok(response) => {
                        if let Some(tx) = replies.write().await.remove(&response.id) {
                            let reply = match response.error {
                                Some(err) => Err(err.message),
                                None => Ok(response.result.unwrap_or(Value::Null)),
                            };
                            let _ = tx.send(reply);
                        }
                    }
                    Err(err) => {
                        let head: String = line.chars().take(200).collect();
                        warn!(error = %err, line = %head, "unparseable helper reply");
                    }
                }
            }
            // Helper exited; fail whatever is still waiting.
            replies.write().await.clear();
        });

        let session = Self {
            url: url.to_string(),
            child: Mutex::new(Some(child)),
            stdin: Mutex::new(Some(stdin)),
            next_id: AtomicU64::new(1),
            pending,
            call_timeout: options.navigation_timeout + options.network_idle_timeout,
            _permit: permit,
        };

        info!(
            url,
            width = options.viewport.width,
            height = options.viewport.height,
            "opening page"
        );
        session
            .call(
                "open",
                json!({
                    "url": url,
                    "width": options.viewport.width,
                    "height": options.viewport.height,
                    "navTimeout": options.navigation_timeout.as_millis() as u64,
                    "idleTimeout": options.network_idle_timeout.as_millis() as u64,
                }),
            )
            .await?;
        Ok(session)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let line = serde_json::to_string(&SessionRequest { id, method, params })?;

        let (tx, rx) = oneshot::channel();
        self.pending.write().await.insert(id, tx);

        if let Err(err) = self.send_line(&line).await {
            self.pending.write().await.remove(&id);
            return Err(err);
        }
        debug!(id, method, "helper request sent");

        match timeout(self.call_timeout, rx).await {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(message))) => Err(map_method_error(method, message)),
            Ok(Err(_)) => Err(InspectError::browser(format!(
                "Playwright helper exited during {method}"
            ))),
            Err(_) => {
                self.pending.write().await.remove(&id);
                Err(InspectError::browser(format!(
                    "Playwright helper did not answer {method} within {:?}",
                    self.call_timeout
                )))
            }
        }
    }

    async fn send_line(&self, line: &str) -> Result<()> {
        let mut guard = self.stdin.lock().await;
        let stdin = guard
            .as_mut()
            .ok_or_else(|| InspectError::browser("Browser session is closed"))?;
        stdin.write_all(line.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await?;
        Ok(())
    }

    async fn call_as<T: serde::de::DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let value = self.call(method, params).await?;
        serde_json::from_value(value).map_err(InspectError::Serialization)
    }

    /// Captures the page. When the capture script is gone (the page navigated
    /// or reloaded) it is injected once more; a second failure asks for a refresh.
    pub async fn snapshot(&self) -> Result<PageSnapshot> {
        let params = json!({ "properties": CAPTURED_PROPERTIES });
        let raw: RawPageSnapshot = match self.call_as("snapshot", params.clone()).await {
            Ok(raw) => raw,
            Err(first) => {
                debug!(error = %first, "capture failed; re-injecting capture script");
                self.call("inject", json!({})).await?;
                self.call_as("snapshot", params).await.map_err(|err| {
                    warn!(error = %err, "capture failed after re-injection");
                    InspectError::browser(REFRESH_PAGE_MESSAGE)
                })?
            }
        };
        Ok(convert_raw_snapshot(raw, &self.url))
    }

    /// Loads the page-context script that answers scroll-animation requests.
    pub async fn inject_page_context(&self) -> Result<()> {
        self.call("evaluatePageContext", json!({ "script": PAGE_CONTEXT_SCRIPT }))
            .await
            .map(|_| ())
    }

    /// Scrolls `selector` into view and outlines it briefly. Returns whether it matched.
    pub async fn highlight(&self, selector: &str) -> Result<bool> {
        self.call_as("highlight", json!({ "selector": selector })).await
    }

    /// Scrolls `selector` to the middle of the viewport without decorating it.
    pub async fn scroll_into_view(&self, selector: &str) -> Result<bool> {
        self.call_as("reveal", json!({ "selector": selector })).await
    }

    pub async fn close(&self) -> Result<()> {
        if self.stdin.lock().await.is_none() {
            return Ok(());
        }
        let closed = self.call("close", json!({})).await;
        self.stdin.lock().await.take();
        if let Some(mut child) = self.child.lock().await.take() {
            let _ = timeout(Duration::from_secs(2), child.wait()).await;
            let _ = child.kill().await;
        }
        closed.map(|_| ())
    }
}

/// Helper stderr is diagnostic chatter; it only shows with `--verbose`.
async fn forward_stderr(stderr: impl AsyncRead + Unpin) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(target: "dinspect::playwright", "{line}");
    }
}

#[async_trait]
impl PageBridge for BrowserSession {
    async fn post(&self, message: &BridgeMessage) -> Result<()> {
        self.call("post", json!({ "message": message })).await.map(|_| ())
    }

    async fn take_detected(&self) -> Result<Option<Vec<GsapTrigger>>> {
        self.call_as("takeDetected", json!({})).await
    }
}

#[async_trait]
impl ScreenshotSource for BrowserSession {
    async fn capture_screenshot(&self) -> Result<String> {
        self.call_as("screenshot", json!({})).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_as_one_json_line() {
        let line = serde_json::to_string(&SessionRequest {
            id: 7,
            method: "highlight",
            params: json!({ "selector": "#hero" }),
        })
        .unwrap();
        assert_eq!(line, r##"{"id":7,"method":"highlight","params":{"selector":"#hero"}}"##);
    }

    #[test]
    fn responses_carry_result_or_error() {
        let ok: SessionResponse = serde_json::from_str(r#"{"id":1,"result":"pong"}"#).unwrap();
        assert_eq!(ok.result, Some(json!("pong")));
        assert!(ok.error.is_none());

        let err: SessionResponse =
            serde_json::from_str(r#"{"id":2,"error":{"message":"No page is open"}}"#).unwrap();
        assert_eq!(err.id, 2);
        assert_eq!(err.error.map(|e| e.message).as_deref(), Some("No page is open"));
    }

    #[tokio::test]
    async fn open_fails_cleanly_without_node() {
        let options = BrowserOptions {
            node_command: "definitely-not-a-binary".to_string(),
            ..BrowserOptions::default()
        };
        let result = BrowserSession::open("https://example.com", &options, None).await;
        match result {
            Err(InspectError::Browser(msg)) => assert!(msg.contains("not found on PATH")),
            Err(other) => panic!("expected browser error, got {other:?}"),
            Ok(_) => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn failed_send_drops_the_pending_request() {
        let session = BrowserSession {
            url: "https://example.com".to_string(),
            child: Mutex::new(None),
            stdin: Mutex::new(None),
            next_id: AtomicU64::new(1),
            pending: Arc::new(RwLock::new(HashMap::new())),
            call_timeout: Duration::from_secs(1),
            _permit: None,
        };

        let err = session.call("ping", json!({})).await.unwrap_err();
        assert!(err.to_string().contains("Browser session is closed"), "got: {err}");
        assert!(session.pending.read().await.is_empty());
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn helper_stderr_is_logged_at_debug() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        forward_stderr(&b"chromium: GPU process started\n"[..]).await;

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("GPU process started"), "got: {output}");
        assert!(output.contains("DEBUG"), "got: {output}");
        assert!(!output.contains("WARN"), "got: {output}");
    }
}
