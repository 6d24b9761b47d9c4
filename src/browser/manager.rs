//! Browser manager for coordinating headless browser sessions.
//!
//! This module provides the `BrowserManager` struct for managing
//! concurrent browser sessions with semaphore-based limiting.

use crate::types::PageSnapshot;
use crate::{InspectError, Result, Viewport};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::info;

use super::playwright::{ensure_node_available, ensure_playwright_available};
use super::session::BrowserSession;

/// Default timeout for page navigation.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Default timeout for waiting for network idle state.
pub const DEFAULT_NETWORK_IDLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration options for browser sessions.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// The Node.js command to use (default: "node").
    pub node_command: String,
    /// Viewport dimensions for the browser.
    pub viewport: Viewport,
    /// Whether to run in headless mode.
    pub headless: bool,
    /// Timeout for page navigation.
    pub navigation_timeout: Duration,
    /// Timeout for waiting for network idle state.
    pub network_idle_timeout: Duration,
    /// Maximum number of concurrent browser sessions.
    pub max_concurrent_sessions: usize,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            node_command: "node".to_string(),
            viewport: Viewport::default(),
            headless: true,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            network_idle_timeout: DEFAULT_NETWORK_IDLE_TIMEOUT,
            max_concurrent_sessions: 1,
        }
    }
}

/// Manages concurrent browser sessions with semaphore-based limiting.
#[derive(Debug, Clone)]
pub struct BrowserManager {
    options: BrowserOptions,
    semaphore: Arc<Semaphore>,
}

impl BrowserManager {
    /// Creates a new BrowserManager with the given options.
    pub fn new(options: BrowserOptions) -> Self {
        let permits = options.max_concurrent_sessions.max(1);
        Self {
            options,
            semaphore: Arc::new(Semaphore::new(permits)),
        }
    }

    pub fn options(&self) -> &BrowserOptions {
        &self.options
    }

    /// Opens `url` in a new session. The session holds a slot until it is dropped.
    pub async fn open(&self, url: &str) -> Result<BrowserSession> {
        ensure_node_available(&self.options.node_command).await?;
        ensure_playwright_available(&self.options.node_command).await?;

        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| InspectError::Config("Browser manager unavailable".to_string()))?;

        info!(
            url,
            nav_secs = self.options.navigation_timeout.as_secs(),
            idle_secs = self.options.network_idle_timeout.as_secs(),
            "launching headless browser"
        );
        BrowserSession::open(url, &self.options, Some(permit)).await
    }

    /// One-shot capture: open, snapshot, close.
    pub async fn capture(&self, url: &str) -> Result<PageSnapshot> {
        let start = Instant::now();
        let session = self.open(url).await?;
        let snapshot = session.snapshot().await;
        let closed = session.close().await;
        let snapshot = snapshot?;
        closed?;
        info!(
            url,
            nodes = snapshot.nodes.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "capture finished"
        );
        Ok(snapshot)
    }
}
