//! Live pages through a Playwright helper running under Node.js.
//!
//! - [`manager`] - session limits and one-shot captures
//! - [`session`] - a page held open for follow-up requests
//! - [`playwright`] - the helper script, availability checks and error mapping
//! - [`dom`] - conversion of raw capture output into a [`crate::PageSnapshot`]
//!
//! # Example
//!
//! ```no_run
//! use dinspect_lib::{BrowserManager, BrowserOptions};
//!
//! # async fn example() -> dinspect_lib::Result<()> {
//! let manager = BrowserManager::new(BrowserOptions::default());
//! let snapshot = manager.capture("https://example.com").await?;
//! println!("{} elements", snapshot.nodes.len());
//! # Ok(())
//! # }
//! ```

mod dom;
mod manager;
mod playwright;
mod session;

pub use manager::{
    BrowserManager, BrowserOptions, DEFAULT_NAVIGATION_TIMEOUT, DEFAULT_NETWORK_IDLE_TIMEOUT,
};
pub use session::BrowserSession;
