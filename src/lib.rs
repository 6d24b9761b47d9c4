//! Design Inspector Library
//!
//! Inspects the rendered design of a web page: fonts, colors with semantic
//! roles, spacing tokens, detected technologies, assets, scroll animations
//! and red flags. Pages are rendered through a headless Playwright helper
//! (or loaded from a saved snapshot), and a small backend refines element
//! prompts with Gemini.
//!
//! # Module Overview
//!
//! - [`browser`] - Headless browser sessions for live pages
//! - [`extract`] - The extraction pipeline over a [`PageSnapshot`]
//! - [`bridge`] - Page-context messaging for scroll-animation libraries
//! - [`inspector`] - Visual inspector state, detail card and AI enhance
//! - [`dispatch`] - Answers extension actions for an open page
//! - [`prompts`] - Design-system prompts and animation snippets
//! - [`store`] - Inspection result and display preferences
//! - [`server`] - The prompt backend (`GET /`, `POST /api/generate-prompt`)
//! - [`config`] - Configuration file support
//! - [`types`] - Core data types and structures
//! - [`output`] - JSON output schemas
//!
//! # Example
//!
//! ```no_run
//! use dinspect_lib::{inspect_page, BrowserManager, BrowserOptions};
//!
//! # async fn example() -> dinspect_lib::Result<()> {
//! let manager = BrowserManager::new(BrowserOptions::default());
//! let snapshot = manager.capture("https://example.com").await?;
//!
//! let data = inspect_page(&snapshot);
//! for color in &data.colors {
//!     println!("{} {:?}", color.hex, color.role);
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend_client;
pub mod bridge;
pub mod browser;
pub mod config;
pub mod css;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod inspector;
pub mod output;
pub mod prompts;
pub mod protocol;
pub mod resource;
pub mod server;
pub mod store;
pub mod types;
pub mod viewport;

pub use backend_client::{BackendClient, DEFAULT_BACKEND_URL};
pub use bridge::{PageBridge, RetrySchedule};
pub use browser::{
    BrowserManager, BrowserOptions, BrowserSession, DEFAULT_NAVIGATION_TIMEOUT,
    DEFAULT_NETWORK_IDLE_TIMEOUT,
};
pub use config::Config;
pub use dispatch::{PageHandle, PageService};
pub use error::{InspectError, Result};
pub use extract::{default_extractors, inspect_page, run_extractors, Extractor, ExtractorKind};
pub use inspector::{ai_enhance, EnhanceStatus, Inspector, InspectorEvent, PointerTarget};
pub use output::{DinspectOutput, ErrorOutput, ResourceDescriptor, OUTPUT_VERSION};
pub use resource::{load_snapshot, parse_resource, save_snapshot, ParsedResource};
pub use store::{ColorFormat, InspectionStore, Preferences, UnitFormat};
pub use types::{InspectionData, PageSnapshot, ResourceKind};
pub use viewport::Viewport;
