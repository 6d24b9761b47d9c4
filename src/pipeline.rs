use std::path::Path;

use tokio::sync::mpsc;
use tracing::{info, warn};

use dinspect_lib::extract::inspect_page;
use dinspect_lib::protocol::ExtensionMessage;
use dinspect_lib::types::{InspectionData, PageSnapshot, ResourceKind};
use dinspect_lib::{
    load_snapshot, parse_resource, BackendClient, BrowserManager, BrowserSession, Config,
    InspectError, InspectionStore, PageService, Preferences, ResourceDescriptor,
};

use crate::cli::{BrowserArgs, SourceArgs};
use crate::settings::{log_effective_config, resolve_browser_options};

pub type LiveService = PageService<BrowserSession, BackendClient>;

/// Where page data comes from for one command run.
pub enum Page {
    /// A snapshot file written by `capture`
    Offline {
        snapshot: PageSnapshot,
        store: InspectionStore,
    },
    /// An open browser session
    Live(Box<LiveService>),
}

pub struct PageSource {
    pub descriptor: ResourceDescriptor,
    pub page: Page,
}

/// Options shared by every command that reads a page.
pub struct OpenOptions<'a> {
    pub config: &'a Config,
    pub browser: &'a BrowserArgs,
    pub preferences: Preferences,
    pub updates: Option<mpsc::Sender<ExtensionMessage>>,
}

impl<'a> OpenOptions<'a> {
    pub fn new(config: &'a Config, browser: &'a BrowserArgs, preferences: Preferences) -> Self {
        Self {
            config,
            browser,
            preferences,
            updates: None,
        }
    }

    pub fn with_updates(mut self, updates: mpsc::Sender<ExtensionMessage>) -> Self {
        self.updates = Some(updates);
        self
    }
}

/// Resolves SOURCE and loads the snapshot file or opens the URL.
pub async fn open_source(args: &SourceArgs, options: OpenOptions<'_>) -> Result<PageSource, InspectError> {
    let resource = parse_resource(&args.source, args.source_type.map(Into::into))?;
    let descriptor = ResourceDescriptor {
        kind: resource.kind,
        value: resource.value.clone(),
    };

    let page = match resource.kind {
        ResourceKind::Snapshot => {
            let snapshot = load_snapshot(Path::new(&resource.value))?;
            info!(
                path = %resource.value,
                nodes = snapshot.nodes.len(),
                "loaded page snapshot"
            );
            Page::Offline {
                snapshot,
                store: InspectionStore::new(options.preferences),
            }
        }
        ResourceKind::Url => {
            let backend = options.config.backend_client()?;
            Page::Live(Box::new(open_live(&resource.value, backend, options).await?))
        }
    };

    Ok(PageSource { descriptor, page })
}

/// Opens `url` in a browser session wired to `backend`.
pub async fn open_live(
    url: &str,
    backend: BackendClient,
    options: OpenOptions<'_>,
) -> Result<LiveService, InspectError> {
    let browser_options = resolve_browser_options(options.browser, options.config);
    log_effective_config(None, &browser_options, options.config);
    let session = BrowserManager::new(browser_options).open(url).await?;
    let service = PageService::new(session, backend, InspectionStore::new(options.preferences));
    Ok(match options.updates {
        Some(tx) => service.with_updates(tx),
        None => service,
    })
}

impl PageSource {
    pub fn is_live(&self) -> bool {
        matches!(self.page, Page::Live(_))
    }

    /// The current DOM snapshot, without running the scroll bridge.
    pub async fn snapshot(&self) -> Result<PageSnapshot, InspectError> {
        match &self.page {
            Page::Offline { snapshot, .. } => Ok(snapshot.clone()),
            Page::Live(service) => service.page().snapshot().await,
        }
    }

    /// Runs every extractor and records the result in the session store.
    pub async fn inspect(&mut self) -> Result<(PageSnapshot, InspectionData), InspectError> {
        match &mut self.page {
            Page::Offline { snapshot, store } => {
                let data = inspect_page(snapshot);
                store.set_data(data.clone());
                Ok((snapshot.clone(), data))
            }
            Page::Live(service) => service.inspect().await,
        }
    }

    pub fn store(&self) -> &InspectionStore {
        match &self.page {
            Page::Offline { store, .. } => store,
            Page::Live(service) => service.store(),
        }
    }

    pub fn store_mut(&mut self) -> &mut InspectionStore {
        match &mut self.page {
            Page::Offline { store, .. } => store,
            Page::Live(service) => service.store_mut(),
        }
    }

    pub fn live_mut(&mut self) -> Option<&mut LiveService> {
        match &mut self.page {
            Page::Live(service) => Some(service.as_mut()),
            Page::Offline { .. } => None,
        }
    }

    /// Closes the browser session, if any. Close failures are only logged.
    pub async fn close(self) {
        if let Page::Live(service) = self.page {
            if let Err(err) = service.page().close().await {
                warn!(error = %err, "failed to close browser session");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::SourceType;
    use dinspect_lib::save_snapshot;
    use tempfile::Builder;

    fn args(source: &str, source_type: Option<SourceType>) -> SourceArgs {
        SourceArgs {
            source: source.to_string(),
            source_type,
        }
    }

    #[tokio::test]
    async fn test_open_snapshot_source() {
        let file = Builder::new().suffix(".json").tempfile().unwrap();
        let mut snapshot = PageSnapshot::new("https://example.com");
        snapshot.title = "Example".into();
        save_snapshot(file.path(), &snapshot).unwrap();

        let config = Config::default();
        let browser = BrowserArgs::default();
        let source = open_source(
            &args(&file.path().to_string_lossy(), None),
            OpenOptions::new(&config, &browser, Preferences::default()),
        )
        .await
        .unwrap();

        assert!(!source.is_live());
        assert!(matches!(source.descriptor.kind, ResourceKind::Snapshot));
        let loaded = source.snapshot().await.unwrap();
        assert_eq!(loaded.title, "Example");
    }

    #[tokio::test]
    async fn test_inspect_offline_fills_store() {
        let file = Builder::new().suffix(".json").tempfile().unwrap();
        let mut snapshot = PageSnapshot::new("https://example.com");
        snapshot.title = "Stored".into();
        save_snapshot(file.path(), &snapshot).unwrap();

        let config = Config::default();
        let browser = BrowserArgs::default();
        let mut source = open_source(
            &args(&file.path().to_string_lossy(), Some(SourceType::Snapshot)),
            OpenOptions::new(&config, &browser, Preferences::default()),
        )
        .await
        .unwrap();

        let (_, data) = source.inspect().await.unwrap();
        assert_eq!(data.meta.title, "Stored");
        assert_eq!(source.store().data().meta.title, "Stored");
        assert!(source.live_mut().is_none());
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_config_error() {
        let config = Config::default();
        let browser = BrowserArgs::default();
        let result = open_source(
            &args("/nonexistent/page.json", None),
            OpenOptions::new(&config, &browser, Preferences::default()),
        )
        .await;
        assert!(matches!(result, Err(InspectError::Config(_))));
    }
}
