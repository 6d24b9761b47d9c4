//! Request/response handling for extension actions against one open page.
//!
//! [`PageService`] owns the page, the backend client, the inspector and the
//! session store, and answers each [`ExtensionMessage`] with a JSON reply.
//! Failures become `{ "error": ... }` replies instead of aborting the session.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::bridge::{
    collect_scroll_animations, control_animation, detect_gsap_triggers, PageBridge, RetrySchedule,
};
use crate::error::{InspectError, Result};
use crate::extract::{default_extractors, inspect_page, run_extractors, ExtractorKind};
use crate::inspector::{
    ai_enhance, ClipboardSink, EnhanceOutcome, EnhanceStatus, Inspector, InspectorEvent,
    PromptBackend, ScreenshotSource,
};
use crate::protocol::{
    ErrorBody, ExtensionMessage, GeneratePromptResponse, Reply, ScreenshotReply, StatusReply,
};
use crate::store::{InspectionPatch, InspectionStore};
use crate::types::{InspectionData, PageSnapshot, ScrollAnimationRecord};

/// A live page: snapshots, screenshots, highlighting and the page-context bridge.
#[async_trait]
pub trait PageHandle: PageBridge + ScreenshotSource {
    async fn snapshot(&self) -> Result<PageSnapshot>;

    /// Scrolls to and outlines the first match of `selector`; `false` when nothing matched.
    async fn highlight(&self, selector: &str) -> Result<bool>;

    /// Scrolls the first match of `selector` into the viewport; `false` when nothing matched.
    async fn scroll_into_view(&self, selector: &str) -> Result<bool>;
}

#[async_trait]
impl PageHandle for crate::browser::BrowserSession {
    async fn snapshot(&self) -> Result<PageSnapshot> {
        crate::browser::BrowserSession::snapshot(self).await
    }

    async fn highlight(&self, selector: &str) -> Result<bool> {
        crate::browser::BrowserSession::highlight(self, selector).await
    }

    async fn scroll_into_view(&self, selector: &str) -> Result<bool> {
        crate::browser::BrowserSession::scroll_into_view(self, selector).await
    }
}

pub struct PageService<P, B> {
    page: P,
    backend: B,
    store: InspectionStore,
    inspector: Inspector,
    schedule: RetrySchedule,
    updates: Option<mpsc::Sender<ExtensionMessage>>,
}

impl<P, B> PageService<P, B>
where
    P: PageHandle,
    B: PromptBackend,
{
    pub fn new(page: P, backend: B, store: InspectionStore) -> Self {
        Self {
            page,
            backend,
            store,
            inspector: Inspector::new(),
            schedule: RetrySchedule::default(),
            updates: None,
        }
    }

    pub fn with_schedule(mut self, schedule: RetrySchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Delayed scroll detections are pushed here as `SCROLL_ANIMATIONS_UPDATED`.
    pub fn with_updates(mut self, updates: mpsc::Sender<ExtensionMessage>) -> Self {
        self.updates = Some(updates);
        self
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn store(&self) -> &InspectionStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut InspectionStore {
        &mut self.store
    }

    pub fn inspector(&self) -> &Inspector {
        &self.inspector
    }

    pub fn into_store(self) -> InspectionStore {
        self.store
    }

    /// Answers one message. Errors are folded into the reply.
    pub async fn handle(&mut self, message: ExtensionMessage) -> Reply<Value> {
        let action = message.action();
        match self.try_handle(message).await {
            Ok(value) => Reply::Ok(value),
            Err(err) => {
                warn!(action, error = %err, "request failed");
                Reply::Failed(ErrorBody::new(err.to_string()))
            }
        }
    }

    async fn try_handle(&mut self, message: ExtensionMessage) -> Result<Value> {
        debug!(action = message.action(), "handling request");
        match message {
            ExtensionMessage::CaptureScreenshot => {
                let data_url = self.page.capture_screenshot().await?;
                to_value(ScreenshotReply { data_url })
            }
            ExtensionMessage::AnalyzeImage { payload } => {
                let prompt = self.backend.generate_prompt(payload).await?;
                to_value(GeneratePromptResponse { prompt })
            }
            ExtensionMessage::ToggleInspector { payload } => {
                self.inspector.handle(if payload {
                    InspectorEvent::Enable
                } else {
                    InspectorEvent::Disable
                });
                self.store.set_inspecting(payload);
                to_value(StatusReply::ok())
            }
            ExtensionMessage::GetPageData => {
                let snapshot = self.page.snapshot().await?;
                let data = run_extractors(
                    &snapshot,
                    &default_extractors(),
                    &ExtractorKind::page_data(),
                );
                self.store.set_data(InspectionPatch {
                    fonts: Some(data.fonts.clone()),
                    colors: Some(data.colors.clone()),
                    spacing: Some(data.spacing.clone()),
                    technologies: Some(data.technologies.clone()),
                    assets: Some(data.assets.clone()),
                    meta: Some(data.meta.clone()),
                    ..InspectionPatch::default()
                });
                to_value(data)
            }
            ExtensionMessage::HighlightElement { selector } => {
                if !self.page.highlight(&selector).await? {
                    debug!(%selector, "no element to highlight");
                }
                to_value(StatusReply::ok())
            }
            ExtensionMessage::ControlAnimation {
                animation_id,
                animation_action,
                value,
            } => {
                if animation_action.needs_value() && value.is_none() {
                    return Err(InspectError::Config(format!(
                        "{animation_action} needs a progress value between 0 and 1"
                    )));
                }
                control_animation(&self.page, &animation_id, animation_action, value).await?;
                to_value(StatusReply::ok())
            }
            ExtensionMessage::ScrollAnimationsUpdated { scroll_animations } => {
                self.store.set_data(InspectionPatch {
                    scroll_animations: Some(scroll_animations),
                    ..InspectionPatch::default()
                });
                to_value(StatusReply::ok())
            }
        }
    }

    /// Full inspection of the page: every extractor, with ScrollTrigger facts
    /// gathered over the bridge first. Returns the snapshot it ran on.
    pub async fn inspect(&mut self) -> Result<(PageSnapshot, InspectionData)> {
        let mut snapshot = self.page.snapshot().await?;
        snapshot.gsap_triggers = detect_gsap_triggers(&self.page, &self.schedule).await.triggers;
        let data = inspect_page(&snapshot);
        self.store.set_data(data.clone());
        Ok((snapshot, data))
    }

    /// Runs scroll-animation detection over a fresh snapshot and stores the result.
    pub async fn detect_scroll_animations(&mut self) -> Result<Vec<ScrollAnimationRecord>> {
        let mut snapshot = self.page.snapshot().await?;
        let records = collect_scroll_animations(
            &self.page,
            &self.schedule,
            &mut snapshot,
            self.updates.as_ref(),
        )
        .await;
        self.store.set_data(InspectionPatch {
            scroll_animations: Some(records.clone()),
            ..InspectionPatch::default()
        });
        Ok(records)
    }

    /// AI Enhance for the first match of `selector`.
    ///
    /// Snapshot rects are relative to the viewport and the screenshot only
    /// covers the viewport, so the element is scrolled into view and the page
    /// captured again before cropping.
    pub async fn enhance_element(
        &self,
        selector: &str,
        clipboard: Option<&mut dyn ClipboardSink>,
        on_status: impl FnMut(&EnhanceStatus),
    ) -> Result<EnhanceOutcome> {
        if !self.page.scroll_into_view(selector).await? {
            return Err(no_match(selector));
        }
        let snapshot = self.page.snapshot().await?;
        let doc = snapshot.document();
        let node = doc.select(selector).ok_or_else(|| no_match(selector))?;
        debug!(%selector, rect = ?node.bounding_box, "element scrolled into view");
        ai_enhance(&self.page, &self.backend, clipboard, &doc, node, on_status).await
    }
}

fn no_match(selector: &str) -> InspectError {
    InspectError::inspector(format!("No element matches selector {selector}"))
}

fn to_value(body: impl Serialize) -> Result<Value> {
    Ok(serde_json::to_value(body)?)
}
