//! AI Enhance: screenshot the selected element, send it with its styled
//! markup to the backend, and hand back the refined prompt.
//!
//! The round trip is linear with no retry. Progress is reported through
//! [`EnhanceStatus`], whose labels mirror the button states of the inspector
//! card.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageOutputFormat;
use std::io::Cursor;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

use super::serialize::element_prompt;
use crate::error::InspectError;
use crate::protocol::GeneratePromptRequest;
use crate::types::{BoundingBox, Document, DomNode};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnhanceStatus {
    Idle,
    Capturing,
    Analyzing,
    /// Prompt is on the clipboard
    Copied,
    /// Prompt returned but not copied
    Done,
    Error(String),
}

impl EnhanceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EnhanceStatus::Idle => "🤖 AI ENHANCE",
            EnhanceStatus::Capturing => "📸 CAPTURING...",
            EnhanceStatus::Analyzing => "🤖 ANALYZING...",
            EnhanceStatus::Copied => "✅ COPIED!",
            EnhanceStatus::Done => "✅ DONE",
            EnhanceStatus::Error(_) => "❌ ERROR",
        }
    }
}

/// Anything that can screenshot the visible viewport.
#[async_trait]
pub trait ScreenshotSource: Send + Sync {
    /// PNG of the visible viewport as a `data:` URL.
    async fn capture_screenshot(&self) -> Result<String>;
}

/// Anything that turns a screenshot plus context into a refined prompt.
#[async_trait]
pub trait PromptBackend: Send + Sync {
    async fn generate_prompt(&self, request: GeneratePromptRequest) -> Result<String>;
}

pub trait ClipboardSink {
    fn copy(&mut self, text: &str) -> Result<()>;
}

/// The system clipboard.
#[cfg(feature = "clipboard")]
pub struct SystemClipboard(arboard::Clipboard);

#[cfg(feature = "clipboard")]
impl SystemClipboard {
    pub fn new() -> Result<Self> {
        arboard::Clipboard::new()
            .map(Self)
            .map_err(|e| InspectError::Clipboard(e.to_string()))
    }
}

#[cfg(feature = "clipboard")]
impl ClipboardSink for SystemClipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        self.0
            .set_text(text.to_string())
            .map_err(|e| InspectError::Clipboard(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnhanceOutcome {
    pub prompt: String,
    /// The cropped element screenshot sent to the backend
    pub image: String,
    /// The serialized context sent alongside it
    pub context: String,
    pub copied: bool,
}

/// Crops a viewport screenshot to `rect`, scaled by the device pixel ratio.
///
/// Returns a PNG `data:` URL. The crop is clamped to the screenshot; an
/// element entirely outside it is an error.
pub fn crop_to_element(data_url: &str, rect: &BoundingBox, device_pixel_ratio: f32) -> Result<String> {
    let encoded = data_url
        .split_once("base64,")
        .map_or(data_url, |(_, data)| data);
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| InspectError::inspector(format!("Screenshot is not valid base64: {e}")))?;
    let screenshot = image::load_from_memory(&bytes)?;

    let dpr = if device_pixel_ratio > 0.0 { device_pixel_ratio } else { 1.0 };
    let (img_w, img_h) = (screenshot.width() as f32, screenshot.height() as f32);
    let left = (rect.x * dpr).clamp(0.0, img_w);
    let top = (rect.y * dpr).clamp(0.0, img_h);
    let right = ((rect.x + rect.width) * dpr).clamp(0.0, img_w);
    let bottom = ((rect.y + rect.height) * dpr).clamp(0.0, img_h);

    let (x, y) = (left as u32, top as u32);
    let (w, h) = ((right - left) as u32, (bottom - top) as u32);
    if w == 0 || h == 0 {
        return Err(InspectError::inspector(
            "Selected element is outside the captured viewport",
        ));
    }

    let cropped = screenshot.crop_imm(x, y, w, h);
    let mut png = Vec::new();
    cropped.write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

fn now_millis() -> Option<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_millis() as u64)
}

/// Runs the capture → crop → analyze → copy round trip for `node`.
pub async fn ai_enhance<S, B>(
    page: &S,
    backend: &B,
    clipboard: Option<&mut dyn ClipboardSink>,
    doc: &Document<'_>,
    node: &DomNode,
    mut on_status: impl FnMut(&EnhanceStatus),
) -> Result<EnhanceOutcome>
where
    S: ScreenshotSource + ?Sized,
    B: PromptBackend + ?Sized,
{
    let result = run(page, backend, clipboard, doc, node, &mut on_status).await;
    match &result {
        Ok(outcome) => {
            let status = if outcome.copied {
                EnhanceStatus::Copied
            } else {
                EnhanceStatus::Done
            };
            on_status(&status);
        }
        Err(err) => {
            warn!(error = %err, "AI enhance failed");
            on_status(&EnhanceStatus::Error(err.to_string()));
        }
    }
    result
}

async fn run<S, B>(
    page: &S,
    backend: &B,
    clipboard: Option<&mut dyn ClipboardSink>,
    doc: &Document<'_>,
    node: &DomNode,
    on_status: &mut impl FnMut(&EnhanceStatus),
) -> Result<EnhanceOutcome>
where
    S: ScreenshotSource + ?Sized,
    B: PromptBackend + ?Sized,
{
    on_status(&EnhanceStatus::Capturing);
    let screenshot = page
        .capture_screenshot()
        .await
        .map_err(|e| InspectError::browser(format!("Screenshot failed: {e}")))?;
    let image = crop_to_element(
        &screenshot,
        &node.bounding_box,
        doc.snapshot().device_pixel_ratio,
    )?;

    on_status(&EnhanceStatus::Analyzing);
    let context = element_prompt(doc, node);
    debug!(context_len = context.len(), image_len = image.len(), "sending element to backend");
    let prompt = backend
        .generate_prompt(GeneratePromptRequest {
            image: image.clone(),
            context: context.clone(),
            timestamp: now_millis(),
        })
        .await?;
    if prompt.is_empty() {
        return Err(InspectError::backend(None, "No prompt returned"));
    }

    let copied = match clipboard {
        Some(sink) => {
            sink.copy(&prompt)?;
            true
        }
        None => false,
    };

    Ok(EnhanceOutcome {
        prompt,
        image,
        context,
        copied,
    })
}
