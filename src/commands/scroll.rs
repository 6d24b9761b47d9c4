use std::path::Path;
use std::process::ExitCode;

use dinspect_lib::extract::detect_scroll_animations;
use dinspect_lib::output::{AnimationSnippet, ScrollOutput};
use dinspect_lib::prompts::animation_snippet;
use dinspect_lib::protocol::{AnimationAction, ExtensionMessage};
use dinspect_lib::store::InspectionPatch;
use dinspect_lib::types::ScrollAnimationRecord;
use dinspect_lib::{Config, DinspectOutput, InspectError, OUTPUT_VERSION};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::cli::{BrowserArgs, OutputArgs, SourceArgs};
use crate::pipeline::{open_source, OpenOptions, Page, PageSource};

use super::{config_or_exit, finish};

/// A playback command for one animation.
pub struct Control {
    pub id: String,
    pub action: AnimationAction,
    pub value: Option<f64>,
}

/// Run the scroll command.
#[allow(clippy::too_many_arguments)]
pub async fn run_scroll(
    config_path: Option<&Path>,
    source: SourceArgs,
    code: bool,
    control: Option<String>,
    action: Option<AnimationAction>,
    value: Option<f64>,
    browser: BrowserArgs,
    output: OutputArgs,
) -> ExitCode {
    let config = match config_or_exit(config_path, &output) {
        Ok(cfg) => cfg,
        Err(code) => return code,
    };
    let control = control.map(|id| Control {
        id,
        action: action.unwrap_or(AnimationAction::Play),
        value,
    });
    let result = scroll(&config, &source, code, control, &browser).await;
    finish(result, output, config.preferences, ExitCode::SUCCESS)
}

async fn scroll(
    config: &Config,
    source: &SourceArgs,
    code: bool,
    control: Option<Control>,
    browser: &BrowserArgs,
) -> Result<DinspectOutput, InspectError> {
    let (tx, mut rx) = mpsc::channel(4);
    let listener = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if let ExtensionMessage::ScrollAnimationsUpdated { scroll_animations } = message {
                info!(
                    count = scroll_animations.len(),
                    "scroll animations updated after a delayed detection"
                );
            }
        }
    });

    let options = OpenOptions::new(config, browser, config.preferences).with_updates(tx);
    let mut page = open_source(source, options).await?;
    let detected = detect_and_control(&mut page, control.as_ref()).await;
    let descriptor = page.descriptor.clone();
    page.close().await;
    if let Err(err) = listener.await {
        warn!(error = %err, "scroll update listener stopped");
    }
    let (scroll_animations, controlled) = detected?;

    let snippets = if code {
        scroll_animations
            .iter()
            .map(|record| AnimationSnippet {
                id: record.id.clone(),
                library: record.library,
                code: animation_snippet(record),
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(DinspectOutput::Scroll(ScrollOutput {
        version: OUTPUT_VERSION.to_string(),
        source: descriptor,
        scroll_animations,
        snippets,
        controlled,
    }))
}

async fn detect_and_control(
    page: &mut PageSource,
    control: Option<&Control>,
) -> Result<(Vec<ScrollAnimationRecord>, Option<String>), InspectError> {
    match &mut page.page {
        Page::Offline { snapshot, store } => {
            if control.is_some() {
                return Err(InspectError::Config(
                    "--control needs a live page; pass a URL instead of a snapshot".to_string(),
                ));
            }
            let records = detect_scroll_animations(&snapshot.document());
            store.set_data(InspectionPatch {
                scroll_animations: Some(records.clone()),
                ..InspectionPatch::default()
            });
            Ok((records, None))
        }
        Page::Live(service) => {
            let records = service.detect_scroll_animations().await?;
            let Some(control) = control else {
                return Ok((records, None));
            };
            if !records.iter().any(|r| r.id == control.id) {
                warn!(id = %control.id, "animation id not among the detected animations");
            }
            let reply = service
                .handle(ExtensionMessage::ControlAnimation {
                    animation_id: control.id.clone(),
                    animation_action: control.action,
                    value: control.value,
                })
                .await;
            reply.into_result().map_err(InspectError::browser)?;
            Ok((records, Some(format!("{} to {}", control.action, control.id))))
        }
    }
}
