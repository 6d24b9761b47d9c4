use std::path::{Path, PathBuf};
use std::process::ExitCode;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use dinspect_lib::inspector::ClipboardSink;
#[cfg(feature = "clipboard")]
use dinspect_lib::inspector::SystemClipboard;
use dinspect_lib::output::EnhanceOutput;
use dinspect_lib::types::ResourceKind;
use dinspect_lib::{
    parse_resource, Config, DinspectOutput, InspectError, ResourceDescriptor, OUTPUT_VERSION,
};
use tracing::{info, warn};

use crate::cli::{BrowserArgs, OutputArgs};
use crate::pipeline::{open_live, OpenOptions};

use super::{config_or_exit, finish};

pub struct EnhanceArgs {
    pub url: String,
    pub selector: String,
    pub backend_url: Option<String>,
    pub no_copy: bool,
    pub save_image: Option<PathBuf>,
}

/// Run the enhance command.
pub async fn run_enhance(
    config_path: Option<&Path>,
    args: EnhanceArgs,
    browser: BrowserArgs,
    output: OutputArgs,
) -> ExitCode {
    let mut config = match config_or_exit(config_path, &output) {
        Ok(cfg) => cfg,
        Err(code) => return code,
    };
    if let Some(url) = &args.backend_url {
        config.backend.url = url.clone();
    }
    let result = enhance(&config, &args, &browser).await;
    finish(result, output, config.preferences, ExitCode::SUCCESS)
}

async fn enhance(
    config: &Config,
    args: &EnhanceArgs,
    browser: &BrowserArgs,
) -> Result<DinspectOutput, InspectError> {
    let resource = parse_resource(&args.url, Some(ResourceKind::Url))?;
    let backend = config.backend_client()?;
    let service = open_live(
        &resource.value,
        backend,
        OpenOptions::new(config, browser, config.preferences),
    )
    .await?;

    let mut clipboard = open_clipboard(args.no_copy);
    let outcome = service
        .enhance_element(
            &args.selector,
            clipboard
                .as_mut()
                .map(|c| c.as_mut() as &mut dyn ClipboardSink),
            |status| info!(status = status.label(), "enhance"),
        )
        .await;
    if let Err(err) = service.page().close().await {
        warn!(error = %err, "failed to close browser session");
    }
    let outcome = outcome?;

    let image_path = match &args.save_image {
        Some(path) => {
            write_data_url(path, &outcome.image)?;
            Some(path.clone())
        }
        None => None,
    };

    Ok(DinspectOutput::Enhance(EnhanceOutput {
        version: OUTPUT_VERSION.to_string(),
        source: ResourceDescriptor {
            kind: resource.kind,
            value: resource.value,
        },
        selector: args.selector.clone(),
        prompt: outcome.prompt,
        copied: outcome.copied,
        image_path,
    }))
}

#[cfg(feature = "clipboard")]
fn open_clipboard(no_copy: bool) -> Option<Box<dyn ClipboardSink>> {
    if no_copy {
        return None;
    }
    match SystemClipboard::new() {
        Ok(clipboard) => Some(Box::new(clipboard)),
        Err(err) => {
            warn!(error = %err, "clipboard unavailable; printing the prompt only");
            None
        }
    }
}

#[cfg(not(feature = "clipboard"))]
fn open_clipboard(_no_copy: bool) -> Option<Box<dyn ClipboardSink>> {
    None
}

/// Decodes a `data:image/png;base64,...` URL into `path`.
fn write_data_url(path: &Path, data_url: &str) -> Result<(), InspectError> {
    let encoded = data_url
        .split_once("base64,")
        .map_or(data_url, |(_, data)| data);
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|e| InspectError::inspector(format!("Invalid screenshot data: {e}")))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    Ok(())
}
