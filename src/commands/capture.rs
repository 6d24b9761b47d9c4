use std::path::{Path, PathBuf};
use std::process::ExitCode;

use dinspect_lib::output::CaptureOutput;
use dinspect_lib::types::ResourceKind;
use dinspect_lib::{
    parse_resource, save_snapshot, BrowserManager, Config, DinspectOutput, InspectError,
    OUTPUT_VERSION,
};

use crate::cli::{BrowserArgs, OutputArgs};
use crate::settings::{log_effective_config, resolve_browser_options};

use super::{config_or_exit, finish};

/// Run the capture command.
pub async fn run_capture(
    config_path: Option<&Path>,
    url: String,
    snapshot: PathBuf,
    browser: BrowserArgs,
    output: OutputArgs,
) -> ExitCode {
    let config = match config_or_exit(config_path, &output) {
        Ok(cfg) => cfg,
        Err(code) => return code,
    };
    let result = capture(config_path, &config, &url, snapshot, &browser).await;
    finish(result, output, config.preferences, ExitCode::SUCCESS)
}

async fn capture(
    config_path: Option<&Path>,
    config: &Config,
    url: &str,
    output_path: PathBuf,
    browser: &BrowserArgs,
) -> Result<DinspectOutput, InspectError> {
    let resource = parse_resource(url, Some(ResourceKind::Url))?;
    let options = resolve_browser_options(browser, config);
    log_effective_config(config_path, &options, config);

    let snapshot = BrowserManager::new(options).capture(&resource.value).await?;
    save_snapshot(&output_path, &snapshot)?;

    Ok(DinspectOutput::Capture(CaptureOutput {
        version: OUTPUT_VERSION.to_string(),
        url: snapshot.url.clone(),
        viewport: snapshot.viewport,
        output_path,
        nodes: snapshot.nodes.len(),
    }))
}
