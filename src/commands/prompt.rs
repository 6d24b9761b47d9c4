use std::path::Path;
use std::process::ExitCode;

use dinspect_lib::output::{PromptKind, PromptOutput};
use dinspect_lib::prompts::{clone_prompt, visual_prompt};
use dinspect_lib::{Config, DinspectOutput, InspectError, Preferences, OUTPUT_VERSION};

use crate::cli::{BrowserArgs, DisplayArgs, OutputArgs, PromptKindArg, SourceArgs};
use crate::pipeline::{open_source, OpenOptions};
use crate::settings::resolve_preferences;

use super::{config_or_exit, finish};

/// Run the prompt command.
pub async fn run_prompt(
    config_path: Option<&Path>,
    source: SourceArgs,
    kind: PromptKindArg,
    display: DisplayArgs,
    browser: BrowserArgs,
    output: OutputArgs,
) -> ExitCode {
    let config = match config_or_exit(config_path, &output) {
        Ok(cfg) => cfg,
        Err(code) => return code,
    };
    let prefs = resolve_preferences(&display, &config);
    let result = prompt(&config, &source, kind.into(), &browser, prefs).await;
    finish(result, output, prefs, ExitCode::SUCCESS)
}

async fn prompt(
    config: &Config,
    source: &SourceArgs,
    kind: PromptKind,
    browser: &BrowserArgs,
    prefs: Preferences,
) -> Result<DinspectOutput, InspectError> {
    let mut page = open_source(source, OpenOptions::new(config, browser, prefs)).await?;
    let inspected = page.inspect().await;
    let text = inspected.map(|(_, data)| match kind {
        PromptKind::Clone => clone_prompt(&data),
        PromptKind::Visual => visual_prompt(&data),
        PromptKind::Palette => page.store().palette_css(),
    });
    let descriptor = page.descriptor.clone();
    page.close().await;

    Ok(DinspectOutput::Prompt(PromptOutput {
        version: OUTPUT_VERSION.to_string(),
        source: descriptor,
        kind,
        text: text?,
    }))
}
