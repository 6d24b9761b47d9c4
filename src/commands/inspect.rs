use std::path::Path;
use std::process::ExitCode;

use tracing::debug;

use dinspect_lib::output::InspectOutput;
use dinspect_lib::{
    default_extractors, run_extractors, Config, DinspectOutput, ExtractorKind, InspectError,
    Preferences, OUTPUT_VERSION,
};

use crate::cli::{BrowserArgs, DisplayArgs, OutputArgs, SourceArgs};
use crate::pipeline::{open_source, OpenOptions};
use crate::settings::resolve_preferences;

use super::{config_or_exit, finish};

/// Run the inspect command.
pub async fn run_inspect(
    config_path: Option<&Path>,
    source: SourceArgs,
    only: Option<Vec<ExtractorKind>>,
    palette_css: bool,
    display: DisplayArgs,
    browser: BrowserArgs,
    output: OutputArgs,
) -> ExitCode {
    let config = match config_or_exit(config_path, &output) {
        Ok(cfg) => cfg,
        Err(code) => return code,
    };
    let prefs = resolve_preferences(&display, &config);
    let result = inspect(&config, &source, only.as_deref(), palette_css, &browser, prefs).await;
    finish(result, output, prefs, ExitCode::SUCCESS)
}

async fn inspect(
    config: &Config,
    source: &SourceArgs,
    only: Option<&[ExtractorKind]>,
    palette_css: bool,
    browser: &BrowserArgs,
    prefs: Preferences,
) -> Result<DinspectOutput, InspectError> {
    let mut page = open_source(source, OpenOptions::new(config, browser, prefs)).await?;
    debug!(live = page.is_live(), source = %page.descriptor.value, "inspecting page");
    let inspected = page.inspect().await;
    let body = inspected.map(|(snapshot, data)| {
        let data = match only {
            Some(kinds) if !kinds.is_empty() => {
                let data = run_extractors(&snapshot, &default_extractors(), kinds);
                page.store_mut().set_data(data.clone());
                data
            }
            _ => data,
        };
        DinspectOutput::Inspect(InspectOutput {
            version: OUTPUT_VERSION.to_string(),
            source: page.descriptor.clone(),
            palette_css: palette_css.then(|| page.store().palette_css()),
            data,
        })
    });
    page.close().await;
    body
}
