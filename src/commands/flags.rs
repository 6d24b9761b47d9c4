use std::path::Path;
use std::process::ExitCode;

use dinspect_lib::extract::red_flags::{detect_red_flags, worst_severity};
use dinspect_lib::output::FlagsOutput;
use dinspect_lib::store::InspectionPatch;
use dinspect_lib::types::Severity;
use dinspect_lib::{Config, DinspectOutput, InspectError, Preferences, OUTPUT_VERSION};
use tracing::info;

use crate::cli::{BrowserArgs, OutputArgs, SourceArgs};
use crate::formatting::exit_code_for_flags;
use crate::pipeline::{open_source, OpenOptions};

use super::{config_or_exit, finish};

/// Run the flags command.
pub async fn run_flags(
    config_path: Option<&Path>,
    source: SourceArgs,
    fail_on: Option<Severity>,
    browser: BrowserArgs,
    output: OutputArgs,
) -> ExitCode {
    let config = match config_or_exit(config_path, &output) {
        Ok(cfg) => cfg,
        Err(code) => return code,
    };
    let prefs = config.preferences;
    let result = flags(&config, &source, fail_on, &browser, prefs).await;
    let code = match &result {
        Ok(DinspectOutput::Flags(body)) => exit_code_for_flags(body.passed),
        _ => ExitCode::SUCCESS,
    };
    finish(result, output, prefs, code)
}

async fn flags(
    config: &Config,
    source: &SourceArgs,
    fail_on: Option<Severity>,
    browser: &BrowserArgs,
    prefs: Preferences,
) -> Result<DinspectOutput, InspectError> {
    let mut page = open_source(source, OpenOptions::new(config, browser, prefs)).await?;
    let snapshot = page.snapshot().await;
    let descriptor = page.descriptor.clone();
    let red_flags = snapshot.map(|snapshot| {
        let red_flags = detect_red_flags(&snapshot.document());
        page.store_mut().set_data(InspectionPatch {
            red_flags: Some(red_flags.clone()),
            ..InspectionPatch::default()
        });
        red_flags
    });
    page.close().await;
    let red_flags = red_flags?;

    let worst = worst_severity(&red_flags);
    let passed = flags_pass(worst, fail_on);
    info!(count = red_flags.len(), ?worst, passed, "red flag check finished");

    Ok(DinspectOutput::Flags(FlagsOutput {
        version: OUTPUT_VERSION.to_string(),
        source: descriptor,
        red_flags,
        worst,
        fail_on,
        passed,
    }))
}

/// A check fails only when some flag is at least as severe as `fail_on`.
fn flags_pass(worst: Option<Severity>, fail_on: Option<Severity>) -> bool {
    match (worst, fail_on) {
        (Some(worst), Some(threshold)) => worst < threshold,
        _ => true,
    }
}
