//! One handler per subcommand. Each handler loads the config, runs its
//! mode and renders either the mode output or an error payload.

mod capture;
mod element;
mod enhance;
mod flags;
mod inspect;
mod prompt;
mod scroll;
mod serve;

use std::path::Path;
use std::process::ExitCode;

use dinspect_lib::{Config, DinspectOutput, InspectError, Preferences};

use crate::cli::OutputArgs;
use crate::formatting::{render_error, write_output};
use crate::settings::load_config;

pub use capture::run_capture;
pub use element::run_element;
pub use enhance::{run_enhance, EnhanceArgs};
pub use flags::run_flags;
pub use inspect::run_inspect;
pub use prompt::run_prompt;
pub use scroll::run_scroll;
pub use serve::run_serve;

/// Loads the config, rendering a load failure with the command's output settings.
fn config_or_exit(config_path: Option<&Path>, output: &OutputArgs) -> Result<Config, ExitCode> {
    load_config(config_path).map_err(|err| render_error(err, output.format, output.output.clone()))
}

/// Writes `result` and maps it to the process exit code.
fn finish(
    result: Result<DinspectOutput, InspectError>,
    output: OutputArgs,
    prefs: Preferences,
    success: ExitCode,
) -> ExitCode {
    match result {
        Ok(body) => {
            if let Err(err) = write_output(&body, output.format, output.output.clone(), prefs) {
                return render_error(InspectError::Config(err.to_string()), output.format, output.output);
            }
            success
        }
        Err(err) => render_error(err, output.format, output.output),
    }
}
