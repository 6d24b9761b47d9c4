use std::path::Path;
use std::time::Duration;

use dinspect_lib::store::PreferencesPatch;
use dinspect_lib::{BrowserOptions, Config, InspectError, Preferences};
use tracing::debug;

use crate::cli::{BrowserArgs, DisplayArgs};

/// Load config from a TOML file, central config, or return defaults.
/// Priority: explicit path > ~/.config/dinspect/config.toml > defaults
pub fn load_config(path: Option<&Path>) -> Result<Config, InspectError> {
    Config::load(path)
}

/// Browser options from the config, with CLI flags taking precedence.
pub fn resolve_browser_options(args: &BrowserArgs, config: &Config) -> BrowserOptions {
    let mut options = config.browser_options();
    if let Some(viewport) = args.viewport {
        options.viewport = viewport;
    }
    if let Some(secs) = args.nav_timeout {
        options.navigation_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = args.network_idle_timeout {
        options.network_idle_timeout = Duration::from_secs(secs);
    }
    options.headless = !args.headed;
    options
}

/// Display preferences from the config, with CLI flags taking precedence.
pub fn resolve_preferences(args: &DisplayArgs, config: &Config) -> Preferences {
    let mut store = dinspect_lib::InspectionStore::new(config.preferences);
    store.set_preferences(PreferencesPatch {
        color_format: args.color_format,
        unit_format: args.unit_format,
    });
    store.preferences()
}

/// Log effective config (visible with --verbose).
pub fn log_effective_config(config_path: Option<&Path>, options: &BrowserOptions, config: &Config) {
    debug!("{}", format_effective_config(options, config, config_path));
}

/// Format effective config as a single-line string.
pub fn format_effective_config(
    options: &BrowserOptions,
    config: &Config,
    config_source: Option<&Path>,
) -> String {
    let source = config_source
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    format!(
        "Effective config [{source}]: viewport={}x{}, timeouts: nav={}s, network-idle={}s, request={}s, headless={}, backend={}, preferences: color={}, unit={}",
        options.viewport.width,
        options.viewport.height,
        options.navigation_timeout.as_secs(),
        options.network_idle_timeout.as_secs(),
        config.timeouts.request.as_secs(),
        options.headless,
        config.backend.url,
        config.preferences.color_format,
        config.preferences.unit_format,
    )
}
