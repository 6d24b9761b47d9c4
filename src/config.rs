//! Configuration file support.
//!
//! ```toml
//! [viewport]
//! width = 1440
//! height = 900
//!
//! [timeouts]
//! navigation = "30s"
//! network_idle = "10s"
//! request = "60s"
//!
//! [backend]
//! url = "http://localhost:3000"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//! model = "gemini-2.5-flash"
//!
//! [preferences]
//! color_format = "hsl"
//! unit_format = "rem"
//! ```
//!
//! `GEMINI_API_KEY`, `PORT` and `DINSPECT_BACKEND_URL` override the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::backend_client::{BackendClient, DEFAULT_BACKEND_URL, DEFAULT_REQUEST_TIMEOUT};
use crate::browser::{BrowserOptions, DEFAULT_NAVIGATION_TIMEOUT, DEFAULT_NETWORK_IDLE_TIMEOUT};
use crate::error::{InspectError, Result};
use crate::server::DEFAULT_MODEL;
use crate::store::Preferences;
use crate::Viewport;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub viewport: Viewport,
    pub timeouts: Timeouts,
    pub backend: BackendConfig,
    pub server: ServerConfig,
    pub preferences: Preferences,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    #[serde(with = "humantime_serde")]
    pub navigation: Duration,
    #[serde(with = "humantime_serde")]
    pub network_idle: Duration,
    /// Per request to the prompt backend
    #[serde(with = "humantime_serde")]
    pub request: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            navigation: DEFAULT_NAVIGATION_TIMEOUT,
            network_idle: DEFAULT_NETWORK_IDLE_TIMEOUT,
            request: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BACKEND_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
        }
    }
}

impl Config {
    /// `~/.config/dinspect/config.toml`
    pub fn central_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("dinspect").join("config.toml"))
    }

    /// Loads `path`, else the central config when it exists, else defaults.
    /// Environment overrides are applied on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let source = match path {
            Some(path) => Some(path.to_path_buf()),
            None => Self::central_config_path().filter(|p| p.is_file()),
        };
        let mut config = match source {
            Some(source) => {
                let content = std::fs::read_to_string(&source).map_err(|e| {
                    InspectError::Config(format!("Failed to read config {}: {e}", source.display()))
                })?;
                Self::from_toml_str(&content).map_err(|e| {
                    InspectError::Config(format!("Invalid config ({}): {e}", source.display()))
                })?
            }
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| InspectError::Config(e.to_string()))
    }

    /// Applies `GEMINI_API_KEY`, `PORT` and `DINSPECT_BACKEND_URL` from `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(key) = lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.server.api_key = Some(key);
        }
        if let Some(port) = lookup("PORT").filter(|p| !p.trim().is_empty()) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| InspectError::Config(format!("PORT must be a port number, got '{port}'")))?;
        }
        if let Some(url) = lookup("DINSPECT_BACKEND_URL").filter(|u| !u.trim().is_empty()) {
            self.backend.url = url;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(InspectError::Config(
                "viewport width and height must be positive".to_string(),
            ));
        }
        for (name, value) in [
            ("navigation", self.timeouts.navigation),
            ("network_idle", self.timeouts.network_idle),
            ("request", self.timeouts.request),
        ] {
            if value.is_zero() {
                return Err(InspectError::Config(format!(
                    "timeouts.{name} must be greater than zero"
                )));
            }
        }
        Url::parse(&self.backend.url).map_err(|e| {
            InspectError::Config(format!("backend.url '{}' is not a valid URL: {e}", self.backend.url))
        })?;
        if self.server.model.trim().is_empty() {
            return Err(InspectError::Config("server.model must not be empty".to_string()));
        }
        Ok(())
    }

    /// The Gemini key, required by `serve`.
    pub fn api_key(&self) -> Result<&str> {
        self.server
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                InspectError::Config(
                    "GEMINI_API_KEY is not set; the backend cannot reach Gemini".to_string(),
                )
            })
    }

    pub fn browser_options(&self) -> BrowserOptions {
        BrowserOptions {
            viewport: self.viewport,
            navigation_timeout: self.timeouts.navigation,
            network_idle_timeout: self.timeouts.network_idle,
            ..BrowserOptions::default()
        }
    }

    pub fn backend_client(&self) -> Result<BackendClient> {
        BackendClient::with_base_url_and_timeout(&self.backend.url, self.timeouts.request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ColorFormat, UnitFormat};
    use std::collections::HashMap;

    #[test]
    fn default_values_match_expected() {
        let cfg = Config::default();

        assert_eq!(cfg.viewport.width, 1440);
        assert_eq!(cfg.viewport.height, 900);
        assert_eq!(cfg.timeouts.navigation, Duration::from_secs(30));
        assert_eq!(cfg.timeouts.network_idle, Duration::from_secs(10));
        assert_eq!(cfg.backend.url, "http://localhost:3000");
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.server.model, "gemini-2.5-flash");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn parses_partial_toml_over_defaults() {
        let cfg = Config::from_toml_str(
            r#"
            [viewport]
            width = 1280
            height = 720

            [timeouts]
            navigation = "45s"

            [preferences]
            color_format = "hsl"
            unit_format = "rem"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.viewport.width, 1280);
        assert_eq!(cfg.timeouts.navigation, Duration::from_secs(45));
        assert_eq!(cfg.timeouts.network_idle, Duration::from_secs(10));
        assert_eq!(cfg.preferences.color_format, ColorFormat::Hsl);
        assert_eq!(cfg.preferences.unit_format, UnitFormat::Rem);
        assert_eq!(cfg.server.port, 3000);
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            ("GEMINI_API_KEY", "secret"),
            ("PORT", "8080"),
            ("DINSPECT_BACKEND_URL", "http://127.0.0.1:8080"),
        ]
        .into_iter()
        .collect();
        let mut cfg = Config::default();
        cfg.apply_env(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(cfg.api_key().unwrap(), "secret");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.backend.url, "http://127.0.0.1:8080");
    }

    #[test]
    fn invalid_port_is_a_config_error() {
        let mut cfg = Config::default();
        let err = cfg
            .apply_env(|name| (name == "PORT").then(|| "eighty".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn missing_api_key_mentions_the_variable() {
        let err = Config::default().api_key().unwrap_err();
        let payload = err.to_payload();
        assert!(payload.message.contains("GEMINI_API_KEY"));
    }

    #[test]
    fn zero_timeouts_are_rejected() {
        let cfg = Config::from_toml_str("[timeouts]\nrequest = \"0s\"\n").unwrap();
        assert!(cfg.validate().unwrap_err().to_string().contains("timeouts.request"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/dinspect.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }
}
