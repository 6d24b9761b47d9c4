use std::fs;
use std::path::Path;
use thiserror::Error;
use url::Url;

use crate::error::InspectError;
use crate::types::{PageSnapshot, ResourceKind};

#[derive(Debug, Clone)]
pub struct ParsedResource {
    pub kind: ResourceKind,
    pub value: String,
}

#[derive(Debug, Error)]
pub enum ResourceParseError {
    #[error("Invalid URL '{value}': {message}. Hint: include http(s):// and ensure the URL is well-formed.")]
    InvalidUrl { value: String, message: String },
    #[error("Snapshot file not found: {path}. Hint: check the path relative to the current working directory or use an absolute path.")]
    FileNotFound { path: String },
    #[error("Unsupported file extension '{extension}'. Snapshots are JSON files written by `dinspect capture`.")]
    UnsupportedExtension { extension: String },
}

impl From<ResourceParseError> for InspectError {
    fn from(err: ResourceParseError) -> Self {
        InspectError::Config(err.to_string())
    }
}

pub fn parse_resource(
    value: &str,
    override_type: Option<ResourceKind>,
) -> Result<ParsedResource, ResourceParseError> {
    match override_type {
        Some(ResourceKind::Url) => parse_url_resource(value),
        Some(ResourceKind::Snapshot) => parse_local_resource(value, false),
        None if value.starts_with("http://") || value.starts_with("https://") => {
            parse_url_resource(value)
        }
        None => parse_local_resource(value, true),
    }
}

fn parse_url_resource(value: &str) -> Result<ParsedResource, ResourceParseError> {
    let url = Url::parse(value).map_err(|e| ResourceParseError::InvalidUrl {
        value: value.to_string(),
        message: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https" | "file") {
        return Err(ResourceParseError::InvalidUrl {
            value: value.to_string(),
            message: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(ParsedResource {
        kind: ResourceKind::Url,
        value: url.to_string(),
    })
}

fn parse_local_resource(value: &str, check_extension: bool) -> Result<ParsedResource, ResourceParseError> {
    let path = Path::new(value);

    if check_extension {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        if extension != "json" {
            return Err(ResourceParseError::UnsupportedExtension {
                extension: if extension.is_empty() {
                    "no extension".to_string()
                } else {
                    extension
                },
            });
        }
    }

    let is_file = fs::metadata(path).map(|m| m.is_file()).unwrap_or(false);
    if !is_file {
        return Err(ResourceParseError::FileNotFound {
            path: path.to_string_lossy().into_owned(),
        });
    }

    Ok(ParsedResource {
        kind: ResourceKind::Snapshot,
        value: value.to_string(),
    })
}

/// Reads a snapshot written by [`save_snapshot`].
pub fn load_snapshot(path: &Path) -> crate::Result<PageSnapshot> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_snapshot(path: &Path, snapshot: &PageSnapshot) -> crate::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(snapshot)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::Builder;

    fn temp_file_with_extension(ext: &str) -> tempfile::NamedTempFile {
        Builder::new()
            .suffix(&format!(".{}", ext))
            .tempfile()
            .expect("create temp file")
    }

    #[test]
    fn test_parse_http_url() {
        let res = parse_resource("http://localhost:3000/dashboard", None).unwrap();
        assert_eq!(res.kind, ResourceKind::Url);
        assert_eq!(res.value, "http://localhost:3000/dashboard");
    }

    #[test]
    fn test_parse_malformed_url() {
        let res = parse_resource("https://", None);
        assert!(matches!(res, Err(ResourceParseError::InvalidUrl { .. })));
    }

    #[test]
    fn test_parse_local_snapshot() {
        let file = temp_file_with_extension("json");
        let res = parse_resource(file.path().to_str().unwrap(), None).unwrap();
        assert_eq!(res.kind, ResourceKind::Snapshot);
    }

    #[test]
    fn test_parse_unsupported_extension() {
        let file = temp_file_with_extension("png");
        let res = parse_resource(file.path().to_str().unwrap(), None);
        assert!(matches!(
            res,
            Err(ResourceParseError::UnsupportedExtension { extension })
                if extension == "png"
        ));
    }

    #[test]
    fn test_missing_snapshot_errors() {
        let err = parse_resource("/tmp/does-not-exist-dinspect.json", None).unwrap_err();
        assert!(matches!(err, ResourceParseError::FileNotFound { .. }));
        let payload = InspectError::from(err).to_payload();
        assert!(payload.remediation.unwrap_or_default().contains("dinspect capture"));
    }

    #[test]
    fn test_override_type_skips_extension_check() {
        let file = temp_file_with_extension("snap");
        let res = parse_resource(file.path().to_str().unwrap(), Some(ResourceKind::Snapshot)).unwrap();
        assert_eq!(res.kind, ResourceKind::Snapshot);
    }

    #[test]
    fn test_snapshot_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("page.json");
        let mut snapshot = PageSnapshot::new("https://example.com/");
        snapshot.title = "Example".into();
        save_snapshot(&path, &snapshot).unwrap();

        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded.url, "https://example.com/");
        assert_eq!(loaded.title, "Example");
    }
}
