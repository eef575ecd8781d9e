//! Tunables for field definitions, uploads and storage layout.
//!
//! Defaults live in the `Default` impl; a JSON document only needs to list
//! the keys it overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Largest accepted upload for a `file` field: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Configuration shared by the plan compiler, normalizer and service.
///
/// # Example
///
/// ```rust
/// use formkit::FormsConfig;
///
/// let config = FormsConfig::from_json_str(r#"{"max_upload_bytes": 1024}"#).unwrap();
/// assert_eq!(config.max_upload_bytes, 1024);
/// assert_eq!(config.signature_area, "signatures");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    /// Size ceiling for a single uploaded file, in bytes.
    pub max_upload_bytes: u64,
    /// Storage area (path prefix) for uploaded files.
    pub upload_area: String,
    /// Storage area (path prefix) for decoded signature images.
    pub signature_area: String,
    /// Extension given to stored signature images.
    pub signature_extension: String,
    /// Random characters appended to a form slug.
    pub slug_suffix_len: usize,
    pub max_label_len: usize,
    pub max_title_len: usize,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            upload_area: "uploads".to_string(),
            signature_area: "signatures".to_string(),
            signature_extension: "png".to_string(),
            slug_suffix_len: 6,
            max_label_len: 255,
            max_title_len: 255,
        }
    }
}

impl FormsConfig {
    pub fn with_max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    pub fn with_upload_area(mut self, area: impl Into<String>) -> Self {
        self.upload_area = area.into();
        self
    }

    pub fn with_signature_area(mut self, area: impl Into<String>) -> Self {
        self.signature_area = area.into();
        self
    }

    pub fn with_slug_suffix_len(mut self, len: usize) -> Self {
        self.slug_suffix_len = len;
        self
    }

    /// Parses a JSON document; absent keys keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::Parse)
    }

    /// Reads and parses a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config = Self::from_json_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded forms configuration");
        Ok(config)
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {0}: {1}")]
    Io(PathBuf, std::io::Error),

    #[error("parse error: {0}")]
    Parse(serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FormsConfig::default();
        assert_eq!(config.max_upload_bytes, 10_485_760);
        assert_eq!(config.upload_area, "uploads");
        assert_eq!(config.slug_suffix_len, 6);
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(
            FormsConfig::from_json_str("{}").unwrap(),
            FormsConfig::default()
        );
    }

    #[test]
    fn test_builder_overrides() {
        let config = FormsConfig::default()
            .with_max_upload_bytes(5)
            .with_signature_area("sig")
            .with_upload_area("files")
            .with_slug_suffix_len(8);
        assert_eq!(config.max_upload_bytes, 5);
        assert_eq!(config.signature_area, "sig");
        assert_eq!(config.upload_area, "files");
        assert_eq!(config.slug_suffix_len, 8);
    }

    #[test]
    fn test_malformed_document() {
        assert!(matches!(
            FormsConfig::from_json_str("{\"max_upload_bytes\": \"big\"}"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = FormsConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_, _)));
    }
}
