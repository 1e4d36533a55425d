use crate::version::SemanticVersion;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_fallback_url() -> String {
    crate::compatibility::DEFAULT_COMPATIBILITY_FALLBACK_URL.to_string()
}

fn default_log_directory() -> String {
    "logs".to_string()
}

fn default_api_version() -> SemanticVersion {
    SemanticVersion::new(1, 0, 0)
}

/// The handful of values the host must supply that the core has no business reading from disk
/// itself: the running framework's own version, where to send mods with no better update URL, and
/// where the logger should write. Every field defaults, so an empty `{}` document is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_api_version")]
    pub framework_api_version: SemanticVersion,
    #[serde(default = "default_fallback_url")]
    pub compatibility_fallback_url: String,
    #[serde(default = "default_log_directory")]
    pub log_directory: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            framework_api_version: default_api_version(),
            compatibility_fallback_url: default_fallback_url(),
            log_directory: default_log_directory(),
        }
    }
}

impl ResolverConfig {
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Reads a config document from disk, falling back to defaults if the file doesn't exist.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        if !path.is_file() {
            return Ok(ResolverConfig::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&raw)?)
    }
}
