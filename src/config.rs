//! Site configuration: the inline JSON config block of the original UI,
//! rendered as TOML for native callers.

use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::KmError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KmConfig {
    /// Site title shown by the UI collaborator.
    pub title: String,
    /// URL of the concatenated bundle document.
    pub bundle_url: String,
    /// Bundle cache time-to-live in minutes; 0 disables cache reads.
    pub cache_minutes: u64,
}

impl Default for KmConfig {
    fn default() -> Self {
        KmConfig {
            title: "Wiki".to_string(),
            bundle_url: String::new(),
            cache_minutes: 0,
        }
    }
}

impl KmConfig {
    pub fn from_toml_str(text: &str) -> Result<KmConfig, KmError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<KmConfig, KmError> {
        tracing::debug!("Reading {:?}", path.as_ref());
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    /// The bundle URL, or a configuration error when it was left empty.
    pub fn require_bundle_url(&self) -> Result<&str, KmError> {
        if self.bundle_url.is_empty() {
            Err(KmError::Config("bundle_url is empty".to_string()))
        } else {
            Ok(&self.bundle_url)
        }
    }

    /// Cache TTL as a duration; `None` when caching is disabled.
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_minutes > 0).then(|| Duration::from_secs(self.cache_minutes * 60))
    }
}
