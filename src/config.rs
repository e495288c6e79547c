//! Content cache configuration
//!
//! Configuration is plain data and can be stored next to the assets as a
//! RON file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ContentError;

/// When zero-referenced entries leave the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EvictionPolicy {
    /// Keep entries until [`ContentCache::compact`](crate::ContentCache::compact) runs
    #[default]
    Deferred,
    /// Drop an entry as soon as its last reference is released
    Immediate,
}

/// Content cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Directory content paths are resolved against
    pub root: PathBuf,
    /// Eviction behavior for released entries
    pub eviction: EvictionPolicy,
    /// Maximum nesting of bundles inside bundles
    pub max_bundle_depth: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            eviction: EvictionPolicy::Deferred,
            max_bundle_depth: 8,
        }
    }
}

impl ContentConfig {
    /// Set the content root directory
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Set the eviction policy
    #[must_use]
    pub fn with_eviction(mut self, eviction: EvictionPolicy) -> Self {
        self.eviction = eviction;
        self
    }

    /// Set the maximum bundle nesting depth
    #[must_use]
    pub fn with_max_bundle_depth(mut self, depth: usize) -> Self {
        self.max_bundle_depth = depth;
        self
    }

    /// Parse a configuration from RON text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration
    pub fn from_ron_str(text: &str) -> Result<Self, ContentError> {
        ron::from_str(text).map_err(|e| ContentError::ConfigError(e.to_string()))
    }

    /// Load a configuration from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, ContentError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| ContentError::IoError(format!("{}: {e}", path.display())))?;
        Self::from_ron_str(&text)
    }

    /// Serialize this configuration to pretty RON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_ron_string(&self) -> Result<String, ContentError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ContentError::ConfigError(e.to_string()))
    }
}
