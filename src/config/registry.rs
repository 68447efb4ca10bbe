//! Source registry (sources.yaml)
//!
//! The registry owns the ordered list of configured feed identifiers. The aggregator uses the
//! list verbatim as the fingerprint of its master cache, so order matters.
//!
//! ```yaml
//! sources:
//!   - RipeStore
//!   - https://example.com/altstore.json
//! origins:
//!   https://example.com/altstore.json: manual
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, config};

/// Feed configured when nothing else has been saved
pub const DEFAULT_SOURCE: &str = "RipeStore";

/// Provides the configured feed identifiers, in order
pub trait SourceRegistry: Send + Sync {
    fn configured_feed_ids(&self) -> Vec<String>;
}

/// How a source ended up in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceOrigin {
    Manual,
    Suggested,
}

/// Registry with a fixed feed list
#[derive(Debug, Clone, Default)]
pub struct StaticSourceRegistry {
    feed_ids: Vec<String>,
}

impl StaticSourceRegistry {
    pub fn new<I, S>(feed_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            feed_ids: feed_ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl SourceRegistry for StaticSourceRegistry {
    fn configured_feed_ids(&self) -> Vec<String> {
        self.feed_ids.clone()
    }
}

/// On-disk layout of the sources file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct SourcesFile {
    #[serde(default)]
    sources: Vec<String>,
    #[serde(default)]
    origins: BTreeMap<String, SourceOrigin>,
}

/// Registry persisted as a YAML file
#[derive(Debug, Clone)]
pub struct FileSourceRegistry {
    path: PathBuf,
}

impl FileSourceRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the sources file, falling back to the default source list
    fn load(&self) -> SourcesFile {
        let defaults = || SourcesFile {
            sources: vec![DEFAULT_SOURCE.to_string()],
            origins: BTreeMap::new(),
        };

        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return defaults(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read sources file");
                return defaults();
            }
        };

        match serde_yaml::from_str::<SourcesFile>(&content) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable sources file");
                defaults()
            }
        }
    }

    fn save(&self, file: &SourcesFile) -> Result<()> {
        let path = self.path.display().to_string();
        let yaml =
            serde_yaml::to_string(file).map_err(|e| config::write_failed(&path, e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| config::write_failed(&path, e.to_string()))?;
        }

        std::fs::write(&self.path, yaml).map_err(|e| config::write_failed(path, e.to_string()))
    }

    /// Add a source at the end of the list
    ///
    /// Returns `false` when the trimmed identifier is empty or already configured.
    pub fn add_source(&self, feed_id: &str, origin: SourceOrigin) -> Result<bool> {
        let feed_id = feed_id.trim();
        if feed_id.is_empty() {
            return Ok(false);
        }

        let mut file = self.load();
        if file.sources.iter().any(|s| s == feed_id) {
            return Ok(false);
        }

        file.sources.push(feed_id.to_string());
        file.origins.insert(feed_id.to_string(), origin);
        self.save(&file)?;
        Ok(true)
    }

    /// Remove a source and forget its origin
    ///
    /// Returns `false` when the source was not configured.
    pub fn remove_source(&self, feed_id: &str) -> Result<bool> {
        let mut file = self.load();
        let before = file.sources.len();
        file.sources.retain(|s| s != feed_id);
        if file.sources.len() == before {
            return Ok(false);
        }

        file.origins.remove(feed_id);
        self.save(&file)?;
        Ok(true)
    }

    /// How each source was added
    pub fn origins(&self) -> BTreeMap<String, SourceOrigin> {
        self.load().origins
    }
}

impl SourceRegistry for FileSourceRegistry {
    fn configured_feed_ids(&self) -> Vec<String> {
        self.load().sources
    }
}
