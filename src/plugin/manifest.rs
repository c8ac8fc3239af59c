//! Tab manifest parsing and the manifest-backed catalog.
//!
//! A tab manifest is a TOML file listing tabs that render static text:
//!
//! ```toml
//! [[tab]]
//! id = "notes"
//! title = "Notes"
//! version = "1.0.0"
//! priority = 50
//! content = "first line\nsecond line"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{
    PluginCatalog, PluginError, PluginFactory, PluginResult, RenderUnit, TabPlugin,
    DEFAULT_PRIORITY,
};

/// A parsed tab manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TabManifest {
    /// Declared tabs, in file order.
    #[serde(default, rename = "tab")]
    pub tabs: Vec<TabEntry>,
}

/// One `[[tab]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabEntry {
    /// Plugin id (unique identifier).
    pub id: String,
    /// Tab label.
    pub title: String,
    /// Plugin version (semver).
    #[serde(default = "default_version")]
    pub version: String,
    /// Ordering priority.
    #[serde(default = "default_priority")]
    pub priority: i32,
    /// Intrinsic capability flag.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Plugin description.
    #[serde(default)]
    pub description: String,
    /// Static body text, one rendered line per text line.
    #[serde(default)]
    pub content: String,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

const fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

const fn default_enabled() -> bool {
    true
}

impl TabManifest {
    /// Parse a manifest from TOML string.
    pub fn from_toml(content: &str) -> PluginResult<Self> {
        toml::from_str(content).map_err(|e| PluginError::InvalidManifest(e.to_string()))
    }

    /// Parse a manifest from a file.
    pub fn from_file(path: &Path) -> PluginResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> PluginResult<String> {
        toml::to_string_pretty(self).map_err(|e| PluginError::InvalidManifest(e.to_string()))
    }
}

impl TabEntry {
    /// Validate the entry.
    pub fn validate(&self) -> PluginResult<()> {
        if self.id.is_empty() {
            return Err(PluginError::InvalidManifest("Tab id is required".to_string()));
        }

        if !self.id.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_') {
            return Err(PluginError::InvalidManifest(format!(
                "Tab id '{}' must contain only alphanumeric characters, hyphens, and underscores",
                self.id
            )));
        }

        if self.title.trim().is_empty() {
            return Err(PluginError::InvalidManifest(format!("Tab '{}' needs a title", self.id)));
        }

        let version_parts: Vec<&str> = self.version.split('.').collect();
        if version_parts.len() < 2 || version_parts.iter().any(|p| p.is_empty()) {
            return Err(PluginError::InvalidManifest(format!(
                "Tab '{}' version must be in semver format (e.g., 1.0.0)",
                self.id
            )));
        }

        Ok(())
    }

    /// Build the plugin this entry describes.
    pub fn to_plugin(&self) -> PluginResult<TabPlugin> {
        self.validate()?;

        let title = self.title.clone();
        let lines: Vec<String> = self.content.lines().map(str::to_string).collect();

        Ok(TabPlugin::new(&self.id, &self.title, &self.version)
            .with_priority(self.priority)
            .with_enabled(self.enabled)
            .with_description(&self.description)
            .with_renderer(move |_| RenderUnit { title: title.clone(), lines: lines.clone() }))
    }
}

/// Catalog backed by a manifest file.
///
/// The file is re-read on every discovery pass.
#[derive(Debug, Clone)]
pub struct ManifestCatalog {
    path: PathBuf,
}

impl ManifestCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PluginCatalog for ManifestCatalog {
    fn name(&self) -> &str {
        "manifest"
    }

    fn candidates(&self) -> PluginResult<Vec<PluginFactory>> {
        let manifest = TabManifest::from_file(&self.path).map_err(|e| {
            PluginError::Discovery(format!("cannot read {}: {e}", self.path.display()))
        })?;

        Ok(manifest
            .tabs
            .into_iter()
            .map(|entry| {
                let name = if entry.id.is_empty() { "<unnamed>".to_string() } else { entry.id.clone() };
                PluginFactory::new(name, move || entry.to_plugin())
            })
            .collect())
    }
}
