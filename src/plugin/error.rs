//! Plugin system error types.

use thiserror::Error;

/// Result type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;

/// Errors that can occur while discovering, registering, or looking up tab plugins.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A plugin factory failed to build its plugin.
    #[error("Failed to construct plugin '{id}': {reason}")]
    Construction { id: String, reason: String },

    /// A plugin's initialize hook failed.
    #[error("Failed to initialize plugin '{id}': {reason}")]
    Initialization { id: String, reason: String },

    /// Two plugins in one registration share an id.
    #[error("Duplicate plugin id '{0}'")]
    DuplicateId(String),

    /// A plugin was registered with an empty id.
    #[error("Plugin id must not be empty")]
    InvalidId,

    /// Invalid tab manifest.
    #[error("Invalid tab manifest: {0}")]
    InvalidManifest(String),

    /// The discovery pass as a whole failed.
    #[error("Discovery failed: {0}")]
    Discovery(String),

    /// No plugin with this id is registered.
    #[error("Plugin not found: {0}")]
    NotFound(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
