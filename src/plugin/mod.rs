//! Tab plugin system.
//!
//! Feature modules describe themselves as [`TabPlugin`]s. A
//! [`DiscoveryService`] builds them from a [`PluginCatalog`] and registers
//! them with a [`TabPluginManager`], which keeps them ordered by priority and
//! publishes the enabled set to the host.
//!
//! # Catalogs
//!
//! - [`StaticCatalog`]: a fixed list of factories ([`builtin::catalog`])
//! - [`ManifestCatalog`]: tabs declared in a TOML manifest
//! - [`ChainCatalog`]: several catalogs in sequence
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tabhost::plugin::{builtin, DiscoveryService, TabPluginManager};
//!
//! let registry = Arc::new(TabPluginManager::new());
//! let discovery = DiscoveryService::new(Arc::clone(&registry), builtin::catalog());
//!
//! let result = discovery.discover_and_register();
//! assert!(result.is_successful());
//! assert_eq!(registry.enabled_plugins()[0].id(), builtin::MAIN_TAB);
//! ```

pub mod builtin;
mod discovery;
mod error;
mod manager;
mod manifest;
mod types;

pub use discovery::{ChainCatalog, DiscoveryService, PluginCatalog, PluginFactory, StaticCatalog};
pub use error::{PluginError, PluginResult};
pub use manager::{RegistrySnapshot, TabPluginManager};
pub use manifest::{ManifestCatalog, TabEntry, TabManifest};
pub use types::{
    CleanupFn, DiscoveryResult, InitFn, PluginInfo, RenderContext, RenderFn, RenderUnit,
    TabPlugin, DEFAULT_PRIORITY,
};
