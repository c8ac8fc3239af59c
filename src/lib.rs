//! # tabhost
//!
//! Tab plugin registry - discover, order, and enable feature tabs at runtime.
//!
//! Feature modules describe themselves as tab plugins. A discovery service
//! builds them from a catalog and registers them with a per-session registry,
//! which keeps them sorted by priority and publishes the enabled set to the
//! host through a `tokio::sync::watch` channel.
//!
//! ## Features
//!
//! - **Priority ordering**: lower priority first, stable on ties
//! - **Enable/disable**: toggle tabs without losing them
//! - **Isolated discovery**: one broken plugin never blocks the others
//! - **Manifest tabs**: declare static tabs in a TOML file
//!
//! ## Quick Start
//!
//! ```bash
//! # Show the tab bar
//! tabhost
//!
//! # Render one tab
//! tabhost show demo_tab
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::significant_drop_tightening)]

pub mod app;
pub mod core;
pub mod plugin;

// Re-export commonly used types
pub use app::App;
pub use core::Config;
pub use plugin::{
    DiscoveryResult, DiscoveryService, PluginCatalog, PluginError, PluginResult, TabPlugin,
    TabPluginManager,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "tabhost";
