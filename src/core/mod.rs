//! Core types shared by the host: configuration.

mod config;

pub use config::{Config, LoggingConfig, PluginsConfig, UiConfig, LOCAL_CONFIG_FILE};
