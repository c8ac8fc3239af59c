//! Application state and lifecycle management.
//!
//! The `App` owns one plugin registry per session, runs discovery, and turns
//! the registry's published snapshots into a tab bar and the selected tab's
//! content.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::core::Config;
use crate::plugin::{
    builtin, ChainCatalog, DiscoveryResult, DiscoveryService, ManifestCatalog, PluginCatalog,
    RegistrySnapshot, RenderUnit, TabPlugin, TabPluginManager,
};

/// Shown while no discovery pass has finished.
pub const LOADING_STATUS: &str = "Loading plugins...";

/// Shown in place of the tab bar when nothing is enabled.
pub const EMPTY_TABS: &str = "No tabs available";

/// Main application state.
#[derive(Debug)]
pub struct App {
    /// Application configuration
    pub config: Config,

    /// Index of the selected tab among the enabled plugins
    pub selected: usize,

    /// Outcome of the last discovery pass
    pub last_discovery: Option<DiscoveryResult>,

    registry: Arc<TabPluginManager>,
    discovery: Arc<DiscoveryService>,
    tabs: watch::Receiver<RegistrySnapshot>,
}

/// Catalog for a config: the built-in tabs, then the manifest if one is set.
///
/// A manifest that cannot be read only loses its own tabs.
pub fn catalog_for(config: &Config) -> ChainCatalog {
    let chain = ChainCatalog::new().with(builtin::catalog());
    match &config.plugins.manifest {
        Some(path) => chain.with_optional(ManifestCatalog::new(path)),
        None => chain,
    }
}

impl App {
    /// Create an app that discovers the built-in tabs plus any configured manifest.
    pub fn new(config: Config) -> Self {
        let catalog = catalog_for(&config);
        Self::with_catalog(config, catalog)
    }

    /// Create an app with an explicit catalog.
    pub fn with_catalog(config: Config, catalog: impl PluginCatalog + 'static) -> Self {
        let registry = Arc::new(TabPluginManager::new());
        let discovery = Arc::new(DiscoveryService::new(Arc::clone(&registry), catalog));
        let tabs = registry.subscribe();

        Self { config, selected: 0, last_discovery: None, registry, discovery, tabs }
    }

    /// The session's plugin registry.
    pub fn registry(&self) -> &Arc<TabPluginManager> {
        &self.registry
    }

    /// Run discovery on the current thread.
    pub fn load_plugins(&mut self) -> &DiscoveryResult {
        let result = self.discovery.discover_and_register();
        self.finish_loading(result)
    }

    /// Run discovery on a blocking task so the caller's runtime keeps going.
    pub async fn load_plugins_async(&mut self) -> &DiscoveryResult {
        let discovery = Arc::clone(&self.discovery);
        let result = tokio::task::spawn_blocking(move || discovery.discover_and_register())
            .await
            .unwrap_or_else(|e| DiscoveryResult::failure(format!("discovery task failed: {e}")));
        self.finish_loading(result)
    }

    /// Clear the registry and discover again.
    pub fn refresh(&mut self) -> &DiscoveryResult {
        let result = self.discovery.refresh();
        self.finish_loading(result)
    }

    fn finish_loading(&mut self, result: DiscoveryResult) -> &DiscoveryResult {
        if result.is_successful() {
            for id in &self.config.plugins.disabled {
                if !self.registry.disable_plugin(id) {
                    debug!("Configured to disable {id}, but it is not enabled");
                }
            }
        } else {
            warn!("Plugin system degraded: {result}");
        }

        self.selected = self.selected_index(self.tabs.borrow().enabled.len());
        self.last_discovery.insert(result)
    }

    /// `selected` clamped to the current tab count, which may have shrunk since
    /// the index was set.
    fn selected_index(&self, count: usize) -> usize {
        self.selected.min(count.saturating_sub(1))
    }

    /// Human-readable loading status.
    pub fn status_line(&self) -> String {
        match &self.last_discovery {
            None => LOADING_STATUS.to_string(),
            Some(result) => result.to_string(),
        }
    }

    /// Enabled tabs as last published by the registry.
    pub fn tabs(&self) -> Vec<TabPlugin> {
        self.tabs.borrow().enabled.clone()
    }

    /// One line with every enabled tab title; the selected one is bracketed.
    pub fn tab_bar(&self) -> String {
        let snapshot = self.tabs.borrow();
        if snapshot.enabled.is_empty() {
            return if self.last_discovery.is_none() {
                LOADING_STATUS.to_string()
            } else {
                EMPTY_TABS.to_string()
            };
        }

        let selected = self.selected_index(snapshot.enabled.len());
        snapshot
            .enabled
            .iter()
            .enumerate()
            .map(|(i, plugin)| {
                if i == selected {
                    format!("[{}]", plugin.title())
                } else {
                    plugin.title().to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Move the selection right, wrapping around.
    pub fn select_next(&mut self) {
        let count = self.tabs.borrow().enabled.len();
        if count > 0 {
            self.selected = (self.selected_index(count) + 1) % count;
        }
    }

    /// Move the selection left, wrapping around.
    pub fn select_previous(&mut self) {
        let count = self.tabs.borrow().enabled.len();
        if count > 0 {
            self.selected = (self.selected_index(count) + count - 1) % count;
        }
    }

    /// Select the enabled tab with this id. Returns whether it was found.
    pub fn select(&mut self, id: &str) -> bool {
        let position = self.tabs.borrow().enabled.iter().position(|p| p.id() == id);
        match position {
            Some(index) => {
                self.selected = index;
                true
            }
            None => false,
        }
    }

    /// The selected tab, if any are enabled.
    pub fn selected_plugin(&self) -> Option<TabPlugin> {
        let tabs = self.tabs.borrow();
        tabs.enabled.get(self.selected_index(tabs.enabled.len())).cloned()
    }

    /// Render the selected tab with the configured display context.
    pub fn render_selected(&self) -> Option<RenderUnit> {
        self.selected_plugin().map(|plugin| plugin.render(&self.config.render_context()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{PluginError, PluginFactory, PluginResult, StaticCatalog};

    struct OfflineCatalog;

    impl PluginCatalog for OfflineCatalog {
        fn name(&self) -> &str {
            "offline"
        }

        fn candidates(&self) -> PluginResult<Vec<PluginFactory>> {
            Err(PluginError::Discovery("offline".to_string()))
        }
    }

    #[test]
    fn test_status_before_and_after_loading() {
        let mut app = App::new(Config::default());
        assert_eq!(app.status_line(), LOADING_STATUS);
        assert_eq!(app.tab_bar(), LOADING_STATUS);

        app.load_plugins();
        assert_eq!(app.status_line(), "discovered 4, enabled 4");
        assert_eq!(app.tab_bar(), "[Home] | 今天吃什么 | Demo | Settings");
    }

    #[test]
    fn test_config_disables_tabs() {
        let mut config = Config::default();
        config.plugins.disabled = vec!["demo_tab".to_string(), "missing".to_string()];

        let mut app = App::new(config);
        app.load_plugins();

        assert_eq!(app.tab_bar(), "[Home] | 今天吃什么 | Settings");
        assert!(app.registry().get_plugin("demo_tab").is_some());
    }

    #[test]
    fn test_selection_wraps() {
        let mut app = App::new(Config::default());
        app.load_plugins();

        app.select_previous();
        let selected = app.selected_plugin().map(|p| p.id().to_string());
        assert_eq!(selected.as_deref(), Some("settings_tab"));

        app.select_next();
        assert_eq!(app.selected, 0);

        assert!(app.select("demo_tab"));
        assert_eq!(app.tab_bar(), "Home | 今天吃什么 | [Demo] | Settings");
        assert!(!app.select("nope"));
    }

    #[test]
    fn test_render_selected_uses_config() {
        let mut config = Config::default();
        config.ui.width = 42;
        let mut app = App::new(config);
        app.load_plugins();
        app.select("settings_tab");

        let unit = app.render_selected().unwrap();
        assert!(unit.lines.contains(&"Display width: 42".to_string()));
    }

    #[test]
    fn test_degraded_mode() {
        let mut app = App::with_catalog(Config::default(), OfflineCatalog);
        let result = app.load_plugins().clone();

        assert!(!result.is_successful());
        assert_eq!(app.status_line(), "plugin discovery failed: Discovery failed: offline");
        assert_eq!(app.tab_bar(), EMPTY_TABS);
        assert!(app.render_selected().is_none());
    }

    #[test]
    fn test_selection_follows_registry_changes() {
        let mut app = App::with_catalog(
            Config::default(),
            StaticCatalog::new()
                .with_factory(PluginFactory::from_plugin(builtin::main_tab()))
                .with_factory(PluginFactory::from_plugin(builtin::demo_tab())),
        );
        app.load_plugins();
        app.select("demo_tab");

        app.registry().disable_plugin("demo_tab");
        app.refresh();
        assert_eq!(app.selected, 1);

        // Disabled at runtime, without a discovery pass.
        app.registry().disable_plugin("demo_tab");
        let selected = app.selected_plugin().map(|p| p.id().to_string());
        assert_eq!(selected.as_deref(), Some("main_tab"));
        assert_eq!(app.tab_bar(), "[Home]");

        app.registry().enable_plugin("demo_tab");
        app.select_previous();
        assert_eq!(app.tab_bar(), "[Home] | Demo");
    }

    #[tokio::test]
    async fn test_load_plugins_async() {
        let mut app = App::new(Config::default());
        let result = app.load_plugins_async().await;
        assert_eq!(result.enabled_count, 4);
        assert_eq!(app.tabs().len(), 4);
    }
}
