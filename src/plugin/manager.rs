//! Tab plugin registry.
//!
//! [`TabPluginManager`] owns the available and enabled plugin sequences for one
//! application session and publishes every change through a
//! `tokio::sync::watch` channel. Both sequences are kept sorted by priority,
//! ties broken by registration order.

use std::collections::HashSet;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, error, info};

use super::{DiscoveryResult, PluginError, PluginResult, TabPlugin};

/// Point-in-time view of the registry, as published to subscribers.
///
/// Available and enabled are published together so a subscriber never sees an
/// enabled plugin that is missing from the available list.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    /// Every plugin registered this session, in display order.
    pub available: Vec<TabPlugin>,
    /// Enabled subset of `available`, in display order.
    pub enabled: Vec<TabPlugin>,
    /// Whether a registration has succeeded since the last cleanup.
    pub initialized: bool,
}

impl RegistrySnapshot {
    /// Ids of the enabled plugins, in display order.
    pub fn enabled_ids(&self) -> Vec<&str> {
        self.enabled.iter().map(TabPlugin::id).collect()
    }

    /// Ids of the available plugins, in display order.
    pub fn available_ids(&self) -> Vec<&str> {
        self.available.iter().map(TabPlugin::id).collect()
    }
}

#[derive(Default)]
struct RegistryState {
    available: Vec<TabPlugin>,
    enabled: Vec<TabPlugin>,
    initialized: bool,
}

impl RegistryState {
    fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            available: self.available.clone(),
            enabled: self.enabled.clone(),
            initialized: self.initialized,
        }
    }

    fn is_enabled(&self, id: &str) -> bool {
        self.enabled.iter().any(|p| p.id() == id)
    }
}

/// Registry of tab plugins for one application session.
///
/// Share it with `Arc`; every method takes `&self`.
pub struct TabPluginManager {
    state: Mutex<RegistryState>,
    tx: watch::Sender<RegistrySnapshot>,
}

impl std::fmt::Debug for TabPluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("TabPluginManager")
            .field("available", &state.available.len())
            .field("enabled", &state.enabled.len())
            .field("initialized", &state.initialized)
            .finish()
    }
}

impl Default for TabPluginManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TabPluginManager {
    /// Create an empty, uninitialized registry.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(RegistrySnapshot::default());
        Self { state: Mutex::new(RegistryState::default()), tx }
    }

    /// Replace the registry contents with `plugins`.
    ///
    /// Plugins are sorted by priority and all of them are enabled. Plugins
    /// registered by an earlier call are replaced and get their cleanup hook
    /// run, unless the same instance is registered again. An empty or
    /// duplicate id fails the whole call and leaves the registry untouched.
    pub fn register_plugins(&self, plugins: Vec<TabPlugin>) -> DiscoveryResult {
        if let Err(e) = validate(&plugins) {
            error!("Failed to register tab plugins: {e}");
            return DiscoveryResult::failure(e.to_string());
        }

        let plugin_ids: Vec<String> = plugins.iter().map(|p| p.id().to_string()).collect();

        let mut sorted = plugins;
        sorted.sort_by_key(TabPlugin::priority);
        let enabled_count = sorted.len();

        let replaced = {
            let mut state = self.state.lock();
            let previous = std::mem::replace(&mut state.available, sorted.clone());
            state.enabled = sorted;
            state.initialized = true;
            self.publish(&state);

            // A plugin handed in again is still live and must not be cleaned up.
            previous
                .into_iter()
                .filter(|old| !state.available.iter().any(|new| new.is_same_instance(old)))
                .collect::<Vec<_>>()
        };

        for plugin in &replaced {
            plugin.cleanup();
        }

        info!("Registered {} tab plugin(s)", plugin_ids.len());
        for plugin in self.available_plugins() {
            debug!("  - {} ({}) priority {}", plugin.title(), plugin.id(), plugin.priority());
        }

        DiscoveryResult { total_discovered: plugin_ids.len(), enabled_count, plugin_ids, error: None }
    }

    /// Enable an available plugin.
    ///
    /// Returns `false` if the id is unknown or already enabled.
    pub fn enable_plugin(&self, id: &str) -> bool {
        let mut state = self.state.lock();

        if state.is_enabled(id) || !state.available.iter().any(|p| p.id() == id) {
            return false;
        }

        // Rebuild from `available` so priority order and registration-order ties hold.
        let mut keep: HashSet<String> = state.enabled.iter().map(|p| p.id().to_string()).collect();
        keep.insert(id.to_string());
        let enabled: Vec<TabPlugin> =
            state.available.iter().filter(|p| keep.contains(p.id())).cloned().collect();
        state.enabled = enabled;

        self.publish(&state);
        debug!("Enabled tab plugin {id}");
        true
    }

    /// Disable an enabled plugin. It stays available.
    ///
    /// Returns `false` if the id is not currently enabled.
    pub fn disable_plugin(&self, id: &str) -> bool {
        let mut state = self.state.lock();

        let Some(index) = state.enabled.iter().position(|p| p.id() == id) else {
            return false;
        };
        state.enabled.remove(index);

        self.publish(&state);
        debug!("Disabled tab plugin {id}");
        true
    }

    /// Look up an available plugin by id.
    pub fn get_plugin(&self, id: &str) -> Option<TabPlugin> {
        self.state.lock().available.iter().find(|p| p.id() == id).cloned()
    }

    /// Like [`get_plugin`](Self::get_plugin), but as an error for callers that propagate.
    pub fn require_plugin(&self, id: &str) -> PluginResult<TabPlugin> {
        self.get_plugin(id).ok_or_else(|| PluginError::NotFound(id.to_string()))
    }

    /// Whether the id is currently enabled.
    pub fn is_plugin_enabled(&self, id: &str) -> bool {
        self.state.lock().is_enabled(id)
    }

    /// Clear the registry and run every available plugin's cleanup hook.
    ///
    /// Calling it again on an empty registry does nothing.
    pub fn cleanup(&self) {
        let removed = {
            let mut state = self.state.lock();
            if !state.initialized && state.available.is_empty() && state.enabled.is_empty() {
                return;
            }
            let removed = std::mem::take(&mut state.available);
            state.enabled.clear();
            state.initialized = false;
            self.publish(&state);
            removed
        };

        for plugin in &removed {
            plugin.cleanup();
        }

        info!("Cleared {} tab plugin(s)", removed.len());
    }

    /// Whether a registration has succeeded since creation or the last cleanup.
    pub fn is_initialized(&self) -> bool {
        self.state.lock().initialized
    }

    /// All available plugins in display order.
    pub fn available_plugins(&self) -> Vec<TabPlugin> {
        self.state.lock().available.clone()
    }

    /// Enabled plugins in display order.
    pub fn enabled_plugins(&self) -> Vec<TabPlugin> {
        self.state.lock().enabled.clone()
    }

    /// Current state as one consistent snapshot.
    pub fn snapshot(&self) -> RegistrySnapshot {
        self.state.lock().snapshot()
    }

    /// Subscribe to registry changes.
    ///
    /// The receiver starts at the current snapshot and is notified once per
    /// state-changing call.
    pub fn subscribe(&self) -> watch::Receiver<RegistrySnapshot> {
        self.tx.subscribe()
    }

    /// Publish while still holding the state lock so snapshots arrive in mutation order.
    fn publish(&self, state: &RegistryState) {
        self.tx.send_replace(state.snapshot());
    }
}

impl Drop for TabPluginManager {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        for plugin in std::mem::take(&mut state.available) {
            plugin.cleanup();
        }
    }
}

fn validate(plugins: &[TabPlugin]) -> PluginResult<()> {
    let mut seen = HashSet::new();
    for plugin in plugins {
        if plugin.id().is_empty() {
            return Err(PluginError::InvalidId);
        }
        if !seen.insert(plugin.id()) {
            return Err(PluginError::DuplicateId(plugin.id().to_string()));
        }
    }
    Ok(())
}
