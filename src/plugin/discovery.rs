//! Plugin discovery.
//!
//! A [`PluginCatalog`] says which plugins exist; the [`DiscoveryService`] builds
//! and initializes them one by one and hands the survivors to the registry.
//! Swapping the catalog (static list, manifest file, anything else) does not
//! touch the registry.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::{DiscoveryResult, PluginError, PluginResult, TabPlugin, TabPluginManager};

type BuildFn = Arc<dyn Fn() -> PluginResult<TabPlugin> + Send + Sync>;

/// Named constructor for one plugin.
#[derive(Clone)]
pub struct PluginFactory {
    name: String,
    build: BuildFn,
}

impl PluginFactory {
    /// Create a factory from a constructor closure.
    pub fn new<F>(name: impl Into<String>, build: F) -> Self
    where
        F: Fn() -> PluginResult<TabPlugin> + Send + Sync + 'static,
    {
        Self { name: name.into(), build: Arc::new(build) }
    }

    /// Factory that hands out clones of an already built plugin.
    pub fn from_plugin(plugin: TabPlugin) -> Self {
        let name = plugin.id().to_string();
        Self::new(name, move || Ok(plugin.clone()))
    }

    /// Name used in logs when construction fails.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the constructor.
    pub fn build(&self) -> PluginResult<TabPlugin> {
        (self.build)()
    }
}

impl fmt::Debug for PluginFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginFactory").field("name", &self.name).finish()
    }
}

/// Source of candidate plugins.
pub trait PluginCatalog: Send + Sync {
    /// Catalog name for logs.
    fn name(&self) -> &str;

    /// Factories for every plugin this catalog knows, in discovery order.
    ///
    /// An error here fails the whole discovery pass.
    fn candidates(&self) -> PluginResult<Vec<PluginFactory>>;
}

/// Fixed list of plugin factories.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    factories: Vec<PluginFactory>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a factory.
    pub fn with_factory(mut self, factory: PluginFactory) -> Self {
        self.factories.push(factory);
        self
    }

    /// Append a constructor closure.
    pub fn with<F>(self, name: impl Into<String>, build: F) -> Self
    where
        F: Fn() -> PluginResult<TabPlugin> + Send + Sync + 'static,
    {
        self.with_factory(PluginFactory::new(name, build))
    }
}

impl PluginCatalog for StaticCatalog {
    fn name(&self) -> &str {
        "static"
    }

    fn candidates(&self) -> PluginResult<Vec<PluginFactory>> {
        Ok(self.factories.clone())
    }
}

/// Several catalogs queried in order.
///
/// A required member failing fails the pass. An optional member failing is
/// logged and contributes nothing.
#[derive(Default)]
pub struct ChainCatalog {
    members: Vec<ChainMember>,
}

struct ChainMember {
    catalog: Box<dyn PluginCatalog>,
    optional: bool,
}

impl ChainCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a required catalog.
    pub fn with(mut self, catalog: impl PluginCatalog + 'static) -> Self {
        self.members.push(ChainMember { catalog: Box::new(catalog), optional: false });
        self
    }

    /// Append a catalog whose failure only drops its own plugins.
    pub fn with_optional(mut self, catalog: impl PluginCatalog + 'static) -> Self {
        self.members.push(ChainMember { catalog: Box::new(catalog), optional: true });
        self
    }
}

impl PluginCatalog for ChainCatalog {
    fn name(&self) -> &str {
        "chain"
    }

    fn candidates(&self) -> PluginResult<Vec<PluginFactory>> {
        let mut all = Vec::new();
        for member in &self.members {
            let name = member.catalog.name();
            let found = match member.catalog.candidates() {
                Ok(found) => found,
                Err(e) if member.optional => {
                    warn!("Skipping catalog {name}: {e}");
                    continue;
                }
                Err(e) => {
                    let reason = match e {
                        PluginError::Discovery(reason) => reason,
                        other => other.to_string(),
                    };
                    return Err(PluginError::Discovery(format!("catalog '{name}': {reason}")));
                }
            };
            debug!("Catalog {name} offered {} plugin(s)", found.len());
            all.extend(found);
        }
        Ok(all)
    }
}

/// Builds plugins from a catalog and registers them.
pub struct DiscoveryService {
    registry: Arc<TabPluginManager>,
    catalog: Box<dyn PluginCatalog>,
}

impl fmt::Debug for DiscoveryService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveryService")
            .field("catalog", &self.catalog.name())
            .field("registry", &self.registry)
            .finish()
    }
}

impl DiscoveryService {
    pub fn new(registry: Arc<TabPluginManager>, catalog: impl PluginCatalog + 'static) -> Self {
        Self { registry, catalog: Box::new(catalog) }
    }

    /// The registry this service feeds.
    pub fn registry(&self) -> &Arc<TabPluginManager> {
        &self.registry
    }

    /// Construct, initialize, and register every plugin the catalog offers.
    ///
    /// A plugin whose constructor or initialize hook fails is logged and left
    /// out; the rest still load. If the catalog itself fails, the registry is
    /// left as it was and the result carries the error.
    pub fn discover_and_register(&self) -> DiscoveryResult {
        let factories = match self.catalog.candidates() {
            Ok(factories) => factories,
            Err(e) => {
                error!("Failed to discover tab plugins: {e}");
                return DiscoveryResult::failure(e.to_string());
            }
        };

        let mut plugins = Vec::with_capacity(factories.len());
        for factory in &factories {
            match load(factory) {
                Ok(plugin) => {
                    debug!("Loaded tab plugin {} ({})", plugin.id(), factory.name());
                    plugins.push(plugin);
                }
                Err(e) => warn!("Skipping tab plugin {}: {e}", factory.name()),
            }
        }

        info!("Discovered {} tab plugin(s) from {} catalog", plugins.len(), self.catalog.name());

        let result = self.registry.register_plugins(plugins.clone());
        if result.is_successful() {
            info!(
                "Registration completed - {}/{} plugins enabled",
                result.enabled_count, result.total_discovered
            );
        } else {
            // Initialized but never registered; nothing else will clean them up.
            // Instances the registry still holds from an earlier pass stay live.
            let live = self.registry.available_plugins();
            for plugin in &plugins {
                if !live.iter().any(|p| p.is_same_instance(plugin)) {
                    plugin.cleanup();
                }
            }
        }

        result
    }

    /// Clear the registry and run discovery again.
    pub fn refresh(&self) -> DiscoveryResult {
        self.registry.cleanup();
        self.discover_and_register()
    }
}

fn load(factory: &PluginFactory) -> PluginResult<TabPlugin> {
    let plugin = factory.build().map_err(|e| match e {
        e @ PluginError::Construction { .. } => e,
        other => {
            PluginError::Construction { id: factory.name().to_string(), reason: other.to_string() }
        }
    })?;

    if let Err(e) = plugin.initialize() {
        plugin.cleanup();
        let id = plugin.id().to_string();
        return Err(PluginError::Initialization { id, reason: e.to_string() });
    }

    Ok(plugin)
}
