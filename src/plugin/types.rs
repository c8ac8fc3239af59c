//! Core plugin types.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Priority assigned to plugins that do not set one.
pub const DEFAULT_PRIORITY: i32 = 100;

/// Content factory for a tab.
pub type RenderFn = Arc<dyn Fn(&RenderContext) -> RenderUnit + Send + Sync>;

/// Initialize hook. An `Err` drops the plugin from the current discovery pass.
pub type InitFn = Arc<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// Cleanup hook.
pub type CleanupFn = Arc<dyn Fn() + Send + Sync>;

/// Display context handed to a plugin's content factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderContext {
    /// Available width in columns.
    pub width: usize,
    /// Whether developer/debug mode is on.
    pub debug: bool,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self { width: 80, debug: false }
    }
}

/// Renderable output produced by a plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderUnit {
    /// Heading shown above the body.
    pub title: String,
    /// Body lines.
    pub lines: Vec<String>,
}

impl RenderUnit {
    /// Create an empty unit with a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), lines: Vec::new() }
    }

    /// Append a body line.
    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }
}

impl fmt::Display for RenderUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        for line in &self.lines {
            writeln!(f, "  {line}")?;
        }
        Ok(())
    }
}

/// A tab plugin: descriptor fields plus the closures that render and manage it.
///
/// Plugins are plain records. Clones share the same closures, so cloning a
/// plugin into the registry's snapshots is cheap.
#[derive(Clone)]
pub struct TabPlugin {
    id: String,
    title: String,
    version: String,
    priority: i32,
    enabled: bool,
    description: String,
    render: RenderFn,
    on_initialize: InitFn,
    on_cleanup: CleanupFn,
}

impl TabPlugin {
    /// Create a plugin with default priority, no description, and no-op hooks.
    ///
    /// The default content factory renders an empty body under the plugin title.
    pub fn new(id: impl Into<String>, title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            version: version.into(),
            priority: DEFAULT_PRIORITY,
            enabled: true,
            description: String::new(),
            render: Arc::new(|_| RenderUnit::default()),
            on_initialize: Arc::new(|| Ok(())),
            on_cleanup: Arc::new(|| {}),
        }
    }

    /// Set the ordering priority (lower sorts first).
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the intrinsic capability flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the content factory.
    pub fn with_renderer<F>(mut self, render: F) -> Self
    where
        F: Fn(&RenderContext) -> RenderUnit + Send + Sync + 'static,
    {
        self.render = Arc::new(render);
        self
    }

    /// Set the initialize hook.
    pub fn on_initialize<F>(mut self, hook: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.on_initialize = Arc::new(hook);
        self
    }

    /// Set the cleanup hook.
    pub fn on_cleanup<F>(mut self, hook: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_cleanup = Arc::new(hook);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Intrinsic capability flag. Not consulted by the registry.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Produce this tab's content.
    ///
    /// An empty unit from the factory gets the plugin title filled in.
    pub fn render(&self, ctx: &RenderContext) -> RenderUnit {
        let mut unit = (self.render)(ctx);
        if unit.title.is_empty() {
            unit.title.clone_from(&self.title);
        }
        unit
    }

    /// Run the initialize hook.
    pub fn initialize(&self) -> anyhow::Result<()> {
        (self.on_initialize)()
    }

    /// Run the cleanup hook.
    pub fn cleanup(&self) {
        (self.on_cleanup)();
    }

    /// Whether `other` is a clone of this plugin: same id and the same cleanup hook.
    pub(crate) fn is_same_instance(&self, other: &TabPlugin) -> bool {
        self.id == other.id && Arc::ptr_eq(&self.on_cleanup, &other.on_cleanup)
    }

    /// Serializable view of the descriptor fields.
    pub fn info(&self) -> PluginInfo {
        PluginInfo {
            id: self.id.clone(),
            title: self.title.clone(),
            version: self.version.clone(),
            priority: self.priority,
            enabled: self.enabled,
            description: self.description.clone(),
        }
    }
}

impl fmt::Debug for TabPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabPlugin")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("version", &self.version)
            .field("priority", &self.priority)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// Descriptor fields of a plugin, without its closures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    /// Unique plugin id.
    pub id: String,
    /// Tab label.
    pub title: String,
    /// Plugin version.
    pub version: String,
    /// Ordering priority.
    pub priority: i32,
    /// Intrinsic capability flag.
    pub enabled: bool,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Outcome of a discovery or registration pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    /// Number of plugins handed to registration.
    pub total_discovered: usize,
    /// Number of plugins enabled afterwards.
    pub enabled_count: usize,
    /// Ids attempted, in discovery order.
    pub plugin_ids: Vec<String>,
    /// Failure message; present means the pass failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DiscoveryResult {
    /// A failed pass with zero counts.
    pub fn failure(error: impl Into<String>) -> Self {
        Self { error: Some(error.into()), ..Self::default() }
    }

    pub fn is_successful(&self) -> bool {
        self.error.is_none()
    }
}

impl fmt::Display for DiscoveryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            Some(err) => write!(f, "plugin discovery failed: {err}"),
            None => {
                write!(f, "discovered {}, enabled {}", self.total_discovered, self.enabled_count)
            }
        }
    }
}
