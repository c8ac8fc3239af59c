//! Built-in tab plugins.

use tracing::info;

use super::{PluginFactory, RenderContext, RenderUnit, StaticCatalog, TabPlugin};

/// Id of the home tab.
pub const MAIN_TAB: &str = "main_tab";

/// Id of the meal suggestion tab.
pub const MEAL_TAB: &str = "jintianchishenme_tab";

/// Id of the platform/demo tab.
pub const DEMO_TAB: &str = "demo_tab";

/// Id of the settings tab.
pub const SETTINGS_TAB: &str = "settings_tab";

/// Catalog of every built-in tab, in construction order.
pub fn catalog() -> StaticCatalog {
    StaticCatalog::new()
        .with_factory(PluginFactory::new(MAIN_TAB, || Ok(main_tab())))
        .with_factory(PluginFactory::new(MEAL_TAB, || Ok(meal_tab())))
        .with_factory(PluginFactory::new(DEMO_TAB, || Ok(demo_tab())))
        .with_factory(PluginFactory::new(SETTINGS_TAB, || Ok(settings_tab())))
}

/// Home tab with the meal suggestion summary.
pub fn main_tab() -> TabPlugin {
    TabPlugin::new(MAIN_TAB, "Home", "1.0.0")
        .with_priority(1)
        .with_description("Main page with meal suggestions and the current order")
        .with_renderer(|_| {
            RenderUnit::new("Home")
                .line("What should we eat today?")
                .line("Pick a suggestion to start an order.")
        })
        .on_initialize(|| {
            info!("Main tab plugin initialized");
            Ok(())
        })
        .on_cleanup(|| info!("Main tab plugin cleaned up"))
}

/// Dishes offered by the meal tab: name, category, calories.
const MENU: &[(&str, &str, u32)] = &[
    ("红烧肉", "中餐", 800),
    ("宫保鸡丁", "中餐", 600),
    ("番茄炒蛋", "中餐", 300),
    ("水煮鱼", "川菜", 700),
    ("鸡蛋面", "面食", 480),
    ("意大利面", "西餐", 520),
    ("日式拉面", "日料", 550),
    ("寿司", "日料", 350),
];

/// Meal suggestion tab, packaged as its own feature module.
pub fn meal_tab() -> TabPlugin {
    TabPlugin::new(MEAL_TAB, "今天吃什么", "2.0.0")
        .with_priority(10)
        .with_description("Meal suggestion feature module")
        .with_renderer(render_menu)
        .on_initialize(|| {
            info!("Meal tab plugin initialized - version 2.0.0");
            Ok(())
        })
        .on_cleanup(|| info!("Meal tab plugin cleaned up"))
}

fn render_menu(ctx: &RenderContext) -> RenderUnit {
    let mut unit = RenderUnit::new("今天吃什么").line("今天你想吃点什么呢？");
    for (name, category, calories) in MENU {
        unit = unit.line(format!("{name} ({category}) {calories}卡"));
    }
    if ctx.debug {
        unit = unit.line(format!("{} dishes", MENU.len()));
    }
    unit
}

/// Demo tab that reports the running platform.
pub fn demo_tab() -> TabPlugin {
    TabPlugin::new(DEMO_TAB, "Demo", "1.0.0")
        .with_priority(99)
        .with_description("Demo and debugging page showing platform information")
        .with_renderer(|ctx| {
            let mut unit = RenderUnit::new("Demo")
                .line(format!("Platform: {}", std::env::consts::OS))
                .line(format!("Architecture: {}", std::env::consts::ARCH))
                .line(format!("Family: {}", std::env::consts::FAMILY));
            if ctx.debug {
                unit = unit.line(format!("Version: {}", crate::VERSION));
            }
            unit
        })
        .on_initialize(|| {
            info!("Demo tab plugin initialized");
            Ok(())
        })
        .on_cleanup(|| info!("Demo tab plugin cleaned up"))
}

/// Settings tab. Shows the display context the host passes in.
pub fn settings_tab() -> TabPlugin {
    TabPlugin::new(SETTINGS_TAB, "Settings", "1.0.0")
        .with_priority(900)
        .with_description("Application settings, including developer options")
        .with_renderer(render_settings)
        .on_initialize(|| {
            info!("Settings tab plugin initialized - version 1.0.0");
            Ok(())
        })
        .on_cleanup(|| info!("Settings tab plugin cleaned up"))
}

fn render_settings(ctx: &RenderContext) -> RenderUnit {
    let debug = if ctx.debug { "on" } else { "off" };
    RenderUnit::new("Settings")
        .line(format!("Developer mode: {debug}"))
        .line(format!("Display width: {}", ctx.width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::PluginCatalog;

    #[test]
    fn test_catalog_order() {
        let names: Vec<_> =
            catalog().candidates().unwrap().iter().map(|f| f.name().to_string()).collect();
        assert_eq!(names, vec![MAIN_TAB, MEAL_TAB, DEMO_TAB, SETTINGS_TAB]);
    }

    #[test]
    fn test_priorities() {
        assert_eq!(main_tab().priority(), 1);
        assert_eq!(meal_tab().priority(), 10);
        assert_eq!(demo_tab().priority(), 99);
        assert_eq!(settings_tab().priority(), 900);
    }

    #[test]
    fn test_demo_shows_version_in_debug() {
        let plain = demo_tab().render(&RenderContext { width: 80, debug: false });
        let debug = demo_tab().render(&RenderContext { width: 80, debug: true });

        assert!(plain.lines[0].starts_with("Platform: "));
        assert_eq!(debug.lines.len(), plain.lines.len() + 1);
    }

    #[test]
    fn test_meal_tab_lists_menu() {
        let plugin = meal_tab();
        assert_eq!(plugin.version(), "2.0.0");

        let unit = plugin.render(&RenderContext::default());
        assert_eq!(unit.title, "今天吃什么");
        assert_eq!(unit.lines[0], "今天你想吃点什么呢？");
        assert_eq!(unit.lines[1], "红烧肉 (中餐) 800卡");
        assert_eq!(unit.lines.len(), MENU.len() + 1);
    }

    #[test]
    fn test_settings_reflects_context() {
        let unit = settings_tab().render(&RenderContext { width: 120, debug: true });
        assert_eq!(unit.lines, vec!["Developer mode: on", "Display width: 120"]);
    }

    #[test]
    fn test_hooks_succeed() {
        for plugin in [main_tab(), meal_tab(), demo_tab(), settings_tab()] {
            assert!(plugin.initialize().is_ok());
            plugin.cleanup();
        }
    }
}
