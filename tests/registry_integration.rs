//! Registry and discovery integration tests.
//!
//! Each test builds its own registry; nothing is shared between tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tabhost::plugin::{
    builtin, DiscoveryService, PluginError, PluginFactory, RegistrySnapshot, StaticCatalog,
    TabPlugin, TabPluginManager,
};

fn plugin(id: &str, priority: i32) -> TabPlugin {
    TabPlugin::new(id, id, "1.0.0").with_priority(priority)
}

fn enabled_ids(registry: &TabPluginManager) -> Vec<String> {
    registry.enabled_plugins().iter().map(|p| p.id().to_string()).collect()
}

/// Every enabled id is also available.
fn assert_subset(snapshot: &RegistrySnapshot) {
    let available = snapshot.available_ids();
    for id in snapshot.enabled_ids() {
        assert!(available.contains(&id), "{id} enabled but not available");
    }
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_priority_scenario() {
    let registry = TabPluginManager::new();
    registry.register_plugins(vec![
        plugin("A", 100),
        plugin("B", 1),
        plugin("C", 99),
        plugin("D", 10),
    ]);

    assert_eq!(enabled_ids(&registry), vec!["B", "D", "C", "A"]);
}

#[test]
fn test_registration_is_deterministic() {
    let input = || vec![plugin("a", 3), plugin("b", 3), plugin("c", 1), plugin("d", 2)];
    let registry = TabPluginManager::new();

    registry.register_plugins(input());
    let first = enabled_ids(&registry);

    registry.cleanup();
    registry.register_plugins(input());

    assert_eq!(enabled_ids(&registry), first);
    assert_eq!(first, vec!["c", "d", "a", "b"]);
}

#[test]
fn test_reenable_is_resorted() {
    let registry = TabPluginManager::new();
    registry.register_plugins(vec![plugin("a", 1), plugin("b", 2), plugin("c", 3)]);

    assert!(registry.disable_plugin("a"));
    assert!(registry.disable_plugin("c"));
    assert!(registry.enable_plugin("c"));
    assert!(registry.enable_plugin("a"));

    assert_eq!(enabled_ids(&registry), vec!["a", "b", "c"]);
}

// ============================================================================
// Enable / disable
// ============================================================================

#[test]
fn test_enable_already_enabled_is_noop() {
    let registry = TabPluginManager::new();
    registry.register_plugins(vec![plugin("a", 1), plugin("b", 2)]);

    assert!(!registry.enable_plugin("a"));
    assert_eq!(enabled_ids(&registry), vec!["a", "b"]);
}

#[test]
fn test_disable_not_enabled_is_noop() {
    let registry = TabPluginManager::new();
    registry.register_plugins(vec![plugin("a", 1)]);
    registry.disable_plugin("a");

    assert!(!registry.disable_plugin("a"));
    assert!(!registry.disable_plugin("never_registered"));
    assert!(enabled_ids(&registry).is_empty());
}

#[test]
fn test_enable_unknown_id() {
    let registry = TabPluginManager::new();
    registry.register_plugins(vec![plugin("a", 1)]);

    assert!(!registry.enable_plugin("unknown_id"));
    assert_eq!(enabled_ids(&registry), vec!["a"]);
}

#[test]
fn test_enable_before_registration() {
    let registry = TabPluginManager::new();
    assert!(!registry.enable_plugin("a"));
    assert!(!registry.disable_plugin("a"));
    assert!(registry.get_plugin("a").is_none());
}

// ============================================================================
// Cleanup
// ============================================================================

#[test]
fn test_cleanup_resets_everything() {
    let registry = TabPluginManager::new();
    registry.register_plugins(vec![plugin("a", 1), plugin("b", 2)]);
    registry.disable_plugin("b");

    registry.cleanup();

    assert!(!registry.is_initialized());
    assert!(registry.available_plugins().is_empty());
    assert!(registry.enabled_plugins().is_empty());

    registry.cleanup();
    assert!(!registry.is_initialized());
}

#[test]
fn test_cleanup_calls_hook_without_initialize() {
    let cleanups = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&cleanups);
    let registry = TabPluginManager::new();

    // Registered directly, so initialize was never called.
    registry.register_plugins(vec![plugin("a", 1).on_cleanup(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })]);
    registry.cleanup();

    assert_eq!(cleanups.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Discovery
// ============================================================================

#[test]
fn test_failing_constructor_is_left_out() {
    let registry = Arc::new(TabPluginManager::new());
    let catalog = StaticCatalog::new()
        .with("exploding", || {
            Err(PluginError::Construction { id: "exploding".into(), reason: "panic".into() })
        })
        .with_factory(PluginFactory::from_plugin(plugin("working", 5)));

    let result = DiscoveryService::new(Arc::clone(&registry), catalog).discover_and_register();

    assert!(result.is_successful());
    assert_eq!(result.total_discovered, 1);
    assert_eq!(result.enabled_count, 1);
    assert_eq!(result.plugin_ids, vec!["working"]);
    assert!(!result.plugin_ids.contains(&"exploding".to_string()));
}

#[test]
fn test_initialize_runs_once_per_registration() {
    let inits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&inits);
    let registry = Arc::new(TabPluginManager::new());
    let catalog = StaticCatalog::new().with_factory(PluginFactory::from_plugin(
        plugin("a", 1).on_initialize(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }),
    ));
    let service = DiscoveryService::new(Arc::clone(&registry), catalog);

    service.discover_and_register();
    assert_eq!(inits.load(Ordering::SeqCst), 1);

    service.refresh();
    assert_eq!(inits.load(Ordering::SeqCst), 2);
}

#[test]
fn test_rediscovery_keeps_live_plugin_initialized() {
    let live = Arc::new(AtomicUsize::new(0));
    let on_init = Arc::clone(&live);
    let on_cleanup = Arc::clone(&live);
    let registry = Arc::new(TabPluginManager::new());
    let catalog = StaticCatalog::new().with_factory(PluginFactory::from_plugin(
        plugin("shared", 1)
            .on_initialize(move || {
                on_init.store(1, Ordering::SeqCst);
                Ok(())
            })
            .on_cleanup(move || on_cleanup.store(0, Ordering::SeqCst)),
    ));
    let service = DiscoveryService::new(Arc::clone(&registry), catalog);

    service.discover_and_register();
    service.discover_and_register();

    assert!(registry.is_plugin_enabled("shared"));
    assert_eq!(live.load(Ordering::SeqCst), 1, "registered plugin was cleaned up");

    registry.cleanup();
    assert_eq!(live.load(Ordering::SeqCst), 0);
}

#[test]
fn test_builtin_discovery() {
    let registry = Arc::new(TabPluginManager::new());
    let result =
        DiscoveryService::new(Arc::clone(&registry), builtin::catalog()).discover_and_register();

    assert_eq!(result.to_string(), "discovered 4, enabled 4");
    assert_eq!(
        enabled_ids(&registry),
        vec!["main_tab", "jintianchishenme_tab", "demo_tab", "settings_tab"]
    );
}

// ============================================================================
// Observation
// ============================================================================

#[tokio::test]
async fn test_subscriber_sees_every_change() {
    let registry = Arc::new(TabPluginManager::new());
    let mut rx = registry.subscribe();
    assert!(!rx.borrow().initialized);

    registry.register_plugins(vec![plugin("a", 2), plugin("b", 1)]);
    rx.changed().await.unwrap();
    {
        let snapshot = rx.borrow_and_update();
        assert!(snapshot.initialized);
        assert_eq!(snapshot.enabled_ids(), vec!["b", "a"]);
        assert_subset(&snapshot);
    }

    registry.disable_plugin("b");
    rx.changed().await.unwrap();
    {
        let snapshot = rx.borrow_and_update();
        assert_eq!(snapshot.enabled_ids(), vec!["a"]);
        assert_eq!(snapshot.available_ids(), vec!["b", "a"]);
        assert_subset(&snapshot);
    }

    registry.cleanup();
    rx.changed().await.unwrap();
    let snapshot = rx.borrow_and_update().clone();
    assert!(snapshot.available.is_empty());
    assert!(!snapshot.initialized);
}

#[tokio::test]
async fn test_concurrent_readers_never_see_broken_subset() {
    let registry = Arc::new(TabPluginManager::new());
    registry.register_plugins((0..8).map(|i| plugin(&format!("p{i}"), i)).collect());

    let mut readers = Vec::new();
    for _ in 0..4 {
        let mut rx = registry.subscribe();
        readers.push(tokio::spawn(async move {
            for _ in 0..50 {
                if rx.changed().await.is_err() {
                    break;
                }
                assert_subset(&rx.borrow_and_update());
            }
        }));
    }

    let writer = Arc::clone(&registry);
    tokio::task::spawn_blocking(move || {
        for round in 0..200 {
            let id = format!("p{}", round % 8);
            if !writer.disable_plugin(&id) {
                writer.enable_plugin(&id);
            }
        }
    })
    .await
    .unwrap();

    drop(registry);
    for reader in readers {
        reader.await.unwrap();
    }
}
