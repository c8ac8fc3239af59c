//! tabhost - tab plugin registry host.
//!
//! Discovers the built-in tabs (plus any manifest tabs), registers them in
//! priority order, and prints the tab bar or a single tab's content.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tabhost::core::Config;
use tabhost::plugin::{PluginInfo, TabPlugin};
use tabhost::App;

/// Tab plugin registry host
#[derive(Parser)]
#[command(name = "tabhost")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the default lookup
    #[arg(short, long, global = true, env = "TABHOST_CONFIG")]
    config: Option<PathBuf>,

    /// Tab manifest to load alongside the built-in tabs
    #[arg(short, long, global = true)]
    manifest: Option<PathBuf>,

    /// Disable a tab after discovery (repeatable)
    #[arg(short, long, global = true)]
    disable: Vec<String>,

    /// Turn on developer mode for rendering
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the status line and tab bar (default)
    Tabs,

    /// List registered tab plugins
    List {
        /// Include disabled plugins
        #[arg(short, long)]
        all: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Render a tab's content
    Show {
        /// Plugin id
        id: String,
    },

    /// Show details about a tab plugin
    Info {
        /// Plugin id
        id: String,
    },

    /// Show configuration
    Config {
        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load()?,
    };

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Some(manifest) = cli.manifest {
        config.plugins.manifest = Some(manifest);
    }
    config.plugins.disabled.extend(cli.disable);
    config.ui.debug |= cli.debug;

    match cli.command {
        None | Some(Commands::Tabs) => cmd_tabs(config).await,
        Some(Commands::List { all, format }) => cmd_list(config, all, &format).await,
        Some(Commands::Show { id }) => cmd_show(config, &id).await,
        Some(Commands::Info { id }) => cmd_info(config, &id).await,
        Some(Commands::Config { path }) => cmd_config(&config, path, cli.config),
    }
}

async fn load(config: Config) -> App {
    let mut app = App::new(config);
    app.load_plugins_async().await;
    app
}

async fn cmd_tabs(config: Config) -> Result<()> {
    let app = load(config).await;

    println!("{}", app.status_line());
    println!("{}", app.tab_bar());

    if let Some(unit) = app.render_selected() {
        println!();
        print!("{unit}");
    }

    Ok(())
}

async fn cmd_list(config: Config, all: bool, format: &str) -> Result<()> {
    let app = load(config).await;
    let registry = app.registry();

    let plugins: Vec<TabPlugin> =
        if all { registry.available_plugins() } else { registry.enabled_plugins() };

    match format {
        "json" => {
            let entries: Vec<ListEntry> = plugins
                .iter()
                .map(|p| ListEntry { active: registry.is_plugin_enabled(p.id()), info: p.info() })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        "text" => {
            if plugins.is_empty() {
                println!("No tab plugins registered.");
                println!("\n{}", app.status_line());
                return Ok(());
            }

            for plugin in &plugins {
                let state =
                    if registry.is_plugin_enabled(plugin.id()) { "enabled" } else { "disabled" };
                println!(
                    "  {:>4}  {} v{} [{}] - {}",
                    plugin.priority(),
                    plugin.id(),
                    plugin.version(),
                    state,
                    plugin.title()
                );
            }
            println!("\nTotal: {} plugin(s)", plugins.len());
        }
        other => bail!("Unknown format '{other}' (expected text or json)"),
    }

    Ok(())
}

#[derive(serde::Serialize)]
struct ListEntry {
    #[serde(flatten)]
    info: PluginInfo,
    active: bool,
}

async fn cmd_show(config: Config, id: &str) -> Result<()> {
    let app = load(config).await;
    let plugin = app.registry().require_plugin(id)?;

    print!("{}", plugin.render(&app.config.render_context()));
    Ok(())
}

async fn cmd_info(config: Config, id: &str) -> Result<()> {
    let app = load(config).await;
    let registry = app.registry();
    let plugin = registry.require_plugin(id)?;

    println!("{} ({})", plugin.title(), plugin.id());
    println!("  Version:  {}", plugin.version());
    println!("  Priority: {}", plugin.priority());
    println!(
        "  State:    {}",
        if registry.is_plugin_enabled(id) { "enabled" } else { "disabled" }
    );
    if !plugin.is_enabled() {
        println!("  Capability flag: off");
    }
    if !plugin.description().is_empty() {
        println!("  {}", plugin.description());
    }

    Ok(())
}

fn cmd_config(config: &Config, show_path: bool, explicit: Option<PathBuf>) -> Result<()> {
    if show_path {
        match explicit.or_else(Config::find_config_file) {
            Some(path) => println!("{}", path.display()),
            None => match Config::global_config_path() {
                Some(path) => println!("{} (not created)", path.display()),
                None => bail!("Could not determine config directory"),
            },
        }
        return Ok(());
    }

    print!("{}", config.to_toml()?);
    Ok(())
}
