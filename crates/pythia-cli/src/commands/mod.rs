//! CLI command definitions and dispatch.

pub mod hooks;
pub mod plugins;
pub mod run;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use plugin_sample::SamplePlugin;
use pythia_core::config::{RunConfig, Settings};
use pythia_core::error::AppError;
use pythia_plugin::catalog::PluginCatalog;
use pythia_plugin::hooks::registry::HookRegistry;
use pythia_plugin::loader::PluginLoader;

use crate::output::OutputFormat;

/// Pythia plugin-hook driver for simulation pipelines
#[derive(Debug, Parser)]
#[command(name = "pythia", version, about, long_about = None)]
pub struct Cli {
    /// Path to the settings file (defaults to ./pythia.toml if present)
    #[arg(short, long, global = true)]
    pub settings: Option<PathBuf>,

    /// Write logs to <prefix>-YYYYmmdd-HHMMSS.log instead of stderr
    #[arg(long, global = true)]
    pub logfile_prefix: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the hook catalog
    Hooks,
    /// Load the plugins of a run configuration and list their handlers
    Plugins(plugins::PluginsArgs),
    /// Load plugins, apply post_config handlers, and print the final configuration
    Run(run::RunArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(&self, settings: &Settings) -> Result<(), AppError> {
        match &self.command {
            Commands::Hooks => hooks::execute(self.format),
            Commands::Plugins(args) => plugins::execute(args, settings, self.format),
            Commands::Run(args) => run::execute(args, settings),
        }
    }
}

/// Builds the catalog of plugins linked into this binary.
pub fn build_catalog(settings: &Settings) -> Result<PluginCatalog, AppError> {
    let mut catalog = PluginCatalog::new();
    catalog.register_under(&settings.plugins.module_prefix, Arc::new(SamplePlugin::new()))?;
    Ok(catalog)
}

/// Helper: build the hook registry for a run configuration.
///
/// The loader is returned alongside the registry because dynamically loaded
/// plugins stay mapped only while it lives.
pub fn load_plugins(
    config: &RunConfig,
    settings: &Settings,
) -> Result<(HookRegistry, PluginLoader), AppError> {
    let mut loader = PluginLoader::from_settings(build_catalog(settings)?, &settings.plugins);
    let registry = loader.load_plugins(config, HookRegistry::new());
    Ok((registry, loader))
}
