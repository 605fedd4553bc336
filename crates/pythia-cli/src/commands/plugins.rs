//! Registered handler listing.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use pythia_core::config::{RunConfig, Settings};
use pythia_core::error::AppError;
use pythia_plugin::hooks::registry::HookRegistry;

use crate::output::{self, OutputFormat};

/// Arguments for the plugins command
#[derive(Debug, Args)]
pub struct PluginsArgs {
    /// JSON run configuration to load plugins from
    pub config: PathBuf,
}

/// One registered handler
#[derive(Debug, Serialize, Tabled)]
pub struct HandlerRow {
    /// Hook name
    pub hook: String,
    /// Position within the hook (dispatch order)
    pub position: usize,
    /// Handler name
    pub handler: String,
    /// Handler configuration
    pub config: String,
}

/// Rows for every registered handler, by hook then dispatch order
pub fn rows(registry: &HookRegistry) -> Vec<HandlerRow> {
    registry
        .registered_hooks()
        .into_iter()
        .flat_map(|hook| {
            registry
                .handlers(hook)
                .iter()
                .enumerate()
                .map(move |(position, entry)| HandlerRow {
                    hook: hook.to_string(),
                    position: position + 1,
                    handler: entry.handler().name().to_string(),
                    config: entry.config().to_string(),
                })
        })
        .collect()
}

/// Execute the plugins command
pub fn execute(args: &PluginsArgs, settings: &Settings, format: OutputFormat) -> Result<(), AppError> {
    let config = RunConfig::load(&args.config)?;
    let (registry, _loader) = super::load_plugins(&config, settings)?;
    output::print_list(&rows(&registry), format);
    Ok(())
}
