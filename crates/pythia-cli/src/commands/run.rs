//! Run preparation: load plugins, apply `post_config` handlers, emit the
//! final configuration.

use std::path::PathBuf;

use clap::Args;
use serde_json::Value;
use tracing::{info, warn};

use pythia_core::config::{RunConfig, Settings};
use pythia_core::error::AppError;
use pythia_core::result::AppResult;
use pythia_plugin::hook_args;
use pythia_plugin::hooks::definitions::{FULL_CONFIG, PluginHook};
use pythia_plugin::hooks::dispatcher::dispatch;
use pythia_plugin::hooks::registry::HookRegistry;

use crate::output;

/// Arguments for the run command
#[derive(Debug, Args)]
pub struct RunArgs {
    /// JSON run configuration
    pub config: PathBuf,

    /// Suppress console output of the run
    #[arg(short, long)]
    pub quiet: bool,

    /// Export the run list instead of running
    #[arg(long)]
    pub export_runlist: bool,
}

/// Execute the run command
pub fn execute(args: &RunArgs, settings: &Settings) -> Result<(), AppError> {
    let config = prepare(args, settings)?;
    output::print_json(&config);
    Ok(())
}

/// Loads the run configuration and its plugins, then lets `post_config`
/// handlers rewrite it.
pub fn prepare(args: &RunArgs, settings: &Settings) -> AppResult<RunConfig> {
    let mut config = RunConfig::load(&args.config)?;
    config.set("exportRunlist", Value::Bool(args.export_runlist));

    let (registry, _loader) = super::load_plugins(&config, settings)?;
    info!(
        hooks = registry.registered_hooks().len(),
        handlers = registry.total_handlers(),
        "Plugins loaded"
    );

    let mut config = apply_post_config(config, &registry)?;
    config.set("silence", Value::Bool(args.quiet));
    Ok(config)
}

/// Dispatches [`PluginHook::PostConfig`] with the configuration under
/// `full_config` and reads the rewritten configuration back.
///
/// A result without a usable `full_config` leaves the configuration as it was.
pub fn apply_post_config(config: RunConfig, registry: &HookRegistry) -> AppResult<RunConfig> {
    let merged = dispatch(
        PluginHook::PostConfig,
        registry,
        hook_args! { FULL_CONFIG => config.to_value()? },
    )?;

    match merged.get(FULL_CONFIG).cloned().map(RunConfig::from_value) {
        Some(Ok(updated)) => Ok(updated),
        Some(Err(e)) => {
            warn!(error = %e, "post_config returned an unusable configuration, keeping the original");
            output::print_warning("post_config handlers returned an unusable configuration");
            Ok(config)
        }
        None => {
            warn!("post_config dropped the configuration, keeping the original");
            Ok(config)
        }
    }
}
