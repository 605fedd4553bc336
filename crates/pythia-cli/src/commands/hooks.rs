//! Hook catalog listing.

use serde::Serialize;
use tabled::Tabled;

use pythia_core::error::AppError;
use pythia_plugin::hooks::definitions::PluginHook;

use crate::output::{self, OutputFormat};

/// One row of the hook listing
#[derive(Debug, Serialize, Tabled)]
pub struct HookRow {
    /// Numeric code
    pub code: u16,
    /// Hook name
    pub hook: &'static str,
}

/// Rows for every hook, in pipeline order
pub fn rows() -> Vec<HookRow> {
    PluginHook::ALL
        .into_iter()
        .map(|hook| HookRow {
            code: hook.code(),
            hook: hook.as_str(),
        })
        .collect()
}

/// Execute the hooks command
pub fn execute(format: OutputFormat) -> Result<(), AppError> {
    output::print_list(&rows(), format);
    Ok(())
}
