//! Hook implementations for the sample plugin.

use serde_json::Value;

use pythia_core::error::AppError;
use pythia_core::result::AppResult;
use pythia_plugin::hooks::definitions::{FULL_CONFIG, HookArgs, HookPatch};
use pythia_plugin::hooks::registry::HookHandler;

/// Result key listing the hooks a marker handler has seen.
pub const MARKERS: &str = "markers";

/// Hook handler for post_config: overlay configured values on the run
/// configuration.
///
/// Handler config is the overrides object itself. Each top-level key of it
/// replaces the same key of `full_config`.
#[derive(Debug, Default)]
pub struct OverridesHook;

impl HookHandler for OverridesHook {
    fn name(&self) -> &str {
        "sample_overrides"
    }

    fn handle(
        &self,
        config: &Value,
        merged: &HookArgs,
        _args: &HookArgs,
    ) -> AppResult<Option<HookPatch>> {
        let Some(overrides) = config.as_object().filter(|o| !o.is_empty()) else {
            return Ok(None);
        };

        let mut full_config = merged
            .get(FULL_CONFIG)
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| {
                AppError::handler("post_config hook: full_config missing or not an object")
            })?;

        for (key, value) in overrides {
            tracing::info!(key = %key, "Sample plugin overriding configuration value");
            full_config.insert(key.clone(), value.clone());
        }

        Ok(Some(
            HookPatch::new().set(FULL_CONFIG, Value::Object(full_config)),
        ))
    }
}

/// Hook handler appending the current hook name to `markers`.
///
/// One instance is shared across every hook it is registered on; the hook
/// name comes from the handler config (`{"hook": "<name>"}`).
#[derive(Debug, Default)]
pub struct MarkerHook;

impl HookHandler for MarkerHook {
    fn name(&self) -> &str {
        "sample_marker"
    }

    fn handle(
        &self,
        config: &Value,
        merged: &HookArgs,
        _args: &HookArgs,
    ) -> AppResult<Option<HookPatch>> {
        let Some(hook) = config.get("hook").and_then(Value::as_str) else {
            return Ok(None);
        };

        let mut markers = match merged.get(MARKERS) {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        };
        markers.push(Value::String(hook.to_string()));

        tracing::debug!(hook = %hook, count = markers.len(), "Sample plugin marker");
        Ok(Some(HookPatch::new().set(MARKERS, Value::Array(markers))))
    }
}
