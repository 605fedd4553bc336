//! Sample plugin implementation: registers with the Pythia plugin system.

use std::sync::Arc;

use serde_json::{Value, json};

use pythia_core::config::{PluginDeclaration, RunConfig};
use pythia_core::result::AppResult;
use pythia_plugin::catalog::Plugin;
use pythia_plugin::hooks::definitions::PluginHook;
use pythia_plugin::hooks::registry::{HookHandler, HookRegistry};

use crate::hooks::{MarkerHook, OverridesHook};

/// Sample plugin for Pythia
#[derive(Debug)]
pub struct SamplePlugin {
    /// Shared overrides handler
    overrides: Arc<dyn HookHandler>,
    /// Shared marker handler
    marker: Arc<dyn HookHandler>,
}

impl SamplePlugin {
    /// Name used in plugin declarations
    pub const NAME: &'static str = "sample";

    /// Create a new sample plugin
    pub fn new() -> Self {
        Self {
            overrides: Arc::new(OverridesHook),
            marker: Arc::new(MarkerHook),
        }
    }
}

impl Default for SamplePlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for SamplePlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn initialize(
        &self,
        declaration: &PluginDeclaration,
        registry: HookRegistry,
        _config: &RunConfig,
    ) -> AppResult<HookRegistry> {
        let mut registry = registry;

        if let Some(overrides) = declaration.param("overrides") {
            registry = registry.register(
                PluginHook::PostConfig,
                Arc::clone(&self.overrides),
                overrides.clone(),
            );
        }

        let markers = declaration
            .param("markers")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for marker in markers {
            let Some(hook) = marker.as_str() else {
                tracing::warn!(marker = %marker, "Ignoring marker because it is not a hook name");
                continue;
            };
            registry = registry.register_named(
                hook,
                Some(Arc::clone(&self.marker)),
                json!({ "hook": hook }),
            );
        }

        tracing::info!(
            handlers = registry.total_handlers(),
            "Sample plugin hooks registered"
        );
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pythia_plugin::hooks::definitions::HookArgs;
    use pythia_plugin::hooks::dispatcher::dispatch;
    use pythia_plugin::hook_args;

    fn declaration(value: Value) -> PluginDeclaration {
        serde_json::from_value(value).expect("declaration")
    }

    #[test]
    fn test_registers_overrides_on_post_config() {
        let plugin = SamplePlugin::new();
        let registry = plugin
            .initialize(
                &declaration(json!({"plugin": "sample", "overrides": {"cores": 4}})),
                HookRegistry::new(),
                &RunConfig::default(),
            )
            .unwrap();

        assert_eq!(registry.handler_count(PluginHook::PostConfig), 1);

        let result = dispatch(
            PluginHook::PostConfig,
            &registry,
            hook_args! { "full_config" => json!({"workDir": "w"}) },
        )
        .unwrap();
        assert_eq!(result.get("full_config"), Some(&json!({"workDir": "w", "cores": 4})));
    }

    #[test]
    fn test_non_object_overrides_rejected() {
        let registry = SamplePlugin::new()
            .initialize(
                &declaration(json!({"plugin": "sample", "overrides": [1, 2]})),
                HookRegistry::new(),
                &RunConfig::default(),
            )
            .unwrap();

        assert!(registry.is_empty());
    }

    #[test]
    fn test_markers_skip_unknown_hooks() {
        let registry = SamplePlugin::new()
            .initialize(
                &declaration(json!({
                    "plugin": "sample",
                    "markers": ["pre_run", "pre_lunch", 42, "post_run_all"]
                })),
                HookRegistry::new(),
                &RunConfig::default(),
            )
            .unwrap();

        assert_eq!(
            registry.registered_hooks(),
            vec![PluginHook::PreRun, PluginHook::PostRunAll]
        );

        let after_run = dispatch(PluginHook::PreRun, &registry, HookArgs::new()).unwrap();
        let after_all = dispatch(PluginHook::PostRunAll, &registry, after_run).unwrap();
        assert_eq!(after_all.get("markers"), Some(&json!(["pre_run", "post_run_all"])));
    }

    #[test]
    fn test_second_initialize_does_not_duplicate_handlers() {
        let plugin = SamplePlugin::new();
        let decl = declaration(json!({"plugin": "sample", "overrides": {"a": 1}, "markers": ["pre_run"]}));

        let once = plugin
            .initialize(&decl, HookRegistry::new(), &RunConfig::default())
            .unwrap();
        let twice = plugin.initialize(&decl, once.clone(), &RunConfig::default()).unwrap();

        assert_eq!(twice, once);
    }
}
