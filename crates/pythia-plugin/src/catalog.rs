//! Plugin catalog: plugin implementations addressable by module path.
//!
//! The catalog is filled at build time with the plugins linked into the
//! binary. The loader joins a module prefix with the plugin name from a
//! declaration (`pythia.plugins` + `sample` → `pythia.plugins.sample`) and
//! looks the result up here.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use pythia_core::config::{PluginDeclaration, RunConfig};
use pythia_core::error::AppError;
use pythia_core::result::AppResult;

use crate::hooks::registry::HookRegistry;

/// Trait that all plugins must implement.
pub trait Plugin: Send + Sync + std::fmt::Debug {
    /// Returns the plugin name, as used in plugin declarations.
    fn name(&self) -> &str;

    /// Called once per declaration naming this plugin.
    ///
    /// Receives the declaration, the registry accumulated by earlier plugins,
    /// and the run configuration. Registers zero or more handlers on
    /// `registry` and returns the result. The returned registry must keep
    /// every registration it was given.
    fn initialize(
        &self,
        declaration: &PluginDeclaration,
        registry: HookRegistry,
        config: &RunConfig,
    ) -> AppResult<HookRegistry>;
}

/// Joins a module prefix and a plugin name into a module path.
pub fn module_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Catalog of plugins available to the loader, keyed by module path.
#[derive(Debug, Clone, Default)]
pub struct PluginCatalog {
    /// Module path → plugin instance.
    plugins: BTreeMap<String, Arc<dyn Plugin>>,
}

impl PluginCatalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a plugin under an explicit module path.
    pub fn register(&mut self, path: impl Into<String>, plugin: Arc<dyn Plugin>) -> AppResult<()> {
        let path = path.into();

        if self.plugins.contains_key(&path) {
            return Err(AppError::validation(format!(
                "Plugin '{path}' is already in the catalog"
            )));
        }

        info!(path = %path, plugin = plugin.name(), "Plugin added to catalog");
        self.plugins.insert(path, plugin);
        Ok(())
    }

    /// Adds a plugin under `prefix` joined with the plugin's own name.
    pub fn register_under(&mut self, prefix: &str, plugin: Arc<dyn Plugin>) -> AppResult<()> {
        let path = module_path(prefix, plugin.name());
        self.register(path, plugin)
    }

    /// Looks up a plugin by module path.
    pub fn resolve(&self, path: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.get(path).cloned()
    }

    /// Checks whether a module path is in the catalog.
    pub fn contains(&self, path: &str) -> bool {
        self.plugins.contains_key(path)
    }

    /// Lists all module paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.plugins.keys().cloned().collect()
    }

    /// Returns the number of plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
