//! Plugin loader: builds the hook registry from the run configuration.
//!
//! Declarations are processed in order. Each one is resolved to a plugin via
//! the catalog (and, with the `dynamic` feature, a shared library directory),
//! then the plugin's `initialize` is handed the registry built so far.
//! Anything that goes wrong for one declaration is logged and that
//! declaration is skipped; loading always runs to the end of the list.

use std::sync::Arc;

use tracing::{info, warn};

use pythia_core::config::{PluginDeclaration, PluginSettings, RunConfig};

use crate::catalog::{Plugin, PluginCatalog, module_path};
use crate::hooks::registry::HookRegistry;

/// Default module prefix joined with plugin names.
pub const DEFAULT_MODULE_PREFIX: &str = "pythia.plugins";

/// Loads plugins named in a run configuration.
#[derive(Debug)]
pub struct PluginLoader {
    /// Plugins linked into the binary.
    catalog: PluginCatalog,
    /// Module prefix joined with declaration names.
    module_prefix: String,
    /// Shared-library loader used when the catalog has no match.
    #[cfg(feature = "dynamic")]
    dynamic: dynamic_loader::DynamicLoader,
}

impl PluginLoader {
    /// Creates a loader over `catalog` with the default module prefix.
    pub fn new(catalog: PluginCatalog) -> Self {
        Self {
            catalog,
            module_prefix: DEFAULT_MODULE_PREFIX.to_string(),
            #[cfg(feature = "dynamic")]
            dynamic: dynamic_loader::DynamicLoader::new("./plugins"),
        }
    }

    /// Creates a loader configured from plugin settings.
    pub fn from_settings(catalog: PluginCatalog, settings: &PluginSettings) -> Self {
        #[cfg(feature = "dynamic")]
        let loader = Self::new(catalog).with_plugin_directory(&settings.directory);
        #[cfg(not(feature = "dynamic"))]
        let loader = Self::new(catalog);

        loader.with_module_prefix(&settings.module_prefix)
    }

    /// Sets the module prefix.
    pub fn with_module_prefix(mut self, prefix: &str) -> Self {
        self.module_prefix = prefix.to_string();
        self
    }

    /// Sets the directory searched for plugin shared libraries.
    #[cfg(feature = "dynamic")]
    pub fn with_plugin_directory(mut self, directory: impl Into<std::path::PathBuf>) -> Self {
        self.dynamic = dynamic_loader::DynamicLoader::new(directory);
        self
    }

    /// Returns the module prefix.
    pub fn module_prefix(&self) -> &str {
        &self.module_prefix
    }

    /// Returns the plugin catalog.
    pub fn catalog(&self) -> &PluginCatalog {
        &self.catalog
    }

    /// Loads every plugin declared in `run_config` on top of `seed`.
    ///
    /// With no declarations `seed` is returned as is.
    pub fn load_plugins(&mut self, run_config: &RunConfig, seed: HookRegistry) -> HookRegistry {
        info!("Starting the plugin check");

        if !run_config.has_plugins() {
            info!("No plugins required");
            return seed;
        }

        let mut registry = seed;

        for (index, declaration) in run_config.plugins().iter().enumerate() {
            let Some(name) = declaration.name() else {
                warn!(
                    index,
                    declaration = %declaration.to_value(),
                    "Invalid plugin configuration, skipping"
                );
                continue;
            };

            info!(plugin = %name, "Plugin found");

            let Some(plugin) = self.resolve(name) else {
                warn!(
                    plugin = %name,
                    path = %module_path(&self.module_prefix, name),
                    "Cannot find plugin, skipping"
                );
                continue;
            };

            registry = initialize(plugin.as_ref(), declaration, registry, run_config);
        }

        info!(
            hooks = registry.registered_hooks().len(),
            handlers = registry.total_handlers(),
            "Plugin loading finished"
        );

        registry
    }

    /// Resolves a plugin name to an implementation.
    fn resolve(&mut self, name: &str) -> Option<Arc<dyn Plugin>> {
        let path = module_path(&self.module_prefix, name);
        self.catalog
            .resolve(&path)
            .or_else(|| self.resolve_dynamic(name, &path))
    }

    #[cfg(feature = "dynamic")]
    fn resolve_dynamic(&mut self, name: &str, path: &str) -> Option<Arc<dyn Plugin>> {
        let library = self.dynamic.locate(name)?;

        // SAFETY: libraries in the plugin directory are trusted, and the
        // loader keeps them mapped for as long as it lives.
        match unsafe { self.dynamic.load_from_path(&library) } {
            Ok(plugin) => {
                if let Err(e) = self.catalog.register(path, plugin.clone()) {
                    warn!(plugin = %name, error = %e, "Dynamic plugin not cached");
                }
                Some(plugin)
            }
            Err(e) => {
                warn!(plugin = %name, library = %library.display(), error = %e, "Cannot load plugin library");
                None
            }
        }
    }

    #[cfg(not(feature = "dynamic"))]
    fn resolve_dynamic(&mut self, _name: &str, _path: &str) -> Option<Arc<dyn Plugin>> {
        None
    }
}

/// Runs a plugin's `initialize` and checks what it hands back.
///
/// A failed initialization, or a registry that lost any registration of
/// `accumulated`, leaves `accumulated` in place.
fn initialize(
    plugin: &dyn Plugin,
    declaration: &PluginDeclaration,
    accumulated: HookRegistry,
    run_config: &RunConfig,
) -> HookRegistry {
    let name = plugin.name();

    match plugin.initialize(declaration, accumulated.clone(), run_config) {
        Ok(next) if next.extends(&accumulated) => {
            info!(
                plugin = %name,
                added = next.total_handlers() - accumulated.total_handlers(),
                "Plugin initialized"
            );
            next
        }
        Ok(_) => {
            warn!(
                plugin = %name,
                "Plugin returned a registry missing earlier registrations, discarding its handlers"
            );
            accumulated
        }
        Err(e) => {
            warn!(plugin = %name, error = %e, "Plugin initialization failed, skipping");
            accumulated
        }
    }
}

/// Dynamic plugin loader using `libloading` (feature-gated).
#[cfg(feature = "dynamic")]
pub mod dynamic_loader {
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    use tracing::info;

    use pythia_core::error::AppError;
    use pythia_core::result::AppResult;

    use crate::catalog::Plugin;

    /// Symbol every plugin library must export.
    pub const CREATE_SYMBOL: &[u8] = b"pythia_plugin_create";

    /// Type of the plugin creation function exported by dynamic plugins.
    ///
    /// Dynamic plugins must export:
    /// `extern "C" fn pythia_plugin_create() -> *mut Box<dyn Plugin>`
    /// returning a pointer obtained from `Box::into_raw`. They must be built
    /// with the same compiler and `pythia-plugin` version as the host.
    pub type CreatePluginFn = unsafe extern "C" fn() -> *mut Box<dyn Plugin>;

    /// Loads plugins from shared libraries (.so / .dll / .dylib).
    pub struct DynamicLoader {
        /// Directory searched for plugin libraries.
        directory: PathBuf,
        /// Loaded libraries, kept alive for the lifetime of the loader.
        libraries: Vec<libloading::Library>,
    }

    impl DynamicLoader {
        /// Creates a loader searching `directory`.
        pub fn new(directory: impl Into<PathBuf>) -> Self {
            Self {
                directory: directory.into(),
                libraries: Vec::new(),
            }
        }

        /// Returns the platform library path for a plugin name, if it exists.
        pub fn locate(&self, name: &str) -> Option<PathBuf> {
            let path = self.directory.join(libloading::library_filename(name));
            path.is_file().then_some(path)
        }

        /// Loads a plugin from the given shared library path.
        ///
        /// # Safety
        /// This function runs arbitrary code from a shared library. Only load
        /// trusted plugins, and keep this loader alive for as long as any
        /// registry holding the plugin's handlers is in use.
        pub unsafe fn load_from_path(&mut self, path: &Path) -> AppResult<Arc<dyn Plugin>> {
            let lib = unsafe { libloading::Library::new(path) }.map_err(|e| {
                AppError::plugin(format!(
                    "Failed to load plugin library '{}': {}",
                    path.display(),
                    e
                ))
            })?;

            let raw = {
                let create_fn: libloading::Symbol<CreatePluginFn> =
                    unsafe { lib.get(CREATE_SYMBOL) }.map_err(|e| {
                        AppError::plugin(format!(
                            "Plugin '{}' missing 'pythia_plugin_create' symbol: {}",
                            path.display(),
                            e
                        ))
                    })?;
                unsafe { create_fn() }
            };

            if raw.is_null() {
                return Err(AppError::plugin(format!(
                    "Plugin '{}' returned a null plugin",
                    path.display()
                )));
            }

            let boxed = unsafe { Box::from_raw(raw) };
            let plugin: Arc<dyn Plugin> = Arc::from(*boxed);

            info!(path = %path.display(), plugin = plugin.name(), "Dynamic plugin loaded");

            self.libraries.push(lib);
            Ok(plugin)
        }
    }

    impl std::fmt::Debug for DynamicLoader {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("DynamicLoader")
                .field("directory", &self.directory)
                .field("loaded_count", &self.libraries.len())
                .finish()
        }
    }

}
