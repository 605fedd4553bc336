//! Configuration schemas.
//!
//! Two kinds of configuration exist side by side:
//!
//! - [`RunConfig`], the working configuration of a single pipeline run. It is
//!   read from the JSON file named on the command line, travels through hook
//!   dispatch, and keeps every key it does not know about.
//! - [`Settings`], the driver's own settings (logging, plugin discovery),
//!   layered from an optional TOML file and `PYTHIA_` environment variables
//!   via the `config` crate.

pub mod logging;
pub mod plugin;

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub use self::logging::LoggingConfig;
pub use self::plugin::{PluginDeclaration, PluginSettings};

use crate::error::{AppError, ErrorKind};
use crate::result::AppResult;

/// Default settings file stem, resolved against the working directory.
const DEFAULT_SETTINGS_FILE: &str = "pythia";

/// Working configuration of a pipeline run.
///
/// Only `plugins` is interpreted by the driver; every other key is kept in
/// `extra` and written back out unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Plugin declarations, in load order. `None` when the key is absent.
    #[serde(
        default,
        deserialize_with = "lenient_plugins",
        skip_serializing_if = "Option::is_none"
    )]
    pub plugins: Option<Vec<PluginDeclaration>>,
    /// All remaining configuration keys.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RunConfig {
    /// Reads a run configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Failed to read run configuration '{}'", path.display()),
                e,
            )
        })?;

        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid run configuration '{}': {e}", path.display()),
                e,
            )
        })?;
        tracing::debug!(
            path = %path.display(),
            plugins = config.plugins().len(),
            keys = config.extra.len(),
            "Run configuration loaded"
        );
        Ok(config)
    }

    /// Builds a run configuration from a JSON value.
    ///
    /// The value must be an object.
    pub fn from_value(value: Value) -> AppResult<Self> {
        if !value.is_object() {
            return Err(AppError::validation(format!(
                "Run configuration must be an object, got {value}"
            )));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Serializes this configuration into a JSON value.
    pub fn to_value(&self) -> AppResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Returns the plugin declarations, in load order.
    pub fn plugins(&self) -> &[PluginDeclaration] {
        self.plugins.as_deref().unwrap_or_default()
    }

    /// Returns whether any plugins are declared.
    pub fn has_plugins(&self) -> bool {
        !self.plugins().is_empty()
    }

    /// Gets a top-level configuration value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Gets a top-level string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(|v| v.as_str())
    }

    /// Sets a top-level configuration value, replacing any previous one.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.extra.insert(key.into(), value);
    }
}

/// Reads `plugins` without ever failing the whole configuration: `null`
/// means no plugins, and each element becomes a declaration whatever its
/// shape.
fn lenient_plugins<'de, D>(deserializer: D) -> Result<Option<Vec<PluginDeclaration>>, D::Error>
where
    D: Deserializer<'de>,
{
    let declarations = match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().map(PluginDeclaration::from).collect(),
        Value::Null => Vec::new(),
        other => {
            tracing::warn!(plugins = %other, "Ignoring plugins because it is not an array");
            Vec::new()
        }
    };
    Ok(Some(declarations))
}

/// Settings of the driver itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Plugin discovery settings.
    #[serde(default)]
    pub plugins: PluginSettings,
}

impl Settings {
    /// Load settings from a TOML file and the environment.
    ///
    /// With no explicit path, `pythia.toml` in the working directory is used
    /// if present. Environment variables prefixed with `PYTHIA_` and using
    /// `__` as the section separator override file values, e.g.
    /// `PYTHIA_LOGGING__LEVEL=debug`.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let file = match path {
            Some(p) => config::File::from(p).required(true),
            None => config::File::with_name(DEFAULT_SETTINGS_FILE).required(false),
        };

        let config = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("PYTHIA")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
