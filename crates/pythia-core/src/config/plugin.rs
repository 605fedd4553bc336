//! Plugin declarations and discovery settings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A plugin entry from the run configuration's `plugins` array.
///
/// The `plugin` field names the plugin. Everything else in the entry is the
/// plugin's own configuration block and is kept verbatim in `params`.
///
/// Any JSON value parses. An entry that is not an object, or whose `plugin`
/// is not a string, has no name and is skipped by the loader; it still
/// serializes back exactly as it was read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub struct PluginDeclaration {
    /// Plugin name, joined with the module prefix to locate the plugin.
    pub plugin: Option<String>,
    /// Plugin-specific configuration.
    pub params: Map<String, Value>,
    /// The entry as written, when it is not an object.
    pub malformed: Option<Value>,
}

impl PluginDeclaration {
    /// Creates a declaration for the named plugin with no parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            plugin: Some(name.into()),
            ..Self::default()
        }
    }

    /// Adds a plugin-specific parameter.
    pub fn with_param(mut self, key: &str, value: Value) -> Self {
        self.params.insert(key.to_string(), value);
        self
    }

    /// Returns the plugin name, or `None` when it is missing or blank.
    pub fn name(&self) -> Option<&str> {
        self.plugin
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Gets a plugin-specific parameter.
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Returns the whole declaration, name included, as it appears in the
    /// run configuration.
    pub fn to_value(&self) -> Value {
        if let Some(raw) = &self.malformed {
            return raw.clone();
        }
        let mut map = self.params.clone();
        if let Some(name) = &self.plugin {
            map.insert("plugin".to_string(), Value::String(name.clone()));
        }
        Value::Object(map)
    }
}

impl From<Value> for PluginDeclaration {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(mut params) => {
                // A non-string name stays in params so it is written back out.
                let plugin = match params.remove("plugin") {
                    Some(Value::String(name)) => Some(name),
                    Some(other) => {
                        params.insert("plugin".to_string(), other);
                        None
                    }
                    None => None,
                };
                Self {
                    plugin,
                    params,
                    malformed: None,
                }
            }
            other => Self {
                malformed: Some(other),
                ..Self::default()
            },
        }
    }
}

impl From<PluginDeclaration> for Value {
    fn from(declaration: PluginDeclaration) -> Self {
        declaration.to_value()
    }
}

/// Plugin discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginSettings {
    /// Module path prefix joined with a plugin name to locate it.
    #[serde(default = "default_module_prefix")]
    pub module_prefix: String,
    /// Directory searched for plugin shared libraries (`dynamic` feature).
    #[serde(default = "default_plugin_directory")]
    pub directory: String,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            module_prefix: default_module_prefix(),
            directory: default_plugin_directory(),
        }
    }
}

fn default_module_prefix() -> String {
    "pythia.plugins".to_string()
}

fn default_plugin_directory() -> String {
    "./plugins".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_declaration_name() {
        let decl: PluginDeclaration =
            serde_json::from_value(json!({"plugin": "sample", "level": 3})).expect("parse");
        assert_eq!(decl.name(), Some("sample"));
        assert_eq!(decl.param("level"), Some(&json!(3)));
    }

    #[test]
    fn test_declaration_without_name() {
        let decl: PluginDeclaration =
            serde_json::from_value(json!({"level": 3})).expect("parse");
        assert_eq!(decl.name(), None);

        let blank = PluginDeclaration::new("   ");
        assert_eq!(blank.name(), None);
    }

    #[test]
    fn test_declaration_with_non_string_name() {
        let decl: PluginDeclaration =
            serde_json::from_value(json!({"plugin": 42, "level": 3})).expect("parse");
        assert_eq!(decl.name(), None);
        assert_eq!(decl.to_value(), json!({"plugin": 42, "level": 3}));
    }

    #[test]
    fn test_declaration_not_an_object() {
        for raw in [json!("sample"), json!(null), json!([1, 2])] {
            let decl: PluginDeclaration = serde_json::from_value(raw.clone()).expect("parse");
            assert_eq!(decl.name(), None);
            assert_eq!(serde_json::to_value(&decl).expect("serialize"), raw);
        }
    }

    #[test]
    fn test_declaration_to_value() {
        let decl = PluginDeclaration::new("sample").with_param("overrides", json!({"a": 1}));
        assert_eq!(
            decl.to_value(),
            json!({"plugin": "sample", "overrides": {"a": 1}})
        );
    }
}
