//! Hook catalog and the values that flow through dispatch.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use pythia_core::error::AppError;

/// Argument carrying the working run configuration at [`PluginHook::PostConfig`].
///
/// Handlers that amend the configuration return a patch replacing this key
/// with the whole updated configuration.
pub const FULL_CONFIG: &str = "full_config";

/// Enumeration of all pipeline lifecycle points plugins can hook into.
///
/// Variants are declared in pipeline phase order and carry their canonical
/// numeric code, so `Ord` follows the pipeline. Dispatch order *within* a
/// hook is registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u16)]
pub enum PluginHook {
    // ── Configuration ──
    /// Fired once the run configuration is loaded, before any stage runs.
    PostConfig = 100,

    // ── Context ──
    /// Fired before the per-point run context is built.
    PreBuildContext = 200,
    /// Fired after the per-point run context is built.
    PostBuildContext = 300,

    // ── Setup ──
    /// Fired when a pixel was processed successfully during setup.
    PostPeerlessPixelSuccess = 350,
    /// Fired when a pixel was skipped during setup.
    PostPeerlessPixelSkip = 351,
    /// Fired when a composed pixel was processed successfully.
    PostComposePeerlessPixelSuccess = 352,
    /// Fired when a composed pixel was skipped.
    PostComposePeerlessPixelSkip = 353,
    /// Fired after all composed pixels are processed.
    PostComposePeerlessAll = 354,
    /// Fired after the run-directory setup stage completes.
    PostSetup = 400,

    // ── Run ──
    /// Fired before the simulation engine runs.
    PreRun = 500,
    /// Fired for each unit handed to the simulation engine.
    RunPixel = 600,
    /// Fired when a unit ran successfully.
    PostRunPixelSuccess = 650,
    /// Fired when a unit failed to run.
    PostRunPixelFailed = 651,
    /// Fired after all units have run.
    PostRunAll = 700,

    // ── Analytics ──
    /// Fired before analytics start.
    PreAnalytics = 800,
    /// Fired after analytics complete.
    PostAnalytics = 900,
}

impl PluginHook {
    /// Every hook, in pipeline order.
    pub const ALL: [PluginHook; 16] = [
        Self::PostConfig,
        Self::PreBuildContext,
        Self::PostBuildContext,
        Self::PostPeerlessPixelSuccess,
        Self::PostPeerlessPixelSkip,
        Self::PostComposePeerlessPixelSuccess,
        Self::PostComposePeerlessPixelSkip,
        Self::PostComposePeerlessAll,
        Self::PostSetup,
        Self::PreRun,
        Self::RunPixel,
        Self::PostRunPixelSuccess,
        Self::PostRunPixelFailed,
        Self::PostRunAll,
        Self::PreAnalytics,
        Self::PostAnalytics,
    ];

    /// Returns the string name of this hook.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PostConfig => "post_config",
            Self::PreBuildContext => "pre_build_context",
            Self::PostBuildContext => "post_build_context",
            Self::PostPeerlessPixelSuccess => "post_peerless_pixel_success",
            Self::PostPeerlessPixelSkip => "post_peerless_pixel_skip",
            Self::PostComposePeerlessPixelSuccess => "post_compose_peerless_pixel_success",
            Self::PostComposePeerlessPixelSkip => "post_compose_peerless_pixel_skip",
            Self::PostComposePeerlessAll => "post_compose_peerless_all",
            Self::PostSetup => "post_setup",
            Self::PreRun => "pre_run",
            Self::RunPixel => "run_pixel",
            Self::PostRunPixelSuccess => "post_run_pixel_success",
            Self::PostRunPixelFailed => "post_run_pixel_failed",
            Self::PostRunAll => "post_run_all",
            Self::PreAnalytics => "pre_analytics",
            Self::PostAnalytics => "post_analytics",
        }
    }

    /// Returns the canonical numeric code of this hook.
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Looks up a hook by its numeric code.
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|hook| hook.code() == code)
    }
}

impl std::fmt::Display for PluginHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PluginHook {
    type Err = AppError;

    /// Parses a hook from its snake-case name or its numeric code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|hook| hook.as_str() == s)
            .or_else(|| s.parse::<u16>().ok().and_then(Self::from_code))
            .ok_or_else(|| AppError::validation(format!("'{s}' is not a plugin hook")))
    }
}

/// Named values passed into a dispatch call and returned from it.
///
/// Callers build a fresh `HookArgs` per dispatch; handlers read it and
/// answer with a [`HookPatch`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HookArgs {
    values: Map<String, Value>,
}

impl HookArgs {
    /// Creates an empty argument map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, builder style.
    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }

    /// Inserts a value, returning the previous one for that key.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(key.into(), value)
    }

    /// Gets a value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Gets a string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| v.as_str())
    }

    /// Gets an i64 value.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(|v| v.as_i64())
    }

    /// Gets a bool value.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(|v| v.as_bool())
    }

    /// Removes a value, returning it.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Returns whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether there are no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the keys.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    /// Folds a patch into these arguments.
    ///
    /// Every key of the patch overwrites the same key here (last writer
    /// wins); keys the patch does not mention are left alone.
    pub fn apply(&mut self, patch: HookPatch) {
        self.values.extend(patch.changes);
    }

    /// Returns the underlying map.
    pub fn into_map(self) -> Map<String, Value> {
        self.values
    }
}

impl From<Map<String, Value>> for HookArgs {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

impl FromIterator<(String, Value)> for HookArgs {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Field updates returned by a handler.
///
/// Applied to the running result of a dispatch with [`HookArgs::apply`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HookPatch {
    changes: Map<String, Value>,
}

impl HookPatch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, builder style.
    pub fn set(mut self, key: &str, value: Value) -> Self {
        self.changes.insert(key.to_string(), value);
        self
    }

    /// Sets a field in place.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.changes.insert(key.into(), value);
    }

    /// Gets the new value of a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.changes.get(key)
    }

    /// Returns the number of changed fields.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

impl From<Map<String, Value>> for HookPatch {
    fn from(changes: Map<String, Value>) -> Self {
        Self { changes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hooks_ordered_by_code() {
        let mut sorted = PluginHook::ALL;
        sorted.sort();
        assert_eq!(sorted, PluginHook::ALL);

        for pair in PluginHook::ALL.windows(2) {
            assert!(pair[0].code() < pair[1].code());
        }
    }

    #[test]
    fn test_parse_by_name_and_code() {
        assert_eq!("pre_run".parse::<PluginHook>().unwrap(), PluginHook::PreRun);
        assert_eq!("651".parse::<PluginHook>().unwrap(), PluginHook::PostRunPixelFailed);
        assert_eq!(PluginHook::from_code(354), Some(PluginHook::PostComposePeerlessAll));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("pre_lunch".parse::<PluginHook>().is_err());
        assert!("101".parse::<PluginHook>().is_err());
        assert!("".parse::<PluginHook>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case_names() {
        let value = serde_json::to_value(PluginHook::PostRunPixelSuccess).unwrap();
        assert_eq!(value, json!("post_run_pixel_success"));

        for hook in PluginHook::ALL {
            assert_eq!(serde_json::to_value(hook).unwrap(), json!(hook.as_str()));
        }
    }

    #[test]
    fn test_apply_overwrites_and_keeps() {
        let mut args = HookArgs::new().with("x", json!(1)).with("y", json!(2));
        args.apply(HookPatch::new().set("y", json!(9)).set("z", json!(true)));

        assert_eq!(args.get_i64("x"), Some(1));
        assert_eq!(args.get_i64("y"), Some(9));
        assert_eq!(args.get_bool("z"), Some(true));
        assert_eq!(args.len(), 3);
    }
}
