//! Closure-based handlers for quick handler creation.

use std::sync::Arc;

use serde_json::Value;

use pythia_core::result::AppResult;

use crate::hooks::definitions::{HookArgs, HookPatch};
use crate::hooks::registry::HookHandler;

/// Signature shared by every closure handler.
type HandlerFn =
    dyn Fn(&Value, &HookArgs, &HookArgs) -> AppResult<Option<HookPatch>> + Send + Sync;

/// A hook handler backed by a closure.
///
/// Each `FnHandler` is its own handler identity: wrap it in an `Arc` once and
/// clone the `Arc` to refer to the same handler again.
pub struct FnHandler {
    /// Handler name.
    name: String,
    /// Handler function.
    handler: Box<HandlerFn>,
}

impl std::fmt::Debug for FnHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnHandler")
            .field("name", &self.name)
            .field("handler", &"<closure>")
            .finish()
    }
}

impl FnHandler {
    /// Creates a new closure-based handler.
    pub fn new<F>(name: &str, handler: F) -> Self
    where
        F: Fn(&Value, &HookArgs, &HookArgs) -> AppResult<Option<HookPatch>> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            handler: Box::new(handler),
        }
    }

    /// Creates a closure-based handler ready for registration.
    pub fn shared<F>(name: &str, handler: F) -> Arc<dyn HookHandler>
    where
        F: Fn(&Value, &HookArgs, &HookArgs) -> AppResult<Option<HookPatch>> + Send + Sync + 'static,
    {
        Arc::new(Self::new(name, handler))
    }
}

impl HookHandler for FnHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(
        &self,
        config: &Value,
        merged: &HookArgs,
        args: &HookArgs,
    ) -> AppResult<Option<HookPatch>> {
        (self.handler)(config, merged, args)
    }
}
