//! Hook registry: plugins register handlers per hook, in order.
//!
//! The registry is a value: every registration returns a new registry and
//! leaves the one it was called on untouched. Invalid registrations are
//! logged and ignored so one misbehaving plugin cannot abort a run.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use pythia_core::result::AppResult;

use super::definitions::{HookArgs, HookPatch, PluginHook};

/// Trait for hook handler implementations.
pub trait HookHandler: Send + Sync + std::fmt::Debug {
    /// Returns a name identifying this handler in logs.
    fn name(&self) -> &str;

    /// Handles a hook invocation.
    ///
    /// `config` is the handler's own configuration as given at registration,
    /// `merged` is the result accumulated by earlier handlers, and `args` are
    /// the arguments the dispatch was called with. Return `Ok(None)` to leave
    /// the result unchanged.
    fn handle(
        &self,
        config: &Value,
        merged: &HookArgs,
        args: &HookArgs,
    ) -> AppResult<Option<HookPatch>>;
}

/// Compares two handlers by allocation identity.
fn same_handler(a: &Arc<dyn HookHandler>, b: &Arc<dyn HookHandler>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// A registered handler with its configuration.
#[derive(Debug, Clone)]
pub struct HandlerEntry {
    /// The handler.
    handler: Arc<dyn HookHandler>,
    /// Handler-local configuration, always a JSON object.
    config: Value,
}

impl HandlerEntry {
    /// Returns the handler.
    pub fn handler(&self) -> &Arc<dyn HookHandler> {
        &self.handler
    }

    /// Returns the handler's configuration.
    pub fn config(&self) -> &Value {
        &self.config
    }

    /// Returns whether this entry holds exactly `handler`.
    pub fn is_handler(&self, handler: &Arc<dyn HookHandler>) -> bool {
        same_handler(&self.handler, handler)
    }
}

impl PartialEq for HandlerEntry {
    fn eq(&self, other: &Self) -> bool {
        same_handler(&self.handler, &other.handler) && self.config == other.config
    }
}

/// Registry of hook handlers organized by hook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookRegistry {
    /// Hook → handlers in registration order.
    handlers: BTreeMap<PluginHook, Vec<HandlerEntry>>,
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for a hook.
    ///
    /// Returns a registry with `(handler, config)` appended to `hook`'s
    /// handlers. If `config` is not a JSON object, or this exact handler is
    /// already registered for `hook`, a warning is logged and an unchanged
    /// copy is returned.
    pub fn register(
        &self,
        hook: PluginHook,
        handler: Arc<dyn HookHandler>,
        config: Value,
    ) -> HookRegistry {
        if !config.is_object() {
            warn!(
                hook = %hook,
                handler = handler.name(),
                config = %config,
                "Ignoring handler because its configuration is not an object"
            );
            return self.clone();
        }

        if self.contains(hook, &handler) {
            warn!(
                hook = %hook,
                handler = handler.name(),
                "Ignoring handler because it is already registered for this hook"
            );
            return self.clone();
        }

        debug!(hook = %hook, handler = handler.name(), "Hook handler registered");

        let mut next = self.clone();
        next.handlers
            .entry(hook)
            .or_default()
            .push(HandlerEntry { handler, config });
        next
    }

    /// Registers a handler for a hook given by name.
    ///
    /// Used when hooks and handlers are picked out of configuration. An
    /// unknown hook name or a handler that did not resolve (`None`) is logged
    /// and ignored; otherwise this behaves like [`HookRegistry::register`].
    pub fn register_named(
        &self,
        hook: &str,
        handler: Option<Arc<dyn HookHandler>>,
        config: Value,
    ) -> HookRegistry {
        let hook = match hook.parse::<PluginHook>() {
            Ok(hook) => hook,
            Err(e) => {
                warn!(hook = %hook, error = %e, "Ignoring handler because the hook is unknown");
                return self.clone();
            }
        };

        let Some(handler) = handler else {
            warn!(hook = %hook, "Ignoring registration because the handler is not invokable");
            return self.clone();
        };

        self.register(hook, handler, config)
    }

    /// Returns the handlers registered for a hook, in registration order.
    pub fn handlers(&self, hook: PluginHook) -> &[HandlerEntry] {
        self.handlers.get(&hook).map(Vec::as_slice).unwrap_or_default()
    }

    /// Returns whether any handlers are registered for a hook.
    pub fn has_handlers(&self, hook: PluginHook) -> bool {
        !self.handlers(hook).is_empty()
    }

    /// Returns the number of handlers registered for a hook.
    pub fn handler_count(&self, hook: PluginHook) -> usize {
        self.handlers(hook).len()
    }

    /// Returns whether `handler` is registered for `hook`.
    pub fn contains(&self, hook: PluginHook, handler: &Arc<dyn HookHandler>) -> bool {
        self.handlers(hook)
            .iter()
            .any(|entry| entry.is_handler(handler))
    }

    /// Returns all hooks with at least one handler, in pipeline order.
    pub fn registered_hooks(&self) -> Vec<PluginHook> {
        self.handlers
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(hook, _)| *hook)
            .collect()
    }

    /// Returns the number of handlers across all hooks.
    pub fn total_handlers(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    /// Returns whether no handlers are registered at all.
    pub fn is_empty(&self) -> bool {
        self.total_handlers() == 0
    }

    /// Returns whether this registry contains every registration of `base`,
    /// as the leading entries of each hook and in the same order.
    ///
    /// A registry produced from `base` by registrations alone always extends
    /// it.
    pub fn extends(&self, base: &HookRegistry) -> bool {
        base.handlers.iter().all(|(hook, base_entries)| {
            let entries = self.handlers(*hook);
            entries.len() >= base_entries.len()
                && entries.iter().zip(base_entries).all(|(a, b)| a == b)
        })
    }
}
