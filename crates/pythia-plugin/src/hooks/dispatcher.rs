//! Hook dispatcher: runs every handler of a hook and merges their patches.
//!
//! - Handlers are called strictly in registration order.
//! - Each handler sees its own configuration, the result merged so far, and
//!   the original arguments.
//! - A returned patch is folded into the result, last writer wins.
//! - A handler error stops the dispatch and is returned to the caller as is.

use std::sync::Arc;

use tracing::{debug, error};

use pythia_core::result::AppResult;

use super::definitions::{HookArgs, PluginHook};
use super::registry::HookRegistry;

/// Dispatches `hook` to every handler registered for it in `registry`.
///
/// With no handlers registered the arguments come back unchanged.
pub fn dispatch(hook: PluginHook, registry: &HookRegistry, args: HookArgs) -> AppResult<HookArgs> {
    let entries = registry.handlers(hook);
    if entries.is_empty() {
        return Ok(args);
    }

    debug!(hook = %hook, handler_count = entries.len(), "Dispatching hook");

    let mut merged = args.clone();
    for entry in entries {
        let handler = entry.handler();
        match handler.handle(entry.config(), &merged, &args) {
            Ok(Some(patch)) => {
                debug!(
                    hook = %hook,
                    handler = handler.name(),
                    fields = patch.len(),
                    "Handler returned patch"
                );
                merged.apply(patch);
            }
            Ok(None) => {
                debug!(hook = %hook, handler = handler.name(), "Handler returned no changes");
            }
            Err(e) => {
                error!(hook = %hook, handler = handler.name(), error = %e, "Hook handler failed");
                return Err(e);
            }
        }
    }

    Ok(merged)
}

/// Dispatches hooks against a registry shared for the whole run.
#[derive(Debug, Clone)]
pub struct HookDispatcher {
    /// Hook registry, read-only once loading is done.
    registry: Arc<HookRegistry>,
}

impl HookDispatcher {
    /// Creates a new hook dispatcher.
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self { registry }
    }

    /// Dispatches a hook, returning the merged result.
    pub fn dispatch(&self, hook: PluginHook, args: HookArgs) -> AppResult<HookArgs> {
        dispatch(hook, &self.registry, args)
    }

    /// Dispatches a hook for its side effects only.
    ///
    /// Handler errors still propagate.
    pub fn fire(&self, hook: PluginHook, args: HookArgs) -> AppResult<()> {
        self.dispatch(hook, args).map(|_| ())
    }

    /// Returns a reference to the hook registry.
    pub fn registry(&self) -> &Arc<HookRegistry> {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook_args;
    use crate::hooks::definitions::HookPatch;
    use crate::traits::FnHandler;
    use pythia_core::error::{AppError, ErrorKind};
    use serde_json::json;
    use std::sync::Mutex;

    #[test]
    fn test_unregistered_hook_is_identity() {
        let registry = HookRegistry::new().register(
            PluginHook::PreRun,
            FnHandler::shared("x", |_, _, _| Ok(Some(HookPatch::new().set("x", json!(1))))),
            json!({}),
        );

        let args = hook_args! { "a" => json!("b") };
        for hook in PluginHook::ALL {
            if hook == PluginHook::PreRun {
                continue;
            }
            assert_eq!(dispatch(hook, &registry, args.clone()).unwrap(), args);
        }
    }

    #[test]
    fn test_empty_registry_returns_input() {
        let args = hook_args! { "n" => json!(5) };
        let result = dispatch(PluginHook::PostAnalytics, &HookRegistry::new(), args).unwrap();
        assert_eq!(result, hook_args! { "n" => json!(5) });
    }

    #[test]
    fn test_last_writer_wins() {
        let h1 = FnHandler::shared("h1", |_, _, _| {
            Ok(Some(HookPatch::new().set("x", json!(1)).set("y", json!(2))))
        });
        let h2 = FnHandler::shared("h2", |_, _, _| Ok(Some(HookPatch::new().set("y", json!(9)))));

        let registry = HookRegistry::new()
            .register(PluginHook::PreRun, h1, json!({}))
            .register(PluginHook::PreRun, h2, json!({}));

        let result = dispatch(PluginHook::PreRun, &registry, HookArgs::new()).unwrap();
        assert_eq!(result, hook_args! { "x" => json!(1), "y" => json!(9) });
    }

    #[test]
    fn test_none_leaves_result_unchanged() {
        let h1 = FnHandler::shared("h1", |_, _, _| Ok(Some(HookPatch::new().set("x", json!(1)))));
        let h2 = FnHandler::shared("h2", |_, _, _| Ok(None));

        let registry = HookRegistry::new()
            .register(PluginHook::PostSetup, h1, json!({}))
            .register(PluginHook::PostSetup, h2, json!({}));

        let result = dispatch(PluginHook::PostSetup, &registry, HookArgs::new()).unwrap();
        assert_eq!(result, hook_args! { "x" => json!(1) });
    }

    #[test]
    fn test_patch_overrides_initial_args() {
        let handler =
            FnHandler::shared("h", |_, _, _| Ok(Some(HookPatch::new().set("n", json!(6)))));
        let registry = HookRegistry::new().register(PluginHook::RunPixel, handler, json!({}));

        let result =
            dispatch(PluginHook::RunPixel, &registry, hook_args! { "n" => json!(5), "m" => json!(0) })
                .unwrap();
        assert_eq!(result, hook_args! { "n" => json!(6), "m" => json!(0) });
    }

    #[test]
    fn test_handlers_see_config_merged_and_original() {
        let seen = Arc::new(Mutex::new(Vec::new()));

        let h1 = FnHandler::shared("h1", |_, _, _| Ok(Some(HookPatch::new().set("n", json!(2)))));
        let recorder = {
            let seen = seen.clone();
            FnHandler::shared("h2", move |config, merged, args| {
                seen.lock().unwrap().push((
                    config.clone(),
                    merged.get_i64("n"),
                    args.get_i64("n"),
                ));
                Ok(None)
            })
        };

        let registry = HookRegistry::new()
            .register(PluginHook::PreRun, h1, json!({}))
            .register(PluginHook::PreRun, recorder, json!({"tag": "rec"}));

        dispatch(PluginHook::PreRun, &registry, hook_args! { "n" => json!(1) }).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.as_slice(), &[(json!({"tag": "rec"}), Some(2), Some(1))]);
    }

    #[test]
    fn test_invocation_follows_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut registry = HookRegistry::new();

        for name in ["c", "a", "b"] {
            let order = order.clone();
            let handler = FnHandler::shared(name, move |_, _, _| {
                order.lock().unwrap().push(name);
                Ok(None)
            });
            registry = registry.register(PluginHook::PostRunAll, handler, json!({}));
        }

        dispatch(PluginHook::PostRunAll, &registry, HookArgs::new()).unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_handler_error_propagates() {
        let calls = Arc::new(Mutex::new(0));
        let failing = FnHandler::shared("boom", |_, _, _| Err(AppError::handler("engine exploded")));
        let after = {
            let calls = calls.clone();
            FnHandler::shared("after", move |_, _, _| {
                *calls.lock().unwrap() += 1;
                Ok(None)
            })
        };

        let registry = HookRegistry::new()
            .register(PluginHook::RunPixel, failing, json!({}))
            .register(PluginHook::RunPixel, after, json!({}));

        let err = dispatch(PluginHook::RunPixel, &registry, HookArgs::new()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Handler);
        assert_eq!(err.message, "engine exploded");
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_dispatcher_shares_registry() {
        let handler =
            FnHandler::shared("h", |_, _, _| Ok(Some(HookPatch::new().set("done", json!(true)))));
        let registry = Arc::new(HookRegistry::new().register(PluginHook::PreAnalytics, handler, json!({})));
        let dispatcher = HookDispatcher::new(registry.clone());

        let result = dispatcher.dispatch(PluginHook::PreAnalytics, HookArgs::new()).unwrap();
        assert_eq!(result.get_bool("done"), Some(true));
        assert!(dispatcher.fire(PluginHook::PostAnalytics, HookArgs::new()).is_ok());
        assert!(Arc::ptr_eq(dispatcher.registry(), &registry));
    }
}
