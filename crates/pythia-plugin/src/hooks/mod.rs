//! Hook system: catalog, registry, and dispatcher.

pub mod definitions;
pub mod dispatcher;
pub mod registry;

pub use definitions::{HookArgs, HookPatch, PluginHook};
pub use dispatcher::{HookDispatcher, dispatch};
pub use registry::{HandlerEntry, HookHandler, HookRegistry};
