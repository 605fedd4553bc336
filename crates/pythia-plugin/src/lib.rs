//! # pythia-plugin
//!
//! Plugin framework for the Pythia pipeline driver. Provides:
//!
//! - The hook catalog: the closed set of pipeline lifecycle points
//! - A hook registry with identity-based deduplication
//! - A plugin loader resolving plugins by module path from configuration
//! - A dispatcher folding handler patches into the caller's state
//! - Optional dynamic loading via `libloading` (`dynamic` feature)

pub mod catalog;
pub mod hooks;
pub mod loader;
pub mod macros;
pub mod prelude;
pub mod traits;

pub use catalog::{Plugin, PluginCatalog};
pub use hooks::definitions::{FULL_CONFIG, HookArgs, HookPatch, PluginHook};
pub use hooks::dispatcher::{HookDispatcher, dispatch};
pub use hooks::registry::{HandlerEntry, HookHandler, HookRegistry};
pub use loader::PluginLoader;
pub use traits::FnHandler;
