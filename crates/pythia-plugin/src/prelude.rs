//! Prelude for plugin authors.

pub use serde_json::{Value, json};

pub use pythia_core::config::{PluginDeclaration, RunConfig};
pub use pythia_core::error::AppError;
pub use pythia_core::result::AppResult;

pub use crate::catalog::{Plugin, PluginCatalog};
pub use crate::hooks::definitions::{FULL_CONFIG, HookArgs, HookPatch, PluginHook};
pub use crate::hooks::dispatcher::dispatch;
pub use crate::hooks::registry::{HookHandler, HookRegistry};
pub use crate::traits::FnHandler;

pub use crate::{hook_args, hook_patch};
