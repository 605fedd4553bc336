//! Sample plugin for Pythia.
//!
//! Applies configuration overrides once the run configuration is loaded and
//! records which lifecycle hooks a run passed through. Declared as:
//!
//! ```json
//! {"plugin": "sample", "overrides": {"cores": 4}, "markers": ["pre_run", "post_run_all"]}
//! ```

pub mod hooks;
pub mod plugin;

pub use plugin::SamplePlugin;
