//! # pythia-core
//!
//! Core crate for the Pythia pipeline driver. Contains the unified error
//! system, the run configuration model that travels between pipeline
//! stages, and the settings used to configure logging and plugin discovery.
//!
//! This crate has **no** internal dependencies on other Pythia crates.

pub mod config;
pub mod error;
pub mod result;

pub use config::{PluginDeclaration, RunConfig, Settings};
pub use error::AppError;
pub use result::AppResult;
