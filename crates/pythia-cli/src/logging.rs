//! Tracing subscriber setup.

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Local};
use tracing_subscriber::{EnvFilter, fmt};

use pythia_core::config::LoggingConfig;
use pythia_core::result::AppResult;

/// Builds the per-run log file name: `<prefix>-YYYYmmdd-HHMMSS.log`.
pub fn log_file_name(prefix: &str, now: DateTime<Local>) -> PathBuf {
    PathBuf::from(format!("{}-{}.log", prefix, now.format("%Y%m%d-%H%M%S")))
}

/// Initialize tracing/logging.
///
/// `RUST_LOG` takes precedence over the configured level. With a file
/// prefix (from the command line, else from settings) events go to a fresh
/// log file whose path is returned; otherwise they go to stderr.
pub fn init_logging(config: &LoggingConfig, file_prefix: Option<&str>) -> AppResult<Option<PathBuf>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let json = config.format == "json";

    match file_prefix.or(config.file_prefix.as_deref()) {
        Some(prefix) => {
            let path = log_file_name(prefix, Local::now());
            let file = std::fs::File::create(&path)?;
            let builder = fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file));

            if json {
                builder.json().init();
            } else {
                builder.init();
            }
            Ok(Some(path))
        }
        None => {
            let builder = fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr);

            if json {
                builder.json().init();
            } else {
                builder.pretty().init();
            }
            Ok(None)
        }
    }
}
