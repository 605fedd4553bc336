//! Pythia CLI entry point.

use clap::Parser;

mod commands;
mod logging;
mod output;

use commands::Cli;
use pythia_core::config::Settings;

fn main() {
    let cli = Cli::parse();

    let settings = match Settings::load(cli.settings.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to load settings: {}", e);
            std::process::exit(1);
        }
    };

    match logging::init_logging(&settings.logging, cli.logfile_prefix.as_deref()) {
        Ok(Some(path)) => tracing::info!(path = %path.display(), "Logging to file"),
        Ok(None) => {}
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = cli.execute(&settings) {
        tracing::error!(error = %e, "Pythia run failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
