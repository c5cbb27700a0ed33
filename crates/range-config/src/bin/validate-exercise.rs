//! Exercise validation CLI tool
//!
//! Validates a rangemaster exercise file and reports any errors.

use range_util::{default_config_path, format_countdown};
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-exercise [config-file]");
            eprintln!();
            eprintln!("Validates a rangemaster exercise file.");
            eprintln!();
            eprintln!("If no path is provided, uses: {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match range_config::load_config(&config_path) {
        Ok(config) => {
            let session = &config.session;
            println!("✓ Exercise is valid");
            println!();
            println!("Summary:");
            println!("  Config version: {}", range_config::CURRENT_CONFIG_VERSION);
            println!("  Exercise: {} ({})", session.name(), session.id());
            println!("  Duration: {}", format_countdown(session.total_duration_seconds()));
            println!("  Targets: {}", session.node_ids().len());
            println!("  Windows: {}", session.windows().len());

            if !session.windows().is_empty() {
                println!();
                println!("Timeline:");
                for window in session.windows() {
                    println!(
                        "  - node {} @ {}m: {} -> {}",
                        window.node_id(),
                        window.target.distance,
                        format_countdown(window.start_seconds),
                        format_countdown(window.end_seconds),
                    );
                }
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Exercise validation failed");
            eprintln!();
            match &e {
                range_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                range_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                range_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                range_config::ConfigError::InvalidSession(err) => {
                    eprintln!("Invalid timeline: {}", err);
                }
                range_config::ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver,
                        range_config::CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
