//! Init and Config commands.

use crate::config::{ConfigError, Settings};

/// Run init command - create configuration file.
pub fn run_init(force: bool) {
    match Settings::init_config_file(force) {
        Ok(path) => {
            println!("Created configuration file at: {}", path.display());
            println!("Add your functions under [[hot_reload.lambda_paths]].");
        }
        Err(e @ ConfigError::AlreadyExists { .. }) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Run config command - display current configuration.
pub fn run_config(config: &Settings) {
    println!("Current Configuration:");
    println!("{}", "=".repeat(50));
    match toml::to_string_pretty(config) {
        Ok(toml_str) => println!("{toml_str}"),
        Err(e) => eprintln!("Error displaying config: {e}"),
    }
}
