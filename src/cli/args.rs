//! CLI argument parsing using clap.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

#[derive(Parser)]
#[command(name = "lambda-reload")]
#[command(version, about = "Hot reload for locally emulated serverless functions")]
#[command(styles = clap_cargo_style())]
pub struct Cli {
    /// Load settings from this file instead of searching for .lambda-reload/settings.toml
    #[arg(long, global = true, env = "LAMBDA_RELOAD_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up .lambda-reload directory with default settings
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Display active settings
    Config,

    /// Print resolved watch targets as JSON lines
    Targets,

    /// Print the file extensions watched for a runtime
    Resolve {
        /// Runtime identifier, e.g. python3.12 or nodejs20.x
        runtime: String,
    },

    /// Wait until the emulator health endpoint responds
    Probe {
        /// Port to probe (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Maximum number of health checks (overrides config)
        #[arg(long)]
        attempts: Option<u32>,

        /// Delay between health checks in milliseconds (overrides config)
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Watch function directories and print change events as JSON lines
    Watch {
        /// Wait for the emulator to become ready before watching
        #[arg(long)]
        wait_ready: bool,

        /// Port to probe with --wait-ready (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Debounce interval in milliseconds (overrides config)
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}
