use clap::Parser;
use tokio_util::sync::CancellationToken;

use lambda_reload::Settings;
use lambda_reload::cli::commands::{init, probe, targets, watch};
use lambda_reload::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Commands::Init { force } = cli.command {
        init::run_init(force);
        return;
    }

    // Load configuration
    let loaded = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let settings = loaded.unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        eprintln!("Using default configuration for now.");
        Settings::default()
    });

    lambda_reload::logging::init_with_config(&settings.logging);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let result = match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Config => {
            init::run_config(&settings);
            Ok(())
        }
        Commands::Targets => targets::run_targets(&settings),
        Commands::Resolve { runtime } => {
            targets::run_resolve(&settings, &runtime);
            Ok(())
        }
        Commands::Probe {
            port,
            attempts,
            delay_ms,
        } => {
            let args = probe::ProbeArgs {
                port,
                attempts,
                delay_ms,
            };
            probe::run(&args.apply(&settings.probe), &cancel).await
        }
        Commands::Watch {
            wait_ready,
            port,
            interval_ms,
        } => {
            let args = watch::WatchArgs {
                wait_ready,
                port,
                interval_ms,
            };
            watch::run(args, settings, cancel).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
