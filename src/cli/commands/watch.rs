//! Watch command - stream change events until interrupted.

use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::watcher::HotReloadWatcher;

/// Arguments for the watch command.
pub struct WatchArgs {
    pub wait_ready: bool,
    pub port: Option<u16>,
    pub interval_ms: Option<u64>,
}

/// Run the watch command.
pub async fn run(
    args: WatchArgs,
    mut settings: Settings,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    if let Some(ms) = args.interval_ms {
        settings.hot_reload.watch_interval_ms = ms;
    }

    if args.wait_ready {
        let mut probe_config = settings.probe.clone();
        if let Some(port) = args.port {
            probe_config.port = port;
        }
        super::probe::run(&probe_config, &cancel).await?;
    }

    let project_root = settings.project_root();
    let (mut watcher, mut events) = HotReloadWatcher::new(settings.hot_reload, project_root);

    let watched = watcher.start_watching();
    if watched == 0 {
        eprintln!("Nothing to watch: hot reload disabled or no configured directory exists.");
        return Ok(());
    }
    eprintln!("Watching {watched} director(ies). Press Ctrl-C to stop.");

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                println!("{}", serde_json::to_string(&event)?);
            }
            _ = cancel.cancelled() => break,
        }
    }

    watcher.stop_watching();
    let dropped = watcher.dropped_events();
    if dropped > 0 {
        eprintln!("{dropped} change event(s) were dropped while output was blocked");
    }
    Ok(())
}
