//! End-to-end watcher behaviour against a real filesystem.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lambda_reload::config::HotReloadConfig;
use lambda_reload::watcher::{ChangeEvent, ChangeReceiver, HotReloadWatcher, WatcherState};
use lambda_reload::WatchTargetConfig;
use lambda_reload::target::build_targets_with;
use tempfile::TempDir;

const INTERVAL_MS: u64 = 150;

fn lambda(name: &str, path: &str, runtime: &str) -> WatchTargetConfig {
    WatchTargetConfig {
        function_name: name.to_string(),
        local_path: path.to_string(),
        handler: "app.handler".to_string(),
        runtime: runtime.to_string(),
        file_extensions: None,
    }
}

fn config(lambdas: Vec<WatchTargetConfig>) -> HotReloadConfig {
    HotReloadConfig {
        watch_interval_ms: INTERVAL_MS,
        lambda_paths: lambdas,
        ..Default::default()
    }
}

async fn next_event(rx: &mut ChangeReceiver) -> Option<ChangeEvent> {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .ok()
        .flatten()
}

async fn settle() {
    // Let the initial debounce window pass before touching files
    tokio::time::sleep(Duration::from_millis(INTERVAL_MS * 2)).await;
}

fn write(path: &Path, contents: &str) {
    std::fs::write(path, contents).unwrap();
}

#[tokio::test]
async fn test_shared_directory_single_watch_notifies_both_functions() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir(temp.path().join("shared")).unwrap();

    let (mut watcher, mut rx) = HotReloadWatcher::new(
        config(vec![
            lambda("orders", "shared", "python3.12"),
            lambda("billing", "./shared", "python3.11"),
        ]),
        temp.path().to_path_buf(),
    );

    assert_eq!(watcher.start_watching(), 1);
    assert_eq!(watcher.watch_count(), 1);
    assert_eq!(watcher.targets().len(), 2);
    assert_eq!(watcher.state(), WatcherState::Watching);

    settle().await;
    write(&temp.path().join("shared").join("app.py"), "print('hi')\n");

    let first = next_event(&mut rx).await.expect("first change event");
    let second = next_event(&mut rx).await.expect("second change event");

    let names: HashSet<String> = [first.function_name.clone(), second.function_name.clone()]
        .into_iter()
        .collect();
    assert_eq!(
        names,
        HashSet::from(["orders".to_string(), "billing".to_string()])
    );
    assert_eq!(first.local_path, temp.path().join("shared"));
    assert!(first.changed_file.ends_with("app.py"));
    assert_eq!(first.handler, "app.handler");

    watcher.stop_watching();
}

#[tokio::test]
async fn test_irrelevant_extension_is_ignored() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("fn");
    std::fs::create_dir(&dir).unwrap();

    let (mut watcher, mut rx) =
        HotReloadWatcher::new(config(vec![lambda("f", "fn", "python3.12")]), temp.path().to_path_buf());
    assert_eq!(watcher.start_watching(), 1);
    settle().await;

    write(&dir.join("README.md"), "# notes\n");
    let none = tokio::time::timeout(Duration::from_millis(500), rx.recv()).await;
    assert!(none.is_err(), "markdown change should not be reported");

    write(&dir.join("handler.py"), "x = 1\n");
    let event = next_event(&mut rx).await.expect("python change event");
    assert!(event.changed_file.ends_with("handler.py"));
    assert_eq!(event.runtime, "python3.12");

    watcher.stop_watching();
}

#[tokio::test]
async fn test_burst_collapses_and_later_change_is_reported() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("fn");
    std::fs::create_dir(&dir).unwrap();

    let mut cfg = config(vec![lambda("f", "fn", "nodejs20.x")]);
    cfg.watch_interval_ms = 1500;
    let (mut watcher, mut rx) = HotReloadWatcher::new(cfg, temp.path().to_path_buf());
    assert_eq!(watcher.start_watching(), 1);
    tokio::time::sleep(Duration::from_millis(1600)).await;

    for i in 0..10 {
        write(&dir.join(format!("mod{i}.js")), "module.exports = 1;\n");
    }

    assert!(next_event(&mut rx).await.is_some());
    let extra = tokio::time::timeout(Duration::from_millis(700), rx.recv()).await;
    assert!(extra.is_err(), "burst must collapse to one event");

    tokio::time::sleep(Duration::from_millis(1000)).await;
    write(&dir.join("index.ts"), "export {};\n");
    let later = next_event(&mut rx).await.expect("change after the window");
    assert!(later.changed_file.ends_with("index.ts"));

    watcher.stop_watching();
}

#[tokio::test]
async fn test_missing_paths_are_skipped_without_error() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir(temp.path().join("present")).unwrap();
    write(&temp.path().join("file.py"), "");

    let (mut watcher, _rx) = HotReloadWatcher::new(
        config(vec![
            lambda("missing", "does/not/exist", "python3.12"),
            lambda("file", "file.py", "python3.12"),
            lambda("present", "present", "python3.12"),
        ]),
        temp.path().to_path_buf(),
    );

    assert_eq!(watcher.start_watching(), 1);
    assert_eq!(watcher.watched_paths(), vec![temp.path().join("present")]);
}

#[tokio::test]
async fn test_stays_idle_without_watchable_targets() {
    let temp = TempDir::new().unwrap();

    let (mut empty, _rx) = HotReloadWatcher::new(config(Vec::new()), temp.path().to_path_buf());
    assert_eq!(empty.start_watching(), 0);
    assert!(!empty.is_watching());

    let (mut missing, _rx) = HotReloadWatcher::new(
        config(vec![lambda("f", "nope", "go1.x")]),
        temp.path().to_path_buf(),
    );
    assert_eq!(missing.start_watching(), 0);
    assert_eq!(missing.state(), WatcherState::Idle);
}

#[tokio::test]
async fn test_disabled_hot_reload_does_not_watch() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir(temp.path().join("fn")).unwrap();

    let mut cfg = config(vec![lambda("f", "fn", "python3.12")]);
    cfg.enabled = false;
    let (mut watcher, _rx) = HotReloadWatcher::new(cfg, temp.path().to_path_buf());

    assert_eq!(watcher.start_watching(), 0);
    assert_eq!(watcher.watch_count(), 0);
}

#[tokio::test]
async fn test_start_is_idempotent_and_stop_is_safe() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir(temp.path().join("fn")).unwrap();

    let (mut watcher, _rx) =
        HotReloadWatcher::new(config(vec![lambda("f", "fn", "ruby3.3")]), temp.path().to_path_buf());

    // Stop before any start
    watcher.stop_watching();
    assert_eq!(watcher.state(), WatcherState::Idle);

    assert_eq!(watcher.start_watching(), 1);
    assert_eq!(watcher.start_watching(), 1);
    assert_eq!(watcher.watch_count(), 1);

    watcher.stop_watching();
    watcher.stop_watching();
    assert_eq!(watcher.watch_count(), 0);
    assert!(watcher.watched_paths().is_empty());
    assert_eq!(watcher.state(), WatcherState::Idle);

    // Can be restarted after stopping
    assert_eq!(watcher.start_watching(), 1);
}

#[tokio::test]
async fn test_placeholder_in_local_path_is_expanded() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("svc");
    std::fs::create_dir(&dir).unwrap();

    let root = temp.path().display().to_string();
    let lookup = |name: &str| (name == "SERVICE_ROOT").then(|| root.clone());

    let hot_reload = config(vec![lambda("f", "${SERVICE_ROOT}/svc", "python3.12")]);
    let targets = build_targets_with(
        &hot_reload.lambda_paths,
        Path::new("/elsewhere"),
        &hot_reload.extension_resolver(),
        lookup,
    );
    assert_eq!(targets[0].local_path, dir);

    let (mut watcher, _rx) = HotReloadWatcher::new(hot_reload, PathBuf::from("/elsewhere"));
    assert_eq!(watcher.start_watching_targets(targets), 1);
    assert_eq!(watcher.watched_paths(), vec![dir]);
}
