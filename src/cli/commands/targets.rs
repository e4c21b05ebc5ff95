//! Targets and Resolve commands.

use crate::config::Settings;
use crate::target::build_targets;

/// Print every resolved watch target as a JSON line.
pub fn run_targets(settings: &Settings) -> anyhow::Result<()> {
    let hot_reload = &settings.hot_reload;
    let resolver = hot_reload.extension_resolver();
    let targets = build_targets(&hot_reload.lambda_paths, &settings.project_root(), &resolver);

    if targets.is_empty() {
        eprintln!("No lambda paths configured.");
        return Ok(());
    }

    for target in &targets {
        println!("{}", serde_json::to_string(target)?);
        if !target.local_path.is_dir() {
            eprintln!(
                "  warning: {} does not exist or is not a directory",
                target.local_path.display()
            );
        }
    }
    Ok(())
}

/// Print the extension set watched for `runtime`.
pub fn run_resolve(settings: &Settings, runtime: &str) {
    let exts = settings.hot_reload.extension_resolver().resolve(runtime);
    let exts: Vec<&str> = exts.iter().map(String::as_str).collect();
    println!("{runtime}: {}", exts.join(" "));
}
