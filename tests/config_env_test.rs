use figment::Jail;
use lambda_reload::Settings;

#[test]
fn test_env_override_with_double_underscore() {
    Jail::expect_with(|jail| {
        jail.set_env("LR_HOT_RELOAD__WATCH_INTERVAL_MS", "300");
        jail.set_env("LR_HOT_RELOAD__ENABLED", "false");
        jail.set_env("LR_PROBE__PORT", "4567");

        let settings = Settings::load().map_err(|e| e.to_string())?;

        assert_eq!(settings.hot_reload.watch_interval_ms, 300);
        assert!(!settings.hot_reload.enabled);
        assert_eq!(settings.probe.port, 4567);
        Ok(())
    });
}

#[test]
fn test_workspace_settings_file_is_found() {
    Jail::expect_with(|jail| {
        jail.create_dir(".lambda-reload")?;
        jail.create_file(
            ".lambda-reload/settings.toml",
            r#"
[hot_reload]
watch_interval_ms = 900

[[hot_reload.lambda_paths]]
function_name = "orders"
local_path = "${ORDERS_DIR}"
runtime = "python3.12"
"#,
        )?;

        let settings = Settings::load().map_err(|e| e.to_string())?;

        assert_eq!(settings.hot_reload.watch_interval_ms, 900);
        assert_eq!(settings.hot_reload.lambda_paths.len(), 1);
        assert_eq!(settings.hot_reload.lambda_paths[0].local_path, "${ORDERS_DIR}");
        assert_eq!(settings.project_root.as_deref(), Some(jail.directory()));
        Ok(())
    });
}

#[test]
fn test_env_beats_settings_file() {
    Jail::expect_with(|jail| {
        jail.create_dir(".lambda-reload")?;
        jail.create_file(
            ".lambda-reload/settings.toml",
            "[probe]\nmax_attempts = 10\n",
        )?;
        jail.set_env("LR_PROBE__MAX_ATTEMPTS", "3");

        let settings = Settings::load().map_err(|e| e.to_string())?;
        assert_eq!(settings.probe.max_attempts, 3);
        Ok(())
    });
}
