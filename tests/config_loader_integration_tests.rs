use audio_cast_guard::TransportCategory;
use audio_cast_guard::config::{Config, ConfigLoader};
use audio_cast_guard::system::{MockFileSystem, StandardFileSystem};
use std::path::PathBuf;

/// Integration tests for ConfigLoader with file system abstraction
#[cfg(test)]
mod config_loader_tests {
    use super::*;

    #[test]
    fn test_full_config_file() {
        let file_system = MockFileSystem::new();
        let config_path = PathBuf::from("/test/config.toml");

        let config_content = r#"
[general]
log_level = "debug"

[logging]
file_output = false
console_output = true
json_format = true
retention_days = 14

[policy]
fallback_order = ["wired_or_dock_connected", "built_in"]
follow_user_selection = false

[service]
slow_evaluation_warn_ms = 500
lock_file = "/tmp/guard.lock"
"#;
        file_system.add_file(&config_path, config_content.to_string());

        let loader = ConfigLoader::new(file_system, config_path);
        let config = loader.load_config().unwrap();

        assert_eq!(config.general.log_level, "debug");
        assert!(!config.logging.file_output);
        assert!(config.logging.json_format);
        assert_eq!(config.logging.retention_days, 14);
        assert_eq!(
            config.policy.fallback_order,
            vec![
                TransportCategory::WiredOrDockConnected,
                TransportCategory::BuiltIn
            ]
        );
        assert!(!config.policy.follow_user_selection);
        assert_eq!(config.service.slow_evaluation_warn_ms, 500);
        assert_eq!(config.service.lock_file, Some(PathBuf::from("/tmp/guard.lock")));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let file_system = MockFileSystem::new();
        let config_path = PathBuf::from("/test/config.toml");
        file_system.add_file(&config_path, "[general]\nlog_level = \"warn\"\n".to_string());

        let config = ConfigLoader::new(file_system, config_path)
            .load_config()
            .unwrap();

        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.policy, Config::default().policy);
        assert_eq!(config.service, Config::default().service);
    }

    #[test]
    fn test_airplay_in_fallback_order_is_rejected() {
        let file_system = MockFileSystem::new();
        let config_path = PathBuf::from("/test/config.toml");
        file_system.add_file(
            &config_path,
            "[policy]\nfallback_order = [\"wireless_cast\", \"built_in\"]\n".to_string(),
        );

        let err = ConfigLoader::new(file_system, config_path)
            .load_config()
            .unwrap_err();
        assert!(format!("{:#}", err).contains("wireless_cast"));
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let file_system = MockFileSystem::new();
        let config_path = PathBuf::from("/test/config.toml");
        file_system.add_file(
            &config_path,
            "[policy]\nfallback_order = [\"carrier_pigeon\"]\n".to_string(),
        );

        assert!(ConfigLoader::new(file_system, config_path).load_config().is_err());
    }

    #[test]
    fn test_empty_fallback_order_is_rejected() {
        let file_system = MockFileSystem::new();
        let config_path = PathBuf::from("/test/config.toml");
        file_system.add_file(&config_path, "[policy]\nfallback_order = []\n".to_string());

        let err = ConfigLoader::new(file_system, config_path)
            .load_config()
            .unwrap_err();
        assert!(format!("{:#}", err).contains("fallback_order must not be empty"));
    }

    #[test]
    fn test_read_failure_is_reported_with_path() {
        let file_system = MockFileSystem::new();
        let config_path = PathBuf::from("/test/config.toml");
        file_system.add_file(&config_path, String::new());
        file_system.set_read_failure(true);

        let loader = ConfigLoader::new(file_system.clone(), config_path.clone());
        let err = loader.load_config().unwrap_err();

        assert!(format!("{:#}", err).contains("/test/config.toml"));
        assert_eq!(file_system.get_read_calls(), vec![config_path.clone()]);
        assert_eq!(loader.get_config_path(), config_path.as_path());
    }

    #[test]
    fn test_unwritable_default_config_still_loads_defaults() {
        let file_system = MockFileSystem::new();
        let config_path = PathBuf::from("/readonly/config.toml");
        file_system.set_write_failure(true);

        let config = ConfigLoader::new(file_system.clone(), config_path.clone())
            .load_config()
            .unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(file_system.get_write_calls().len(), 1);
        assert!(file_system.file_content(&config_path).is_none());
    }

    #[test]
    fn test_missing_file_writes_defaults() {
        let file_system = MockFileSystem::new();
        let config_path = PathBuf::from("/test/new/config.toml");

        let loader = ConfigLoader::new(file_system.clone(), config_path.clone());
        let config = loader.load_config().unwrap();

        assert_eq!(config, Config::default());
        let written = file_system.file_content(&config_path).expect("default config saved");
        assert!(written.contains("follow_user_selection"));
    }

    #[test]
    fn test_roundtrip_on_real_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("nested/config.toml");
        let loader = ConfigLoader::new(StandardFileSystem, config_path.clone());

        let mut config = Config::default();
        config.policy.fallback_order = vec![TransportCategory::BuiltIn];
        config.logging.retention_days = 3;
        loader.save_config(&config).unwrap();

        assert!(config_path.exists());
        assert_eq!(loader.load_config().unwrap(), config);
    }

    #[test]
    fn test_config_load_with_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "[service]\nslow_evaluation_warn_ms = 50\n").unwrap();

        let config = Config::load(config_path.to_str()).unwrap();
        assert_eq!(config.service.slow_evaluation_warn_ms, 50);
    }
}
