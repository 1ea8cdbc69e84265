use dupfind::cli::OutputFormat;
use dupfind::config::{ConfigError, ScanConfig, Settings, SettingsOverrides};
use dupfind::duplicates::{SizeFilter, SizeOperator};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_settings_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = Figment::from(Serialized::defaults(Settings::default()));
    let settings: Settings = figment.extract().unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(settings.io_threads, 4);
}

#[test]
fn test_settings_load_from_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "io_threads = 1\noutput = \"json\"\n").unwrap();

    let settings = Settings::load(Some(&path), &SettingsOverrides::default()).unwrap();

    assert_eq!(settings.io_threads, 1);
    assert_eq!(settings.output, OutputFormat::Json);
    assert_eq!(
        settings,
        Settings {
            io_threads: 1,
            output: OutputFormat::Json,
            ..Settings::default()
        }
    );
}

#[test]
fn test_settings_env_layer() {
    std::env::set_var("DUPFIND_TEST_BUFFER_SIZE", "8192");
    std::env::set_var("DUPFIND_TEST_OUTPUT", "json");

    let figment = Figment::from(Serialized::defaults(Settings::default()))
        .merge(Env::prefixed("DUPFIND_TEST_"));
    let settings: Settings = figment.extract().unwrap();

    assert_eq!(settings.buffer_size, 8192);
    assert_eq!(settings.output, OutputFormat::Json);

    std::env::remove_var("DUPFIND_TEST_BUFFER_SIZE");
    std::env::remove_var("DUPFIND_TEST_OUTPUT");
}

#[test]
fn test_cli_overrides_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "io_threads = 8\nbuffer_size = 131072\n").unwrap();

    let overrides = SettingsOverrides {
        io_threads: Some(2),
        output: Some(OutputFormat::Json),
        ..Default::default()
    };
    let settings = Settings::load(Some(&path), &overrides).unwrap();

    assert_eq!(settings.io_threads, 2);
    assert_eq!(settings.buffer_size, 131072);
    assert_eq!(settings.output, OutputFormat::Json);
}

#[test]
fn test_zero_io_threads_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "io_threads = 0\n").unwrap();

    let result = Settings::load(Some(&path), &SettingsOverrides::default());
    assert!(matches!(result, Err(ConfigError::InvalidIoThreads)));
}

#[test]
fn test_invalid_toml_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "io_threads = [").unwrap();

    let figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file(&path));
    assert!(figment.extract::<Settings>().is_err());

    let result = Settings::load(Some(&path), &SettingsOverrides::default());
    assert!(matches!(result, Err(ConfigError::Settings(_))));
}

#[test]
fn test_scan_config_validation() {
    assert!(matches!(
        ScanConfig::parse(4, Some(1), None),
        Err(ConfigError::DepthOrder { .. })
    ));
    assert!(matches!(
        ScanConfig::parse(0, None, Some("+")),
        Err(ConfigError::InvalidSize(_))
    ));

    let config = ScanConfig::parse(1, Some(3), Some("+1M")).unwrap();
    assert_eq!(
        config.size_filter(),
        SizeFilter::new(SizeOperator::GreaterOrEqual, 1024 * 1024)
    );
}
