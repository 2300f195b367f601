//! Configuration loading tests
//!
//! These tests modify process environment variables and run serially.

use serial_test::serial;
use Presensi::config::Settings;

#[test]
#[serial]
fn test_defaults_load_without_config_file() {
    let settings = Settings::new().unwrap();
    assert_eq!(settings.api.base_url, "http://localhost:8080/api");
    assert_eq!(settings.relay.capacity, 50);
    assert_eq!(settings.i18n.default_language, "id");
    settings.validate().unwrap();
}

#[test]
#[serial]
fn test_environment_overrides() {
    std::env::set_var("PRESENSI_API__BASE_URL", "https://presensi.example.sch.id/api");
    std::env::set_var("PRESENSI_RELAY__MAX_ATTEMPTS", "5");

    let settings = Settings::new();

    std::env::remove_var("PRESENSI_API__BASE_URL");
    std::env::remove_var("PRESENSI_RELAY__MAX_ATTEMPTS");

    let settings = settings.unwrap();
    assert_eq!(settings.api.base_url, "https://presensi.example.sch.id/api");
    assert_eq!(settings.relay.max_attempts, 5);
    settings.validate().unwrap();
}

#[test]
#[serial]
fn test_rendered_toml_round_trips() {
    let settings = Settings::default();
    let rendered = settings.to_toml().unwrap();
    assert!(rendered.contains("[relay]"));

    let parsed: Settings = toml::from_str(&rendered).unwrap();
    assert_eq!(parsed.session.allowed_durations, settings.session.allowed_durations);
}
