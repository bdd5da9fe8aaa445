use std::fs;
use std::path::PathBuf;

use scwctl_core::config::{Config, ConfigError, CredentialStore, Profile};
use serial_test::serial;
use tempfile::TempDir;

/// Returns true if running as root (euid == 0). Used to skip permission tests.
#[cfg(unix)]
fn is_root() -> bool {
    // Use `id -u` to check the effective user ID without depending on libc.
    std::process::Command::new("id")
        .arg("-u")
        .output()
        .ok()
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim() == "0")
        .unwrap_or(false)
}

fn write_config(content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, content).unwrap();
    (dir, config_path)
}

// ---------------------------------------------------------------------------
// 1. Missing config directory / nonexistent path
// ---------------------------------------------------------------------------

#[test]
fn load_from_nonexistent_path_returns_default_config() {
    let path = PathBuf::from("/tmp/scwctl-test-nonexistent/does/not/exist/config.toml");
    assert!(!path.exists());

    let config = Config::load_from_path(&path).expect("should not panic or error on missing path");

    assert!(config.profiles.is_empty());
    assert!(config.active_profile.is_none());
}

// ---------------------------------------------------------------------------
// 2. Empty config file
// ---------------------------------------------------------------------------

#[test]
fn load_empty_config_file_returns_default_config() {
    let (_dir, config_path) = write_config("");

    let config = Config::load_from_path(&config_path).expect("empty file should parse as default");

    assert!(config.profiles.is_empty());
    assert!(config.active_profile.is_none());
}

// ---------------------------------------------------------------------------
// 3. Corrupt / invalid TOML
// ---------------------------------------------------------------------------

#[test]
fn load_corrupt_toml_returns_parse_error() {
    let (_dir, config_path) = write_config("[[[broken");

    let err = Config::load_from_path(&config_path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
    assert!(
        err.to_string().contains("parse"),
        "error should mention parsing: {err}"
    );
}

// ---------------------------------------------------------------------------
// 4. Profile without a secret key loads, but does not resolve
// ---------------------------------------------------------------------------

#[test]
fn profile_missing_secret_key_fails_to_resolve() {
    let (_dir, config_path) = write_config(
        r#"
[profiles.broken]
default_zone = "fr-par-1"
"#,
    );

    let config = Config::load_from_path(&config_path).expect("partial profile should load");
    let err = config
        .resolve(Some("broken"), &CredentialStore::new().without_env())
        .unwrap_err();
    assert!(
        matches!(err, ConfigError::MissingCredential { ref field, .. } if field == "secret_key"),
        "unexpected error: {err}"
    );
}

// ---------------------------------------------------------------------------
// 5. Config with unknown / extra fields
// ---------------------------------------------------------------------------

#[test]
fn load_config_with_unknown_fields_ignores_them() {
    let (_dir, config_path) = write_config(
        r#"
unknown_top_level_key = "hello"

[profiles.dev]
secret_key = "s"
totally_unknown_field = true
"#,
    );

    let config =
        Config::load_from_path(&config_path).expect("unknown fields should be silently ignored");

    assert!(config.profiles.contains_key("dev"));
}

// ---------------------------------------------------------------------------
// 6. Invalid locality values
// ---------------------------------------------------------------------------

#[test]
fn invalid_default_zone_is_reported() {
    let (_dir, config_path) = write_config(
        r#"
[profiles.dev]
secret_key = "s"
default_zone = "paris"
"#,
    );

    let config = Config::load_from_path(&config_path).unwrap();
    let err = config
        .resolve(None, &CredentialStore::new().without_env())
        .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "default_zone"));
}

#[test]
fn default_zone_implies_region_and_polling_converts() {
    let (_dir, config_path) = write_config(
        r#"
active_profile = "dev"

[profiles.dev]
secret_key = "s"
default_zone = "nl-ams-2"

[profiles.dev.polling]
interval_secs = 2
timeout_secs = 10
"#,
    );

    let config = Config::load_from_path(&config_path).unwrap();
    let resolved = config
        .resolve(None, &CredentialStore::new().without_env())
        .unwrap();
    assert_eq!(resolved.name, "dev");
    assert_eq!(resolved.default_region.unwrap().to_string(), "nl-ams");
    assert_eq!(resolved.wait.max_retries, 5);
    assert_eq!(resolved.wait.interval.as_secs(), 2);
}

// ---------------------------------------------------------------------------
// 7. Environment variable expansion and overrides
// ---------------------------------------------------------------------------

#[test]
#[serial]
fn env_vars_are_expanded_on_load() {
    unsafe {
        std::env::set_var("SCWCTL_TEST_PROJECT", "33333333-3333-3333-3333-333333333333");
    }
    let (_dir, config_path) = write_config(
        r#"
[profiles.dev]
secret_key = "s"
default_project_id = "${SCWCTL_TEST_PROJECT}"
api_url = "${SCWCTL_TEST_UNSET_URL:-https://api.example.test}"
"#,
    );

    let config = Config::load_from_path(&config_path).unwrap();
    let profile = &config.profiles["dev"];
    assert_eq!(
        profile.default_project_id.as_deref(),
        Some("33333333-3333-3333-3333-333333333333")
    );
    assert_eq!(profile.api_url.as_deref(), Some("https://api.example.test"));

    unsafe {
        std::env::remove_var("SCWCTL_TEST_PROJECT");
    }
}

#[test]
#[serial]
fn env_only_profile_when_no_profiles_exist() {
    unsafe {
        std::env::set_var("SCW_SECRET_KEY", "env-secret");
        std::env::set_var("SCW_DEFAULT_ZONE", "pl-waw-1");
    }

    let resolved = Config::default()
        .resolve(None, &CredentialStore::new())
        .unwrap();
    assert_eq!(resolved.name, "env");
    assert_eq!(resolved.secret_key, "env-secret");
    assert_eq!(resolved.default_zone.unwrap().to_string(), "pl-waw-1");

    unsafe {
        std::env::remove_var("SCW_SECRET_KEY");
        std::env::remove_var("SCW_DEFAULT_ZONE");
    }
}

#[test]
#[serial]
fn env_overrides_profile_values() {
    unsafe {
        std::env::set_var("SCW_SECRET_KEY", "from-env");
    }

    let mut config = Config::default();
    config.set_profile(
        "dev".to_string(),
        Profile {
            secret_key: Some("from-file".to_string()),
            ..Default::default()
        },
    );
    let resolved = config.resolve(None, &CredentialStore::new()).unwrap();
    assert_eq!(resolved.secret_key, "from-env");

    let resolved = config
        .resolve(None, &CredentialStore::new().without_env())
        .unwrap();
    assert_eq!(resolved.secret_key, "from-file");

    unsafe {
        std::env::remove_var("SCW_SECRET_KEY");
    }
}

// ---------------------------------------------------------------------------
// 8. Round trip through save / load
// ---------------------------------------------------------------------------

#[test]
fn save_then_load_keeps_profiles_and_active_profile() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.set_profile(
        "prod".to_string(),
        Profile {
            secret_key: Some("keyring:prod-secret".to_string()),
            default_zone: Some("fr-par-2".to_string()),
            ..Default::default()
        },
    );
    config.set_active_profile("prod").unwrap();
    config.save_to_path(&config_path).unwrap();

    let loaded = Config::load_from_path(&config_path).unwrap();
    assert_eq!(loaded.active_profile.as_deref(), Some("prod"));
    assert_eq!(loaded.profiles["prod"], config.profiles["prod"]);
}

// ---------------------------------------------------------------------------
// 9. Permission errors (unix only)
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[test]
fn load_unreadable_file_returns_clear_error() {
    use std::os::unix::fs::PermissionsExt;

    // Skip if running as root (permissions won't be enforced)
    if is_root() {
        eprintln!("skipping test: running as root");
        return;
    }

    let (_dir, config_path) = write_config("# valid toml");
    fs::set_permissions(&config_path, fs::Permissions::from_mode(0o000)).unwrap();

    let err = Config::load_from_path(&config_path).unwrap_err();
    assert!(
        err.to_string().contains("load"),
        "error should reference loading: {err}"
    );

    // Restore permissions so TempDir cleanup can remove the file
    fs::set_permissions(&config_path, fs::Permissions::from_mode(0o644)).unwrap();
}

#[cfg(unix)]
#[test]
fn save_to_readonly_directory_returns_clear_error() {
    use std::os::unix::fs::PermissionsExt;

    if is_root() {
        eprintln!("skipping test: running as root");
        return;
    }

    let dir = TempDir::new().unwrap();
    let readonly_dir = dir.path().join("readonly");
    fs::create_dir(&readonly_dir).unwrap();
    fs::set_permissions(&readonly_dir, fs::Permissions::from_mode(0o444)).unwrap();

    let config_path = readonly_dir.join("config.toml");
    let err = Config::default().save_to_path(&config_path).unwrap_err();
    assert!(
        err.to_string().contains("save"),
        "error should reference saving: {err}"
    );

    fs::set_permissions(&readonly_dir, fs::Permissions::from_mode(0o755)).unwrap();
}
