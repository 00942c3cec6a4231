//! Loading and saving deploy.toml.

use tempfile::TempDir;

use deploy_core::config::{ConfigStore, DeployConfig};

#[test]
fn missing_file_loads_defaults() {
    let temp = TempDir::new().unwrap();
    let store = ConfigStore::from_dir(temp.path().join("deploy"));

    let config = store.load().unwrap();
    assert_eq!(config, DeployConfig::default());
    assert!(!store.config_path().exists());
}

#[test]
fn save_then_load() {
    let temp = TempDir::new().unwrap();
    let store = ConfigStore::from_dir(temp.path().join("deploy"));

    let mut config = DeployConfig::new();
    config.deploy.default_org = Some("remind101".to_string());
    config.deploy.timeout_secs = 45;
    store.save(&config).unwrap();

    assert!(store.config_path().ends_with("deploy/deploy.toml"));
    assert_eq!(store.load().unwrap(), config);
}

#[test]
fn save_token_keeps_other_settings() {
    let temp = TempDir::new().unwrap();
    let store = ConfigStore::from_dir(temp.path().to_path_buf());
    std::fs::write(
        store.config_path(),
        "[deploy]\ndefault_org = \"remind101\"\n",
    )
    .unwrap();

    store.save_token("s3cret").unwrap();

    let config = store.load().unwrap();
    assert_eq!(config.github.token.as_deref(), Some("s3cret"));
    assert_eq!(config.deploy.default_org.as_deref(), Some("remind101"));
}

#[test]
fn invalid_file_reports_path() {
    let temp = TempDir::new().unwrap();
    let store = ConfigStore::from_dir(temp.path().to_path_buf());
    std::fs::write(store.config_path(), "[deploy\n").unwrap();

    let err = format!("{:#}", store.load().unwrap_err());
    assert!(err.contains("deploy.toml"));
    assert!(err.contains("TOML parsing error"));
}

#[cfg(unix)]
#[test]
fn saved_token_is_private_to_the_owner() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let store = ConfigStore::from_dir(temp.path().join("deploy"));
    store.save_token("s3cret").unwrap();

    let mode = std::fs::metadata(store.config_path())
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[cfg(unix)]
#[test]
fn saving_tightens_existing_file_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let store = ConfigStore::from_dir(temp.path().to_path_buf());
    std::fs::write(store.config_path(), "[deploy]\n").unwrap();
    std::fs::set_permissions(store.config_path(), std::fs::Permissions::from_mode(0o644))
        .unwrap();

    store.save_token("s3cret").unwrap();

    let mode = std::fs::metadata(store.config_path())
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o077, 0);
}
