//! Integration tests for configuration rendering
//!
//! Resolves credentials from data bag files on disk and renders the daemon
//! configuration with the production renderer.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use zbx_provision::adapters::credentials::DataBagStore;
use zbx_provision::adapters::render::{digest, format_conf, ConfFileRenderer};
use zbx_provision::adapters::ConfigRenderer;
use zbx_provision::config::ProvisionConfig;
use zbx_provision::core::preview;

fn write_data_bag(root: &Path, group: &str, body: &str) {
    fs::create_dir_all(root.join(group)).unwrap();
    fs::write(root.join(group).join("users.json"), body).unwrap();
}

fn config(data_bags: &Path, role: &str, version: &str) -> ProvisionConfig {
    toml::from_str(&format!(
        r#"
[zabbix]
role = "{role}"
version = "{version}"

[zabbix.config]
SenderFrequency = 30
Timeout = 4
LoadModule = ["a.so", "b.so"]

[zabbix.config.cache]
HistoryTextCacheSize = "16M"
HistoryCacheSize = "16M"

[zabbix.config.hk]
MaxHousekeeperDelete = 5000

[database]
vendor = "postgresql"

[database.postgresql]
credential_group = "zabbix-pg"
listen_addresses = "db.internal"

[credentials]
data_bag_path = '{}'
"#,
        data_bags.display()
    ))
    .unwrap()
}

#[tokio::test]
async fn test_preview_server_32_keeps_sender_frequency() {
    let dir = TempDir::new().unwrap();
    write_data_bag(
        dir.path(),
        "zabbix-pg",
        r#"{"id": "users", "users": {"zabbix": {"options": {"password": "pw-one"}}}}"#,
    );
    let config = config(dir.path(), "server", "3.2");
    let store = Arc::new(DataBagStore::new(dir.path(), "users"));

    let rendered = preview(&config, store).await.unwrap();
    let tree = rendered.tree();

    // Only HistoryTextCacheSize is gone at 3.x below 3.4
    assert!(tree.contains(None, "SenderFrequency"));
    assert!(!tree.contains(Some("cache"), "HistoryTextCacheSize"));
    assert!(tree.contains(Some("cache"), "HistoryCacheSize"));
    assert_eq!(
        tree.get(Some("db"), "DBHost").and_then(|v| v.as_str()),
        Some("db.internal")
    );

    // The redacted view hides the password
    let shown = format_conf(&rendered.redacted());
    assert!(!shown.contains("pw-one"));
    assert!(shown.contains("DBPassword=[REDACTED]\n"));
}

#[tokio::test]
async fn test_preview_proxy_34_prunes_proxy_keys() {
    let dir = TempDir::new().unwrap();
    write_data_bag(
        dir.path(),
        "zabbix-pg",
        r#"{"id": "users", "users": {"zabbix": {"options": {"password": "pw-one"}}}}"#,
    );
    let mut config = config(dir.path(), "proxy", "3.4");
    config.database.proxy_store = "postgresql".to_string();
    let store = Arc::new(DataBagStore::new(dir.path(), "users"));

    let rendered = preview(&config, store).await.unwrap();
    let tree = rendered.tree();

    assert!(!tree.contains(None, "SenderFrequency"));
    assert!(!tree.contains(Some("cache"), "HistoryCacheSize"));
    assert!(!tree.contains(Some("hk"), "MaxHousekeeperDelete"));
    assert!(tree.contains(None, "Timeout"));
}

#[tokio::test]
async fn test_render_writes_once_and_converges() {
    let dir = TempDir::new().unwrap();
    write_data_bag(
        dir.path(),
        "zabbix-pg",
        r#"{"id": "users", "users": {"zabbix": {"options": {"password": "pw-one"}}}}"#,
    );
    let config = config(dir.path(), "server", "4.0");
    let store = Arc::new(DataBagStore::new(dir.path(), "users"));
    let rendered = preview(&config, store).await.unwrap();

    let target = dir.path().join("zabbix_server.conf");
    let renderer = ConfFileRenderer::new(0o640, None);

    assert!(!renderer.is_current(&target, &rendered).await.unwrap());
    let first = renderer.render(&target, &rendered).await.unwrap();
    assert!(first.changed);
    assert!(renderer.is_current(&target, &rendered).await.unwrap());

    let content = fs::read_to_string(&target).unwrap();
    assert_eq!(first.digest, digest(content.as_bytes()));
    assert!(content.contains("LoadModule=a.so\nLoadModule=b.so\n"));
    assert!(content.contains("### db\n"));
    assert!(content.contains("DBPassword=pw-one\n"));

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // Widen the mode; an unchanged render must still restore it
        fs::set_permissions(&target, fs::Permissions::from_mode(0o644)).unwrap();
        let second = renderer.render(&target, &rendered).await.unwrap();
        assert!(!second.changed);
        let mode = fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }
}

#[tokio::test]
async fn test_preview_reports_missing_data_bag() {
    let dir = TempDir::new().unwrap();
    let config = config(dir.path(), "server", "4.0");
    let store = Arc::new(DataBagStore::new(dir.path(), "users"));

    let err = preview(&config, store).await.unwrap_err();
    assert!(err.to_string().contains("zabbix-pg"));
}
