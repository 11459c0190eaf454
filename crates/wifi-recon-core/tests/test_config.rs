//! Integration tests for [`wifi_recon_core::ReconConfig`].

use std::path::PathBuf;

use tempfile::TempDir;

use wifi_recon_core::{ConfigError, LinkType, ReconConfig, Registry};

#[test]
fn partial_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("recon.json");
    std::fs::write(&path, r#"{ "link_type": 105, "ap_ttl_secs": 30 }"#).unwrap();

    let cfg = ReconConfig::from_json(&path).unwrap();
    assert_eq!(cfg.link_type, LinkType::IEEE802_11);
    assert_eq!(cfg.ap_ttl_secs, 30);
    assert_eq!(cfg.save_interval_secs, 10);
    assert_eq!(cfg.handshakes_file, PathBuf::from("wifi-handshakes.pcap"));
}

#[test]
fn missing_file_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nope.json");

    match ReconConfig::from_json(&path) {
        Err(ConfigError::FileRead { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected FileRead, got {other:?}"),
    }
}

#[test]
fn malformed_json_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("recon.json");
    std::fs::write(&path, "{ link_type: ").unwrap();

    assert!(matches!(
        ReconConfig::from_json(&path),
        Err(ConfigError::InvalidValue { .. })
    ));
}

#[test]
fn out_of_range_values_are_rejected_on_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("recon.json");
    std::fs::write(&path, r#"{ "save_interval_secs": 0 }"#).unwrap();

    assert!(matches!(
        ReconConfig::from_json(&path),
        Err(ConfigError::InvalidValue {
            field: "save_interval_secs",
            ..
        })
    ));
}

#[test]
fn config_drives_a_save_cycle() {
    let dir = TempDir::new().unwrap();
    let cfg = ReconConfig {
        handshakes_file: dir.path().join("out.pcap"),
        link_type: LinkType::IEEE802_11,
        ..ReconConfig::default()
    };

    let registry: Registry = Registry::new();
    registry.upsert("Home", "00:11:22:33:44:55", 2412, -40);

    let summary = registry
        .save_handshakes_to(&cfg.handshakes_file, cfg.link_type)
        .unwrap();
    assert!(summary.header_written);
    assert!(registry.prune_stale(cfg.ap_ttl()).is_empty());
    assert_eq!(registry.len(), 1);
    assert_eq!(cfg.save_interval(), std::time::Duration::from_secs(10));
}
