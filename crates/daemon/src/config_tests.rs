// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

use super::*;
use serial_test::serial;

fn with_env(vars: &[(&str, Option<&str>)], f: impl FnOnce()) {
    let saved: Vec<(String, Option<String>)> = vars
        .iter()
        .map(|(k, _)| ((*k).to_string(), std::env::var(k).ok()))
        .collect();
    for (k, v) in vars {
        match v {
            Some(v) => std::env::set_var(k, v),
            None => std::env::remove_var(k),
        }
    }
    f();
    for (k, v) in saved {
        match v {
            Some(v) => std::env::set_var(&k, v),
            None => std::env::remove_var(&k),
        }
    }
}

#[test]
#[serial]
fn load_uses_state_dir_override_and_defaults() {
    let dir = tempfile::tempdir().unwrap();
    with_env(
        &[
            ("GL_STATE_DIR", Some(dir.path().to_str().unwrap())),
            ("GL_CONFIG", None),
        ],
        || {
            let config = Config::load().unwrap();
            assert_eq!(config.state_dir, dir.path());
            assert_eq!(config.lock_path, dir.path().join("gld.pid"));
            assert_eq!(config.log_path, dir.path().join("gld.log"));
            assert_eq!(config.settings.health_check_interval_ms, 30_000);
            assert!(config.settings.knx.managed);
        },
    );
}

#[test]
#[serial]
fn load_reads_toml_settings() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("custom.toml");
    std::fs::write(
        &config_path,
        r#"
health_check_interval_ms = 5000

[knx]
managed = true
listen_port = 6721
reset_on_bus_failure = true

[knx.backend]
type = "ip_tunnel"
host = "gw.local"
port = 3671
"#,
    )
    .unwrap();

    with_env(
        &[
            ("GL_STATE_DIR", Some(dir.path().to_str().unwrap())),
            ("GL_CONFIG", Some(config_path.to_str().unwrap())),
        ],
        || {
            let config = Config::load().unwrap();
            assert_eq!(config.settings.health_check_interval_ms, 5_000);
            assert_eq!(config.settings.knx.listen_port, 6721);
            assert!(config.settings.knx.reset_on_bus_failure);
            assert_eq!(
                config.settings.knx.backend,
                gl_knx::KnxBackend::IpTunnel {
                    host: "gw.local".to_string(),
                    port: 3671
                }
            );
        },
    );
}

#[test]
#[serial]
fn load_rejects_malformed_toml() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("broken.toml");
    std::fs::write(&config_path, "health_check_interval_ms = \"soon\"").unwrap();

    with_env(
        &[
            ("GL_STATE_DIR", Some(dir.path().to_str().unwrap())),
            ("GL_CONFIG", Some(config_path.to_str().unwrap())),
        ],
        || {
            assert!(matches!(
                Config::load(),
                Err(ConfigError::Parse { .. })
            ));
        },
    );
}
