// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Gray Logic Ltd

use super::*;
use gl_adapters::RestartPolicy;

#[test]
fn default_args_cover_required_flags() {
    let config = KnxConfig::default();
    assert_eq!(
        config.build_args(),
        [
            "-e", "1.1.128", "-E", "1.1.129:8", "-i6720", "-b", "usb:"
        ]
    );
}

#[test]
fn optional_flags_are_appended() {
    let mut config = KnxConfig::default();
    config.log_level = Some(6);
    config.trace_mask = Some(0x3ff);
    let args = config.build_args();
    assert!(args.contains(&"-f6".to_string()));
    assert!(args.contains(&"-t0x3ff".to_string()));
}

#[test]
fn tcp_listen_flag_is_omitted_when_disabled() {
    let mut config = KnxConfig::default();
    config.listen_tcp = false;
    assert!(!config.build_args().iter().any(|a| a.starts_with("-i")));
}

#[yare::parameterized(
    usb     = { KnxBackend::Usb, "usb:" },
    tunnel  = { KnxBackend::IpTunnel { host: "gw.local".to_string(), port: 3671 }, "ipt:gw.local:3671" },
    routing = { KnxBackend::IpRouting { multicast: "224.0.23.12".to_string() }, "ip:224.0.23.12" },
)]
fn backend_argument_forms(backend: KnxBackend, expected: &str) {
    assert_eq!(backend.as_arg(), expected);
}

#[test]
fn backend_deserializes_from_tagged_toml() {
    #[derive(serde::Deserialize)]
    struct Wrapper {
        backend: KnxBackend,
    }
    let wrapper: Wrapper = serde_json::from_str(
        r#"{"backend": {"type": "ip_tunnel", "host": "gw", "port": 3671}}"#,
    )
    .unwrap();
    assert_eq!(
        wrapper.backend,
        KnxBackend::IpTunnel {
            host: "gw".to_string(),
            port: 3671
        }
    );
}

#[test]
fn restart_settings_map_to_policies() {
    let mut settings = RestartSettings::default();
    assert!(matches!(
        settings.to_policy(),
        RestartPolicy::Exponential { .. }
    ));

    settings.strategy = RestartStrategy::Fixed;
    settings.delay_ms = 250;
    settings.max_attempts = 3;
    assert_eq!(
        settings.to_policy(),
        RestartPolicy::Fixed {
            delay: Duration::from_millis(250),
            max_attempts: 3
        }
    );
}

#[test]
fn process_spec_carries_restart_and_grace() {
    let mut config = KnxConfig::default();
    config.restart.graceful_stop_ms = 2_000;
    let spec = config.process_spec();
    assert_eq!(spec.program, PathBuf::from("knxd"));
    assert_eq!(spec.graceful_stop, Duration::from_secs(2));
    assert!(spec.on_restart.is_none());
}

#[test]
fn connection_url_prefers_tcp() {
    let config = KnxConfig::default();
    assert_eq!(config.connection_url(), "tcp://127.0.0.1:6720");

    let mut external = KnxConfig::default();
    external.listen_tcp = false;
    assert_eq!(external.connection_url(), "usb:");
}

#[test]
fn config_roundtrips_through_serde_defaults() {
    let config: KnxConfig = serde_json::from_str("{}").unwrap();
    assert!(config.managed);
    assert_eq!(config.listen_port, 6720);
    assert_eq!(config.backend, KnxBackend::Usb);
    assert_eq!(config.bus_check_timeout(), Duration::from_secs(3));
}
