//! Supervisor end-to-end: bus health dialogue and PID-lock recovery.

use gl_adapters::FakeProcessAdapter;
use gl_knx::{
    FakeAddressProvider, Frame, KnxBackend, KnxConfig, KnxSupervisor, PidLock, PidLockError,
    GROUP_PACKET, OPEN_GROUP_SOCKET,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Daemon double that answers the probe handshake and replies to a group
/// read with a group-value-response.
async fn answering_daemon() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let open = gl_knx::frame::read_frame(&mut stream).await.unwrap();
        assert_eq!(open.frame_type, OPEN_GROUP_SOCKET);
        gl_knx::frame::write_frame(&mut stream, &Frame::new(OPEN_GROUP_SOCKET, vec![]))
            .await
            .unwrap();
        let _request = gl_knx::frame::read_frame(&mut stream).await.unwrap();
        // 0x40 in the APCI high bits marks a group-value-response
        gl_knx::frame::write_frame(
            &mut stream,
            &Frame::new(GROUP_PACKET, vec![0x11, 0x01, 0x00, 0x40]),
        )
        .await
        .unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(2)).await;
    });
    port
}

fn managed_config(dir: &tempfile::TempDir, port: u16) -> KnxConfig {
    let mut config = KnxConfig::default();
    config.backend = KnxBackend::IpTunnel {
        host: "gw.local".to_string(),
        port: 3671,
    };
    config.listen_tcp = false;
    config.listen_port = port;
    config.pid_file = Some(dir.path().join("graylogic-knxd.pid"));
    config
}

#[tokio::test]
async fn bus_dialogue_health_check_succeeds_and_rotates_provider() {
    let dir = tempfile::tempdir().unwrap();
    let port = answering_daemon().await;
    let process = FakeProcessAdapter::new();
    process.set_pid(std::process::id());
    let provider = FakeAddressProvider::seed(&["0/0/1"]);
    let supervisor = KnxSupervisor::new(
        managed_config(&dir, port),
        process,
        Some(provider.clone()),
    );

    supervisor.start(&CancellationToken::new()).await.unwrap();
    supervisor
        .health_check(&CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(provider.used(), ["0/0/1"]);
}

#[tokio::test]
async fn stale_pid_file_is_replaced_on_acquisition() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graylogic-knxd.pid");
    // A PID above the default pid_max is guaranteed dead
    std::fs::write(&path, "3999999\n").unwrap();

    let lock = PidLock::acquire_at(path.clone(), 4321, "knxd").unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "4321\n");
    lock.release().unwrap();
    assert!(!path.exists());
}

#[tokio::test]
async fn live_owner_keeps_the_lock() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graylogic-knxd.pid");
    let own_pid = std::process::id();
    std::fs::write(&path, format!("{own_pid}\n")).unwrap();

    let own_comm = std::fs::read_to_string(format!("/proc/{own_pid}/comm"))
        .unwrap()
        .trim()
        .to_string();
    let err = PidLock::acquire_at(path, 5555, &own_comm).unwrap_err();
    assert!(matches!(err, PidLockError::AlreadyRunning { .. }));
}

#[tokio::test]
async fn supervisor_stats_expose_json_surface() {
    let dir = tempfile::tempdir().unwrap();
    let process = FakeProcessAdapter::new();
    process.set_pid(std::process::id());
    let supervisor: KnxSupervisor<_, gl_knx::NoOpAddressProvider> =
        KnxSupervisor::new(managed_config(&dir, 6720), process, None);

    supervisor.start(&CancellationToken::new()).await.unwrap();
    let stats = serde_json::to_value(supervisor.stats()).unwrap();
    assert_eq!(stats["managed"], true);
    assert_eq!(stats["status"], "running");
    assert_eq!(stats["backend"], "ipt:gw.local:3671");
    assert!(stats["pid"].is_u64());
    assert!(stats["uptime_secs"].is_u64());
}
