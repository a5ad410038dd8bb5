use gateway::error::GatewayError;
use gateway::startup::{bind_gateway, load_config, prepare_log_dir};

use gateway_core::config::GatewayConfig;
use gateway_core::error::CoreError;
use gateway_core::error::config::ConfigError;

use std::fs;
use std::io::ErrorKind;
use std::net::{Ipv4Addr, TcpListener as StdTcpListener};
use std::time::Duration;

use tempfile::TempDir;

// ============================================================================
// Integration tests for startup against real sockets and directories
// ============================================================================

fn config_for_port(port: u16, max_retries: u32) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.gateway.port = port;
    config.listen.max_retries = max_retries;
    config.listen.base_delay = Duration::from_millis(5);
    config
}

fn free_port() -> u16 {
    let probe = StdTcpListener::bind((Ipv4Addr::LOCALHOST, 0)).expect("probe bind");
    probe.local_addr().expect("probe addr").port()
}

/// **VALUE**: Tests that a free configured port is bound on the first try.
///
/// **WHY THIS MATTERS**: This is the normal startup path.
///
/// **BUG THIS CATCHES**: Would catch the config's host/port not reaching the binder.
#[tokio::test]
async fn given_free_port_when_binding_gateway_then_listens_on_configured_port() {
    // GIVEN: A config pointing at a free loopback port
    let port = free_port();
    let config = config_for_port(port, 0);

    // WHEN: Binding
    let listener = bind_gateway(&config).await.expect("should bind");

    // THEN: Listening on exactly that port
    assert_eq!(listener.local_addr().expect("addr").port(), port);
}

/// **VALUE**: Tests that a port held for the whole budget becomes a lock error.
///
/// **WHY THIS MATTERS**: The binary exits non-zero with a message naming the endpoint
/// when another gateway is running.
///
/// **BUG THIS CATCHES**: Would catch a lock conflict reported as a generic core error,
/// or the port-holder lookup turning the conflict into a different failure.
#[tokio::test]
async fn given_port_held_when_binding_gateway_then_returns_lock_error() {
    // GIVEN: Another listener on the configured port
    let holder = StdTcpListener::bind((Ipv4Addr::LOCALHOST, 0)).expect("holder bind");
    let port = holder.local_addr().expect("holder addr").port();
    let config = config_for_port(port, 1);

    // WHEN: Binding
    let result = bind_gateway(&config).await;

    // THEN: Lock error naming the endpoint
    match result {
        Err(GatewayError::Lock {
            message,
            endpoint,
            source,
            ..
        }) => {
            assert_eq!(endpoint, format!("ws://127.0.0.1:{port}"));
            assert_eq!(source.io_kind(), ErrorKind::AddrInUse);
            assert!(
                message.contains("another gateway instance is already listening"),
                "Got: {message}"
            );
        }
        other => panic!("Expected GatewayError::Lock, got {other:?}"),
    }
    drop(holder);
}

/// **VALUE**: Tests that an invalid configured port is rejected before binding.
///
/// **WHY THIS MATTERS**: Port 0 would silently bind an ephemeral port clients cannot find.
///
/// **BUG THIS CATCHES**: Would catch `bind_gateway` skipping bind-target validation.
#[tokio::test]
async fn given_zero_port_when_binding_gateway_then_returns_core_error() {
    let config = config_for_port(0, 0);

    let result = bind_gateway(&config).await;

    assert!(matches!(
        result,
        Err(GatewayError::Core {
            source: CoreError::Model(_),
            ..
        })
    ));
}

/// **VALUE**: Tests log directory creation and config loading from a config dir.
///
/// **WHY THIS MATTERS**: These run before anything else at startup; a fresh machine has
/// neither directory nor config.
///
/// **BUG THIS CATCHES**: Would catch a missing `create_dir_all` or an error on a missing
/// config file.
#[test]
fn given_fresh_config_dir_when_preparing_then_creates_logs_and_loads_defaults() {
    // GIVEN: A config dir that does not exist yet
    let temp_dir = TempDir::new().expect("temp dir");
    let config_dir = temp_dir.path().join("gateway");

    // WHEN: Preparing logs and loading config
    let log_dir = prepare_log_dir(&config_dir).expect("log dir");
    let config = load_config(&config_dir).expect("config");

    // THEN: logs/ exists and config is default
    assert_eq!(log_dir, config_dir.join("logs"));
    assert!(log_dir.is_dir());
    assert_eq!(config, GatewayConfig::default());
}

/// **VALUE**: Tests that a broken config file stops startup with a core error.
///
/// **WHY THIS MATTERS**: Falling back to defaults would listen on a port the operator
/// did not choose.
///
/// **BUG THIS CATCHES**: Would catch config errors being swallowed by the binary.
#[test]
fn given_corrupt_config_when_loading_then_returns_core_error() {
    let temp_dir = TempDir::new().expect("temp dir");
    fs::write(temp_dir.path().join("config.json"), "{").expect("write config");

    let result = load_config(temp_dir.path());

    assert!(matches!(
        result,
        Err(GatewayError::Core {
            source: CoreError::Config(ConfigError::Format { .. }),
            ..
        })
    ));
}
