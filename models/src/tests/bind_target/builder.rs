use crate::{BindTargetBuilder, ModelError};

/// **VALUE**: Verifies that builder validation rejects port zero.
///
/// **WHY THIS MATTERS**: Port 0 asks the OS for an ephemeral port. The gateway has to reclaim
/// the same fixed endpoint its predecessor held, so an ephemeral bind would silently "succeed"
/// on the wrong port.
///
/// **BUG THIS CATCHES**: Would catch if the non-zero check is removed during refactoring.
#[test]
fn given_zero_port_when_building_bind_target_then_returns_validation_error() {
    // GIVEN: Builder with port set to zero
    let builder = BindTargetBuilder::default()
        .with_host("127.0.0.1")
        .with_port(0);

    // WHEN: Attempting to build
    let result = builder.build();

    // THEN: Should return validation error
    match result {
        Err(ModelError::Validation { message, .. }) => {
            assert_eq!(message, "Port must be non-zero");
        }
        Ok(target) => panic!("Expected validation error, got {target:?}"),
    }
}

/// **VALUE**: Verifies that builder validation rejects a missing port.
///
/// **WHY THIS MATTERS**: A target without a port cannot be bound; the error must surface at
/// construction rather than as an opaque OS error later.
///
/// **BUG THIS CATCHES**: Would catch if the builder defaulted the port silently.
#[test]
fn given_missing_port_when_building_then_returns_validation_error() {
    // GIVEN: Builder without port
    let builder = BindTargetBuilder::default().with_host("127.0.0.1");

    // WHEN: Attempting to build
    let result = builder.build();

    // THEN: Should return validation error naming the port
    let err = result.expect_err("Missing port should fail");
    assert!(err.to_string().contains("Port is required"));
}

/// **VALUE**: Verifies that whitespace-only hosts are rejected.
///
/// **WHY THIS MATTERS**: An empty host would be handed to the resolver and fail with a
/// confusing lookup error instead of a clear validation message.
///
/// **BUG THIS CATCHES**: Would catch if trimming is dropped before the emptiness check.
#[test]
fn given_blank_host_when_building_then_returns_validation_error() {
    // GIVEN: Builder with a blank host
    let builder = BindTargetBuilder::default().with_host("   ").with_port(18789);

    // WHEN: Attempting to build
    let result = builder.build();

    // THEN: Should return validation error
    let err = result.expect_err("Blank host should fail");
    assert!(err.to_string().contains("Host cannot be empty"));
}

/// **VALUE**: Verifies that a valid builder produces a trimmed target with stable Display.
///
/// **WHY THIS MATTERS**: `Display` feeds the `ws://host:port` text of lock-conflict errors.
///
/// **BUG THIS CATCHES**: Would catch if the host is stored untrimmed or IPv6 literals are
/// printed without brackets (making the port ambiguous).
#[test]
fn given_valid_fields_when_building_then_formats_as_host_port() {
    // GIVEN: Valid IPv4 and IPv6 builders
    let v4 = BindTargetBuilder::default()
        .with_host(" 127.0.0.1 ")
        .with_port(18789)
        .build()
        .expect("valid target");
    let v6 = BindTargetBuilder::default()
        .with_host("::1")
        .with_port(18789)
        .build()
        .expect("valid target");

    // THEN: Should expose fields and format host:port
    assert_eq!(v4.host(), "127.0.0.1");
    assert_eq!(v4.port(), 18789);
    assert_eq!(v4.to_string(), "127.0.0.1:18789");
    assert_eq!(v6.to_string(), "[::1]:18789");
}
