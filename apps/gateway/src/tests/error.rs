// Unit tests for error module
// Display text is what ends up in gateway.log and on stderr

use crate::error::GatewayError;

use gateway_core::error::CoreError;
use gateway_core::error::listen::ListenError;

use common::ErrorLocation;

use std::error::Error;
use std::io::{Error as IoError, ErrorKind};
use std::panic::Location;

fn listen_error(kind: ErrorKind) -> ListenError {
    let endpoint = String::from("ws://127.0.0.1:18789");
    let location = ErrorLocation::from(Location::caller());
    let source = IoError::from(kind);
    if kind == ErrorKind::AddrInUse {
        ListenError::LockConflict {
            message: format!("another gateway instance is already listening on {endpoint}"),
            endpoint,
            location,
            source,
        }
    } else {
        ListenError::Bind {
            message: format!("failed to bind gateway socket on {endpoint}: {source}"),
            endpoint,
            location,
            source,
        }
    }
}

/// **VALUE**: Tests that a lock conflict keeps its message, endpoint and OS cause.
///
/// **WHY THIS MATTERS**: Operators read this line to learn which instance to stop, and
/// callers walk `source()` down to the errno.
///
/// **BUG THIS CATCHES**: Would catch the listen error being flattened to a string.
#[test]
fn given_lock_conflict_when_converted_then_lock_error_keeps_source_chain() {
    // GIVEN: A lock conflict from the retry loop
    let err = GatewayError::from_listen(listen_error(ErrorKind::AddrInUse));

    // THEN: Lock variant with the original message and endpoint
    assert!(err.is_lock());
    assert!(err.to_string().starts_with("Lock Error: another gateway instance"));
    let GatewayError::Lock { endpoint, .. } = &err else {
        panic!("Expected GatewayError::Lock, got {err:?}");
    };
    assert_eq!(endpoint, "ws://127.0.0.1:18789");

    // AND: source() reaches the io error through the listen error
    let listen = err
        .source()
        .and_then(|source| source.downcast_ref::<ListenError>())
        .expect("source should be the listen error");
    let io = listen
        .source()
        .and_then(|source| source.downcast_ref::<IoError>())
        .expect("listen error should carry the io error");
    assert_eq!(io.kind(), ErrorKind::AddrInUse);
}

/// **VALUE**: Tests that other bind failures become core errors, not lock errors.
///
/// **WHY THIS MATTERS**: Lock conflicts are expected during restarts and are reported
/// differently from real failures such as a privileged port.
///
/// **BUG THIS CATCHES**: Would catch every listen error being treated as a lock.
#[test]
fn given_bind_failure_when_converted_then_core_error_wraps_listen_error() {
    // GIVEN: A non-conflict bind failure
    let err = GatewayError::from_listen(listen_error(ErrorKind::PermissionDenied));

    // THEN: Core error whose source is the listen error
    assert!(!err.is_lock());
    assert!(err.to_string().starts_with("Core Error: Bind Error: "));
    match &err {
        GatewayError::Core {
            source: CoreError::Listen(listen),
            ..
        } => assert_eq!(listen.io_kind(), ErrorKind::PermissionDenied),
        other => panic!("Expected core listen error, got {other:?}"),
    }
}
