use gateway_core::error::CoreError;
use gateway_core::error::listen::ListenError;
use common::ErrorLocation;

use std::error::Error;
use std::io::{Error as IoError, ErrorKind};
use std::panic::Location;

/// **VALUE**: Verifies that `ListenError::LockConflict` formats with kind, message and location.
///
/// **WHY THIS MATTERS**: The binary logs this error verbatim before exiting. The operator
/// needs the endpoint and the source location of the failure in a single line.
///
/// **BUG THIS CATCHES**: Would catch a Display change dropping the location suffix.
#[test]
fn given_lock_conflict_when_formatted_then_includes_message_and_location() {
    // GIVEN: A lock conflict
    let err = ListenError::LockConflict {
        message: String::from("another gateway instance is already listening on ws://127.0.0.1:1"),
        endpoint: String::from("ws://127.0.0.1:1"),
        location: ErrorLocation::from(Location::caller()),
        source: IoError::from(ErrorKind::AddrInUse),
    };

    // WHEN: Formatting the error
    let text = err.to_string();

    // THEN: Kind, message and location are all present
    assert!(text.starts_with("Lock Conflict Error: another gateway instance"));
    assert!(text.contains("ws://127.0.0.1:1"));
    assert!(text.contains("listen.rs"));
    assert_eq!(err.endpoint(), "ws://127.0.0.1:1");
}

/// **VALUE**: Verifies the OS error is kept as the source.
///
/// **WHY THIS MATTERS**: Callers walk `source()` to print the underlying errno text.
///
/// **BUG THIS CATCHES**: Would catch a removed `#[source]` attribute.
#[test]
fn given_bind_error_when_walking_source_then_reaches_io_error() {
    // GIVEN: A bind error wrapped in CoreError
    let err: CoreError = ListenError::Bind {
        message: String::from("failed to bind gateway socket on ws://127.0.0.1:1: denied"),
        endpoint: String::from("ws://127.0.0.1:1"),
        location: ErrorLocation::from(Location::caller()),
        source: IoError::new(ErrorKind::PermissionDenied, "denied"),
    }
    .into();

    // WHEN: Walking the source chain
    let source = err.source().expect("should have a source");

    // THEN: Source is the io error
    let io = source
        .downcast_ref::<IoError>()
        .expect("source should be io::Error");
    assert_eq!(io.kind(), ErrorKind::PermissionDenied);
    assert!(err.to_string().starts_with("Bind Error:"));
}
