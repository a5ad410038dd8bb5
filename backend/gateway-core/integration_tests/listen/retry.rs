use super::helpers::{CountingBinder, ScriptedBinder, loopback_target};

use gateway_core::error::listen::ListenError;
use gateway_core::listen::{RetryPolicy, TcpBinder, listen_with_retry};
use models::BindTargetBuilder;

use std::io::ErrorKind;
use std::net::TcpListener as StdTcpListener;
use std::time::Duration;

use tokio::time::{Instant, sleep};

// ============================================================================
// Public API tests for listen_with_retry
// Real sockets where the OS behaviour matters, scripted binders elsewhere
// ============================================================================

/// **VALUE**: Verifies the full retry budget against a port held by another listener.
///
/// **WHY THIS MATTERS**: This is the "another gateway is really running" case. The loop must
/// spend exactly its budget (3 attempts for 2 retries), honour the backoff (10 + 20 ms) and
/// then report a lock conflict rather than a generic bind error.
///
/// **BUG THIS CATCHES**: Would catch an off-by-one in the attempt count, skipped sleeps, or
/// the final classification losing the "address in use" distinction.
#[tokio::test]
async fn given_port_held_by_other_listener_when_listening_then_lock_conflict_after_budget() {
    // GIVEN: A port held by another listener
    let holder = StdTcpListener::bind("127.0.0.1:0").expect("bind holder");
    let port = holder.local_addr().expect("holder addr").port();
    let target = loopback_target(port);
    let binder = CountingBinder::new(TcpBinder);
    let policy = RetryPolicy::new(2, Duration::from_millis(10));

    // WHEN: Listening with retry
    let started = Instant::now();
    let result = listen_with_retry(&binder, &target, &policy).await;
    let elapsed = started.elapsed();

    // THEN: Three attempts, lock conflict, at least 30ms of backoff
    assert_eq!(binder.attempts(), 3, "Should make exactly max_retries + 1 attempts");
    assert!(
        elapsed >= Duration::from_millis(30),
        "Should wait 10ms + 20ms between attempts, waited {elapsed:?}"
    );
    match result {
        Err(ListenError::LockConflict { message, endpoint, .. }) => {
            assert_eq!(endpoint, format!("ws://127.0.0.1:{port}"));
            assert!(message.contains("another gateway instance is already listening"));
            assert!(message.contains(&endpoint));
        }
        other => panic!("Expected lock conflict, got {other:?}"),
    }

    drop(holder);
}

/// **VALUE**: Verifies that a conflict that clears is absorbed by the retry loop.
///
/// **WHY THIS MATTERS**: This is the supervised-restart case the loop exists for: the old
/// process releases its socket shortly after the new one starts.
///
/// **BUG THIS CATCHES**: Would catch a loop that reports the first conflict instead of retrying.
#[tokio::test]
async fn given_single_conflict_when_listening_then_binds_on_second_attempt() {
    // GIVEN: A binder that conflicts once, then succeeds
    let binder = ScriptedBinder::new([ErrorKind::AddrInUse]);
    let target = loopback_target(18789);
    let policy = RetryPolicy::new(5, Duration::from_millis(1));

    // WHEN: Listening with retry
    let result = listen_with_retry(&binder, &target, &policy).await;

    // THEN: Bound on the second attempt
    assert_eq!(result.expect("should bind"), 2);
    assert_eq!(binder.attempts(), 2);
}

/// **VALUE**: Verifies the same recovery against a real socket that is released mid-retry.
///
/// **WHY THIS MATTERS**: The scripted test proves the control flow; this one proves tokio's
/// bind reports a held port as `AddrInUse` and can reclaim it once freed.
///
/// **BUG THIS CATCHES**: Would catch platform error mapping that turns the conflict into a
/// non-retryable kind.
#[tokio::test]
async fn given_port_released_during_backoff_when_listening_then_reclaims_port() {
    // GIVEN: A port held by a listener that is released after 20ms
    let holder = StdTcpListener::bind("127.0.0.1:0").expect("bind holder");
    let port = holder.local_addr().expect("holder addr").port();
    let release = tokio::spawn(async move {
        sleep(Duration::from_millis(20)).await;
        drop(holder);
    });
    let binder = CountingBinder::new(TcpBinder);
    let policy = RetryPolicy::new(5, Duration::from_millis(50));

    // WHEN: Listening with retry
    let listener = listen_with_retry(&binder, &loopback_target(port), &policy)
        .await
        .expect("should reclaim the port");
    release.await.expect("release task");

    // THEN: Bound to the same port after at least one retry
    assert_eq!(listener.local_addr().expect("addr").port(), port);
    assert!(binder.attempts() >= 2, "First attempt should have conflicted");
}

/// **VALUE**: Verifies non-conflict errors fail immediately, whatever the budget.
///
/// **WHY THIS MATTERS**: Permission and address errors cannot clear by waiting. Retrying them
/// would only delay the startup failure by 15 seconds with the default schedule.
///
/// **BUG THIS CATCHES**: Would catch a loop that retries every error.
#[tokio::test]
async fn given_permission_denied_when_listening_then_fails_fatally_on_first_attempt() {
    // GIVEN: A binder that is always denied
    let binder = ScriptedBinder::always(ErrorKind::PermissionDenied);
    let policy = RetryPolicy::new(5, Duration::from_secs(10));

    // WHEN: Listening with retry
    let result = listen_with_retry(&binder, &loopback_target(80), &policy).await;

    // THEN: One attempt, fatal bind error naming the endpoint and cause
    assert_eq!(binder.attempts(), 1);
    let err = result.expect_err("should fail");
    assert!(!err.is_lock_conflict());
    assert_eq!(err.io_kind(), ErrorKind::PermissionDenied);
    assert!(err.to_string().contains("failed to bind gateway socket on ws://127.0.0.1:80"));
}

/// **VALUE**: Verifies an unassignable address is a fatal bind failure on a real socket.
///
/// **WHY THIS MATTERS**: A typo in `bind_host` is the most common misconfiguration and must be
/// reported at once.
///
/// **BUG THIS CATCHES**: Would catch a misclassified `AddrNotAvailable`.
#[tokio::test]
async fn given_non_local_address_when_listening_then_fails_with_bind_error() {
    // GIVEN: A documentation-range address no interface owns
    let target = BindTargetBuilder::default()
        .with_host("192.0.2.1")
        .with_port(18789)
        .build()
        .expect("valid target");
    let binder = CountingBinder::new(TcpBinder);
    let policy = RetryPolicy::new(3, Duration::from_millis(10));

    // WHEN: Listening with retry
    let result = listen_with_retry(&binder, &target, &policy).await;

    // THEN: Fatal on the first attempt
    assert_eq!(binder.attempts(), 1);
    assert!(matches!(result, Err(ListenError::Bind { .. })));
}

/// **VALUE**: Verifies a zero budget means exactly one attempt.
///
/// **WHY THIS MATTERS**: Tools that probe for a running gateway set `max_retries = 0` and
/// expect an immediate answer.
///
/// **BUG THIS CATCHES**: Would catch an implicit minimum of one retry.
#[tokio::test]
async fn given_zero_retries_when_port_in_use_then_single_attempt_lock_conflict() {
    // GIVEN: A binder that always conflicts and no retry budget
    let binder = ScriptedBinder::always(ErrorKind::AddrInUse);
    let policy = RetryPolicy::new(0, Duration::from_secs(10));

    // WHEN: Listening with retry
    let result = listen_with_retry(&binder, &loopback_target(18789), &policy).await;

    // THEN: One attempt, lock conflict
    assert_eq!(binder.attempts(), 1);
    assert!(result.expect_err("should fail").is_lock_conflict());
}

/// **VALUE**: Verifies a conflict followed by a different error reports the last error.
///
/// **WHY THIS MATTERS**: Classification uses the last observed error. Reporting a stale
/// conflict would send the operator looking for a process that no longer exists.
///
/// **BUG THIS CATCHES**: Would catch classification keyed on the first error.
#[tokio::test]
async fn given_conflict_then_other_error_when_listening_then_reports_bind_error() {
    // GIVEN: A conflict, then an address error
    let binder = ScriptedBinder::new([ErrorKind::AddrInUse, ErrorKind::AddrNotAvailable]);
    let policy = RetryPolicy::new(5, Duration::from_millis(1));

    // WHEN: Listening with retry
    let result = listen_with_retry(&binder, &loopback_target(18789), &policy).await;

    // THEN: Two attempts, fatal bind error
    assert_eq!(binder.attempts(), 2);
    let err = result.expect_err("should fail");
    assert!(!err.is_lock_conflict());
    assert_eq!(err.io_kind(), ErrorKind::AddrNotAvailable);
}

/// **VALUE**: Verifies the backoff sleep does not block other tasks.
///
/// **WHY THIS MATTERS**: The gateway runs other startup work on the same runtime while it waits
/// for the port. A blocking sleep would stall it for up to 15 seconds.
///
/// **BUG THIS CATCHES**: Would catch `std::thread::sleep` sneaking into the loop.
#[tokio::test(flavor = "current_thread")]
async fn given_retry_in_progress_when_other_task_runs_then_it_is_not_blocked() {
    // GIVEN: A long retry and a concurrent short task on a single-threaded runtime
    let binder = ScriptedBinder::new([ErrorKind::AddrInUse]);
    let policy = RetryPolicy::new(1, Duration::from_millis(200));
    let target = loopback_target(18789);

    // WHEN: Running both
    let started = Instant::now();
    let (bound, side_elapsed) = tokio::join!(listen_with_retry(&binder, &target, &policy), async {
        sleep(Duration::from_millis(5)).await;
        started.elapsed()
    });

    // THEN: The side task finished long before the retry delay elapsed
    assert_eq!(bound.expect("should bind"), 2);
    assert!(
        side_elapsed < Duration::from_millis(200),
        "Side task waited {side_elapsed:?}"
    );
}
