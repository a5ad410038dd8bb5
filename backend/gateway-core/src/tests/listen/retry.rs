// Unit tests for the retry schedule
// Integration tests for listen_with_retry are in integration_tests/listen/retry.rs

use crate::listen::{RetryPolicy, gateway_endpoint, is_addr_in_use};

use models::BindTargetBuilder;

use std::io::{Error as IoError, ErrorKind};
use std::time::Duration;

use backoff::backoff::Backoff;

/// **VALUE**: Verifies the default schedule is 500/1000/2000/4000/8000 ms.
///
/// **WHY THIS MATTERS**: The schedule is sized for a supervised restart, where the previous
/// gateway may need several seconds to release its socket. Jitter or a different multiplier
/// would either give up too early or wait too long.
///
/// **BUG THIS CATCHES**: Would catch if randomization is re-enabled on the backoff or the
/// multiplier drifts from 2.
#[test]
fn given_default_policy_when_computing_delays_then_doubles_from_500ms() {
    // GIVEN: The default policy
    let policy = RetryPolicy::default();

    // WHEN: Computing the delay schedule
    let delays = policy.delays();

    // THEN: Should be exactly five doubling delays
    let expected: Vec<Duration> = [500, 1000, 2000, 4000, 8000]
        .into_iter()
        .map(Duration::from_millis)
        .collect();
    assert_eq!(delays, expected);
}

/// **VALUE**: Verifies a zero budget has no delays at all.
///
/// **WHY THIS MATTERS**: `max_retries = 0` must mean exactly one attempt.
///
/// **BUG THIS CATCHES**: Would catch an off-by-one that always allows one retry.
#[test]
fn given_zero_retries_when_computing_delays_then_schedule_is_empty() {
    // GIVEN: A policy with no retries
    let policy = RetryPolicy::new(0, Duration::from_millis(500));

    // THEN: No delays
    assert!(policy.delays().is_empty());
}

/// **VALUE**: Verifies the largest configurable budget keeps doubling to the end.
///
/// **WHY THIS MATTERS**: Config allows up to 16 retries. A fixed interval cap would flatten
/// the tail of the schedule without telling anyone.
///
/// **BUG THIS CATCHES**: Would catch a hard-coded `max_interval` shorter than the schedule.
#[test]
fn given_sixteen_retries_when_computing_delays_then_last_delay_is_base_times_2_pow_15() {
    // GIVEN: Sixteen retries from one second
    let policy = RetryPolicy::new(16, Duration::from_secs(1));

    // WHEN: Computing the delay schedule
    let delays = policy.delays();

    // THEN: Every step doubles, ending at 2^15 seconds
    assert_eq!(delays.len(), 16);
    assert_eq!(delays.last(), Some(&Duration::from_secs(1 << 15)));
    assert!(delays.windows(2).all(|pair| pair[1] == pair[0] * 2));
}

/// **VALUE**: Verifies the backoff never gives up on its own.
///
/// **WHY THIS MATTERS**: The retry budget is the attempt count. A `max_elapsed_time` on the
/// backoff would silently shorten it on slow machines.
///
/// **BUG THIS CATCHES**: Would catch if `max_elapsed_time` is left at the crate default.
#[test]
fn given_policy_backoff_when_polled_many_times_then_always_yields_delay() {
    // GIVEN: The backoff for a short base delay
    let mut backoff = RetryPolicy::new(3, Duration::from_millis(1)).backoff();

    // WHEN/THEN: Polling well beyond the budget still yields delays
    for _ in 0..32 {
        assert!(backoff.next_backoff().is_some());
    }
}

/// **VALUE**: Verifies only `AddrInUse` counts as "address in use".
///
/// **WHY THIS MATTERS**: Retrying permission or address errors only delays a startup failure
/// that cannot resolve itself.
///
/// **BUG THIS CATCHES**: Would catch a broadened classification (e.g. matching on message text).
#[test]
fn given_io_errors_when_classified_then_only_addr_in_use_is_retryable() {
    assert!(is_addr_in_use(&IoError::from(ErrorKind::AddrInUse)));
    assert!(!is_addr_in_use(&IoError::from(ErrorKind::PermissionDenied)));
    assert!(!is_addr_in_use(&IoError::from(ErrorKind::AddrNotAvailable)));
    assert!(!is_addr_in_use(&IoError::other("address already in use")));
}

/// **VALUE**: Verifies the endpoint text used in lock errors.
///
/// **WHY THIS MATTERS**: Operators copy this endpoint into clients when diagnosing a conflict.
///
/// **BUG THIS CATCHES**: Would catch a lost `ws://` scheme or a missing port.
#[test]
fn given_bind_target_when_formatting_endpoint_then_uses_ws_scheme() {
    // GIVEN: A target
    let target = BindTargetBuilder::default()
        .with_host("0.0.0.0")
        .with_port(18789)
        .build()
        .expect("valid target");

    // THEN: Endpoint is ws://host:port
    assert_eq!(gateway_endpoint(&target), "ws://0.0.0.0:18789");
}
