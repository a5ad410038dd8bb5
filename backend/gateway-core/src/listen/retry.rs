use crate::GATEWAY_WS_SCHEME;
use crate::error::listen::ListenError;
use crate::listen::binder::SocketBinder;

use common::ErrorLocation;
use models::BindTarget;

use std::io::{Error as IoError, ErrorKind};
use std::panic::Location;
use std::time::Duration;

use backoff::{ExponentialBackoff, backoff::Backoff};
use log::{debug, info, warn};
use tokio::time::sleep as TokioSleep;

/// Retries allowed after the first failed attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 5;
/// Wait before the first retry; doubles on each subsequent one.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

const BACKOFF_MULTIPLIER: f64 = 2.0;

/// Retry budget for "address in use" during startup.
///
/// With the defaults the waits are 500, 1000, 2000, 4000 and 8000 ms: long
/// enough for a predecessor killed by its supervisor to release the socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    pub const fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Deterministic `base_delay * 2^attempt` schedule.
    pub(crate) fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            current_interval: self.base_delay,
            initial_interval: self.base_delay,
            randomization_factor: 0.0,
            multiplier: BACKOFF_MULTIPLIER,
            max_interval: self.longest_delay(),
            max_elapsed_time: None,
            ..Default::default()
        }
    }

    /// `base_delay * 2^max_retries`, one step past the last wait, so the
    /// interval cap never shortens the schedule.
    fn longest_delay(&self) -> Duration {
        let factor = 2u32.checked_pow(self.max_retries).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Waits the retry loop would sleep, in order, if every attempt hit
    /// "address in use".
    pub fn delays(&self) -> Vec<Duration> {
        let mut backoff = self.backoff();
        (0..self.max_retries)
            .map_while(|_| backoff.next_backoff())
            .collect()
    }
}

/// `ws://host:port` for a bind target.
pub fn gateway_endpoint(target: &BindTarget) -> String {
    format!("{GATEWAY_WS_SCHEME}{target}")
}

pub fn is_addr_in_use(err: &IoError) -> bool {
    err.kind() == ErrorKind::AddrInUse
}

/// Bind `target`, retrying while the address is still in use.
///
/// Makes at most `policy.max_retries + 1` attempts. Between attempts the task
/// sleeps on the tokio timer, so other startup work keeps running. Any error
/// other than "address in use" ends the loop at once.
///
/// # Errors
///
/// - [`ListenError::LockConflict`] if the last attempt still saw "address in use"
/// - [`ListenError::Bind`] for any other bind error
pub async fn listen_with_retry<B>(
    binder: &B,
    target: &BindTarget,
    policy: &RetryPolicy,
) -> Result<B::Listener, ListenError>
where
    B: SocketBinder,
{
    let mut backoff = policy.backoff();
    let mut attempt: u32 = 0;

    let last_err = loop {
        match binder.bind(target).await {
            Ok(listener) => {
                if attempt > 0 {
                    info!("Bound {target} after {attempt} retries");
                }
                return Ok(listener);
            }
            Err(err) => {
                if !is_addr_in_use(&err) || attempt >= policy.max_retries {
                    break err;
                }

                let Some(delay) = backoff.next_backoff() else {
                    break err;
                };

                attempt += 1;
                warn!(
                    "port {} in use, retrying in {delay:?} (attempt {attempt}/{})",
                    target.port(),
                    policy.max_retries
                );
                TokioSleep(delay).await;
            }
        }
    };

    debug!("Giving up on {target} after {} attempts: {last_err}", attempt + 1);
    Err(classify_failure(target, last_err))
}

#[track_caller]
fn classify_failure(target: &BindTarget, err: IoError) -> ListenError {
    let endpoint = gateway_endpoint(target);

    if is_addr_in_use(&err) {
        ListenError::LockConflict {
            message: format!("another gateway instance is already listening on {endpoint}"),
            endpoint,
            location: ErrorLocation::from(Location::caller()),
            source: err,
        }
    } else {
        ListenError::Bind {
            message: format!("failed to bind gateway socket on {endpoint}: {err}"),
            endpoint,
            location: ErrorLocation::from(Location::caller()),
            source: err,
        }
    }
}
