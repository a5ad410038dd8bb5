//! Test binders for driving `listen_with_retry` without real sockets, or
//! counting attempts against real ones.

use gateway_core::listen::SocketBinder;
use models::{BindTarget, BindTargetBuilder};

use std::collections::VecDeque;
use std::future::{Future, ready};
use std::io::{Error as IoError, ErrorKind, Result as IoResult};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn loopback_target(port: u16) -> BindTarget {
    BindTargetBuilder::default()
        .with_host("127.0.0.1")
        .with_port(port)
        .build()
        .expect("valid target")
}

/// Replays a fixed sequence of bind failures; succeeds once the script runs
/// out. The listener is the 1-based attempt number that succeeded.
pub struct ScriptedBinder {
    script: Mutex<VecDeque<ErrorKind>>,
    attempts: AtomicUsize,
}

impl ScriptedBinder {
    pub fn new(failures: impl IntoIterator<Item = ErrorKind>) -> Self {
        Self {
            script: Mutex::new(failures.into_iter().collect()),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Fails with `kind` on every attempt.
    pub fn always(kind: ErrorKind) -> Self {
        Self::new(std::iter::repeat_n(kind, 64))
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl SocketBinder for ScriptedBinder {
    type Listener = usize;

    fn bind(&self, _target: &BindTarget) -> impl Future<Output = IoResult<usize>> + Send {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let next = self.script.lock().expect("script lock").pop_front();

        ready(match next {
            Some(kind) => Err(IoError::from(kind)),
            None => Ok(attempt),
        })
    }
}

/// Wraps another binder and counts its attempts.
pub struct CountingBinder<B> {
    inner: B,
    attempts: AtomicUsize,
}

impl<B> CountingBinder<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl<B> SocketBinder for CountingBinder<B>
where
    B: SocketBinder,
{
    type Listener = B::Listener;

    fn bind(&self, target: &BindTarget) -> impl Future<Output = IoResult<B::Listener>> + Send {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.inner.bind(target)
    }
}
