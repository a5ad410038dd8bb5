use models::BindTarget;

use std::future::Future;
use std::io::Result as IoResult;

use tokio::net::TcpListener;

/// Something that can open a listening socket on a [`BindTarget`].
///
/// Each call is one bind attempt. Errors must keep their OS error kind so
/// "address in use" can be told apart from other failures.
pub trait SocketBinder {
    type Listener;

    fn bind(&self, target: &BindTarget) -> impl Future<Output = IoResult<Self::Listener>> + Send;
}

/// Binds a tokio [`TcpListener`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpBinder;

impl SocketBinder for TcpBinder {
    type Listener = TcpListener;

    async fn bind(&self, target: &BindTarget) -> IoResult<TcpListener> {
        TcpListener::bind((target.host(), target.port())).await
    }
}
