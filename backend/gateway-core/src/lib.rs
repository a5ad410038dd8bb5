pub mod config;
pub mod error;
pub mod listen;
pub mod replay;

#[cfg(test)]
mod tests;

pub const GATEWAY_WS_SCHEME: &str = "ws://";
pub const DEFAULT_GATEWAY_HOST: &str = "127.0.0.1";
pub const DEFAULT_GATEWAY_PORT: u16 = 18789;
pub const DEFAULT_GATEWAY_URL: &str =
    const_format::concatcp!(GATEWAY_WS_SCHEME, DEFAULT_GATEWAY_HOST, ":", DEFAULT_GATEWAY_PORT);
