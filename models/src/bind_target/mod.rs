//! Host/port pair a listener is bound to.

mod builder;

pub use builder::BindTargetBuilder;

use std::fmt::{Display, Formatter, Result as FormatResult};

/// Validated listen endpoint.
///
/// Construct through [`BindTargetBuilder`]; a built target always has a
/// non-empty host and a port in `1..=65535`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindTarget {
    host: String,
    port: u16,
}

impl BindTarget {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

/// Formats as `host:port`, bracketing IPv6 literals.
impl Display for BindTarget {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        if self.host.contains(':') && !self.host.starts_with('[') {
            write!(formatter, "[{}]:{}", self.host, self.port)
        } else {
            write!(formatter, "{}:{}", self.host, self.port)
        }
    }
}
