//! Process currently listening on a TCP port.

use std::fmt::{Display, Formatter, Result as FormatResult};

/// A process found holding a listening socket.
///
/// Reported alongside a lock conflict so the operator can see which instance
/// owns the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortHolder {
    pub pid: u32,
    pub port: u16,
    pub name: String,
    pub command: String,
}

impl Display for PortHolder {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "{} (PID: {})", self.name, self.pid)?;
        if !self.command.is_empty() {
            write!(formatter, ": {}", self.command)?;
        }
        Ok(())
    }
}
