use std::net::Ipv4Addr;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that reject a scan before any probe is sent, plus report persistence failures.
///
/// Failures of individual probes are never represented here; they are folded
/// into [`crate::scanning::HostStatus::Failed`] or [`crate::scanning::PortStatus::Closed`].
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid IPv4 address: '{0}'")]
    InvalidAddress(String),

    #[error("invalid range: start {start} is greater than end {end}")]
    InvalidRange { start: Ipv4Addr, end: Ipv4Addr },

    #[error("invalid port range: {0}")]
    InvalidPortRange(String),

    #[error("failed to write report to {}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
