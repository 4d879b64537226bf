//! # Probe Outcomes
//!
//! Values produced by individual probes and the aggregated result of a sweep.

use std::collections::BTreeSet;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

/// Hosts that answered the most recent host sweep.
pub type LiveHostSet = BTreeSet<Ipv4Addr>;

/// `(host, port)` pairs that accepted a TCP connection during a port sweep.
pub type OpenPortSet = BTreeSet<SocketAddrV4>;

/// Outcome of a single reachability probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostStatus {
    /// The host answered. `latency` is the round trip reported by the probe.
    Reachable { latency: Duration },
    /// No answer within the timeout.
    Unreachable,
    /// Transport or permission error; the probe never reached a verdict.
    Failed(String),
}

/// Outcome of a single TCP connect probe.
///
/// Refusals, timeouts and transport errors are indistinguishable and all map
/// to [`PortStatus::Closed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortStatus {
    Open,
    Closed,
}

/// Classifies an outcome for aggregation.
pub trait Outcome {
    /// Whether the probed target belongs in the result set.
    fn is_positive(&self) -> bool;

    /// Whether the probe itself failed, as opposed to returning a negative answer.
    fn is_failure(&self) -> bool {
        false
    }
}

impl Outcome for HostStatus {
    fn is_positive(&self) -> bool {
        matches!(self, HostStatus::Reachable { .. })
    }

    fn is_failure(&self) -> bool {
        matches!(self, HostStatus::Failed(_))
    }
}

impl Outcome for PortStatus {
    fn is_positive(&self) -> bool {
        matches!(self, PortStatus::Open)
    }
}

impl HostStatus {
    pub fn latency(&self) -> Option<Duration> {
        match self {
            HostStatus::Reachable { latency } => Some(*latency),
            _ => None,
        }
    }
}

/// One probe attempt. Handed to progress callbacks, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult<T, O> {
    pub target: T,
    pub outcome: O,
}

impl<T, O> ProbeResult<T, O> {
    pub fn new(target: T, outcome: O) -> Self {
        Self { target, outcome }
    }
}

/// Aggregated result of one sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport<T: Ord> {
    /// Targets with a positive outcome.
    pub found: BTreeSet<T>,
    /// Probes that ran to completion, positive or not.
    pub probed: u64,
    /// Probes that errored out instead of producing a verdict.
    pub failed: u64,
    /// Dispatch was stopped before the work set was exhausted.
    pub cancelled: bool,
}

impl<T: Ord> Default for SweepReport<T> {
    fn default() -> Self {
        Self {
            found: BTreeSet::new(),
            probed: 0,
            failed: 0,
            cancelled: false,
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
