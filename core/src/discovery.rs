//! # Scan Service
//!
//! Implements the "calibrate, discover, then scan ports" use case.
//!
//! The service owns the probes and the cancellation control, and remembers
//! nothing between passes: every call takes its inputs explicitly and hands
//! its result set back to the caller.

use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::Arc;

use sweepr_common::{
    config::ScanConfig,
    network::{port::PortRange, range::AddressRange},
    scanning::{HostStatus, LiveHostSet, PortStatus, ProbeResult, SweepReport},
};
use tracing::info;

use crate::network::{icmp::IcmpProbe, tcp::{HandshakeProbe, TcpConnectProbe}};
use crate::scanner::{self, HostProbe, PortProbe, SweepControl};
use crate::timing::{self, Sample, TimeoutEstimate};

/// Application service for host discovery and port scanning.
///
/// Orchestrates a pass by:
/// 1. calibrating the probe timeout on a prefix of the range,
/// 2. sweeping the range for live hosts,
/// 3. sweeping live hosts × ports for open ports.
pub struct ScanService {
    host_probe: Arc<HostProbe>,
    port_probe: Arc<PortProbe>,
    control: Arc<SweepControl>,
}

impl ScanService {
    pub fn new(host_probe: Arc<HostProbe>, port_probe: Arc<PortProbe>) -> Self {
        Self {
            host_probe,
            port_probe,
            control: Arc::new(SweepControl::new()),
        }
    }

    /// ICMP echo for hosts, TCP connect for ports.
    pub fn icmp(probe: IcmpProbe) -> Self {
        Self::new(Arc::new(probe), Arc::new(TcpConnectProbe))
    }

    /// TCP handshake on `port` for hosts, for when ICMP sockets are unavailable.
    pub fn handshake(port: u16) -> Self {
        Self::new(Arc::new(HandshakeProbe::new(port)), Arc::new(TcpConnectProbe))
    }

    /// Handle used to cancel whichever sweep is running.
    ///
    /// A cancelled control stays cancelled, so sweeps started afterwards
    /// dispatch nothing until the caller resets it.
    pub fn control(&self) -> Arc<SweepControl> {
        Arc::clone(&self.control)
    }

    pub async fn calibrate<F>(
        &self,
        range: &AddressRange,
        sample_count: usize,
        on_sample: F,
    ) -> TimeoutEstimate
    where
        F: FnMut(&Sample),
    {
        let estimate =
            timing::estimate_timeout(self.host_probe.as_ref(), range, sample_count, on_sample)
                .await;
        info!(
            "calibrated timeout: {}ms ({} of {} samples answered)",
            estimate.timeout.as_millis(),
            estimate.successes(),
            estimate.samples.len()
        );
        estimate
    }

    /// Sweeps `range`. The returned set replaces any earlier live-host set.
    pub async fn discover<F>(
        &self,
        range: &AddressRange,
        cfg: &ScanConfig,
        on_result: F,
    ) -> SweepReport<Ipv4Addr>
    where
        F: FnMut(&ProbeResult<Ipv4Addr, HostStatus>),
    {
        info!(
            "sweeping {} addresses ({range}) with {} parallel probes, {}ms timeout",
            range.count(),
            cfg.parallelism,
            cfg.timeout.as_millis()
        );
        let report = scanner::discover_hosts(
            Arc::clone(&self.host_probe),
            range,
            cfg,
            &self.control,
            on_result,
        )
        .await;
        info!(
            "host sweep done: {} live, {} probed, {} failed",
            report.found.len(),
            report.probed,
            report.failed
        );
        report
    }

    pub async fn scan_ports<F>(
        &self,
        hosts: &LiveHostSet,
        ports: PortRange,
        cfg: &ScanConfig,
        on_result: F,
    ) -> SweepReport<SocketAddrV4>
    where
        F: FnMut(&ProbeResult<SocketAddrV4, PortStatus>),
    {
        info!(
            "scanning ports {ports} on {} hosts with {} parallel probes",
            hosts.len(),
            cfg.parallelism
        );
        let report = scanner::scan_ports(
            Arc::clone(&self.port_probe),
            hosts,
            ports,
            cfg,
            &self.control,
            on_result,
        )
        .await;
        info!(
            "port sweep done: {} open, {} probed",
            report.found.len(),
            report.probed
        );
        report
    }
}
