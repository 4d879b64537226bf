//! The central **abstraction** for sweeping a work set with probes.
//!
//! A sweep pulls targets lazily from an iterator and keeps at most
//! `parallelism` probes in flight, each on its own Tokio task. Results come
//! back to the coordinator through a [`JoinSet`], which makes the coordinator
//! the single writer of the result set: no lock is shared with the probes,
//! and a target can only be recorded once.
//!
//! Probe-level problems never escape a sweep. A probe that errors reports it
//! through its outcome, and a probe that panics is converted into a failed
//! outcome for its target.

use std::any::Any;
use std::fmt::Debug;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use tokio::task::JoinSet;
use tracing::debug;

use sweepr_common::{
    config::ScanConfig,
    network::{port::PortRange, range::AddressRange},
    scanning::{HostStatus, LiveHostSet, Outcome, PortStatus, ProbeResult, SweepReport},
};

/// A single bounded-time network operation against one target.
///
/// Implementations must not panic or block past `timeout`, and must release
/// whatever handle they open before returning.
#[async_trait]
pub trait Probe: Send + Sync {
    type Target: Copy + Ord + Debug + Send + Sync + 'static;
    type Outcome: Outcome + Debug + Send + 'static;

    async fn probe(&self, target: Self::Target, timeout: Duration) -> Self::Outcome;
}

/// Reachability probe for one address.
pub type HostProbe = dyn Probe<Target = Ipv4Addr, Outcome = HostStatus>;

/// TCP connect probe for one `(host, port)` pair.
pub type PortProbe = dyn Probe<Target = SocketAddrV4, Outcome = PortStatus>;

/// Outcome recorded for a probe whose task panicked.
pub trait FromFailure {
    fn from_failure(reason: String) -> Self;
}

impl FromFailure for HostStatus {
    fn from_failure(reason: String) -> Self {
        HostStatus::Failed(reason)
    }
}

impl FromFailure for PortStatus {
    fn from_failure(_reason: String) -> Self {
        PortStatus::Closed
    }
}

/// Cooperative stop signal for a running sweep.
///
/// Cancelling stops the dispatch of new targets. Probes already in flight run
/// until they finish or time out and are still aggregated.
#[derive(Debug, Default)]
pub struct SweepControl {
    cancelled: AtomicBool,
}

impl SweepControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Re-arms the control for the next sweep.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::Relaxed);
    }
}

/// Runs `probe` over every target with bounded parallelism.
///
/// `on_result` sees every completed probe in completion order. The call
/// returns once every dispatched probe has completed.
pub async fn sweep<P, I, F>(
    probe: Arc<P>,
    targets: I,
    cfg: &ScanConfig,
    control: &SweepControl,
    mut on_result: F,
) -> SweepReport<P::Target>
where
    P: Probe + ?Sized + 'static,
    P::Outcome: FromFailure,
    I: IntoIterator<Item = P::Target>,
    F: FnMut(&ProbeResult<P::Target, P::Outcome>),
{
    let limit: usize = cfg.parallelism.get();
    let timeout: Duration = cfg.timeout;
    let mut targets = targets.into_iter();
    let mut in_flight: JoinSet<Completed<P::Target, P::Outcome>> = JoinSet::new();
    let mut report: SweepReport<P::Target> = SweepReport::default();
    let mut exhausted = false;

    loop {
        while !exhausted && in_flight.len() < limit {
            if control.is_cancelled() {
                debug!("sweep cancelled, {} probes still in flight", in_flight.len());
                report.cancelled = true;
                exhausted = true;
                break;
            }

            match targets.next() {
                Some(target) => {
                    let probe = Arc::clone(&probe);
                    in_flight.spawn(run_probe(probe, target, timeout));
                }
                None => exhausted = true,
            }
        }

        let Some(joined) = in_flight.join_next().await else {
            break;
        };

        match joined {
            Ok(Completed { result, panic }) => {
                report.probed += 1;
                if let Some(reason) = panic {
                    report.failed += 1;
                    debug!("probe of {:?} failed: {reason}", result.target);
                } else if result.outcome.is_failure() {
                    report.failed += 1;
                    debug!("probe of {:?} failed: {:?}", result.target, result.outcome);
                }
                if result.outcome.is_positive() {
                    report.found.insert(result.target);
                }
                on_result(&result);
            }
            Err(e) => {
                report.failed += 1;
                debug!("probe task did not complete: {e}");
            }
        }
    }

    report
}

/// A finished probe task, with the panic message if the probe panicked.
struct Completed<T, O> {
    result: ProbeResult<T, O>,
    panic: Option<String>,
}

async fn run_probe<P>(
    probe: Arc<P>,
    target: P::Target,
    timeout: Duration,
) -> Completed<P::Target, P::Outcome>
where
    P: Probe + ?Sized + 'static,
    P::Outcome: FromFailure,
{
    match AssertUnwindSafe(probe.probe(target, timeout))
        .catch_unwind()
        .await
    {
        Ok(outcome) => Completed {
            result: ProbeResult::new(target, outcome),
            panic: None,
        },
        Err(panic) => {
            let reason = panic_reason(panic);
            Completed {
                result: ProbeResult::new(target, P::Outcome::from_failure(reason.clone())),
                panic: Some(reason),
            }
        }
    }
}

fn panic_reason(panic: Box<dyn Any + Send>) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        format!("probe panicked: {msg}")
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("probe panicked: {msg}")
    } else {
        "probe panicked".to_string()
    }
}

/// Host sweep: probes every address of `range`.
pub async fn discover_hosts<P, F>(
    probe: Arc<P>,
    range: &AddressRange,
    cfg: &ScanConfig,
    control: &SweepControl,
    on_result: F,
) -> SweepReport<Ipv4Addr>
where
    P: Probe<Target = Ipv4Addr, Outcome = HostStatus> + ?Sized + 'static,
    F: FnMut(&ProbeResult<Ipv4Addr, HostStatus>),
{
    sweep(probe, range.iter(), cfg, control, on_result).await
}

/// Port sweep: probes the cross product of `hosts` and `ports`.
///
/// Pairs are generated on demand, host by host in ascending order.
pub async fn scan_ports<P, F>(
    probe: Arc<P>,
    hosts: &LiveHostSet,
    ports: PortRange,
    cfg: &ScanConfig,
    control: &SweepControl,
    on_result: F,
) -> SweepReport<SocketAddrV4>
where
    P: Probe<Target = SocketAddrV4, Outcome = PortStatus> + ?Sized + 'static,
    F: FnMut(&ProbeResult<SocketAddrV4, PortStatus>),
{
    let targets = hosts
        .iter()
        .copied()
        .flat_map(move |host| ports.iter().map(move |port| SocketAddrV4::new(host, port)));

    sweep(probe, targets, cfg, control, on_result).await
}

/// Number of probes a port sweep will dispatch.
pub fn port_sweep_len(hosts: &LiveHostSet, ports: &PortRange) -> u64 {
    hosts.len() as u64 * ports.count() as u64
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
