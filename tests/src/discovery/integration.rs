use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use sweepr_common::config::ScanConfig;
use sweepr_common::network::range::AddressRange;
use sweepr_common::scanning::{HostStatus, LiveHostSet};
use sweepr_core::discovery::ScanService;
use sweepr_core::network::tcp::{HandshakeProbe, TcpConnectProbe};
use sweepr_core::scanner::{HostProbe, PortProbe};

use crate::support::{ip, Topology};

fn cfg(parallelism: usize) -> ScanConfig {
    ScanConfig::new(
        Duration::from_millis(200),
        NonZeroUsize::new(parallelism).unwrap(),
    )
}

fn range(text: &str) -> AddressRange {
    text.parse().unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn discovery_finds_only_live_hosts() {
    let (service, _) = Topology::with_alive([ip(2)]).into_service();

    let report = service
        .discover(&range("10.0.0.1-10.0.0.3"), &cfg(4), |_| {})
        .await;

    assert_eq!(report.found, LiveHostSet::from([ip(2)]));
    assert_eq!(report.probed, 3);
    assert_eq!(report.failed, 0);
    assert!(!report.cancelled);
}

#[tokio::test(flavor = "multi_thread")]
async fn repeated_sweeps_are_deterministic() {
    let alive = [ip(1), ip(17), ip(64), ip(200), ip(254)];
    let (service, _) = Topology::with_alive(alive)
        .latency(Duration::from_millis(1))
        .into_service();
    let target = range("10.0.0.0/24");

    let first = service.discover(&target, &cfg(32), |_| {}).await;
    let second = service.discover(&target, &cfg(7), |_| {}).await;

    assert_eq!(first.found, second.found);
    assert_eq!(first.found, LiveHostSet::from(alive));
    assert_eq!(first.probed, 256);
}

#[tokio::test(flavor = "multi_thread")]
async fn parallelism_bound_is_respected() {
    let (service, network) = Topology::with_alive([ip(5)])
        .latency(Duration::from_millis(5))
        .into_service();

    let report = service
        .discover(&range("10.0.0.1-10.0.0.100"), &cfg(6), |_| {})
        .await;

    assert_eq!(report.probed, 100);
    assert_eq!(network.calls(), 100);
    assert!(network.peak() <= 6, "peak in flight was {}", network.peak());
    assert!(network.peak() > 1, "probes never overlapped");
}

#[tokio::test(flavor = "multi_thread")]
async fn completion_callback_sees_every_probe() {
    let (service, _) = Topology::with_alive([ip(1), ip(3)]).into_service();
    let mut seen = Vec::new();

    service
        .discover(&range("10.0.0.1-10.0.0.4"), &cfg(2), |result| {
            seen.push((result.target, result.outcome.clone()))
        })
        .await;

    seen.sort_by_key(|(addr, _)| *addr);
    assert_eq!(seen.len(), 4);
    assert!(matches!(seen[0].1, HostStatus::Reachable { .. }));
    assert_eq!(seen[1].1, HostStatus::Unreachable);
}

#[tokio::test(flavor = "multi_thread")]
async fn panicking_probe_is_contained() {
    let mut topology = Topology::with_alive([ip(1)]);
    topology.broken.insert(ip(2));
    let (service, _) = topology.into_service();

    let report = service
        .discover(&range("10.0.0.1-10.0.0.3"), &cfg(3), |_| {})
        .await;

    assert_eq!(report.found, LiveHostSet::from([ip(1)]));
    assert_eq!(report.probed, 3);
    assert_eq!(report.failed, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn cancelled_sweep_stops_dispatching() {
    let (service, network) = Topology::with_alive([ip(1)])
        .latency(Duration::from_millis(20))
        .into_service();
    let control = service.control();

    let report = service
        .discover(&range("10.0.0.0/24"), &cfg(4), |_| control.cancel())
        .await;

    assert!(report.cancelled);
    assert!(report.probed < 256);
    assert_eq!(report.probed as usize, network.calls());

    // Nothing is dispatched until the control is re-armed.
    let report = service
        .discover(&range("10.0.0.1-10.0.0.2"), &cfg(4), |_| {})
        .await;
    assert!(report.cancelled);
    assert_eq!(report.probed, 0);

    control.reset();
    let report = service
        .discover(&range("10.0.0.1-10.0.0.2"), &cfg(4), |_| {})
        .await;
    assert!(!report.cancelled);
    assert_eq!(report.probed, 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn calibration_without_answers_falls_back() {
    let (service, network) = Topology::default().into_service();

    let estimate = service.calibrate(&range("10.0.0.1-10.0.0.50"), 5, |_| {}).await;

    assert!(estimate.is_fallback());
    assert_eq!(estimate.timeout, Duration::from_millis(1000));
    assert_eq!(network.calls(), 5);
}

#[tokio::test(flavor = "multi_thread")]
async fn calibration_uses_measured_latency() {
    let (service, _) = Topology::with_alive([ip(1), ip(2)])
        .latency(Duration::from_millis(10))
        .into_service();

    let estimate = service.calibrate(&range("10.0.0.1-10.0.0.2"), 5, |_| {}).await;

    assert_eq!(estimate.samples.len(), 2);
    assert_eq!(estimate.successes(), 2);
    assert!(estimate.timeout >= Duration::from_millis(100));
    assert!(estimate.timeout <= Duration::from_millis(1000));
}

/// Handshake discovery against the loopback interface, where a refused
/// connection still proves the host is up.
#[tokio::test(flavor = "multi_thread")]
async fn handshake_discovery_on_loopback() -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();

    let hosts: Arc<HostProbe> = Arc::new(HandshakeProbe::new(port));
    let ports: Arc<PortProbe> = Arc::new(TcpConnectProbe);
    let service = ScanService::new(hosts, ports);

    let report = service
        .discover(&range("127.0.0.1"), &cfg(1), |_| {})
        .await;

    assert_eq!(report.found, LiveHostSet::from([std::net::Ipv4Addr::LOCALHOST]));
    Ok(())
}

#[test]
fn service_constructors_share_one_control() {
    let service = ScanService::handshake(HandshakeProbe::DEFAULT_PORT);
    let a = service.control();
    let b = service.control();
    a.cancel();
    assert!(b.is_cancelled());
}
