use std::net::{Ipv4Addr, SocketAddrV4};
use std::num::NonZeroUsize;
use std::time::Duration;

use sweepr_common::config::ScanConfig;
use sweepr_common::network::port::PortRange;
use sweepr_common::scanning::{LiveHostSet, OpenPortSet};
use sweepr_core::discovery::ScanService;

use crate::support::{ip, Topology};

fn cfg(parallelism: usize) -> ScanConfig {
    ScanConfig::new(
        Duration::from_millis(200),
        NonZeroUsize::new(parallelism).unwrap(),
    )
}

/// Host sweep followed by a port sweep on what it found.
#[tokio::test(flavor = "multi_thread")]
async fn end_to_end_discovery_then_port_scan() {
    let (service, _) = Topology::with_alive([ip(2)])
        .open([SocketAddrV4::new(ip(2), 80)])
        .into_service();

    let hosts = service
        .discover(&"10.0.0.1-10.0.0.3".parse().unwrap(), &cfg(4), |_| {})
        .await
        .found;
    assert_eq!(hosts, LiveHostSet::from([ip(2)]));

    let ports: PortRange = "80-81".parse().unwrap();
    let report = service.scan_ports(&hosts, ports, &cfg(4), |_| {}).await;

    assert_eq!(report.found, OpenPortSet::from([SocketAddrV4::new(ip(2), 80)]));
    assert_eq!(report.probed, 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn port_scan_covers_cross_product() {
    let open = [
        SocketAddrV4::new(ip(1), 22),
        SocketAddrV4::new(ip(9), 443),
        SocketAddrV4::new(ip(9), 22),
    ];
    let (service, network) = Topology::with_alive([ip(1), ip(9)])
        .open(open)
        .latency(Duration::from_millis(1))
        .into_service();

    let hosts = LiveHostSet::from([ip(1), ip(9)]);
    let report = service
        .scan_ports(&hosts, "1-1024".parse().unwrap(), &cfg(64), |_| {})
        .await;

    assert_eq!(report.probed, 2048);
    assert_eq!(network.calls(), 2048);
    assert!(network.peak() <= 64);
    assert_eq!(report.found, OpenPortSet::from(open));
}

#[tokio::test(flavor = "multi_thread")]
async fn port_scan_without_hosts_is_empty() {
    let (service, network) = Topology::default().into_service();

    let report = service
        .scan_ports(
            &LiveHostSet::new(),
            "1-100".parse().unwrap(),
            &cfg(8),
            |_| {},
        )
        .await;

    assert!(report.found.is_empty());
    assert_eq!(report.probed, 0);
    assert_eq!(network.calls(), 0);
}

/// Real connects against loopback: a listening port is open, a freed one is not.
#[tokio::test(flavor = "multi_thread")]
async fn loopback_port_scan() -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let open_port = listener.local_addr()?.port();

    let freed = std::net::TcpListener::bind("127.0.0.1:0")?;
    let closed_port = freed.local_addr()?.port();
    drop(freed);

    let service = ScanService::handshake(open_port);
    let hosts = LiveHostSet::from([Ipv4Addr::LOCALHOST]);

    let ports = PortRange::new(open_port.into(), open_port.into())?;
    let report = service.scan_ports(&hosts, ports, &cfg(2), |_| {}).await;
    assert_eq!(
        report.found,
        OpenPortSet::from([SocketAddrV4::new(Ipv4Addr::LOCALHOST, open_port)])
    );

    let ports = PortRange::new(closed_port.into(), closed_port.into())?;
    let report = service.scan_ports(&hosts, ports, &cfg(2), |_| {}).await;
    assert!(report.found.is_empty());
    Ok(())
}
