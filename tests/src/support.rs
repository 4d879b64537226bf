use std::collections::BTreeSet;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use sweepr_common::scanning::{HostStatus, PortStatus};
use sweepr_core::discovery::ScanService;
use sweepr_core::scanner::{HostProbe, PortProbe, Probe};

/// Fake network: a fixed set of hosts answering pings and of open ports.
#[derive(Default)]
pub struct Topology {
    pub alive: BTreeSet<Ipv4Addr>,
    pub open: BTreeSet<SocketAddrV4>,
    pub broken: BTreeSet<Ipv4Addr>,
    pub latency: Duration,
}

impl Topology {
    pub fn with_alive(alive: impl IntoIterator<Item = Ipv4Addr>) -> Self {
        Self {
            alive: alive.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn open(mut self, open: impl IntoIterator<Item = SocketAddrV4>) -> Self {
        self.open.extend(open);
        self
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn into_service(self) -> (ScanService, Arc<MockNetwork>) {
        let network = Arc::new(MockNetwork::new(self));
        let hosts: Arc<HostProbe> = network.clone();
        let ports: Arc<PortProbe> = Arc::new(MockPorts(Arc::clone(&network)));
        (ScanService::new(hosts, ports), network)
    }
}

/// Host probe over a [`Topology`], tracking how many probes overlap.
pub struct MockNetwork {
    topology: Topology,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl MockNetwork {
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter<T>(&self, work: impl FnOnce() -> T) -> T {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if !self.topology.latency.is_zero() {
            tokio::time::sleep(self.topology.latency).await;
        } else {
            tokio::task::yield_now().await;
        }

        let result = work();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[async_trait]
impl Probe for MockNetwork {
    type Target = Ipv4Addr;
    type Outcome = HostStatus;

    async fn probe(&self, addr: Ipv4Addr, _timeout: Duration) -> HostStatus {
        let latency = self.topology.latency;
        self.enter(|| {
            if self.topology.broken.contains(&addr) {
                panic!("socket exploded for {addr}");
            }
            if self.topology.alive.contains(&addr) {
                HostStatus::Reachable { latency }
            } else {
                HostStatus::Unreachable
            }
        })
        .await
    }
}

pub struct MockPorts(Arc<MockNetwork>);

#[async_trait]
impl Probe for MockPorts {
    type Target = SocketAddrV4;
    type Outcome = PortStatus;

    async fn probe(&self, addr: SocketAddrV4, _timeout: Duration) -> PortStatus {
        self.0
            .enter(|| {
                if self.0.topology.open.contains(&addr) {
                    PortStatus::Open
                } else {
                    PortStatus::Closed
                }
            })
            .await
    }
}

pub fn ip(last: u8) -> Ipv4Addr {
    Ipv4Addr::new(10, 0, 0, last)
}
