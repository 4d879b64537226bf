//! ICMP echo host probe.
//!
//! A single [`Client`] (one ICMP socket) is shared by every probe; each call
//! gets its own pinger with a random identifier, which is released when the
//! call returns. On Linux the socket is an unprivileged datagram ICMP socket
//! when `net.ipv4.ping_group_range` allows it, and a raw socket otherwise.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use async_trait::async_trait;
use surge_ping::{Client, Config, ICMP, PingIdentifier, PingSequence, SurgeError};
use sweepr_common::{scanning::HostStatus, warn};

use crate::scanner::Probe;

const PAYLOAD: [u8; 56] = [0; 56];

pub struct IcmpProbe {
    client: Result<Client, String>,
}

impl IcmpProbe {
    /// Opens the ICMP socket. Must be called from within a Tokio runtime.
    ///
    /// Never fails: if the socket cannot be opened, every probe reports the
    /// reason as [`HostStatus::Failed`].
    pub fn new() -> Self {
        let config = Config::builder().kind(ICMP::V4).build();
        let client = Client::new(&config).map_err(|e| format!("cannot open ICMP socket: {e}"));

        if let Err(reason) = &client {
            warn!("{reason}");
        }

        Self { client }
    }

    /// Whether the ICMP socket was opened.
    pub fn is_available(&self) -> bool {
        self.client.is_ok()
    }
}

#[async_trait]
impl Probe for IcmpProbe {
    type Target = Ipv4Addr;
    type Outcome = HostStatus;

    async fn probe(&self, addr: Ipv4Addr, timeout: Duration) -> HostStatus {
        let client = match &self.client {
            Ok(client) => client,
            Err(reason) => return HostStatus::Failed(reason.clone()),
        };

        let mut pinger = client
            .pinger(IpAddr::V4(addr), PingIdentifier(rand::random()))
            .await;
        pinger.timeout(timeout);

        match pinger.ping(PingSequence(0), &PAYLOAD).await {
            Ok((_packet, rtt)) => HostStatus::Reachable { latency: rtt },
            Err(SurgeError::Timeout { .. }) => HostStatus::Unreachable,
            Err(e) => HostStatus::Failed(e.to_string()),
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
