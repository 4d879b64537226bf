use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use sweepr_common::scanning::{HostStatus, PortStatus};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::scanner::Probe;

/// Full TCP handshake against one `(host, port)` pair.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnectProbe;

#[async_trait]
impl Probe for TcpConnectProbe {
    type Target = SocketAddrV4;
    type Outcome = PortStatus;

    async fn probe(&self, addr: SocketAddrV4, probe_timeout: Duration) -> PortStatus {
        match timeout(probe_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                PortStatus::Open
            }
            Ok(Err(_)) | Err(_) => PortStatus::Closed,
        }
    }
}

/// Host liveness through a TCP handshake on a single port.
///
/// Works without raw-socket privileges. A completed handshake or an active
/// refusal both prove the host is up; silence means it is not.
#[derive(Debug, Clone, Copy)]
pub struct HandshakeProbe {
    port: u16,
}

impl HandshakeProbe {
    pub const DEFAULT_PORT: u16 = 443;

    pub fn new(port: u16) -> Self {
        Self { port }
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl Default for HandshakeProbe {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PORT)
    }
}

#[async_trait]
impl Probe for HandshakeProbe {
    type Target = Ipv4Addr;
    type Outcome = HostStatus;

    async fn probe(&self, addr: Ipv4Addr, probe_timeout: Duration) -> HostStatus {
        let socket_addr = SocketAddr::V4(SocketAddrV4::new(addr, self.port));
        let started = Instant::now();

        match timeout(probe_timeout, TcpStream::connect(socket_addr)).await {
            Ok(Ok(_)) => HostStatus::Reachable {
                latency: started.elapsed(),
            },
            Ok(Err(e)) => match e.kind() {
                ErrorKind::ConnectionRefused | ErrorKind::ConnectionReset => {
                    HostStatus::Reachable {
                        latency: started.elapsed(),
                    }
                }
                ErrorKind::HostUnreachable
                | ErrorKind::NetworkUnreachable
                | ErrorKind::TimedOut => HostStatus::Unreachable,
                _ => HostStatus::Failed(e.to_string()),
            },
            Err(_elapsed) => HostStatus::Unreachable,
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
