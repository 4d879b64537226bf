//! # IPv4 Range Model
//!
//! An inclusive, ordered range of IPv4 host addresses.
//!
//! Addresses are handled numerically (`u32`, network byte order) so that
//! enumeration is plain integer arithmetic. The range never materializes its
//! addresses: [`AddressRange::iter`] hands out an [`AddressIter`] cursor that
//! only holds the next address and the end bound, which keeps a full `/0`
//! sweep at constant memory.

use std::iter::FusedIterator;
use std::net::Ipv4Addr;
use std::str::FromStr;

use pnet::ipnetwork::Ipv4Network;

use crate::error::ScanError;

/// Inclusive range of IPv4 addresses, `start <= end` by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressRange {
    start: u32,
    end: u32,
}

impl AddressRange {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Result<Self, ScanError> {
        let start: u32 = start_addr.into();
        let end: u32 = end_addr.into();
        if start > end {
            return Err(ScanError::InvalidRange {
                start: start_addr,
                end: end_addr,
            });
        }
        Ok(Self { start, end })
    }

    /// Builds a range from two dotted-quad strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, ScanError> {
        let start_addr = parse_addr(start)?;
        let end_addr = parse_addr(end)?;
        Self::new(start_addr, end_addr)
    }

    /// Covers a whole CIDR block, network address through broadcast.
    pub fn from_cidr(ip: Ipv4Addr, prefix: u8) -> Result<Self, ScanError> {
        let network = Ipv4Network::new(ip, prefix)
            .map_err(|e| ScanError::InvalidAddress(format!("{ip}/{prefix}: {e}")))?;
        Self::new(network.network(), network.broadcast())
    }

    pub fn start(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.start)
    }

    pub fn end(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.end)
    }

    /// Number of addresses in the range. Up to 2^32, hence `u64`.
    pub fn count(&self) -> u64 {
        u64::from(self.end) - u64::from(self.start) + 1
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let value: u32 = addr.into();
        self.start <= value && value <= self.end
    }

    /// Returns a fresh cursor positioned at `start`.
    pub fn iter(&self) -> AddressIter {
        AddressIter {
            next: u64::from(self.start),
            end: u64::from(self.end),
        }
    }
}

impl IntoIterator for AddressRange {
    type Item = Ipv4Addr;
    type IntoIter = AddressIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &AddressRange {
    type Item = Ipv4Addr;
    type IntoIter = AddressIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl std::fmt::Display for AddressRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start(), self.end())
    }
}

impl FromStr for AddressRange {
    type Err = ScanError;

    /// Parses a range string.
    ///
    /// Supported formats:
    /// * **Range**: "Start-End" (e.g., "192.168.1.1-192.168.1.254").
    /// * **CIDR**: "Network/Prefix" (e.g., "192.168.1.0/24").
    /// * **Host**: a single address, yielding a one-element range.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        if let Some((start_str, end_str)) = s.split_once('-') {
            return Self::parse(start_str, end_str);
        }

        if let Some((ip_str, prefix_str)) = s.split_once('/') {
            let ip = parse_addr(ip_str)?;
            let prefix = prefix_str
                .trim()
                .parse::<u8>()
                .map_err(|e| ScanError::InvalidAddress(format!("{s}: bad prefix ({e})")))?;
            return Self::from_cidr(ip, prefix);
        }

        let addr = parse_addr(s)?;
        Self::new(addr, addr)
    }
}

fn parse_addr(s: &str) -> Result<Ipv4Addr, ScanError> {
    let s = s.trim();
    s.parse::<Ipv4Addr>()
        .map_err(|_| ScanError::InvalidAddress(s.to_string()))
}

/// Cursor over an [`AddressRange`].
///
/// Bounds are widened to `u64` so that stepping past `255.255.255.255`
/// cannot wrap around.
#[derive(Debug, Clone)]
pub struct AddressIter {
    next: u64,
    end: u64,
}

impl Iterator for AddressIter {
    type Item = Ipv4Addr;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.end {
            return None;
        }
        let current = self.next as u32;
        self.next += 1;
        Some(Ipv4Addr::from(current))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end + 1).saturating_sub(self.next);
        match usize::try_from(remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl FusedIterator for AddressIter {}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
