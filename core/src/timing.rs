//! # Adaptive Timeout
//!
//! Picks the per-probe timeout for a host sweep by pinging the first few
//! addresses of the range. A responsive network gets a short timeout, which
//! keeps a full sweep cheap; if nothing answers, the sweep falls back to the
//! calibration timeout.

use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use sweepr_common::{
    config::DEFAULT_TIMEOUT, network::range::AddressRange, scanning::HostStatus,
};
use tracing::debug;

use crate::scanner::Probe;

/// Timeout given to every calibration sample.
pub const CALIBRATION_TIMEOUT: Duration = DEFAULT_TIMEOUT;

const MIN_TIMEOUT_MS: u64 = 100;
const MAX_TIMEOUT_MS: u64 = 1_000;
const LATENCY_MARGIN_MS: u64 = 50;

/// Outcome of one calibration probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub addr: Ipv4Addr,
    pub status: HostStatus,
    /// Wall-clock time spent in the probe.
    pub elapsed: Duration,
}

impl Sample {
    /// Latency contributed to the estimate, if the host answered.
    pub fn latency_ms(&self) -> Option<u64> {
        match self.status {
            HostStatus::Reachable { .. } => Some(self.elapsed.as_millis() as u64),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutEstimate {
    pub timeout: Duration,
    pub samples: Vec<Sample>,
}

impl TimeoutEstimate {
    pub fn successes(&self) -> usize {
        self.samples
            .iter()
            .filter(|s| s.latency_ms().is_some())
            .count()
    }

    /// No sample answered, so `timeout` is the fallback value.
    pub fn is_fallback(&self) -> bool {
        self.successes() == 0
    }
}

/// Probes the first `min(sample_count, range.count())` addresses one after
/// another and derives a timeout from the ones that answered.
///
/// `on_sample` is called after every probe, in range order.
pub async fn estimate_timeout<P, F>(
    probe: &P,
    range: &AddressRange,
    sample_count: usize,
    mut on_sample: F,
) -> TimeoutEstimate
where
    P: Probe<Target = Ipv4Addr, Outcome = HostStatus> + ?Sized,
    F: FnMut(&Sample),
{
    let mut samples: Vec<Sample> = Vec::with_capacity(sample_count.min(64));

    for addr in range.iter().take(sample_count) {
        let started = Instant::now();
        let status = probe.probe(addr, CALIBRATION_TIMEOUT).await;
        let sample = Sample {
            addr,
            status,
            elapsed: started.elapsed(),
        };

        debug!("calibration sample {addr}: {:?}", sample.status);
        on_sample(&sample);
        samples.push(sample);
    }

    let latencies: Vec<u64> = samples.iter().filter_map(Sample::latency_ms).collect();

    TimeoutEstimate {
        timeout: optimal_timeout(&latencies),
        samples,
    }
}

/// `clamp(round(mean) + 50, 100, 1000)` milliseconds, or 1000 ms when there
/// is nothing to average.
pub fn optimal_timeout(latencies_ms: &[u64]) -> Duration {
    if latencies_ms.is_empty() {
        return DEFAULT_TIMEOUT;
    }

    let sum: u128 = latencies_ms.iter().map(|&ms| u128::from(ms)).sum();
    let mean: f64 = sum as f64 / latencies_ms.len() as f64;
    let millis = (mean.round() as u64)
        .saturating_add(LATENCY_MARGIN_MS)
        .clamp(MIN_TIMEOUT_MS, MAX_TIMEOUT_MS);

    Duration::from_millis(millis)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Answers after a fixed delay for the listed hosts only.
    struct DelayedEcho {
        alive: Vec<Ipv4Addr>,
        delay: Duration,
        asked: Mutex<Vec<(Ipv4Addr, Duration)>>,
    }

    #[async_trait]
    impl Probe for DelayedEcho {
        type Target = Ipv4Addr;
        type Outcome = HostStatus;

        async fn probe(&self, addr: Ipv4Addr, timeout: Duration) -> HostStatus {
            self.asked.lock().unwrap().push((addr, timeout));
            if self.alive.contains(&addr) {
                tokio::time::sleep(self.delay).await;
                HostStatus::Reachable {
                    latency: self.delay,
                }
            } else if addr.octets()[3] == 13 {
                HostStatus::Failed("network is unreachable".into())
            } else {
                HostStatus::Unreachable
            }
        }
    }

    fn echo(alive: &[[u8; 4]], delay: Duration) -> DelayedEcho {
        DelayedEcho {
            alive: alive.iter().map(|o| Ipv4Addr::from(*o)).collect(),
            delay,
            asked: Mutex::new(Vec::new()),
        }
    }

    #[test]
    fn test_optimal_timeout_formula() {
        assert_eq!(optimal_timeout(&[]), Duration::from_millis(1_000));
        assert_eq!(optimal_timeout(&[0]), Duration::from_millis(100));
        assert_eq!(optimal_timeout(&[100, 200]), Duration::from_millis(200));
        // 10.5 rounds to 11
        assert_eq!(optimal_timeout(&[10, 11]), Duration::from_millis(100));
        assert_eq!(optimal_timeout(&[300, 301]), Duration::from_millis(351));
        assert_eq!(optimal_timeout(&[949]), Duration::from_millis(999));
        assert_eq!(optimal_timeout(&[951]), Duration::from_millis(1_000));
    }

    #[test]
    fn test_optimal_timeout_is_always_clamped() {
        let cases: [&[u64]; 5] = [
            &[0, 0, 0],
            &[1],
            &[5_000],
            &[u64::MAX],
            &[u64::MAX, u64::MAX, 3],
        ];
        for latencies in cases {
            let timeout = optimal_timeout(latencies).as_millis();
            assert!((100..=1_000).contains(&timeout), "{latencies:?} -> {timeout}");
        }
    }

    #[tokio::test]
    async fn no_answers_yield_default_timeout() {
        let probe = echo(&[], Duration::ZERO);
        let range: AddressRange = "10.0.0.1-10.0.0.20".parse().unwrap();

        let estimate = estimate_timeout(&probe, &range, 5, |_| {}).await;

        assert_eq!(estimate.timeout, Duration::from_millis(1_000));
        assert!(estimate.is_fallback());
        assert_eq!(estimate.samples.len(), 5);
    }

    #[tokio::test]
    async fn samples_only_the_range_prefix() {
        let probe = echo(&[[10, 0, 0, 2]], Duration::from_millis(20));
        let range: AddressRange = "10.0.0.1-10.0.0.20".parse().unwrap();

        let estimate = estimate_timeout(&probe, &range, 3, |_| {}).await;

        let asked = probe.asked.lock().unwrap().clone();
        let expected: Vec<(Ipv4Addr, Duration)> = range
            .iter()
            .take(3)
            .map(|addr| (addr, CALIBRATION_TIMEOUT))
            .collect();
        assert_eq!(asked, expected);
        assert_eq!(estimate.successes(), 1);

        let timeout = estimate.timeout.as_millis();
        assert!((100..=1_000).contains(&timeout));
    }

    #[tokio::test]
    async fn sample_count_larger_than_range() {
        let probe = echo(&[[10, 0, 0, 1]], Duration::ZERO);
        let range: AddressRange = "10.0.0.1-10.0.0.2".parse().unwrap();

        let estimate = estimate_timeout(&probe, &range, 50, |_| {}).await;
        assert_eq!(estimate.samples.len(), 2);
        assert_eq!(estimate.timeout, Duration::from_millis(100));
    }

    #[tokio::test]
    async fn zero_samples_probe_nothing() {
        let probe = echo(&[[10, 0, 0, 1]], Duration::ZERO);
        let range: AddressRange = "10.0.0.1-10.0.0.2".parse().unwrap();

        let estimate = estimate_timeout(&probe, &range, 0, |_| {}).await;
        assert!(probe.asked.lock().unwrap().is_empty());
        assert_eq!(estimate.timeout, Duration::from_millis(1_000));
    }

    #[tokio::test]
    async fn failures_do_not_abort_estimation() {
        let probe = echo(&[[10, 0, 0, 14]], Duration::ZERO);
        let range: AddressRange = "10.0.0.12-10.0.0.14".parse().unwrap();
        let mut seen: Vec<HostStatus> = Vec::new();

        let estimate = estimate_timeout(&probe, &range, 3, |s| seen.push(s.status.clone())).await;

        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], HostStatus::Unreachable);
        assert!(matches!(seen[1], HostStatus::Failed(_)));
        assert!(matches!(seen[2], HostStatus::Reachable { .. }));
        assert_eq!(estimate.successes(), 1);
    }
}
