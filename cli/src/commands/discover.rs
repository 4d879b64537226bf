use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use colored::*;
use sweepr_common::{
    config::Config,
    scanning::{HostStatus, LiveHostSet, ProbeResult, SweepReport},
    success, warn,
};
use sweepr_core::{discovery::ScanService, timing::Sample};
use tracing::Instrument;

use crate::commands::Options;
use crate::interrupt::Interrupt;
use crate::terminal::{colors, print, progress};

type Detail = (String, ColoredString);

/// Picks the probe timeout: the fixed one if given, otherwise a calibrated one.
pub async fn timeout(service: &ScanService, opts: &Options, cfg: &Config) -> Duration {
    if let Some(fixed) = opts.fixed_timeout {
        print::print_status(format!("Using fixed timeout of {}ms", fixed.as_millis()));
        return fixed;
    }

    print::header("estimating network speed", cfg);
    let spinner = progress::calibration_spinner(opts.samples);
    let estimate = service
        .calibrate(&opts.range, opts.samples, |sample| print_sample(sample, cfg))
        .instrument(spinner.clone())
        .await;
    drop(spinner);

    if estimate.is_fallback() {
        warn!(
            "No sampled host answered, using {}ms timeout",
            estimate.timeout.as_millis()
        );
    } else {
        print::print_status(format!(
            "Optimal timeout: {}ms",
            estimate.timeout.as_millis().to_string().bold()
        ));
    }
    estimate.timeout
}

fn print_sample(sample: &Sample, cfg: &Config) {
    if cfg.quiet > 0 {
        return;
    }

    let addr = sample.addr.to_string().color(colors::IPV4_ADDR);
    match &sample.status {
        HostStatus::Reachable { .. } => print::print_status(format!(
            "Response from {addr}: {}",
            progress::format_latency(sample.elapsed)
        )),
        HostStatus::Unreachable => print::print_status(format!("No response from {addr}")),
        HostStatus::Failed(reason) => warn!("Probe of {addr} failed: {reason}"),
    }
}

/// Sweeps the range once and returns the live hosts it found.
pub async fn discover(
    service: &ScanService,
    interrupt: &Interrupt,
    opts: &Options,
    timeout: Duration,
    cfg: &Config,
) -> LiveHostSet {
    print::header("host discovery", cfg);
    let scan_cfg = opts.scan_config(timeout);

    let start_time = Instant::now();
    let report = {
        let _sweeping = interrupt.sweep_guard();
        let mut bar = progress::SweepProgress::start("hosts", opts.range.count());
        service
            .discover(&opts.range, &scan_cfg, |result| on_host(result, &mut bar))
            .await
    };

    discovery_ends(&report, start_time.elapsed(), cfg);
    report.found
}

fn on_host(result: &ProbeResult<Ipv4Addr, HostStatus>, bar: &mut progress::SweepProgress) {
    let alive = matches!(result.outcome, HostStatus::Reachable { .. });
    if let HostStatus::Reachable { latency } = result.outcome {
        success!(
            "Host {} is alive ({})",
            result.target.to_string().color(colors::IPV4_ADDR),
            progress::format_latency(latency)
        );
    }
    bar.advance(alive);
}

fn discovery_ends(report: &SweepReport<Ipv4Addr>, total_time: Duration, cfg: &Config) {
    if report.cancelled {
        warn!("Sweep cancelled, results are partial");
    }
    if report.failed > 0 {
        warn!("{} probes failed", report.failed);
    }

    if report.found.is_empty() {
        print::header("zero hosts detected", cfg);
        print::no_results("live hosts");
        return;
    }

    print::header("live hosts", cfg);
    print_hosts(&report.found, cfg);
    print_summary(report, total_time, cfg);
}

fn print_hosts(hosts: &LiveHostSet, cfg: &Config) {
    for (idx, host) in hosts.iter().enumerate() {
        match cfg.quiet {
            0 => {
                print::tree_head(idx, &host.to_string());
                let details: Vec<Detail> = vec![(
                    "IPv4".to_string(),
                    host.to_string().color(colors::IPV4_ADDR),
                )];
                print::as_tree_one_level(&details);
            }
            _ => print::print(&host.to_string()),
        }
    }
}

fn print_summary(report: &SweepReport<Ipv4Addr>, total_time: Duration, cfg: &Config) {
    let active_hosts: ColoredString = format!("{} active hosts", report.found.len()).bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output = format!(
        "Discovery Complete: {active_hosts} out of {} probed in {total_time}",
        report.probed
    );

    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
        }
        _ => success!("{}", output),
    }
}
