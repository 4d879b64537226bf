use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::{Duration, Instant};

use colored::*;
use sweepr_common::{
    config::Config,
    network::port::PortRange,
    scanning::{LiveHostSet, OpenPortSet, PortStatus, ProbeResult, SweepReport},
    success, warn,
};
use sweepr_core::{discovery::ScanService, scanner::port_sweep_len};

use crate::commands::Options;
use crate::interrupt::Interrupt;
use crate::terminal::{colors, print, progress};

/// Probes every port of `ports` on every live host.
pub async fn scan(
    service: &ScanService,
    interrupt: &Interrupt,
    hosts: &LiveHostSet,
    ports: PortRange,
    opts: &Options,
    timeout: Duration,
    cfg: &Config,
) -> OpenPortSet {
    print::header("port scan", cfg);
    print::print_status(format!(
        "Scanning ports {ports} on {} hosts",
        hosts.len().to_string().bold()
    ));
    let scan_cfg = opts.scan_config(timeout);

    let start_time = Instant::now();
    let report = {
        let _sweeping = interrupt.sweep_guard();
        let mut bar = progress::SweepProgress::start("open ports", port_sweep_len(hosts, &ports));
        service
            .scan_ports(hosts, ports, &scan_cfg, |result| on_port(result, &mut bar))
            .await
    };

    scan_ends(&report, start_time.elapsed(), cfg);
    report.found
}

fn on_port(result: &ProbeResult<SocketAddrV4, PortStatus>, bar: &mut progress::SweepProgress) {
    let open = result.outcome == PortStatus::Open;
    if open {
        success!(
            "Port {} open on {}",
            result.target.port().to_string().color(colors::PORT),
            result.target.ip().to_string().color(colors::IPV4_ADDR)
        );
    }
    bar.advance(open);
}

fn scan_ends(report: &SweepReport<SocketAddrV4>, total_time: Duration, cfg: &Config) {
    if report.cancelled {
        warn!("Scan cancelled, results are partial");
    }

    if report.found.is_empty() {
        print::header("zero open ports", cfg);
        print::no_results("open ports");
        return;
    }

    print::header("open ports", cfg);
    print_open_ports(&report.found, cfg);

    let open: ColoredString = format!("{} open ports", report.found.len()).bold().green();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output = format!("Port Scan Complete: {open} found in {total_time}");
    match cfg.quiet {
        0 => {
            print::fat_separator();
            print::centerln(&output);
        }
        _ => success!("{}", output),
    }
}

fn print_open_ports(open: &OpenPortSet, cfg: &Config) {
    if cfg.quiet > 0 {
        for addr in open {
            print::print(&format!("[OPEN] {}:{}", addr.ip(), addr.port()));
        }
        return;
    }

    for (idx, (host, ports)) in group_by_host(open).into_iter().enumerate() {
        print::tree_head(idx, &host.to_string());
        let details: Vec<(String, ColoredString)> = ports
            .into_iter()
            .map(|port| ("tcp".to_string(), port.to_string().color(colors::PORT)))
            .collect();
        print::as_tree_one_level(&details);
    }
}

fn group_by_host(open: &OpenPortSet) -> Vec<(Ipv4Addr, Vec<u16>)> {
    let mut grouped: Vec<(Ipv4Addr, Vec<u16>)> = Vec::new();
    for addr in open {
        match grouped.last_mut() {
            Some((host, ports)) if *host == *addr.ip() => ports.push(addr.port()),
            _ => grouped.push((*addr.ip(), vec![addr.port()])),
        }
    }
    grouped
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
