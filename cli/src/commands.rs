pub mod discover;
pub mod menu;
pub mod scan;

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use sweepr_common::{
    config::ScanConfig,
    network::{port::PortRange, range::AddressRange},
    warn,
};

use crate::terminal::{print, prompt};

const DEFAULT_SAMPLES: usize = 5;
const MAX_FIXED_TIMEOUT_MS: u64 = 60_000;

#[derive(Parser)]
#[command(name = "sweepr")]
#[command(version)]
#[command(about = "Concurrent IPv4 host sweep and TCP port scanner with adaptive timeouts.")]
pub struct CommandLine {
    /// Range to sweep: "START-END", "NETWORK/PREFIX" or a single address
    #[arg(short, long)]
    pub range: Option<AddressRange>,

    /// Probes in flight at once (default: twice the CPU count)
    #[arg(short, long, allow_hyphen_values = true)]
    pub parallelism: Option<String>,

    /// Addresses pinged to calibrate the probe timeout
    #[arg(short, long)]
    pub samples: Option<usize>,

    /// Port range for the port scan, e.g. "20-1024"
    #[arg(short = 'P', long)]
    pub ports: Option<PortRange>,

    /// Fixed probe timeout in milliseconds, skips calibration
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Detect hosts with a TCP handshake on this port instead of ICMP echo
    #[arg(long, value_name = "PORT")]
    pub tcp_ping: Option<u16>,

    /// Directory receiving saved reports
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Run the sweeps once and exit instead of opening the menu
    #[arg(long)]
    pub no_menu: bool,

    /// Save a report before exiting (with --no-menu)
    #[arg(long)]
    pub save: bool,

    /// Less output; repeat for results only
    #[arg(short, long, action = ArgAction::Count)]
    pub quiet: u8,

    #[arg(long)]
    pub no_banner: bool,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn interactive(&self) -> bool {
        !self.no_menu
    }
}

/// Scan inputs after command-line values and prompts have been merged.
#[derive(Debug, Clone)]
pub struct Options {
    pub range: AddressRange,
    pub parallelism: NonZeroUsize,
    pub samples: usize,
    pub fixed_timeout: Option<Duration>,
    pub ports: Option<PortRange>,
    pub output_dir: PathBuf,
}

impl Options {
    /// Merges arguments with interactive answers for whatever is missing.
    ///
    /// Without a menu nothing is prompted; a missing range is then an error.
    pub fn resolve(args: &CommandLine) -> anyhow::Result<Self> {
        let parallelism = resolve_parallelism(args)?;

        let range = match args.range {
            Some(range) => range,
            None if args.interactive() => ask_range()?,
            None => anyhow::bail!("a range is required with --no-menu (use --range START-END)"),
        };

        let samples = match (args.samples, args.timeout) {
            (Some(samples), _) => samples,
            (None, Some(_)) => 0,
            (None, None) if args.interactive() => ask_samples()?,
            (None, None) => DEFAULT_SAMPLES,
        };

        let fixed_timeout = args
            .timeout
            .map(|ms| Duration::from_millis(ms.clamp(1, MAX_FIXED_TIMEOUT_MS)));

        Ok(Self {
            range,
            parallelism,
            samples,
            fixed_timeout,
            ports: args.ports,
            output_dir: args.output_dir.clone(),
        })
    }

    pub fn scan_config(&self, timeout: Duration) -> ScanConfig {
        ScanConfig::new(timeout, self.parallelism)
    }
}

fn resolve_parallelism(args: &CommandLine) -> anyhow::Result<NonZeroUsize> {
    let recommended = ScanConfig::default_parallelism();

    let input: Option<String> = match &args.parallelism {
        Some(value) => Some(value.clone()),
        None if args.interactive() => {
            let cores = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
            print::print_status(format!("Your system has {cores} CPU cores."));
            prompt::ask_optional(&format!(
                "Number of parallel probes (recommended: {recommended}):"
            ))?
        }
        None => None,
    };

    let parallelism = ScanConfig::resolve_parallelism(input.as_deref());
    if input.is_some() && is_invalid_parallelism(input.as_deref()) {
        warn!("Invalid parallelism, using default value of {parallelism}");
    }
    Ok(parallelism)
}

fn is_invalid_parallelism(input: Option<&str>) -> bool {
    !matches!(input.map(str::trim).map(str::parse::<i64>), Some(Ok(n)) if n > 0)
}

fn ask_range() -> anyhow::Result<AddressRange> {
    loop {
        let answer = prompt::ask("IP range to scan (e.g., 192.168.1.1-192.168.1.254):")?;
        match answer.parse::<AddressRange>() {
            Ok(range) => return Ok(range),
            Err(e) => warn!("{e}"),
        }
    }
}

fn ask_samples() -> anyhow::Result<usize> {
    let answer = prompt::ask_optional(&format!(
        "Samples to estimate network speed (default: {DEFAULT_SAMPLES}):"
    ))?;

    Ok(match answer {
        None => DEFAULT_SAMPLES,
        Some(value) => value.parse().unwrap_or_else(|_| {
            warn!("Invalid sample count, using {DEFAULT_SAMPLES}");
            DEFAULT_SAMPLES
        }),
    })
}

/// Asks for a port range until a valid one is given.
pub fn ask_ports() -> anyhow::Result<PortRange> {
    loop {
        let answer = prompt::ask("Port range to scan (e.g., 20-1024):")?;
        match answer.parse::<PortRange>() {
            Ok(ports) => return Ok(ports),
            Err(e) => warn!("{e}"),
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
