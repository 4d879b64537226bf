mod commands;
mod interrupt;
mod report;
mod terminal;

use commands::{CommandLine, Options, menu};
use sweepr_common::{config::Config, warn};
use sweepr_core::discovery::ScanService;
use sweepr_core::network::{icmp::IcmpProbe, tcp::HandshakeProbe};

use crate::interrupt::Interrupt;
use crate::report::Session;
use crate::terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CommandLine::parse_args();

    logging::init_logging(args.quiet);

    let cfg = Config {
        no_banner: args.no_banner,
        quiet: args.quiet,
    };
    print::banner(&cfg);

    let service = match args.tcp_ping {
        Some(port) => ScanService::handshake(port),
        None => {
            let probe = IcmpProbe::new();
            if !probe.is_available() {
                warn!(
                    "ICMP echo is unavailable, use --tcp-ping {}",
                    HandshakeProbe::DEFAULT_PORT
                );
            } else if !is_root::is_root() {
                warn!("Not running as root, ICMP echo replies may be filtered");
            }
            ScanService::icmp(probe)
        }
    };
    let interrupt = Interrupt::install(service.control());

    print::header("getting ready", &cfg);
    let opts = Options::resolve(&args)?;

    let mut run = menu::Run {
        service: &service,
        interrupt: &interrupt,
        opts,
        cfg,
        session: Session::new(),
        hosts: Default::default(),
        timeout: Default::default(),
    };

    run.sweep_hosts().await;

    if args.interactive() {
        menu::menu(&mut run).await?;
    } else {
        if run.opts.ports.is_some() {
            run.scan_ports().await?;
        }
        if args.save {
            run.save();
        }
    }

    print::end_of_program();
    Ok(())
}
