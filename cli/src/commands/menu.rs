use std::time::Duration;

use colored::*;
use sweepr_common::{
    config::Config,
    error, info,
    scanning::LiveHostSet,
    success, warn,
};
use sweepr_core::discovery::ScanService;

use crate::commands::{self, Options, discover, scan};
use crate::interrupt::Interrupt;
use crate::report::{self, Session};
use crate::terminal::{colors, print, prompt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Rescan,
    ScanPorts,
    Save,
    Exit,
}

impl Choice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::Rescan),
            "2" => Some(Self::ScanPorts),
            "3" => Some(Self::Save),
            "4" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Everything one run of the front end carries between sweeps.
pub struct Run<'a> {
    pub service: &'a ScanService,
    pub interrupt: &'a Interrupt,
    pub opts: Options,
    pub cfg: Config,
    pub session: Session,
    pub hosts: LiveHostSet,
    pub timeout: Duration,
}

impl Run<'_> {
    /// Calibrates, sweeps the range and replaces the live-host set.
    pub async fn sweep_hosts(&mut self) {
        self.timeout = discover::timeout(self.service, &self.opts, &self.cfg).await;
        self.hosts = discover::discover(
            self.service,
            self.interrupt,
            &self.opts,
            self.timeout,
            &self.cfg,
        )
        .await;
        self.session.record_hosts(&self.opts.range, &self.hosts);
    }

    pub async fn scan_ports(&mut self) -> anyhow::Result<()> {
        if self.hosts.is_empty() {
            warn!("No live hosts to scan, run a host sweep first");
            return Ok(());
        }

        let ports = match self.opts.ports {
            Some(ports) => ports,
            None => commands::ask_ports()?,
        };

        let open = scan::scan(
            self.service,
            self.interrupt,
            &self.hosts,
            ports,
            &self.opts,
            self.timeout,
            &self.cfg,
        )
        .await;
        self.session.record_ports(&ports, &open);
        Ok(())
    }

    pub fn save(&self) {
        if self.session.is_empty() {
            warn!("Nothing to save yet");
            return;
        }

        match report::save_report(&self.session, &self.opts.output_dir) {
            Ok(path) => success!("Results saved to {}", path.display()),
            Err(e) => error!("{e}"),
        }
    }
}

/// Menu loop after the first host sweep. Returns when the operator exits.
pub async fn menu(run: &mut Run<'_>) -> anyhow::Result<()> {
    loop {
        print_menu();
        let choice = prompt::ask("Choose an option:")?;

        match Choice::parse(&choice) {
            Some(Choice::Rescan) => run.sweep_hosts().await,
            Some(Choice::ScanPorts) => run.scan_ports().await?,
            Some(Choice::Save) => run.save(),
            Some(Choice::Exit) => {
                info!("Exiting");
                return Ok(());
            }
            None => warn!("Invalid option: {choice}"),
        }
    }
}

fn print_menu() {
    print::print("");
    for (key, label) in [
        ("1", "Rescan hosts"),
        ("2", "Scan ports on live hosts"),
        ("3", "Save results"),
        ("4", "Exit"),
    ] {
        print::print(&format!(
            " {} {}",
            format!("[{key}]").color(colors::ACCENT),
            label.color(colors::TEXT_DEFAULT)
        ));
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
