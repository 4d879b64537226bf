//! # Session Report
//!
//! Results accumulated over an interactive session and their persistence to a
//! timestamped text file. The scan engine never sees this history; the menu
//! records into a [`Session`] after every pass and hands it to [`save_report`].

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use sweepr_common::error::ScanError;
use sweepr_common::network::{port::PortRange, range::AddressRange};
use sweepr_common::scanning::{LiveHostSet, OpenPortSet};

/// History of every pass of the current session, one report line per finding.
#[derive(Debug, Default, Clone)]
pub struct Session {
    lines: Vec<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hosts(&mut self, range: &AddressRange, hosts: &LiveHostSet) {
        self.lines.push(format!("# live hosts in {range}"));
        self.lines.extend(hosts.iter().map(|host| host.to_string()));
    }

    pub fn record_ports(&mut self, ports: &PortRange, open: &OpenPortSet) {
        self.lines.push(format!("# open ports in {ports}"));
        self.lines
            .extend(open.iter().map(|addr| format!("[OPEN] {}:{}", addr.ip(), addr.port())));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// `sweepr_<YYYYMMDD_HHMMSS>.txt`
pub fn report_file_name(now: DateTime<Local>) -> String {
    format!("sweepr_{}.txt", now.format("%Y%m%d_%H%M%S"))
}

/// Writes the session history to a new file in `dir` and returns its path.
pub fn save_report(session: &Session, dir: &Path) -> Result<PathBuf, ScanError> {
    let path = dir.join(report_file_name(Local::now()));
    write_lines(session.lines(), &path)?;
    Ok(path)
}

pub fn write_lines(lines: &[String], path: &Path) -> Result<(), ScanError> {
    let mut contents = lines.join("\n");
    if !contents.is_empty() {
        contents.push('\n');
    }

    fs::write(path, contents).map_err(|source| ScanError::Persistence {
        path: path.to_path_buf(),
        source,
    })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
