use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use sweepr_common::warn;
use sweepr_core::scanner::SweepControl;

use crate::terminal::print;

/// Routes Ctrl-C either to the running sweep or to process exit.
#[derive(Clone)]
pub struct Interrupt {
    control: Arc<SweepControl>,
    sweeping: Arc<AtomicBool>,
}

impl Interrupt {
    fn new(control: Arc<SweepControl>) -> Self {
        Self {
            control,
            sweeping: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Spawns the signal listener. Must be called from within the runtime.
    pub fn install(control: Arc<SweepControl>) -> Self {
        let interrupt = Self::new(control);

        let listener = interrupt.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if !listener.cancel_sweep() {
                    print::end_of_program();
                    std::process::exit(130);
                }
            }
        });

        interrupt
    }

    /// Cancels the running sweep. Returns `false` when no sweep is running.
    fn cancel_sweep(&self) -> bool {
        if !self.sweeping.load(Ordering::SeqCst) {
            return false;
        }
        warn!("Interrupted, waiting for in-flight probes to finish...");
        self.control.cancel();
        true
    }

    /// Re-arms the sweep control and marks a sweep as running until the
    /// guard is dropped.
    pub fn sweep_guard(&self) -> SweepGuard {
        self.control.reset();
        self.sweeping.store(true, Ordering::SeqCst);
        SweepGuard {
            sweeping: Arc::clone(&self.sweeping),
        }
    }
}

pub struct SweepGuard {
    sweeping: Arc<AtomicBool>,
}

impl Drop for SweepGuard {
    fn drop(&mut self) {
        self.sweeping.store(false, Ordering::SeqCst);
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
