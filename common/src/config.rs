use std::num::NonZeroUsize;
use std::time::Duration;

/// Timeout applied to calibration samples and used when calibration finds nothing.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1_000);

/// Presentation settings of the front end.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Skips the banner on start-up.
    pub no_banner: bool,
    /// `0` prints everything, `1` drops headers and per-sample lines, `2` prints results only.
    pub quiet: u8,
}

/// Settings for a single sweep. Rebuilt between sweeps, never mutated during one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Upper bound for every individual probe.
    pub timeout: Duration,
    /// Maximum number of probes in flight at any instant.
    pub parallelism: NonZeroUsize,
}

impl ScanConfig {
    pub fn new(timeout: Duration, parallelism: NonZeroUsize) -> Self {
        Self {
            timeout,
            parallelism,
        }
    }

    /// Twice the available parallelism reported by the OS.
    pub fn default_parallelism() -> NonZeroUsize {
        let cores = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
        NonZeroUsize::new(cores.saturating_mul(2)).unwrap_or(NonZeroUsize::MIN)
    }

    /// Interprets operator input for the parallelism bound.
    ///
    /// Empty, unparseable, zero or negative input all mean "unset" and fall
    /// back to [`ScanConfig::default_parallelism`].
    pub fn resolve_parallelism(input: Option<&str>) -> NonZeroUsize {
        input
            .map(str::trim)
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|n| *n > 0)
            .and_then(|n| usize::try_from(n).ok())
            .and_then(NonZeroUsize::new)
            .unwrap_or_else(Self::default_parallelism)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT, Self::default_parallelism())
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
