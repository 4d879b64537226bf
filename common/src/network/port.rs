use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::ScanError;

pub const MIN_PORT: u32 = 1;
pub const MAX_PORT: u32 = 65_535;

/// Inclusive TCP port range, always within `1..=65535` with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRange {
    start: u16,
    end: u16,
}

impl PortRange {
    /// Takes `u32` bounds so out-of-range input is rejected instead of truncated.
    pub fn new(start: u32, end: u32) -> Result<Self, ScanError> {
        let valid = |port: u32| (MIN_PORT..=MAX_PORT).contains(&port);

        if !valid(start) || !valid(end) {
            return Err(ScanError::InvalidPortRange(format!(
                "{start}-{end}: ports must be between {MIN_PORT} and {MAX_PORT}"
            )));
        }
        if start > end {
            return Err(ScanError::InvalidPortRange(format!(
                "{start}-{end}: start port is greater than end port"
            )));
        }

        Ok(Self {
            start: start as u16,
            end: end as u16,
        })
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    pub fn count(&self) -> usize {
        usize::from(self.end - self.start) + 1
    }

    pub fn iter(&self) -> RangeInclusive<u16> {
        self.start..=self.end
    }
}

impl std::fmt::Display for PortRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for PortRange {
    type Err = ScanError;

    /// Parses "Start-End" (e.g., "20-1024") or a single port ("443").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (start_str, end_str) = s.split_once('-').unwrap_or((s, s));

        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|e| ScanError::InvalidPortRange(format!("{s}: {e}")))
        };

        Self::new(parse(start_str)?, parse(end_str)?)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_range() {
        let range: PortRange = "20-1024".parse().unwrap();
        assert_eq!(range.start(), 20);
        assert_eq!(range.end(), 1024);
        assert_eq!(range.count(), 1005);
    }

    #[test]
    fn test_rejects_bad_ranges() {
        for input in ["0-100", "100-20", "1-70000", "65536-65536", "a-b", "", "-80"] {
            assert!(
                matches!(input.parse::<PortRange>(), Err(ScanError::InvalidPortRange(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let full = PortRange::new(1, 65_535).unwrap();
        assert_eq!(full.count(), 65_535);
        assert_eq!(full.iter().last(), Some(65_535));

        let single: PortRange = "443".parse().unwrap();
        assert_eq!(single.iter().collect::<Vec<u16>>(), vec![443]);
    }
}
