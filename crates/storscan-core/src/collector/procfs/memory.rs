//! Swap usage and swap sizing recommendation.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::collector::procfs::parser::{parse_mem_total_kb, parse_swaps};
use crate::collector::traits::FileSystem;

/// Upper bound for the recommended swap size (16 GiB).
pub const SWAP_RECOMMENDATION_CAP_BYTES: u64 = 16 << 30;

/// Swap figures derived from `/proc/swaps` and `/proc/meminfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SwapAdvice {
    /// Total size of all active swap areas.
    pub current_bytes: u64,
    /// Installed RAM, 0 when unknown.
    pub ram_bytes: u64,
    pub recommended_bytes: u64,
}

/// Recommended swap: 1.5x RAM capped at 16 GiB, or 16 GiB when RAM is unknown.
pub fn recommend_swap_bytes(ram_bytes: u64) -> u64 {
    if ram_bytes == 0 {
        return SWAP_RECOMMENDATION_CAP_BYTES;
    }
    (ram_bytes.saturating_mul(3) / 2).min(SWAP_RECOMMENDATION_CAP_BYTES)
}

/// Reads swap and memory totals from `/proc`.
pub struct SwapAdvisor<F: FileSystem> {
    fs: F,
    proc_path: PathBuf,
}

impl<F: FileSystem> SwapAdvisor<F> {
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    /// Sum of all active swap areas in bytes, 0 if `/proc/swaps` is unreadable.
    pub fn swap_current_bytes(&self) -> u64 {
        let path = self.proc_path.join("swaps");
        let content = match self.fs.read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "swap usage unavailable");
                return 0;
            }
        };

        let areas = parse_swaps(&content);
        let total_kb = areas
            .iter()
            .fold(0u64, |acc, area| acc.saturating_add(area.size_kb));
        debug!(areas = areas.len(), total_kb, "read swap areas");
        total_kb.saturating_mul(1024)
    }

    /// Installed RAM in bytes, 0 if `/proc/meminfo` is unreadable or malformed.
    pub fn ram_total_bytes(&self) -> u64 {
        let path = self.proc_path.join("meminfo");
        let parsed = self
            .fs
            .read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|content| parse_mem_total_kb(&content).map_err(|e| e.to_string()));

        match parsed {
            Ok(kb) => kb.saturating_mul(1024),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "total RAM unknown");
                0
            }
        }
    }

    /// Reads both sources once and derives the recommendation.
    pub fn advise(&self) -> SwapAdvice {
        let current_bytes = self.swap_current_bytes();
        let ram_bytes = self.ram_total_bytes();
        SwapAdvice {
            current_bytes,
            ram_bytes,
            recommended_bytes: recommend_swap_bytes(ram_bytes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    const GIB: u64 = 1 << 30;

    fn advisor(fs: MockFs) -> SwapAdvisor<MockFs> {
        SwapAdvisor::new(fs, "/proc")
    }

    #[test]
    fn test_recommend_swap_bytes() {
        assert_eq!(recommend_swap_bytes(8 * GIB), 12 * GIB);
        assert_eq!(recommend_swap_bytes(8 * GIB), 12_884_901_888);
        assert_eq!(recommend_swap_bytes(32 * GIB), 16 * GIB);
        assert_eq!(recommend_swap_bytes(0), 16 * GIB);
        assert_eq!(recommend_swap_bytes(u64::MAX), 16 * GIB);
        assert_eq!(recommend_swap_bytes(1024), 1536);
    }

    #[test]
    fn test_no_swap_eight_gib_ram() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/swaps", "Filename\tType\tSize\tUsed\tPriority\n");
        fs.add_file("/proc/meminfo", "MemTotal:        8388608 kB\n");

        let advice = advisor(fs).advise();
        assert_eq!(advice.current_bytes, 0);
        assert_eq!(advice.ram_bytes, 8 * GIB);
        assert_eq!(advice.recommended_bytes, 12_884_901_888);
    }

    #[test]
    fn test_large_ram_caps_recommendation() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/meminfo", "MemTotal:       33554432 kB\n");

        let advice = advisor(fs).advise();
        assert_eq!(advice.ram_bytes, 32 * GIB);
        assert_eq!(advice.recommended_bytes, 16 * GIB);
    }

    #[test]
    fn test_swap_areas_are_summed() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/proc/swaps",
            "\
Filename Type Size Used Priority
/dev/sda3 partition 4194304 0 -2
/swapfile file 1048576 512 -3
",
        );

        assert_eq!(advisor(fs).swap_current_bytes(), 5 * GIB);
    }

    #[test]
    fn test_missing_sources_degrade() {
        let advice = advisor(MockFs::new()).advise();
        assert_eq!(advice.current_bytes, 0);
        assert_eq!(advice.ram_bytes, 0);
        assert_eq!(advice.recommended_bytes, 16 * GIB);
    }

    #[test]
    fn test_malformed_meminfo_degrades() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/meminfo", "MemTotal: unknown kB\n");
        assert_eq!(advisor(fs).ram_total_bytes(), 0);
    }
}
