//! Scan result model.
//!
//! These structures are the only externally observable artifact of a scan.
//! Field names serialize exactly as the JSON report expects.

use serde::{Deserialize, Serialize};

/// Signature label reported for LVM physical volumes.
pub const LVM_MEMBER_SIGNATURE: &str = "LVM2_member";

/// Signature label reported for LUKS containers.
pub const LUKS_SIGNATURE: &str = "crypto_LUKS";

/// Complete block-storage snapshot of the host.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct ScanResult {
    /// Sum of all active swap areas, in bytes.
    /// Source: `/proc/swaps` size column (KiB)
    pub swap_current_bytes: u64,

    /// Recommended swap size: 1.5x RAM, capped at 16 GiB.
    pub swap_recommended_bytes: u64,

    /// Physical disks sorted by name.
    pub disks: Vec<DiskDevice>,

    /// True when any partition carries an `LVM2_member` signature.
    pub lvm_present: bool,

    /// True when any partition carries a `crypto_LUKS` signature.
    pub encryption_present: bool,
}

impl ScanResult {
    /// Iterates every partition across all disks.
    pub fn partitions(&self) -> impl Iterator<Item = &PartitionDevice> {
        self.disks.iter().flat_map(|disk| disk.partitions.iter())
    }
}

/// A whole disk found under `/sys/block`.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct DiskDevice {
    /// Kernel device name (`sda`, `nvme0n1`).
    pub name: String,

    /// Device node path (`/dev/<name>`).
    pub path: String,

    /// Hardware sector size in bytes.
    /// Source: `/sys/block/<name>/queue/hw_sector_size` (512 if absent)
    pub sector_size: u64,

    /// Disk size in sectors.
    /// Source: `/sys/block/<name>/size`
    pub size_sectors: u64,

    /// `size_sectors * sector_size`.
    pub size_bytes: u64,

    /// Partitions of this disk sorted by name.
    pub partitions: Vec<PartitionDevice>,
}

/// A partition correlated with its mount binding and on-disk signature.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct PartitionDevice {
    pub name: String,
    pub path: String,

    /// Source: `/sys/class/block/<name>/start`
    pub start_sector: u64,

    /// Source: `/sys/class/block/<name>/size`
    pub size_sectors: u64,

    /// Last sector covered by the partition; equals `start_sector` when empty.
    pub end_sector: u64,

    pub mountpoint: Option<String>,

    /// Mounted filesystem type, else the probed signature.
    pub fs_type: Option<String>,

    pub is_lvm_member: bool,
    pub is_luks: bool,
}

/// Last sector of a range starting at `start` spanning `size` sectors.
pub fn end_sector(start: u64, size: u64) -> u64 {
    if size > 0 {
        start.saturating_add(size - 1)
    } else {
        start
    }
}
