//! Scanner that correlates topology, mounts and signatures.
//!
//! The `Scanner` runs the mount table loader and swap advisor once, then
//! walks every disk and partition from sysfs, attaching mount bindings and
//! probed signatures to produce a [`ScanResult`].

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::collector::procfs::{
    BlockDevice, BlockEnumerator, MountTable, PartitionInfo, SwapAdvice, SwapAdvisor,
};
use crate::collector::signature::SignatureProbe;
use crate::collector::traits::FileSystem;
use crate::models::{
    DiskDevice, LUKS_SIGNATURE, LVM_MEMBER_SIGNATURE, PartitionDevice, ScanResult, end_sector,
};

/// Prefix of device node paths reported for disks and partitions.
pub const DEVICE_DIR: &str = "/dev";

/// Error type for scan failures.
#[derive(Debug)]
pub enum ScanError {
    /// The block-device topology root could not be listed.
    TopologyUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The result could not be serialized.
    Render(serde_json::Error),
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanError::TopologyUnavailable { path, source } => {
                write!(f, "cannot open {}: {}", path.display(), source)
            }
            ScanError::Render(e) => write!(f, "cannot render scan result: {}", e),
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScanError::TopologyUnavailable { source, .. } => Some(source),
            ScanError::Render(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for ScanError {
    fn from(e: serde_json::Error) -> Self {
        ScanError::Render(e)
    }
}

/// Locations of the kernel pseudo-filesystems.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Base path to proc filesystem (usually "/proc").
    pub proc_root: PathBuf,
    /// Base path to sysfs (usually "/sys").
    pub sys_root: PathBuf,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            proc_root: PathBuf::from("/proc"),
            sys_root: PathBuf::from("/sys"),
        }
    }
}

/// Timing information for each scan phase.
#[derive(Debug, Clone, Default)]
pub struct ScanTiming {
    pub total: Duration,
    pub mounts: Duration,
    pub swap: Duration,
    pub topology: Duration,
    /// Mount lookups and signature probes across all partitions.
    pub correlation: Duration,
}

/// One-shot storage scanner.
pub struct Scanner<F: FileSystem, P: SignatureProbe> {
    fs: F,
    probe: P,
    config: ScanConfig,
    last_timing: Option<ScanTiming>,
}

impl<F: FileSystem, P: SignatureProbe> Scanner<F, P> {
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `probe` - Signature probe for partition devices
    /// * `config` - Pseudo-filesystem roots
    pub fn new(fs: F, probe: P, config: ScanConfig) -> Self {
        Self {
            fs,
            probe,
            config,
            last_timing: None,
        }
    }

    /// Returns timing information from the last `scan` call.
    pub fn last_timing(&self) -> Option<&ScanTiming> {
        self.last_timing.as_ref()
    }

    /// Produces a complete scan of the host.
    ///
    /// Fails only when the disk enumeration root is unavailable.
    pub fn scan(&mut self) -> Result<ScanResult, ScanError> {
        let (result, _) = self.scan_with_advice()?;
        Ok(result)
    }

    /// Like [`Scanner::scan`], also returning the swap figures, including
    /// RAM, that the JSON report does not carry.
    pub fn scan_with_advice(&mut self) -> Result<(ScanResult, SwapAdvice), ScanError> {
        let start = Instant::now();
        let mut timing = ScanTiming::default();

        let t = Instant::now();
        let mounts = MountTable::load(&self.fs, &self.config.proc_root);
        timing.mounts = t.elapsed();

        let t = Instant::now();
        let advice = SwapAdvisor::new(&self.fs, &self.config.proc_root).advise();
        timing.swap = t.elapsed();

        let t = Instant::now();
        let enumerator = BlockEnumerator::new(&self.fs, &self.config.sys_root);
        let devices = enumerator
            .enumerate()
            .map_err(|source| ScanError::TopologyUnavailable {
                path: enumerator.block_root(),
                source,
            })?;
        timing.topology = t.elapsed();

        let t = Instant::now();
        let correlator = Correlator {
            mounts: &mounts,
            probe: &self.probe,
        };
        let disks: Vec<DiskDevice> = devices
            .into_iter()
            .map(|device| correlator.disk(device))
            .collect();
        timing.correlation = t.elapsed();

        let result = assemble(advice, disks);

        timing.total = start.elapsed();
        info!(
            disks = result.disks.len(),
            partitions = result.partitions().count(),
            lvm_present = result.lvm_present,
            encryption_present = result.encryption_present,
            elapsed_ms = timing.total.as_millis() as u64,
            "scan complete"
        );
        self.last_timing = Some(timing);

        Ok((result, advice))
    }
}

/// Builds the final result; the host-level flags are derived from the
/// partition records so they always agree with them.
fn assemble(advice: SwapAdvice, disks: Vec<DiskDevice>) -> ScanResult {
    let mut lvm_present = false;
    let mut encryption_present = false;
    for part in disks.iter().flat_map(|disk| disk.partitions.iter()) {
        lvm_present |= part.is_lvm_member;
        encryption_present |= part.is_luks;
    }

    ScanResult {
        swap_current_bytes: advice.current_bytes,
        swap_recommended_bytes: advice.recommended_bytes,
        disks,
        lvm_present,
        encryption_present,
    }
}

struct Correlator<'a, P: SignatureProbe> {
    mounts: &'a MountTable,
    probe: &'a P,
}

impl<P: SignatureProbe> Correlator<'_, P> {
    fn disk(&self, device: BlockDevice) -> DiskDevice {
        let size_bytes = device.size_bytes();
        let partitions = device
            .partitions
            .into_iter()
            .map(|part| self.partition(part))
            .collect();

        DiskDevice {
            path: device_path(&device.name),
            name: device.name,
            sector_size: device.sector_size,
            size_sectors: device.size_sectors,
            size_bytes,
            partitions,
        }
    }

    /// Mount fstype wins over the probed signature; the signature alone
    /// decides the LVM and LUKS flags.
    fn partition(&self, part: PartitionInfo) -> PartitionDevice {
        let path = device_path(&part.name);
        let mount = self.mounts.find_by_device(&path);
        let signature = self.probe.probe(Path::new(&path));

        let is_lvm_member = signature.as_deref() == Some(LVM_MEMBER_SIGNATURE);
        let is_luks = signature.as_deref() == Some(LUKS_SIGNATURE);

        let mounted_fs_type = mount
            .map(|m| m.fs_type.as_str())
            .filter(|fs_type| !fs_type.is_empty());
        let fs_type = match mounted_fs_type {
            Some(fs_type) => Some(fs_type.to_string()),
            None => signature,
        };
        let mountpoint = mount.map(|m| m.mountpoint.clone());

        debug!(
            partition = %part.name,
            mountpoint = ?mountpoint,
            fs_type = ?fs_type,
            is_lvm_member,
            is_luks,
            "correlated partition"
        );

        PartitionDevice {
            name: part.name,
            path,
            start_sector: part.start_sector,
            size_sectors: part.size_sectors,
            end_sector: end_sector(part.start_sector, part.size_sectors),
            mountpoint,
            fs_type,
            is_lvm_member,
            is_luks,
        }
    }
}

fn device_path(name: &str) -> String {
    format!("{}/{}", DEVICE_DIR, name)
}
