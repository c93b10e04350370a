//! Block-device topology from `/sys/block` and `/sys/class/block`.

use std::cmp::Ordering;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::collector::procfs::parser::parse_scalar_u64;
use crate::collector::traits::FileSystem;

/// Sector size assumed when `queue/hw_sector_size` is missing.
pub const DEFAULT_SECTOR_SIZE: u64 = 512;

/// A physical disk with its geometry and partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDevice {
    pub name: String,
    pub sector_size: u64,
    pub size_sectors: u64,
    pub partitions: Vec<PartitionInfo>,
}

impl BlockDevice {
    pub fn size_bytes(&self) -> u64 {
        self.size_sectors.saturating_mul(self.sector_size)
    }
}

/// Raw partition geometry, before mount and signature correlation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionInfo {
    pub name: String,
    pub start_sector: u64,
    pub size_sectors: u64,
}

/// Reads a single unsigned integer attribute, `None` if missing or malformed.
pub fn read_scalar<F: FileSystem>(fs: &F, path: &Path) -> Option<u64> {
    let content = fs.read_to_string(path).ok()?;
    match parse_scalar_u64(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "ignoring malformed attribute");
            None
        }
    }
}

/// Orders names so that digit runs compare numerically (`sda2` < `sda10`).
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (a.as_bytes(), b.as_bytes());
    loop {
        match (a.first(), b.first()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let a_len = a.iter().take_while(|c| c.is_ascii_digit()).count();
                let b_len = b.iter().take_while(|c| c.is_ascii_digit()).count();
                let (a_num, b_num) = (trim_zeros(&a[..a_len]), trim_zeros(&b[..b_len]));
                let ord = a_num
                    .len()
                    .cmp(&b_num.len())
                    .then_with(|| a_num.cmp(b_num))
                    .then_with(|| a_len.cmp(&b_len));
                if ord != Ordering::Equal {
                    return ord;
                }
                a = &a[a_len..];
                b = &b[b_len..];
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(y);
                }
                a = &a[1..];
                b = &b[1..];
            }
        }
    }
}

fn trim_zeros(digits: &[u8]) -> &[u8] {
    let zeros = digits.iter().take_while(|&&c| c == b'0').count();
    &digits[zeros..]
}

/// Enumerates disks and partitions from sysfs.
pub struct BlockEnumerator<F: FileSystem> {
    fs: F,
    sys_path: PathBuf,
}

impl<F: FileSystem> BlockEnumerator<F> {
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `sys_path` - Base path to sysfs (usually "/sys")
    pub fn new(fs: F, sys_path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            sys_path: sys_path.into(),
        }
    }

    /// `<sys>/block`, the root a scan cannot proceed without.
    pub fn block_root(&self) -> PathBuf {
        self.sys_path.join("block")
    }

    fn class_root(&self) -> PathBuf {
        self.sys_path.join("class").join("block")
    }

    /// Lists physical disks with their partitions, sorted by name.
    ///
    /// Fails only when `<sys>/block` itself cannot be listed.
    pub fn enumerate(&self) -> io::Result<Vec<BlockDevice>> {
        let disk_names = self.disk_names()?;
        let mut partitions: Vec<Vec<PartitionInfo>> = vec![Vec::new(); disk_names.len()];

        for entry in self.class_names() {
            if disk_names.contains(&entry) {
                continue;
            }
            if let Some(owner) = owning_disk(&disk_names, &entry) {
                partitions[owner].push(self.read_partition(&entry));
            }
        }

        Ok(disk_names
            .iter()
            .zip(partitions)
            .map(|(name, partitions)| self.read_disk(name, partitions))
            .collect())
    }

    /// Whether `<sys>/block/<name>/device` exists.
    pub fn is_physical_disk(&self, name: &str) -> bool {
        self.fs.exists(&self.block_root().join(name).join("device"))
    }

    fn disk_names(&self) -> io::Result<Vec<String>> {
        let mut names: Vec<String> = list_names(&self.fs, &self.block_root())?
            .into_iter()
            .filter(|name| {
                let disk = self.is_physical_disk(name);
                if !disk {
                    trace!(name, "skipping block entry without device descriptor");
                }
                disk
            })
            .collect();
        names.sort_by(|a, b| natural_cmp(a, b));
        Ok(names)
    }

    fn class_names(&self) -> Vec<String> {
        let root = self.class_root();
        match list_names(&self.fs, &root) {
            Ok(mut names) => {
                names.sort_by(|a, b| natural_cmp(a, b));
                names
            }
            Err(e) => {
                debug!(path = %root.display(), error = %e, "block class directory unavailable, reporting disks without partitions");
                Vec::new()
            }
        }
    }

    fn read_disk(&self, name: &str, partitions: Vec<PartitionInfo>) -> BlockDevice {
        let dir = self.block_root().join(name);
        let sector_size = read_scalar(&self.fs, &dir.join("queue").join("hw_sector_size"))
            .unwrap_or(DEFAULT_SECTOR_SIZE);
        let size_sectors = read_scalar(&self.fs, &dir.join("size")).unwrap_or(0);

        debug!(
            disk = name,
            sector_size,
            size_sectors,
            partitions = partitions.len(),
            "found disk"
        );

        BlockDevice {
            name: name.to_string(),
            sector_size,
            size_sectors,
            partitions,
        }
    }

    fn read_partition(&self, name: &str) -> PartitionInfo {
        let dir = self.class_root().join(name);
        PartitionInfo {
            name: name.to_string(),
            start_sector: read_scalar(&self.fs, &dir.join("start")).unwrap_or(0),
            size_sectors: read_scalar(&self.fs, &dir.join("size")).unwrap_or(0),
        }
    }
}

/// True when `entry` strictly extends `disk` (`sda1` of `sda`).
pub fn is_partition_of(disk: &str, entry: &str) -> bool {
    entry.len() > disk.len() && entry.starts_with(disk)
}

/// Index of the disk `entry` belongs to: the longest disk name it strictly
/// extends, so `sdaa1` belongs to `sdaa` rather than `sda`.
fn owning_disk(disk_names: &[String], entry: &str) -> Option<usize> {
    disk_names
        .iter()
        .enumerate()
        .filter(|(_, disk)| is_partition_of(disk, entry))
        .max_by_key(|(_, disk)| disk.len())
        .map(|(index, _)| index)
}

/// Directory entry names, hidden entries excluded.
fn list_names<F: FileSystem>(fs: &F, dir: &Path) -> io::Result<Vec<String>> {
    Ok(fs
        .read_dir(dir)?
        .into_iter()
        .filter_map(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(str::to_string)
        })
        .filter(|name| !name.starts_with('.'))
        .collect())
}
