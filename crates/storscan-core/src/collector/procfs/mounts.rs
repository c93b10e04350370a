//! Live mount bindings from `/proc/mounts`.

use std::path::Path;

use tracing::{debug, warn};

use crate::collector::procfs::parser::parse_mounts;
use crate::collector::traits::FileSystem;

/// Device fields starting with this prefix are canonicalized.
const DEVICE_NODE_PREFIX: &str = "/dev/";

/// One mount binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    /// Device as listed by the kernel (`/dev/mapper/vg0-root`, `tmpfs`, ...).
    pub device: String,
    /// Canonical device path after symlink resolution, or `device` itself.
    pub resolved_device: String,
    pub mountpoint: String,
    pub fs_type: String,
}

/// Mount bindings in reverse `/proc/mounts` order: the most recently mounted
/// entry comes first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MountTable {
    entries: Vec<MountEntry>,
}

impl MountTable {
    /// Reads `<proc_root>/mounts`.
    ///
    /// An unreadable mount source yields an empty table.
    pub fn load<F: FileSystem>(fs: &F, proc_root: &Path) -> Self {
        let path = proc_root.join("mounts");
        match fs.read_to_string(&path) {
            Ok(content) => Self::from_content(fs, &content),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "mount table unavailable, scanning without mount context");
                Self::default()
            }
        }
    }

    /// Builds a table from `/proc/mounts` content, resolving `/dev/*` devices
    /// through `fs`.
    pub fn from_content<F: FileSystem>(fs: &F, content: &str) -> Self {
        let mut entries: Vec<MountEntry> = parse_mounts(content)
            .into_iter()
            .map(|record| {
                let resolved_device = resolve_device(fs, &record.device);
                MountEntry {
                    device: record.device,
                    resolved_device,
                    mountpoint: record.mountpoint,
                    fs_type: record.fs_type,
                }
            })
            .collect();
        entries.reverse();

        debug!(entries = entries.len(), "loaded mount table");
        Self { entries }
    }

    /// Returns the most recent entry whose device or resolved device equals
    /// `device_path`.
    pub fn find_by_device(&self, device_path: &str) -> Option<&MountEntry> {
        self.entries
            .iter()
            .find(|entry| entry.device == device_path || entry.resolved_device == device_path)
    }

    /// Entries, most recent first.
    pub fn entries(&self) -> &[MountEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn resolve_device<F: FileSystem>(fs: &F, device: &str) -> String {
    if !device.starts_with(DEVICE_NODE_PREFIX) {
        return device.to_string();
    }

    match fs.canonicalize(Path::new(device)) {
        Ok(resolved) => match resolved.to_str() {
            Some(resolved) => resolved.to_string(),
            None => device.to_string(),
        },
        Err(e) => {
            debug!(device, error = %e, "device symlink not resolved");
            device.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    #[test]
    fn test_load_resolves_mapper_symlinks() {
        let mut fs = MockFs::new();
        fs.add_device_node("dm-0");
        fs.add_symlink("/dev/mapper/vg0-root", "../dm-0");
        fs.add_file(
            "/proc/mounts",
            "/dev/mapper/vg0-root / ext4 rw,relatime 0 0\n",
        );

        let table = MountTable::load(&fs, Path::new("/proc"));
        let entry = &table.entries()[0];
        assert_eq!(entry.device, "/dev/mapper/vg0-root");
        assert_eq!(entry.resolved_device, "/dev/dm-0");
        assert_eq!(entry.mountpoint, "/");
        assert_eq!(entry.fs_type, "ext4");
    }

    #[test]
    fn test_load_keeps_non_device_sources() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/proc/mounts",
            "tmpfs /run tmpfs rw 0 0\n/dev/gone /mnt ext4 rw 0 0\n",
        );

        let table = MountTable::load(&fs, Path::new("/proc"));
        let tmpfs = table.find_by_device("tmpfs").unwrap();
        assert_eq!(tmpfs.resolved_device, "tmpfs");
        let gone = table.find_by_device("/dev/gone").unwrap();
        assert_eq!(gone.resolved_device, "/dev/gone");
    }

    #[test]
    fn test_load_missing_source_is_empty() {
        let fs = MockFs::new();
        let table = MountTable::load(&fs, Path::new("/proc"));
        assert!(table.is_empty());
        assert!(table.find_by_device("/dev/sda1").is_none());
    }

    #[test]
    fn test_find_by_device_matches_resolved_path() {
        let mut fs = MockFs::new();
        fs.add_device_node("sdb1");
        fs.add_symlink("/dev/disk/by-uuid/1234-ABCD", "../../sdb1");
        let table = MountTable::from_content(&fs, "/dev/disk/by-uuid/1234-ABCD /boot/efi vfat rw 0 0\n");

        let entry = table.find_by_device("/dev/sdb1").unwrap();
        assert_eq!(entry.mountpoint, "/boot/efi");
        assert_eq!(entry.fs_type, "vfat");
    }

    #[test]
    fn test_find_by_device_most_recent_wins() {
        let mut fs = MockFs::new();
        fs.add_device_node("sda2");
        let content = "\
/dev/sda2 /data ext4 rw 0 0
/dev/sda2 /srv/data ext4 rw 0 0
";
        let table = MountTable::from_content(&fs, content);

        assert_eq!(table.len(), 2);
        assert_eq!(table.entries()[0].mountpoint, "/srv/data");
        assert_eq!(table.find_by_device("/dev/sda2").unwrap().mountpoint, "/srv/data");
    }

    #[test]
    fn test_find_by_device_no_match() {
        let fs = MockFs::new();
        let table = MountTable::from_content(&fs, "/dev/sda1 / ext4 rw 0 0\n");
        assert!(table.find_by_device("/dev/sda").is_none());
        assert!(table.find_by_device("/dev/sda11").is_none());
    }
}
