//! Pre-built mock hosts for testing.
//!
//! These scenarios provide realistic `/proc` and `/sys` states for the
//! storage layouts a scan has to reconcile.

use super::filesystem::MockFs;

impl MockFs {
    /// Adds a physical disk under `/sys/block` and `/sys/class/block`, plus
    /// its `/dev` node.
    ///
    /// `sector_size` of `None` leaves `queue/hw_sector_size` absent.
    pub fn add_disk(&mut self, name: &str, sector_size: Option<u64>, size_sectors: u64) {
        self.add_dir(format!("/sys/block/{}/device", name));
        self.add_file(
            format!("/sys/block/{}/size", name),
            format!("{}\n", size_sectors),
        );
        if let Some(sector_size) = sector_size {
            self.add_file(
                format!("/sys/block/{}/queue/hw_sector_size", name),
                format!("{}\n", sector_size),
            );
        }
        self.add_dir(format!("/sys/class/block/{}", name));
        self.add_device_node(name);
    }

    /// Adds a partition under `/sys/class/block` and its `/dev` node.
    pub fn add_partition(&mut self, name: &str, start_sector: u64, size_sectors: u64) {
        self.add_file(
            format!("/sys/class/block/{}/start", name),
            format!("{}\n", start_sector),
        );
        self.add_file(
            format!("/sys/class/block/{}/size", name),
            format!("{}\n", size_sectors),
        );
        self.add_device_node(name);
    }

    /// Adds a device-mapper node: listed in sysfs but without a hardware
    /// descriptor, reachable through `/dev/mapper/<map_name>`.
    pub fn add_mapper(&mut self, dm_name: &str, map_name: &str, size_sectors: u64) {
        self.add_file(
            format!("/sys/block/{}/size", dm_name),
            format!("{}\n", size_sectors),
        );
        self.add_file(format!("/sys/block/{}/dm/name", dm_name), format!("{}\n", map_name));
        self.add_dir(format!("/sys/class/block/{}", dm_name));
        self.add_device_node(dm_name);
        self.add_symlink(format!("/dev/mapper/{}", map_name), format!("../{}", dm_name));
    }

    /// One SATA disk `sda` with a single ext4 root partition, no swap, 8 GiB RAM.
    pub fn single_disk_host() -> Self {
        let mut fs = Self::new();

        fs.add_disk("sda", Some(512), 500_118_192);
        fs.add_partition("sda1", 2048, 500_116_144);

        fs.add_file(
            "/proc/mounts",
            "\
sysfs /sys sysfs rw,nosuid,nodev,noexec,relatime 0 0
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
devtmpfs /dev devtmpfs rw,nosuid,size=4017588k,nr_inodes=1004397,mode=755 0 0
/dev/sda1 / ext4 rw,relatime,errors=remount-ro 0 0
tmpfs /run tmpfs rw,nosuid,nodev,size=814264k,mode=755 0 0
",
        );
        fs.add_file(
            "/proc/swaps",
            "Filename\t\t\t\tType\t\tSize\t\tUsed\t\tPriority\n",
        );
        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:        8388608 kB
MemFree:         6291456 kB
MemAvailable:    7340032 kB
SwapTotal:             0 kB
SwapFree:              0 kB
",
        );

        fs
    }

    /// Two disks: `sda` carries EFI, `/boot` and an LVM physical volume whose
    /// logical volumes are mounted through `/dev/mapper`; `sdb1` is an
    /// unopened LUKS container. 32 GiB RAM and an 8 GiB swap LV.
    ///
    /// Signatures are not part of the filesystem; pair this with a
    /// `StaticProbe` reporting `LVM2_member` for `/dev/sda3` and
    /// `crypto_LUKS` for `/dev/sdb1`.
    pub fn lvm_luks_host() -> Self {
        let mut fs = Self::new();

        fs.add_disk("sda", Some(512), 1_000_215_216);
        fs.add_partition("sda1", 2048, 1_048_576);
        fs.add_partition("sda2", 1_050_624, 2_097_152);
        fs.add_partition("sda3", 3_147_776, 997_064_704);

        fs.add_disk("sdb", Some(4096), 488_378_646);
        fs.add_partition("sdb1", 256, 488_378_134);

        fs.add_mapper("dm-0", "vg0-root", 209_715_200);
        fs.add_mapper("dm-1", "vg0-swap", 16_777_216);

        fs.add_file("/sys/block/loop0/size", "0\n");
        fs.add_dir("/sys/class/block/loop0");

        fs.add_symlink("/dev/disk/by-uuid/7A3C-1F02", "../../sda1");

        fs.add_file(
            "/proc/mounts",
            "\
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
/dev/mapper/vg0-root / ext4 rw,relatime 0 0
/dev/sda2 /boot ext4 rw,relatime 0 0
/dev/disk/by-uuid/7A3C-1F02 /boot/efi vfat rw,relatime,fmask=0077,dmask=0077 0 0
tmpfs /tmp tmpfs rw,nosuid,nodev 0 0
",
        );
        fs.add_file(
            "/proc/swaps",
            "\
Filename\t\t\t\tType\t\tSize\t\tUsed\t\tPriority
/dev/dm-1                               partition\t8388604\t\t0\t\t-2
",
        );
        fs.add_file("/proc/meminfo", "MemTotal:       33554432 kB\n");

        fs
    }

    /// One NVMe namespace with `pN`-suffixed partitions, btrfs root remounted
    /// on a second mountpoint, and no readable `/proc/meminfo`.
    pub fn nvme_host() -> Self {
        let mut fs = Self::new();

        fs.add_disk("nvme0n1", Some(512), 1_953_525_168);
        fs.add_partition("nvme0n1p1", 2048, 1_048_576);
        fs.add_partition("nvme0n1p2", 1_050_624, 1_952_474_511);

        fs.add_file(
            "/proc/mounts",
            "\
/dev/nvme0n1p2 / btrfs rw,relatime,ssd,subvol=/@ 0 0
/dev/nvme0n1p1 /boot/efi vfat rw,relatime 0 0
/dev/nvme0n1p2 /home btrfs rw,relatime,ssd,subvol=/@home 0 0
",
        );
        fs.add_file(
            "/proc/swaps",
            "\
Filename\t\t\t\tType\t\tSize\t\tUsed\t\tPriority
/swap/swapfile                          file\t\t4194300\t\t0\t\t-2
",
        );

        fs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::traits::FileSystem;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_single_disk_host_has_required_files() {
        let fs = MockFs::single_disk_host();

        assert!(fs.exists(Path::new("/proc/mounts")));
        assert!(fs.exists(Path::new("/proc/swaps")));
        assert!(fs.exists(Path::new("/proc/meminfo")));
        assert!(fs.exists(Path::new("/sys/block/sda/device")));
        assert!(fs.exists(Path::new("/sys/class/block/sda1/start")));
        assert!(fs.exists(Path::new("/dev/sda1")));
    }

    #[test]
    fn test_lvm_luks_host_mapper_links() {
        let fs = MockFs::lvm_luks_host();

        assert_eq!(
            fs.canonicalize(Path::new("/dev/mapper/vg0-root")).unwrap(),
            PathBuf::from("/dev/dm-0")
        );
        assert!(!fs.exists(Path::new("/sys/block/dm-0/device")));
        assert!(!fs.exists(Path::new("/sys/block/loop0/device")));
    }

    #[test]
    fn test_nvme_host_has_no_meminfo() {
        let fs = MockFs::nvme_host();
        assert!(!fs.exists(Path::new("/proc/meminfo")));
        assert!(fs.exists(Path::new("/sys/class/block/nvme0n1p2/size")));
    }
}
