//! On-disk signature probing.
//!
//! A probe inspects a block device and reports a single type label: a
//! filesystem name (`ext4`, `xfs`, ...) or a volume marker (`LVM2_member`,
//! `crypto_LUKS`, `linux_raid_member`). Probing is best effort and read-only;
//! any failure is reported as "unknown".

use std::path::Path;

use blkid::{Probe, ProbeResult};
use tracing::{debug, trace};

/// Capability to identify the signature on a device.
pub trait SignatureProbe {
    /// Returns the signature label of `device`, or `None` if undetermined.
    fn probe(&self, device: &Path) -> Option<String>;
}

impl<T: SignatureProbe + ?Sized> SignatureProbe for &T {
    fn probe(&self, device: &Path) -> Option<String> {
        (**self).probe(device)
    }
}

/// blkid result key holding the signature label.
const TYPE_TAG: &str = "TYPE";

/// Probes devices through libblkid's superblock chain.
///
/// Uses the safe probe, so devices carrying conflicting signatures are
/// reported as unknown.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlkidProbe;

impl BlkidProbe {
    pub fn new() -> Self {
        Self
    }
}

impl SignatureProbe for BlkidProbe {
    fn probe(&self, device: &Path) -> Option<String> {
        let probe = match Probe::new_from(device) {
            Ok(probe) => probe,
            Err(e) => {
                debug!(device = %device.display(), error = %e, "cannot open device for probing");
                return None;
            }
        };

        match probe.probe_safe() {
            Ok(ProbeResult::Success) => {}
            Ok(ProbeResult::NothingFound) => {
                trace!(device = %device.display(), "no signature found");
                return None;
            }
            Ok(ProbeResult::Ambivalent) => {
                debug!(device = %device.display(), "ambivalent signatures, reporting unknown");
                return None;
            }
            Err(e) => {
                debug!(device = %device.display(), error = %e, "signature probe failed");
                return None;
            }
        }

        let label = probe.lookup_value(TYPE_TAG).ok().map(str::to_string);
        trace!(device = %device.display(), signature = ?label, "probed signature");
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SWAP_PAGE_64K: usize = 64 * 1024;

    fn put(buf: &mut [u8], offset: usize, bytes: &[u8]) {
        buf[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    fn image_file(buf: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(buf).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_swap_on_64k_pages() {
        let mut buf = vec![0u8; 2 * SWAP_PAGE_64K];
        // swap header v1: version and last page follow the boot block
        put(&mut buf, 1024, &1u32.to_le_bytes());
        put(&mut buf, 1028, &1u32.to_le_bytes());
        put(&mut buf, SWAP_PAGE_64K - 10, b"SWAPSPACE2");
        let file = image_file(&buf);

        assert_eq!(BlkidProbe::new().probe(file.path()), Some("swap".to_string()));
    }

    #[test]
    fn test_luks1_container() {
        let mut buf = vec![0u8; 1024 * 1024];
        put(&mut buf, 0, b"LUKS\xba\xbe");
        put(&mut buf, 6, &1u16.to_be_bytes());
        let file = image_file(&buf);

        assert_eq!(
            BlkidProbe::new().probe(file.path()),
            Some("crypto_LUKS".to_string())
        );
    }

    #[test]
    fn test_blank_image_is_unknown() {
        let file = image_file(&vec![0u8; 1024 * 1024]);
        assert_eq!(BlkidProbe::new().probe(file.path()), None);
    }

    #[test]
    fn test_missing_device_is_unknown() {
        let probe = BlkidProbe::new();
        assert_eq!(probe.probe(Path::new("/nonexistent/device/sdz9")), None);
    }
}
