//! Signature probe backed by a fixed device → label map.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::collector::signature::SignatureProbe;

/// Returns preconfigured signatures and records every probed path.
#[derive(Debug, Default)]
pub struct StaticProbe {
    signatures: HashMap<PathBuf, String>,
    probed: RefCell<Vec<PathBuf>>,
}

impl StaticProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`StaticProbe::insert`].
    pub fn with(mut self, device: impl Into<PathBuf>, signature: impl Into<String>) -> Self {
        self.insert(device, signature);
        self
    }

    pub fn insert(&mut self, device: impl Into<PathBuf>, signature: impl Into<String>) {
        self.signatures.insert(device.into(), signature.into());
    }

    /// Paths passed to `probe`, in call order.
    pub fn probed(&self) -> Vec<PathBuf> {
        self.probed.borrow().clone()
    }
}

impl SignatureProbe for StaticProbe {
    fn probe(&self, device: &Path) -> Option<String> {
        self.probed.borrow_mut().push(device.to_path_buf());
        self.signatures.get(device).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_probe_lookup_and_record() {
        let probe = StaticProbe::new().with("/dev/sdb1", "crypto_LUKS");

        assert_eq!(probe.probe(Path::new("/dev/sdb1")).as_deref(), Some("crypto_LUKS"));
        assert_eq!(probe.probe(Path::new("/dev/sdb2")), None);
        assert_eq!(
            probe.probed(),
            [PathBuf::from("/dev/sdb1"), PathBuf::from("/dev/sdb2")]
        );
    }
}
