//! Block-storage collector for Linux.
//!
//! This module reads the host's disk topology from sysfs, mount and swap
//! state from `/proc`, and on-disk signatures from the device nodes, with
//! support for mocking all three for tests.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Scanner                            │
//! │  ┌────────────────┐ ┌────────────────┐ ┌─────────────────┐  │
//! │  │ BlockEnumerator│ │   MountTable   │ │   SwapAdvisor   │  │
//! │  │ - /sys/block   │ │ - /proc/mounts │ │ - /proc/swaps   │  │
//! │  │ - /sys/class/  │ │                │ │ - /proc/meminfo │  │
//! │  │   block        │ │                │ │                 │  │
//! │  └───────┬────────┘ └───────┬────────┘ └────────┬────────┘  │
//! │          └──────────────────┼───────────────────┘           │
//! │                      ┌──────▼──────┐    ┌────────────────┐  │
//! │                      │  FileSystem │    │ SignatureProbe │  │
//! │                      └──────┬──────┘    └───────┬────────┘  │
//! └─────────────────────────────┼───────────────────┼───────────┘
//!                    ┌──────────┴───┐        ┌──────┴──────────┐
//!             ┌──────▼──────┐ ┌─────▼─────┐ ┌▼─────────────┐ ┌─▼───────────┐
//!             │   RealFs    │ │  MockFs   │ │ BlkidProbe   │ │ StaticProbe │
//!             │  (Linux)    │ │ (Testing) │ │  (Linux)     │ │  (Testing)  │
//!             └─────────────┘ └───────────┘ └──────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production (Linux)
//!
//! ```ignore
//! use storscan_core::collector::{BlkidProbe, RealFs, ScanConfig, Scanner};
//!
//! let mut scanner = Scanner::new(RealFs::new(), BlkidProbe::new(), ScanConfig::default());
//! let result = scanner.scan().unwrap();
//! ```
//!
//! ## Testing (with MockFs)
//!
//! ```
//! use storscan_core::collector::{MockFs, ScanConfig, Scanner, StaticProbe};
//!
//! let fs = MockFs::lvm_luks_host();
//! let probe = StaticProbe::new().with("/dev/sda3", "LVM2_member");
//! let mut scanner = Scanner::new(fs, probe, ScanConfig::default());
//! let result = scanner.scan().unwrap();
//! assert!(result.lvm_present);
//! ```

#[allow(clippy::module_inception)]
mod collector;
pub mod mock;
pub mod procfs;
pub mod signature;
pub mod traits;

pub use collector::{DEVICE_DIR, ScanConfig, ScanError, ScanTiming, Scanner};
pub use mock::{MockFs, StaticProbe};
pub use signature::{BlkidProbe, SignatureProbe};
pub use traits::{FileSystem, RealFs};
