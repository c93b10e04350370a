//! storscan-core: block-storage topology snapshot for a single host.
//!
//! Provides:
//! - `collector`: sysfs/procfs readers, signature probing and the
//!   [`Scanner`](collector::Scanner) that correlates them
//! - `models`: the serializable scan result
//! - `render`: JSON and plain-text output
//! - `fmt`: byte formatting helpers

pub mod collector;
pub mod fmt;
pub mod models;
pub mod render;

/// Crate version with the short git SHA when built from a checkout.
pub const VERSION: &str = env!("STORSCAN_VERSION");
