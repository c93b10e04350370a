//! Readers for the Linux `/proc` and `/sys` pseudo-filesystems.
//!
//! `parser` holds the pure text parsers; the remaining modules wire them to a
//! [`FileSystem`](crate::collector::traits::FileSystem).

pub mod memory;
pub mod mounts;
pub mod parser;
pub mod sysfs;

pub use memory::{SwapAdvice, SwapAdvisor};
pub use mounts::{MountEntry, MountTable};
pub use parser::ParseError;
pub use sysfs::{BlockDevice, BlockEnumerator, PartitionInfo};
