//! Mock implementations for testing.
//!
//! This module provides `MockFs`, `StaticProbe` and pre-built host scenarios
//! for exercising the scanner without real `/proc`, `/sys` or block devices.

mod filesystem;
mod probe;
mod scenarios;

pub use filesystem::MockFs;
pub use probe::StaticProbe;
