//! Report rendering.

use std::fmt::Write;

use crate::collector::ScanError;
use crate::collector::procfs::SwapAdvice;
use crate::fmt::{FmtStyle, format_bytes, or_dash};
use crate::models::ScanResult;

/// Serializes the scan result as JSON, on one line unless `pretty`.
pub fn to_json(result: &ScanResult, pretty: bool) -> Result<String, ScanError> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(json)
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

/// Human-readable summary of a scan.
///
/// Host and disk sizes use full units; the partition table uses the compact
/// form to keep columns narrow.
pub fn to_text(result: &ScanResult, advice: &SwapAdvice) -> String {
    let size = |bytes| format_bytes(bytes, FmtStyle::Detail);
    let ram = if advice.ram_bytes == 0 {
        "unknown".to_string()
    } else {
        size(advice.ram_bytes)
    };

    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(
        out,
        "RAM: {}  swap: {}  recommended swap: {}",
        ram,
        size(result.swap_current_bytes),
        size(result.swap_recommended_bytes)
    );
    let _ = writeln!(
        out,
        "LVM: {}  encryption: {}",
        yes_no(result.lvm_present),
        yes_no(result.encryption_present)
    );

    for disk in &result.disks {
        let _ = writeln!(
            out,
            "\n{}  {}  ({} sectors of {} B)",
            disk.path,
            size(disk.size_bytes),
            disk.size_sectors,
            disk.sector_size
        );
        if disk.partitions.is_empty() {
            let _ = writeln!(out, "  (no partitions)");
            continue;
        }
        for part in &disk.partitions {
            let mut flags = Vec::new();
            if part.is_lvm_member {
                flags.push("lvm");
            }
            if part.is_luks {
                flags.push("luks");
            }
            let _ = writeln!(
                out,
                "  {:<16} {:>10}  {:>12}-{:<12} {:<12} {:<20} {}",
                part.path,
                format_bytes(
                    part.size_sectors.saturating_mul(disk.sector_size),
                    FmtStyle::Compact
                ),
                part.start_sector,
                part.end_sector,
                or_dash(part.fs_type.as_deref()),
                or_dash(part.mountpoint.as_deref()),
                flags.join(",")
            );
        }
    }

    out
}
