//! Parsers for `/proc` and `/sys` pseudo-files.
//!
//! These are pure functions that parse the content of the kernel files a scan
//! reads into structured data. They are designed to be easily testable with
//! string inputs.

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

// ============ Scalar Attribute Parser ============

/// Parses a single unsigned integer from a sysfs attribute such as
/// `/sys/block/sda/size`.
///
/// Only the first whitespace-delimited token is considered.
pub fn parse_scalar_u64(content: &str) -> Result<u64, ParseError> {
    let token = content
        .split_whitespace()
        .next()
        .ok_or_else(|| ParseError::new("empty attribute"))?;
    token
        .parse()
        .map_err(|_| ParseError::new(format!("invalid unsigned integer '{}'", token)))
}

// ============ Mount Table Parser ============

/// One record of `/proc/mounts`, before device resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountRecord {
    pub device: String,
    pub mountpoint: String,
    pub fs_type: String,
}

/// Parses `/proc/mounts` content.
///
/// Format: `device mountpoint fstype options dump pass`
///
/// Options, dump and pass are ignored. Lines with fewer than three fields are
/// skipped. Octal escapes in device and mountpoint are decoded.
pub fn parse_mounts(content: &str) -> Vec<MountRecord> {
    let mut records = Vec::new();

    for line in content.lines() {
        let mut fields = line.split_whitespace();
        let (Some(device), Some(mountpoint), Some(fs_type)) =
            (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };

        records.push(MountRecord {
            device: unescape_mount_field(device),
            mountpoint: unescape_mount_field(mountpoint),
            fs_type: fs_type.to_string(),
        });
    }

    records
}

/// Decodes the `\ooo` octal escapes the kernel uses for whitespace and
/// backslashes in mount table fields.
///
/// Invalid escapes are kept verbatim.
pub fn unescape_mount_field(field: &str) -> String {
    if !field.contains('\\') {
        return field.to_string();
    }

    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() {
            let digits = &bytes[i + 1..i + 4];
            if digits.iter().all(|b| (b'0'..=b'7').contains(b)) {
                let value = digits
                    .iter()
                    .fold(0u16, |acc, b| acc * 8 + u16::from(b - b'0'));
                if let Ok(byte) = u8::try_from(value) {
                    out.push(byte);
                    i += 4;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8(out).unwrap_or_else(|_| field.to_string())
}

// ============ Swaps Parser ============

/// One active swap area from `/proc/swaps`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapArea {
    pub device: String,
    pub kind: String,
    pub size_kb: u64,
    pub used_kb: u64,
    pub priority: i32,
}

/// Parses `/proc/swaps` content.
///
/// Format:
/// ```text
/// Filename                Type        Size      Used    Priority
/// /dev/sda3               partition   8388604   0       -2
/// ```
///
/// The header line is skipped. Records that do not have five well-formed
/// fields are ignored.
pub fn parse_swaps(content: &str) -> Vec<SwapArea> {
    content
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let device = fields.next()?;
            let kind = fields.next()?;
            let size_kb = fields.next()?.parse().ok()?;
            let used_kb = fields.next()?.parse().ok()?;
            let priority = fields.next()?.parse().ok()?;
            Some(SwapArea {
                device: device.to_string(),
                kind: kind.to_string(),
                size_kb,
                used_kb,
                priority,
            })
        })
        .collect()
}

// ============ Meminfo Parser ============

/// Extracts `MemTotal` (in KiB) from `/proc/meminfo` content.
///
/// Format: `MemTotal:       16384000 kB`
pub fn parse_mem_total_kb(content: &str) -> Result<u64, ParseError> {
    for line in content.lines() {
        let mut fields = line.split_whitespace();
        if fields.next() != Some("MemTotal:") {
            continue;
        }
        let value = fields
            .next()
            .ok_or_else(|| ParseError::new("MemTotal without value"))?;
        return value
            .parse()
            .map_err(|_| ParseError::new(format!("invalid MemTotal '{}'", value)));
    }

    Err(ParseError::new("MemTotal not found"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar_u64() {
        assert_eq!(parse_scalar_u64("1953525168\n").unwrap(), 1953525168);
        assert_eq!(parse_scalar_u64("  4096  ").unwrap(), 4096);
        assert!(parse_scalar_u64("").is_err());
        assert!(parse_scalar_u64("\n").is_err());
        assert!(parse_scalar_u64("-1").is_err());
        assert!(parse_scalar_u64("abc").is_err());
    }

    #[test]
    fn test_parse_mounts() {
        let content = "\
sysfs /sys sysfs rw,nosuid,nodev,noexec,relatime 0 0
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
/dev/sda1 / ext4 rw,relatime 0 0
/dev/mapper/vg0-home /home xfs rw,relatime,attr2 0 0
";
        let mounts = parse_mounts(content);

        assert_eq!(mounts.len(), 4);
        assert_eq!(mounts[0].device, "sysfs");
        assert_eq!(mounts[2].device, "/dev/sda1");
        assert_eq!(mounts[2].mountpoint, "/");
        assert_eq!(mounts[2].fs_type, "ext4");
        assert_eq!(mounts[3].device, "/dev/mapper/vg0-home");
        assert_eq!(mounts[3].fs_type, "xfs");
    }

    #[test]
    fn test_parse_mounts_skips_short_lines() {
        let content = "\n/dev/sda1 /\n/dev/sdb1 /data ext4 rw 0 0\n";
        let mounts = parse_mounts(content);
        assert_eq!(mounts.len(), 1);
        assert_eq!(mounts[0].device, "/dev/sdb1");
    }

    #[test]
    fn test_parse_mounts_decodes_escapes() {
        let content = "/dev/sdc1 /media/USB\\040Stick vfat rw 0 0\n";
        let mounts = parse_mounts(content);
        assert_eq!(mounts[0].mountpoint, "/media/USB Stick");
    }

    #[test]
    fn test_unescape_mount_field() {
        assert_eq!(unescape_mount_field("/plain"), "/plain");
        assert_eq!(unescape_mount_field("/a\\011b"), "/a\tb");
        assert_eq!(unescape_mount_field("/a\\134b"), "/a\\b");
        assert_eq!(unescape_mount_field("/trailing\\04"), "/trailing\\04");
        assert_eq!(unescape_mount_field("/bad\\999"), "/bad\\999");
    }

    #[test]
    fn test_parse_swaps() {
        let content = "\
Filename\t\t\t\tType\t\tSize\t\tUsed\t\tPriority
/dev/sda3                               partition\t8388604\t\t0\t\t-2
/swapfile                               file\t\t2097148\t\t1024\t\t-3
";
        let swaps = parse_swaps(content);

        assert_eq!(swaps.len(), 2);
        assert_eq!(swaps[0].device, "/dev/sda3");
        assert_eq!(swaps[0].kind, "partition");
        assert_eq!(swaps[0].size_kb, 8388604);
        assert_eq!(swaps[0].priority, -2);
        assert_eq!(swaps[1].used_kb, 1024);
    }

    #[test]
    fn test_parse_swaps_header_only() {
        let content = "Filename\tType\tSize\tUsed\tPriority\n";
        assert!(parse_swaps(content).is_empty());
        assert!(parse_swaps("").is_empty());
    }

    #[test]
    fn test_parse_swaps_skips_malformed() {
        let content = "\
Filename Type Size Used Priority
/dev/sda3 partition lots 0 -2
/dev/sdb2 partition 1024 0
/dev/sdc2 partition 2048 0 -1
";
        let swaps = parse_swaps(content);
        assert_eq!(swaps.len(), 1);
        assert_eq!(swaps[0].device, "/dev/sdc2");
    }

    #[test]
    fn test_parse_mem_total_kb() {
        let content = "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
HugePages_Total:       0
";
        assert_eq!(parse_mem_total_kb(content).unwrap(), 16384000);
    }

    #[test]
    fn test_parse_mem_total_kb_missing() {
        assert!(parse_mem_total_kb("MemFree: 1 kB\n").is_err());
        assert!(parse_mem_total_kb("MemTotal:\n").is_err());
        assert!(parse_mem_total_kb("MemTotal: lots kB\n").is_err());
    }
}
