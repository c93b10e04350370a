//! storscan - block-storage topology scanner.
//!
//! Reads disks and partitions from sysfs, mounts and swap from procfs, probes
//! partition signatures, and prints one report on stdout. Never writes to
//! any device.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{Level, debug, error};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

use storscan_core::collector::{BlkidProbe, RealFs, ScanConfig, ScanError, Scanner};
use storscan_core::render;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Single JSON object.
    Json,
    /// Human-readable summary.
    Text,
}

/// Block-storage topology scanner.
#[derive(Parser)]
#[command(
    name = "storscan",
    about = "Read-only snapshot of disks, partitions, mounts and signatures",
    version = storscan_core::VERSION,
    after_help = "Run without arguments for the one-line JSON report; all options are optional."
)]
struct Args {
    /// Report format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long)]
    pretty: bool,

    /// Path to /proc filesystem.
    #[arg(long, value_name = "PATH", default_value = "/proc")]
    proc_path: PathBuf,

    /// Path to /sys filesystem.
    #[arg(long, value_name = "PATH", default_value = "/sys")]
    sys_path: PathBuf,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace). Default is warn.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber on stderr so stdout carries only the report.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["storscan", "storscan_core"] {
        if let Ok(directive) = format!("{}={}", target, level).parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Scans the host and renders the report selected by `args`.
fn run(args: &Args) -> Result<String, ScanError> {
    let config = ScanConfig {
        proc_root: args.proc_path.clone(),
        sys_root: args.sys_path.clone(),
    };
    let mut scanner = Scanner::new(RealFs::new(), BlkidProbe::new(), config);
    let (result, advice) = scanner.scan_with_advice()?;

    if let Some(timing) = scanner.last_timing() {
        debug!(
            total_ms = timing.total.as_millis() as u64,
            mounts_ms = timing.mounts.as_millis() as u64,
            swap_ms = timing.swap.as_millis() as u64,
            topology_ms = timing.topology.as_millis() as u64,
            correlation_ms = timing.correlation.as_millis() as u64,
            "scan timing"
        );
    }

    match args.format {
        OutputFormat::Json => render::to_json(&result, args.pretty),
        OutputFormat::Text => Ok(render::to_text(&result, &advice)),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    match run(&args) {
        Ok(report) => {
            match args.format {
                OutputFormat::Json => println!("{}", report),
                OutputFormat::Text => print!("{}", report),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["storscan"]);
        assert_eq!(args.format, OutputFormat::Json);
        assert!(!args.pretty);
        assert_eq!(args.proc_path, PathBuf::from("/proc"));
        assert_eq!(args.sys_path, PathBuf::from("/sys"));
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
    }

    #[test]
    fn test_flags() {
        let args = Args::parse_from([
            "storscan",
            "--format",
            "text",
            "--sys-path",
            "/host/sys",
            "-vv",
            "-q",
        ]);
        assert_eq!(args.format, OutputFormat::Text);
        assert_eq!(args.sys_path, PathBuf::from("/host/sys"));
        assert_eq!(args.verbose, 2);
        assert!(args.quiet);
    }

    fn args_for(sys: &std::path::Path, proc: &std::path::Path) -> Args {
        Args::parse_from([
            OsString::from("storscan"),
            OsString::from("--sys-path"),
            sys.into(),
            OsString::from("--proc-path"),
            proc.into(),
        ])
    }

    #[test]
    fn test_run_fails_without_block_root() {
        let dir = tempfile::tempdir().unwrap();
        let args = args_for(&dir.path().join("sys"), &dir.path().join("proc"));

        match run(&args) {
            Err(ScanError::TopologyUnavailable { path, .. }) => {
                assert_eq!(path, dir.path().join("sys").join("block"));
            }
            other => panic!("expected TopologyUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_run_empty_host_renders_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sys/block")).unwrap();
        std::fs::create_dir_all(dir.path().join("proc")).unwrap();
        std::fs::write(dir.path().join("proc/meminfo"), "MemTotal: 8388608 kB\n").unwrap();
        let args = args_for(&dir.path().join("sys"), &dir.path().join("proc"));

        assert_eq!(
            run(&args).unwrap(),
            concat!(
                r#"{"swap_current_bytes":0,"swap_recommended_bytes":12884901888,"#,
                r#""disks":[],"lvm_present":false,"encryption_present":false}"#
            )
        );
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Args::try_parse_from(["storscan", "--format", "yaml"]).is_err());
    }
}
