//! Command-line interface for the round-trip tester.
//!
//! Two positional arguments mirror the traditional invocation: the target
//! device node and the media kind. Everything else is an optional override.
//!
//! # Example
//!
//! ```bash
//! # Burn and verify a CD in the default drive
//! disc-roundtrip
//!
//! # Burn and verify a BD in a specific drive
//! disc-roundtrip /dev/sr1 bd
//!
//! # Use a custom dataset and scratch area
//! disc-roundtrip --sample-dir ~/testdata --work-dir /tmp/burn-check /dev/sr0 dvd
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Verify an optical burner by writing sample data and reading it back.
///
/// Stages a sample dataset, fingerprints it, authors an ISO image, burns the
/// image to the target drive, then waits for the disc to come back, remounts
/// it, and compares the recovered checksums against the originals.
#[derive(Debug, Parser)]
#[command(name = "disc-roundtrip")]
#[command(author, version, about)]
pub struct Cli {
    /// Target optical device node (falls back to /dev/sr0 if the path does not exist)
    #[arg(value_name = "DEVICE")]
    pub device: Option<PathBuf>,

    /// Media kind in the drive: cd, dvd, or bd (defaults to cd)
    #[arg(value_name = "MEDIA")]
    pub media: Option<String>,

    /// Scratch directory for staging, imaging, and verification
    #[arg(long, value_name = "DIR")]
    pub work_dir: Option<PathBuf>,

    /// Directory containing the sample dataset to burn
    #[arg(long, value_name = "DIR")]
    pub sample_dir: Option<PathBuf>,

    /// Ceiling in seconds for the post-burn remount wait
    #[arg(long, value_name = "SECS")]
    pub mount_timeout_secs: Option<u64>,

    /// Show debug output on the terminal
    #[arg(short, long)]
    pub verbose: bool,
}
