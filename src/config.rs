//! Resolved run configuration.
//!
//! Everything the workflow needs is resolved up front into a [`TesterConfig`]
//! owned by the driver. The struct is immutable for the life of the run; the
//! only state discovered later (the mount point) lives on the driver itself.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Cli;
use crate::error::WorkflowError;

/// Well-known default optical device node.
pub const DEFAULT_DEVICE: &str = "/dev/sr0";
/// Default scratch directory for a run.
pub const DEFAULT_WORK_DIR: &str = "/tmp/optical-test";
/// Default location of the sample dataset shipped with the OS.
pub const DEFAULT_SAMPLE_ROOT: &str = "/usr/share/example-content";
/// Default sample dataset directory name.
pub const DEFAULT_SAMPLE_NAME: &str = "Ubuntu_Free_Culture_Showcase";

const ISO_NAME: &str = "optical-test.iso";
const MANIFEST_NAME: &str = "optical-test.md5";

/// Kind of optical media in the target drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaKind {
    #[default]
    Cd,
    Dvd,
    Bd,
}

impl MediaKind {
    /// Resolve the media-kind argument. An omitted or empty argument selects
    /// CD; anything outside the supported set is a configuration error,
    /// rejected before any workflow step runs.
    pub fn resolve(arg: Option<&str>) -> Result<Self, WorkflowError> {
        let Some(arg) = arg.filter(|s| !s.is_empty()) else {
            return Ok(Self::default());
        };
        match arg.to_ascii_lowercase().as_str() {
            "cd" => Ok(Self::Cd),
            "dvd" => Ok(Self::Dvd),
            "bd" => Ok(Self::Bd),
            other => Err(WorkflowError::Config(format!(
                "unsupported media type '{other}' (expected cd, dvd, or bd)"
            ))),
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cd => "cd",
            Self::Dvd => "dvd",
            Self::Bd => "bd",
        };
        write!(f, "{name}")
    }
}

/// Fixed pauses and ceilings for the burn/remount sequence.
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    /// Pause before burning so the drive can spin up.
    pub settle_delay: Duration,
    /// Interval between mount-table polls.
    pub poll_interval: Duration,
    /// Total budget for waiting on the reinserted media.
    pub mount_timeout: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_secs(10),
            poll_interval: Duration::from_secs(3),
            mount_timeout: Duration::from_secs(300),
        }
    }
}

/// Immutable session state for one round-trip run.
#[derive(Debug, Clone)]
pub struct TesterConfig {
    /// Resolved target device node.
    pub device: PathBuf,
    /// Media kind in the drive.
    pub media: MediaKind,
    /// Scratch directory; created by the workflow, removed by cleanup.
    pub work_dir: PathBuf,
    /// Directory containing the sample dataset.
    pub sample_root: PathBuf,
    /// Name of the sample dataset directory under `sample_root`.
    pub sample_name: String,
    /// File name of the generated image, inside `work_dir`.
    pub iso_name: String,
    /// File name of the checksum manifest, inside `work_dir`.
    pub manifest_name: String,
    /// Directory the process was started from; restored by cleanup.
    pub start_dir: PathBuf,
    /// Pauses and ceilings.
    pub timing: Timing,
}

impl TesterConfig {
    /// Build the session from parsed arguments, resolving defaults.
    pub fn from_cli(cli: &Cli) -> Result<Self, WorkflowError> {
        let media = MediaKind::resolve(cli.media.as_deref())?;
        let device = resolve_device(cli.device.as_deref());

        let start_dir = env::current_dir().map_err(|e| {
            WorkflowError::Setup(format!("cannot determine current directory: {e}"))
        })?;

        let work_dir = absolutize(
            cli.work_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WORK_DIR)),
            &start_dir,
        );

        let (sample_root, sample_name) = match &cli.sample_dir {
            Some(dir) => split_sample_dir(&absolutize(dir.clone(), &start_dir))?,
            None => (
                PathBuf::from(DEFAULT_SAMPLE_ROOT),
                DEFAULT_SAMPLE_NAME.to_string(),
            ),
        };

        let mut timing = Timing::default();
        if let Some(secs) = cli.mount_timeout_secs {
            timing.mount_timeout = Duration::from_secs(secs);
        }

        Ok(Self {
            device,
            media,
            work_dir,
            sample_root,
            sample_name,
            iso_name: ISO_NAME.to_string(),
            manifest_name: MANIFEST_NAME.to_string(),
            start_dir,
            timing,
        })
    }

    /// Source of the sample dataset.
    pub fn sample_source(&self) -> PathBuf {
        self.sample_root.join(&self.sample_name)
    }

    /// Staged (and later recovered) dataset directory inside the scratch dir.
    pub fn dataset_dir(&self) -> PathBuf {
        self.work_dir.join(&self.sample_name)
    }

    /// Path of the generated ISO image.
    pub fn iso_path(&self) -> PathBuf {
        self.work_dir.join(&self.iso_name)
    }

    /// Path of the checksum manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.work_dir.join(&self.manifest_name)
    }
}

/// Resolve the target device node.
///
/// A path that exists is canonicalized so symlinks like `/dev/cdrom` point at
/// the real node; a missing or omitted path falls back to the well-known
/// default drive.
pub fn resolve_device(arg: Option<&Path>) -> PathBuf {
    match arg {
        Some(path) if path.exists() => {
            fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
        }
        _ => PathBuf::from(DEFAULT_DEVICE),
    }
}

fn absolutize(path: PathBuf, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

fn split_sample_dir(dir: &Path) -> Result<(PathBuf, String), WorkflowError> {
    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            WorkflowError::Config(format!(
                "sample directory {} has no usable name",
                dir.display()
            ))
        })?
        .to_string();
    let root = dir.parent().unwrap_or(Path::new("/")).to_path_buf();
    Ok((root, name))
}
