//! Mount-table queries and media attach/detach helpers.
//!
//! The mount table is read by running `mount` with no arguments and parsing
//! its `<device> on <dir> type <fs> (<options>)` lines. The remount wait is a
//! bounded poll: a disc that never shows up is a warning, not an error, since
//! the driver attempts an explicit mount afterwards anyway.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::WorkflowError;

use super::tool_failure;

/// Parse `mount` output for the line describing `device`, returning its
/// mount point.
pub fn parse_mount_table(table: &str, device: &Path) -> Option<PathBuf> {
    let device = device.to_string_lossy();
    for line in table.lines() {
        let Some((dev, rest)) = line.split_once(" on ") else {
            continue;
        };
        if dev.trim() != device {
            continue;
        }
        // The filesystem type never contains spaces, so the last " type "
        // is the real delimiter even for odd mount-point names.
        let mount_point = match rest.rsplit_once(" type ") {
            Some((mp, _)) => mp,
            None => rest,
        };
        return Some(PathBuf::from(mount_point.trim()));
    }
    None
}

/// Query the system mount table for the device's current mount point.
pub fn find_mount_point(device: &Path) -> Result<Option<PathBuf>, WorkflowError> {
    let output = Command::new("mount")
        .output()
        .map_err(|e| WorkflowError::Verification(format!("failed to run mount: {}", e)))?;
    if !output.status.success() {
        return Err(WorkflowError::Verification(tool_failure("mount", &output)));
    }
    Ok(parse_mount_table(
        &String::from_utf8_lossy(&output.stdout),
        device,
    ))
}

/// Poll until the device shows up in the mount table or the budget runs out.
///
/// Returns the discovered mount point, or `None` on timeout. A failed table
/// probe counts as "not mounted yet". Total sleep time never exceeds
/// `timeout`.
pub fn wait_for_mount(
    device: &Path,
    poll_interval: Duration,
    timeout: Duration,
) -> Option<PathBuf> {
    let start = Instant::now();
    loop {
        let elapsed = start.elapsed();
        if elapsed >= timeout {
            log::warn!("Timeout exceeded and no mount detected; proceeding anyway");
            return None;
        }
        thread::sleep((timeout - elapsed).min(poll_interval));

        if let Ok(Some(mount_point)) = find_mount_point(device) {
            log::info!("Drive appears to be mounted at {}", mount_point.display());
            return Some(mount_point);
        }
    }
}

/// Explicitly mount the device at the given mount point.
pub fn mount_device(device: &Path, mount_point: &Path) -> Result<(), WorkflowError> {
    let output = Command::new("mount")
        .arg(device)
        .arg(mount_point)
        .output()
        .map_err(|e| WorkflowError::Verification(format!("failed to run mount: {}", e)))?;
    if !output.status.success() {
        return Err(WorkflowError::Verification(format!(
            "unable to re-mount {}: {}",
            device.display(),
            tool_failure("mount", &output)
        )));
    }
    Ok(())
}

/// Unmount a mount point. Returns the failure text for cleanup to report.
pub fn unmount(mount_point: &Path) -> Result<(), String> {
    let output = Command::new("umount")
        .arg(mount_point)
        .output()
        .map_err(|e| format!("failed to run umount: {}", e))?;
    if !output.status.success() {
        return Err(format!(
            "could not unmount {}: {}",
            mount_point.display(),
            tool_failure("umount", &output)
        ));
    }
    Ok(())
}

/// Eject the media from the drive. Returns the failure text for cleanup.
pub fn eject(device: &Path) -> Result<(), String> {
    let output = Command::new("eject")
        .arg(device)
        .output()
        .map_err(|e| format!("failed to run eject: {}", e))?;
    if !output.status.success() {
        return Err(format!(
            "could not eject {}: {}",
            device.display(),
            tool_failure("eject", &output)
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
proc on /proc type proc (rw,nosuid,nodev,noexec,relatime)
/dev/sda2 on / type ext4 (rw,relatime)
/dev/sr0 on /media/user/OPTICAL_TEST type iso9660 (ro,nosuid,nodev,relatime)
tmpfs on /run type tmpfs (rw,nosuid,nodev,mode=755)";

    #[test]
    fn test_parse_mount_table_finds_device() {
        let mp = parse_mount_table(TABLE, Path::new("/dev/sr0"));
        assert_eq!(mp, Some(PathBuf::from("/media/user/OPTICAL_TEST")));
    }

    #[test]
    fn test_parse_mount_table_unmounted_device() {
        assert_eq!(parse_mount_table(TABLE, Path::new("/dev/sr1")), None);
    }

    #[test]
    fn test_parse_mount_table_ignores_partial_device_match() {
        // /dev/sr0 must not match a query for /dev/sr
        assert_eq!(parse_mount_table(TABLE, Path::new("/dev/sr")), None);
    }

    #[test]
    fn test_parse_mount_table_empty_input() {
        assert_eq!(parse_mount_table("", Path::new("/dev/sr0")), None);
    }

    #[test]
    fn test_wait_for_mount_times_out_within_budget() {
        let device = Path::new("/nonexistent/never-mounted");
        let timeout = Duration::from_millis(100);

        let start = Instant::now();
        let result = wait_for_mount(device, Duration::from_millis(10), timeout);
        let elapsed = start.elapsed();

        assert!(result.is_none());
        // Sleep time is capped by the budget; allow slack for the probes.
        assert!(
            elapsed < timeout + Duration::from_secs(2),
            "poll overran its ceiling: {:?}",
            elapsed
        );
    }

    #[test]
    fn test_wait_for_mount_zero_budget_returns_immediately() {
        let device = Path::new("/nonexistent/never-mounted");
        let result = wait_for_mount(device, Duration::from_millis(10), Duration::ZERO);
        assert!(result.is_none());
    }
}
