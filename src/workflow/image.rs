//! ISO 9660 image authoring using genisoimage.

use std::fs;
use std::path::Path;
use std::process::Command;

use crate::error::WorkflowError;

use super::tool_failure;

/// Create an ISO image of the dataset directory.
///
/// Uses UTF-8 as the input charset and enables Rock Ridge (`-r`) and Joliet
/// (`-J`) extensions so names survive the trip on Unix and Windows readers.
pub fn create_iso(dataset_dir: &Path, iso_path: &Path) -> Result<(), WorkflowError> {
    if iso_path.exists() {
        log::debug!("Removing stale image at {}", iso_path.display());
        fs::remove_file(iso_path).map_err(|e| {
            WorkflowError::ImageBuild(format!("failed to remove stale image: {}", e))
        })?;
    }

    let output = Command::new("genisoimage")
        .args(["-input-charset", "UTF-8", "-r", "-J", "-o"])
        .arg(iso_path)
        .arg(dataset_dir)
        .output()
        .map_err(|e| WorkflowError::ImageBuild(format!("failed to run genisoimage: {}", e)))?;

    if !output.status.success() {
        return Err(WorkflowError::ImageBuild(tool_failure(
            "genisoimage",
            &output,
        )));
    }

    log::info!("ISO image created at {}", iso_path.display());
    Ok(())
}
