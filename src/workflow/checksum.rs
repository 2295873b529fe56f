//! Checksum manifest generation and verification.
//!
//! Fingerprinting delegates to the system `md5sum` tool, invoked with
//! argument vectors and a pinned working directory so the manifest holds
//! paths relative to the dataset root. The same manifest is checked twice:
//! right after it is written, and again on the files recovered from the disc.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use walkdir::WalkDir;

use crate::error::WorkflowError;

use super::tool_failure;

/// List every file in the dataset as a path relative to its root, sorted so
/// the manifest is deterministic.
pub fn list_dataset_files(dataset_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dataset_dir).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() {
            let rel = entry
                .path()
                .strip_prefix(dataset_dir)
                .unwrap_or(entry.path())
                .to_path_buf();
            files.push(rel);
        }
    }
    Ok(files)
}

/// Generate the checksum manifest for the staged dataset.
///
/// Runs `md5sum -- <files...>` from the dataset directory and persists its
/// stdout verbatim, so the manifest stays in the format `md5sum -c` expects.
pub fn write_manifest(dataset_dir: &Path, manifest_path: &Path) -> Result<(), WorkflowError> {
    let files = list_dataset_files(dataset_dir).map_err(|e| {
        WorkflowError::Integrity(format!("failed to enumerate staged files: {}", e))
    })?;
    if files.is_empty() {
        return Err(WorkflowError::Integrity(format!(
            "no files found under {}",
            dataset_dir.display()
        )));
    }

    let mut cmd = Command::new("md5sum");
    cmd.arg("--");
    for file in &files {
        cmd.arg(file);
    }
    cmd.current_dir(dataset_dir);

    let output = cmd
        .output()
        .map_err(|e| WorkflowError::Integrity(format!("failed to run md5sum: {}", e)))?;
    if !output.status.success() {
        return Err(WorkflowError::Integrity(tool_failure("md5sum", &output)));
    }

    fs::write(manifest_path, &output.stdout).map_err(|e| {
        WorkflowError::Integrity(format!(
            "failed to write manifest {}: {}",
            manifest_path.display(),
            e
        ))
    })
}

/// Check dataset files against the manifest with `md5sum -c`.
///
/// Returns the failure text on mismatch; the caller decides which error kind
/// it maps to (pre-burn integrity vs post-burn verification).
pub fn verify_manifest(dataset_dir: &Path, manifest_path: &Path) -> Result<(), String> {
    let output = Command::new("md5sum")
        .arg("-c")
        .arg(manifest_path)
        .current_dir(dataset_dir)
        .output()
        .map_err(|e| format!("failed to run md5sum -c: {}", e))?;

    if output.status.success() {
        return Ok(());
    }

    // md5sum lists each file as "name: OK" or "name: FAILED" on stdout
    let stdout = String::from_utf8_lossy(&output.stdout);
    let detail = stdout
        .lines()
        .find(|line| !line.ends_with(": OK"))
        .map(str::to_string)
        .unwrap_or_else(|| tool_failure("md5sum", &output));
    Err(format!("checksum mismatch: {}", detail))
}
