//! Staging and recovery copies of the sample dataset.

use std::fs;
use std::path::Path;

use crate::error::WorkflowError;

/// Recursively copy a directory tree.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let path = entry.path();
        let dest_path = dst.join(entry.file_name());

        if path.is_dir() {
            copy_dir_recursive(&path, &dest_path)?;
        } else {
            fs::copy(&path, &dest_path)?;
        }
    }

    Ok(())
}

/// Copy the sample dataset into the scratch directory.
pub fn stage_sample(source: &Path, dataset_dir: &Path) -> Result<(), WorkflowError> {
    if !source.is_dir() {
        return Err(WorkflowError::DataUnavailable(format!(
            "sample source {} does not exist",
            source.display()
        )));
    }
    copy_dir_recursive(source, dataset_dir).map_err(|e| {
        WorkflowError::DataUnavailable(format!("failed to copy sample data: {}", e))
    })
}

/// Remove the staged originals.
///
/// Runs only after the image is burned, so the verification step cannot end
/// up comparing the disc against the very files it was made from.
pub fn remove_staged(dataset_dir: &Path) -> Result<(), WorkflowError> {
    fs::remove_dir_all(dataset_dir).map_err(|e| {
        WorkflowError::Verification(format!(
            "failed to remove staged originals {}: {}",
            dataset_dir.display(),
            e
        ))
    })
}

/// Copy the recovered files off the mounted disc back into the scratch area.
pub fn recover_from_mount(mount_point: &Path, dataset_dir: &Path) -> Result<(), WorkflowError> {
    copy_dir_recursive(mount_point, dataset_dir).map_err(|e| {
        WorkflowError::Verification(format!(
            "failed to copy files from {}: {}",
            mount_point.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_dir_recursive() {
        let temp_src = TempDir::new().unwrap();
        let temp_dst = TempDir::new().unwrap();

        let src_path = temp_src.path();
        let dst_path = temp_dst.path().join("copied");

        // Create test structure
        fs::write(src_path.join("file1.txt"), b"content1").unwrap();
        fs::create_dir(src_path.join("subdir")).unwrap();
        fs::write(src_path.join("subdir/file2.txt"), b"content2").unwrap();

        // Copy
        copy_dir_recursive(src_path, &dst_path).unwrap();

        // Verify
        assert!(dst_path.join("file1.txt").exists());
        assert!(dst_path.join("subdir").exists());
        assert!(dst_path.join("subdir/file2.txt").exists());

        let content1 = fs::read_to_string(dst_path.join("file1.txt")).unwrap();
        assert_eq!(content1, "content1");
    }

    #[test]
    fn test_stage_sample_missing_source() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("no-such-dataset");
        let dest = temp.path().join("staged");

        let err = stage_sample(&missing, &dest).unwrap_err();
        assert!(matches!(err, WorkflowError::DataUnavailable(_)));
        assert!(!dest.exists());
    }

    #[test]
    fn test_stage_then_remove_staged() {
        let temp_src = TempDir::new().unwrap();
        let temp_work = TempDir::new().unwrap();
        fs::write(temp_src.path().join("track.ogg"), b"data").unwrap();

        let dataset = temp_work.path().join("dataset");
        stage_sample(temp_src.path(), &dataset).unwrap();
        assert!(dataset.join("track.ogg").exists());

        remove_staged(&dataset).unwrap();
        assert!(!dataset.exists());
    }

    #[test]
    fn test_remove_staged_missing_dir_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("gone");
        let err = remove_staged(&missing).unwrap_err();
        assert!(matches!(err, WorkflowError::Verification(_)));
    }

    #[test]
    fn test_recover_from_mount_copies_into_existing_tree() {
        let mount = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        fs::write(mount.path().join("a.txt"), b"aaa").unwrap();
        fs::create_dir(mount.path().join("nested")).unwrap();
        fs::write(mount.path().join("nested/b.txt"), b"bbb").unwrap();

        let dataset = work.path().join("dataset");
        recover_from_mount(mount.path(), &dataset).unwrap();

        assert_eq!(fs::read(dataset.join("a.txt")).unwrap(), b"aaa");
        assert_eq!(fs::read(dataset.join("nested/b.txt")).unwrap(), b"bbb");
    }
}
