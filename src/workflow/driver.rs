//! The round-trip workflow driver.
//!
//! A strictly ordered sequence of steps with no branching back: each step
//! either succeeds and hands off to the next, or aborts the run. Cleanup runs
//! exactly once on every exit path and never re-enters itself.

use std::env;
use std::fs;
use std::path::PathBuf;

use crate::config::TesterConfig;
use crate::error::WorkflowError;

use super::{burn, checksum, image, mount, staging};

/// Drives one write-then-verify pass against an optical drive.
pub struct DiscRoundTripTester {
    config: TesterConfig,
    /// Where the reinserted disc is attached; discovered during the remount
    /// wait or the explicit mount, consumed by cleanup.
    mount_point: Option<PathBuf>,
}

impl DiscRoundTripTester {
    pub fn new(config: TesterConfig) -> Self {
        Self {
            config,
            mount_point: None,
        }
    }

    /// Run the full workflow.
    ///
    /// Cleanup always runs, whether the steps succeeded or not, and each
    /// failure is reported here as it happens. When both a step and cleanup
    /// fail, the step error is the one returned.
    pub fn execute(&mut self) -> Result<(), WorkflowError> {
        let run = self.run_steps();
        if let Err(e) = &run {
            log::error!("{}", e);
            log::info!("Attempting to clean up ...");
        }
        let cleanup = self.cleanup();
        if run.is_ok() {
            if let Err(e) = &cleanup {
                log::error!("{}", e);
            }
        }
        run.and(cleanup)
    }

    fn run_steps(&mut self) -> Result<(), WorkflowError> {
        self.create_workspace()?;
        self.stage_sample_data()?;
        self.fingerprint()?;
        self.author_image()?;
        self.burn_image()?;
        self.await_remount();
        self.delete_originals()?;
        self.resolve_mount_point()?;
        self.verify_recovered_data()
    }

    fn create_workspace(&self) -> Result<(), WorkflowError> {
        let work_dir = &self.config.work_dir;
        log::info!("Creating scratch directory {} ...", work_dir.display());
        // A leftover scratch directory means a previous run did not clean
        // up; refuse rather than burn stale data.
        fs::create_dir(work_dir).map_err(|e| {
            WorkflowError::Setup(format!("failed to create {}: {}", work_dir.display(), e))
        })?;
        env::set_current_dir(work_dir).map_err(|e| {
            WorkflowError::Setup(format!("failed to enter {}: {}", work_dir.display(), e))
        })?;
        log::info!("Now working in {} ...", work_dir.display());
        Ok(())
    }

    fn stage_sample_data(&self) -> Result<(), WorkflowError> {
        let source = self.config.sample_source();
        log::info!("Staging sample files from {} ...", source.display());
        staging::stage_sample(&source, &self.config.dataset_dir())
    }

    fn fingerprint(&self) -> Result<(), WorkflowError> {
        log::info!("Generating checksums of sample files ...");
        checksum::write_manifest(&self.config.dataset_dir(), &self.config.manifest_path())?;
        // Re-check immediately, in case the staging copy itself was corrupt
        log::info!("Checking checksums ...");
        checksum::verify_manifest(&self.config.dataset_dir(), &self.config.manifest_path())
            .map_err(WorkflowError::Integrity)
    }

    fn author_image(&self) -> Result<(), WorkflowError> {
        log::info!("Creating ISO image ...");
        image::create_iso(&self.config.dataset_dir(), &self.config.iso_path())
    }

    fn burn_image(&self) -> Result<(), WorkflowError> {
        burn::burn_image(
            self.config.media,
            &self.config.device,
            &self.config.iso_path(),
            self.config.timing.settle_delay,
        )
    }

    fn await_remount(&mut self) {
        log::info!(
            "Waiting up to {}s for the drive to be mounted ...",
            self.config.timing.mount_timeout.as_secs()
        );
        self.mount_point = mount::wait_for_mount(
            &self.config.device,
            self.config.timing.poll_interval,
            self.config.timing.mount_timeout,
        );
    }

    fn delete_originals(&self) -> Result<(), WorkflowError> {
        log::info!("Deleting original data files ...");
        staging::remove_staged(&self.config.dataset_dir())
    }

    fn resolve_mount_point(&mut self) -> Result<(), WorkflowError> {
        if self.mount_point.is_none() {
            self.mount_point = mount::find_mount_point(&self.config.device)?;
        }

        match &self.mount_point {
            Some(mount_point) => {
                log::info!("Disc is mounted at {}", mount_point.display());
            }
            None => {
                let mount_point = self.config.work_dir.join("mnt");
                log::info!(
                    "Attempting best effort to mount {} at {} ...",
                    self.config.device.display(),
                    mount_point.display()
                );
                fs::create_dir_all(&mount_point).map_err(|e| {
                    WorkflowError::Verification(format!(
                        "failed to create mount point {}: {}",
                        mount_point.display(),
                        e
                    ))
                })?;
                mount::mount_device(&self.config.device, &mount_point)?;
                self.mount_point = Some(mount_point);
            }
        }
        Ok(())
    }

    fn verify_recovered_data(&self) -> Result<(), WorkflowError> {
        let mount_point = self.mount_point.as_ref().ok_or_else(|| {
            WorkflowError::Verification("no mount point available".to_string())
        })?;

        log::info!("Copying files back from the disc ...");
        staging::recover_from_mount(mount_point, &self.config.dataset_dir())?;

        log::info!("Checking recovered checksums ...");
        checksum::verify_manifest(&self.config.dataset_dir(), &self.config.manifest_path())
            .map_err(WorkflowError::Verification)
    }

    /// Best-effort teardown.
    ///
    /// Every action is attempted even when an earlier one failed; failures
    /// are logged individually and folded into a single error so the process
    /// still exits nonzero without a second cleanup pass.
    pub fn cleanup(&mut self) -> Result<(), WorkflowError> {
        log::info!("Cleaning up ...");
        let mut problems: Vec<String> = Vec::new();

        if let Err(e) = env::set_current_dir(&self.config.start_dir) {
            problems.push(format!(
                "could not return to {}: {}",
                self.config.start_dir.display(),
                e
            ));
        }

        if let Some(mount_point) = self.mount_point.take() {
            if let Err(e) = mount::unmount(&mount_point) {
                problems.push(e);
            }
        }

        if self.config.work_dir.exists() {
            if let Err(e) = fs::remove_dir_all(&self.config.work_dir) {
                problems.push(format!(
                    "could not remove {}: {}",
                    self.config.work_dir.display(),
                    e
                ));
            }
        }

        log::info!("Ejecting spent media ...");
        if let Err(e) = mount::eject(&self.config.device) {
            problems.push(e);
        }

        if problems.is_empty() {
            Ok(())
        } else {
            for problem in &problems {
                log::warn!("Cleanup: {}", problem);
            }
            Err(WorkflowError::Cleanup(problems.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MediaKind, Timing};
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    fn test_config(base: &Path, work_dir: PathBuf, sample_root: PathBuf) -> TesterConfig {
        TesterConfig {
            device: PathBuf::from("/nonexistent/test-device"),
            media: MediaKind::Cd,
            work_dir,
            sample_root,
            sample_name: "dataset".to_string(),
            iso_name: "optical-test.iso".to_string(),
            manifest_name: "optical-test.md5".to_string(),
            start_dir: base.to_path_buf(),
            timing: Timing {
                settle_delay: Duration::ZERO,
                poll_interval: Duration::from_millis(10),
                mount_timeout: Duration::from_millis(20),
            },
        }
    }

    // Every scenario here changes the process working directory, so they all
    // run inside one test to keep them from interleaving.
    #[test]
    fn test_failures_still_remove_the_scratch_directory() {
        // Missing sample source: fails during staging, scratch dir cleaned
        // up. The bogus device also guarantees the eject in cleanup fails;
        // the reported error must still be the staging failure.
        let temp = TempDir::new().unwrap();
        let work_dir = temp.path().join("scratch");
        let config = test_config(
            temp.path(),
            work_dir.clone(),
            temp.path().join("no-samples"),
        );

        let mut tester = DiscRoundTripTester::new(config);
        let err = tester.execute().unwrap_err();
        assert!(matches!(err, WorkflowError::DataUnavailable(_)));
        assert!(!work_dir.exists(), "cleanup must remove the scratch dir");
        assert_eq!(
            env::current_dir().unwrap(),
            fs::canonicalize(temp.path()).unwrap()
        );

        // Pre-existing scratch dir: setup refuses, cleanup still removes it
        let work_dir = temp.path().join("scratch2");
        fs::create_dir(&work_dir).unwrap();
        let config = test_config(
            temp.path(),
            work_dir.clone(),
            temp.path().join("no-samples"),
        );

        let mut tester = DiscRoundTripTester::new(config);
        let err = tester.execute().unwrap_err();
        assert!(matches!(err, WorkflowError::Setup(_)));
        assert!(!work_dir.exists(), "cleanup must remove the scratch dir");
    }
}
