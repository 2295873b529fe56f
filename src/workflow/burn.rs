//! Burn command selection and execution.
//!
//! CD media gets an eject-on-completion `wodim` write; DVD and BD media get
//! a DVD-compatible `growisofs` write. Selection is total over [`MediaKind`]:
//! unsupported kind strings are rejected at argument parsing, before the
//! settle delay and long before any tool runs.

use std::path::Path;
use std::process::Command;
use std::thread;
use std::time::Duration;

use crate::config::MediaKind;
use crate::error::WorkflowError;

use super::tool_failure;

/// A resolved burn invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurnCommand {
    pub program: &'static str,
    pub args: Vec<String>,
}

/// Select the burn template for the media in the drive.
pub fn burn_command(media: MediaKind, device: &Path, iso_path: &Path) -> BurnCommand {
    match media {
        MediaKind::Cd => BurnCommand {
            program: "wodim",
            args: vec![
                "-eject".to_string(),
                format!("dev={}", device.display()),
                iso_path.display().to_string(),
            ],
        },
        MediaKind::Dvd | MediaKind::Bd => BurnCommand {
            program: "growisofs",
            args: vec![
                "-dvd-compat".to_string(),
                "-Z".to_string(),
                format!("{}={}", device.display(), iso_path.display()),
            ],
        },
    }
}

/// Burn the image to the device after a settle pause for drive spin-up.
pub fn burn_image(
    media: MediaKind,
    device: &Path,
    iso_path: &Path,
    settle_delay: Duration,
) -> Result<(), WorkflowError> {
    log::info!(
        "Sleeping {}s in case the drive is not yet ready ...",
        settle_delay.as_secs()
    );
    thread::sleep(settle_delay);

    let cmd = burn_command(media, device, iso_path);
    log::info!("Beginning image burn with {} ...", cmd.program);
    log::debug!("Burn command: {} {}", cmd.program, cmd.args.join(" "));

    let output = Command::new(cmd.program)
        .args(&cmd.args)
        .output()
        .map_err(|e| WorkflowError::Burn(format!("failed to run {}: {}", cmd.program, e)))?;

    if !output.status.success() {
        return Err(WorkflowError::Burn(tool_failure(cmd.program, &output)));
    }

    log::info!("Burn completed");
    Ok(())
}
