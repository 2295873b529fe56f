//! The round-trip workflow: stage, fingerprint, image, burn, remount, verify.
//!
//! Each submodule wraps one external collaborator; the driver sequences them.

pub mod burn;
pub mod checksum;
pub mod driver;
pub mod image;
pub mod mount;
pub mod staging;

pub use driver::DiscRoundTripTester;

use std::process::Output;

/// Render a failed tool invocation as a short diagnostic, keeping the last
/// stderr line the way the tools summarize their own failures.
pub(crate) fn tool_failure(tool: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!(
        "{} exited with {}: {}",
        tool,
        output.status,
        stderr.lines().last().unwrap_or("unknown error").trim()
    )
}
