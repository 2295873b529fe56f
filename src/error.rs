//! Typed errors, one per workflow step.
//!
//! Every fatal step error funnels to a single handler in `main`, which logs
//! the message and exits nonzero after cleanup has run. The remount-timeout
//! case is the only degradation that is not an error (it logs a warning and
//! the workflow continues).

use thiserror::Error;

/// Failure categories for the round-trip workflow.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The scratch working directory could not be created or entered.
    #[error("failed to set up working directory: {0}")]
    Setup(String),

    /// The sample dataset is missing or could not be staged.
    #[error("sample data unavailable: {0}")]
    DataUnavailable(String),

    /// Checksum manifest generation or pre-burn verification failed.
    #[error("checksum integrity failure: {0}")]
    Integrity(String),

    /// The ISO authoring tool failed.
    #[error("ISO image creation failed: {0}")]
    ImageBuild(String),

    /// The run was configured with an unsupported media kind or sample path.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The burn tool exited nonzero or could not be started.
    #[error("failed to burn image: {0}")]
    Burn(String),

    /// Post-burn remount, copy-back, or checksum comparison failed.
    #[error("failed to verify files on optical disk: {0}")]
    Verification(String),

    /// One or more cleanup actions failed.
    #[error("cleanup incomplete: {0}")]
    Cleanup(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_step() {
        let err = WorkflowError::Setup("mkdir denied".to_string());
        assert!(err.to_string().contains("working directory"));

        let err = WorkflowError::DataUnavailable("no such path".to_string());
        assert!(err.to_string().contains("sample data"));

        let err = WorkflowError::Burn("wodim exited with 1".to_string());
        assert!(err.to_string().contains("burn"));

        let err = WorkflowError::Verification("checksum mismatch".to_string());
        assert!(err.to_string().contains("verify"));
    }

    #[test]
    fn test_error_message_carries_detail() {
        let err = WorkflowError::Config("unsupported media type 'tape'".to_string());
        assert!(err.to_string().contains("tape"));
    }
}
