//! Failures of host-side subscription operations that callers classify.

use thiserror::Error;

/// Errors raised while talking to the event collector on a host.
#[derive(Debug, Error)]
pub enum WecError {
    /// The Windows Event Collector service is stopped or not installed.
    #[error("Windows Event Collector service (wecsvc) is not running on {computer}")]
    ServiceNotRunning { computer: String },

    /// `wecutil` reported an error.
    #[error("wecutil {operation} failed on {computer}: {message}")]
    Command {
        computer: String,
        operation: &'static str,
        message: String,
    },

    /// The staged subscription document could not be written.
    #[error("failed to write temporary subscription file {path} on {computer}: {reason}")]
    TempFileWrite {
        computer: String,
        path: String,
        reason: String,
    },

    /// Deleting the live subscription before recreating it failed.
    #[error("failed to delete subscription '{name}' on {computer}: {message}")]
    Delete {
        computer: String,
        name: String,
        message: String,
    },

    /// Recreating the subscription failed; the staged file is kept.
    #[error(
        "failed to create subscription '{name}' on {computer}: {message} \
         (document kept at {temp_path})"
    )]
    Create {
        computer: String,
        name: String,
        temp_path: String,
        message: String,
    },
}
