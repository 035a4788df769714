//! Error types for dockdeck-exec

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while running a command on a transport
#[derive(Error, Debug, Clone)]
pub enum ExecError {
    /// Failed to connect to remote host
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Authentication failed
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Server presented a host key that the configured policy rejects
    #[error("host key rejected for {host}:{port}: {reason}")]
    HostKeyRejected {
        /// Remote host
        host: String,
        /// Remote port
        port: u16,
        /// Why the key was rejected
        reason: String,
    },

    /// Command timed out
    #[error("command timed out after {timeout:?}")]
    Timeout {
        /// Timeout duration that was exceeded
        timeout: Duration,
    },

    /// SSH key error
    #[error("SSH key error: {0}")]
    SshKeyError(String),

    /// Process spawn error
    #[error("failed to spawn process: {0}")]
    SpawnError(String),

    /// I/O error during execution
    #[error("I/O error: {0}")]
    IoError(String),

    /// Remote transport requested but no endpoint configured
    #[error("remote endpoint not configured")]
    RemoteNotConfigured,
}

impl From<russh::Error> for ExecError {
    fn from(e: russh::Error) -> Self {
        ExecError::ConnectionFailed(e.to_string())
    }
}

impl ExecError {
    /// Check if the failure happened before any command could run on the remote side
    #[must_use]
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            ExecError::ConnectionFailed(_)
                | ExecError::AuthenticationFailed(_)
                | ExecError::HostKeyRejected { .. }
                | ExecError::SshKeyError(_)
                | ExecError::RemoteNotConfigured
        )
    }
}
