//! Error types for dockdeck-engine

use thiserror::Error;

/// Errors raised while building an engine command
///
/// Execution problems never show up here: they are reported through the
/// command output like any other result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A required field was empty
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Container command could not be split into words
    #[error("invalid container command: {0}")]
    InvalidCommand(String),

    /// Unknown container action
    #[error("unknown container action: {0} (expected stop or rm)")]
    UnknownAction(String),
}
