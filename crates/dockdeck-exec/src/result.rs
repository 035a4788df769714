//! Request and result types for command execution

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ExecError;

/// Prefix of the synthetic stdout line produced for a failed execution
pub const ERROR_LINE_PREFIX: &str = "Erro: ";

/// Which transport a command should run on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// The host shell of this machine
    #[default]
    Local,
    /// A shell on the configured remote endpoint, reached over SSH
    Remote,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Local => write!(f, "local"),
            TransportKind::Remote => write!(f, "remote"),
        }
    }
}

/// A single command to run on one transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    command: String,
    transport: TransportKind,
}

impl ExecutionRequest {
    /// Create a new request
    pub fn new(command: impl Into<String>, transport: TransportKind) -> Self {
        Self {
            command: command.into(),
            transport,
        }
    }

    /// Request to run on the local shell
    pub fn local(command: impl Into<String>) -> Self {
        Self::new(command, TransportKind::Local)
    }

    /// Request to run on the remote endpoint
    pub fn remote(command: impl Into<String>) -> Self {
        Self::new(command, TransportKind::Remote)
    }

    /// Command text, passed verbatim to the shell
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Selected transport
    #[must_use]
    pub fn transport(&self) -> TransportKind {
        self.transport
    }
}

/// Result of a command execution, as reported by a transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    /// Exit status code (0 for success, -1 if none was reported)
    pub status: i32,
    /// stdout output
    pub stdout: String,
    /// stderr output
    pub stderr: String,
    /// Time taken to execute
    pub duration: Duration,
}

impl CommandResult {
    /// Check if command succeeded (exit code 0)
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == 0
    }

    /// Split both streams into lines
    #[must_use]
    pub fn into_execution_result(self) -> ExecutionResult {
        ExecutionResult {
            stdout: split_lines(&self.stdout),
            stderr: split_lines(&self.stderr),
        }
    }
}

/// Line-oriented output of one command
///
/// A failed execution is reported as a single stdout line starting with
/// [`ERROR_LINE_PREFIX`] and an empty stderr.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// stdout, one element per line
    pub stdout: Vec<String>,
    /// stderr, one element per line
    pub stderr: Vec<String>,
}

impl ExecutionResult {
    /// Build the synthetic error result for a failed execution
    #[must_use]
    pub fn from_error(error: &ExecError) -> Self {
        Self {
            stdout: vec![format!("{ERROR_LINE_PREFIX}{error}")],
            stderr: Vec::new(),
        }
    }

    /// The synthetic error line, if this result is one
    ///
    /// Output that legitimately starts with the prefix is indistinguishable.
    #[must_use]
    pub fn error_line(&self) -> Option<&str> {
        if self.stderr.is_empty() {
            error_line(&self.stdout)
        } else {
            None
        }
    }

    /// Whether this result looks like the synthetic error line
    #[must_use]
    pub fn is_error_line(&self) -> bool {
        self.error_line().is_some()
    }
}

/// The single `Erro: ` line of a failed execution's stdout, if that is what
/// `stdout` holds
#[must_use]
pub fn error_line(stdout: &[String]) -> Option<&str> {
    match stdout {
        [line] if line.starts_with(ERROR_LINE_PREFIX) => Some(line.as_str()),
        _ => None,
    }
}

impl From<CommandResult> for ExecutionResult {
    fn from(result: CommandResult) -> Self {
        result.into_execution_result()
    }
}

/// Split text on line boundaries without a trailing empty element
fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}
