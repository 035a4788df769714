//! Transport trait

use std::future::Future;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::error;

use crate::error::ExecError;
use crate::result::{CommandResult, ExecutionResult, TransportKind};

/// A channel that can run one shell command to completion
///
/// `run` reports failures as errors; `execute` flattens them into the
/// line-oriented [`ExecutionResult`] and never fails.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Run a command and return its raw output
    async fn run(&self, cmd: &str) -> Result<CommandResult, ExecError>;

    /// Run a command, failing with `ExecError::Timeout` once the deadline passes
    async fn run_with_timeout(
        &self,
        cmd: &str,
        timeout: Duration,
    ) -> Result<CommandResult, ExecError>;

    /// Which transport this is
    fn kind(&self) -> TransportKind;

    /// Run a command and return its output lines
    async fn execute(&self, cmd: &str) -> ExecutionResult {
        match self.run(cmd).await {
            Ok(result) => result.into_execution_result(),
            Err(e) => ExecutionResult::from_error(&e),
        }
    }

    /// Like `execute`, with a deadline
    async fn execute_with_timeout(&self, cmd: &str, timeout: Duration) -> ExecutionResult {
        match self.run_with_timeout(cmd, timeout).await {
            Ok(result) => result.into_execution_result(),
            Err(e) => ExecutionResult::from_error(&e),
        }
    }
}

/// Bound a transport call by a deadline
///
/// The call is dropped on expiry, which releases whatever it owns (a child
/// process or an SSH session).
pub(crate) async fn with_deadline<F>(
    deadline: Duration,
    call: F,
) -> Result<CommandResult, ExecError>
where
    F: Future<Output = Result<CommandResult, ExecError>>,
{
    let start = Instant::now();
    timeout(deadline, call).await.unwrap_or_else(|_| {
        error!(timeout = ?deadline, elapsed = ?start.elapsed(), "command timed out");
        Err(ExecError::Timeout { timeout: deadline })
    })
}
