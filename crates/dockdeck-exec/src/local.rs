//! Commands on this machine's shell

use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, instrument};

use crate::error::ExecError;
use crate::result::{CommandResult, TransportKind};
use crate::traits::{Transport, with_deadline};

/// Runs commands through `sh -c` on this machine
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTransport;

impl LocalTransport {
    /// Create a new local transport
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// `sh -c <cmd>` with both streams captured and stdin closed
///
/// The child is killed when its handle is dropped, so an expired deadline
/// does not leave a stray process behind.
fn shell(cmd: &str) -> Command {
    let mut command = Command::new("sh");
    command
        .arg("-c")
        .arg(cmd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    command
}

/// Exit code of the shell, -1 when it was terminated by a signal
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            tracing::warn!(signal, "shell terminated by signal");
        }
    }

    -1
}

#[async_trait]
impl Transport for LocalTransport {
    #[instrument(skip(self), level = "debug")]
    async fn run(&self, cmd: &str) -> Result<CommandResult, ExecError> {
        let start = Instant::now();

        let child = shell(cmd)
            .spawn()
            .map_err(|e| ExecError::SpawnError(e.to_string()))?;
        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ExecError::IoError(e.to_string()))?;

        let result = CommandResult {
            status: exit_code(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            duration: start.elapsed(),
        };

        // stderr goes back to the caller; only the status is logged here
        if result.success() {
            debug!(duration = ?result.duration, "shell exited cleanly");
        } else {
            info!(status = result.status, duration = ?result.duration, "shell exited non-zero");
        }

        Ok(result)
    }

    #[instrument(skip(self), level = "debug")]
    async fn run_with_timeout(
        &self,
        cmd: &str,
        timeout: Duration,
    ) -> Result<CommandResult, ExecError> {
        with_deadline(timeout, self.run(cmd)).await
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Local
    }
}
