//! Transport selection for execution requests

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use crate::endpoint::RemoteEndpoint;
use crate::error::ExecError;
use crate::local::LocalTransport;
use crate::result::{ExecutionRequest, ExecutionResult, TransportKind};
use crate::ssh::RemoteTransport;
use crate::traits::Transport;

/// Routes each request to the local or the remote transport
///
/// The remote side is optional: without an endpoint every remote request
/// reports `ExecError::RemoteNotConfigured`.
#[derive(Clone)]
pub struct Executor {
    local: Arc<dyn Transport>,
    remote: Option<Arc<dyn Transport>>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("remote_configured", &self.remote.is_some())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Executor {
    /// Executor with the local shell and an optional SSH endpoint
    #[must_use]
    pub fn new(remote: Option<RemoteEndpoint>) -> Self {
        Self {
            local: Arc::new(LocalTransport::new()),
            remote: remote.map(|endpoint| {
                Arc::new(RemoteTransport::new(endpoint)) as Arc<dyn Transport>
            }),
            timeout: None,
        }
    }

    /// Executor over arbitrary transports
    pub fn with_transports(local: Arc<dyn Transport>, remote: Option<Arc<dyn Transport>>) -> Self {
        Self {
            local,
            remote,
            timeout: None,
        }
    }

    /// Apply a deadline to every request
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Whether a remote endpoint is configured
    #[must_use]
    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Pick the transport for a kind
    ///
    /// # Errors
    /// Returns `ExecError::RemoteNotConfigured` when asking for the remote
    /// transport without an endpoint
    pub fn transport(&self, kind: TransportKind) -> Result<&dyn Transport, ExecError> {
        match kind {
            TransportKind::Local => Ok(self.local.as_ref()),
            TransportKind::Remote => self
                .remote
                .as_deref()
                .ok_or(ExecError::RemoteNotConfigured),
        }
    }

    /// Run a request and return its output lines
    ///
    /// Never fails: transport errors become a single `Erro: ` stdout line.
    #[instrument(skip(self), fields(transport = %request.transport()))]
    pub async fn execute(&self, request: &ExecutionRequest) -> ExecutionResult {
        let transport = match self.transport(request.transport()) {
            Ok(transport) => transport,
            Err(e) => {
                warn!(error = %e, "no transport for request");
                return ExecutionResult::from_error(&e);
            }
        };

        debug!(command = %request.command(), "dispatching request");

        match self.timeout {
            Some(timeout) => {
                transport
                    .execute_with_timeout(request.command(), timeout)
                    .await
            }
            None => transport.execute(request.command()).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::result::CommandResult;

    struct FixedTransport {
        kind: TransportKind,
        stdout: &'static str,
    }

    #[async_trait]
    impl Transport for FixedTransport {
        async fn run(&self, _cmd: &str) -> Result<CommandResult, ExecError> {
            Ok(CommandResult {
                status: 0,
                stdout: self.stdout.to_string(),
                stderr: String::new(),
                duration: Duration::from_millis(1),
            })
        }

        async fn run_with_timeout(
            &self,
            cmd: &str,
            _timeout: Duration,
        ) -> Result<CommandResult, ExecError> {
            self.run(cmd).await
        }

        fn kind(&self) -> TransportKind {
            self.kind
        }
    }

    fn executor() -> Executor {
        Executor::with_transports(
            Arc::new(FixedTransport {
                kind: TransportKind::Local,
                stdout: "from local\n",
            }),
            Some(Arc::new(FixedTransport {
                kind: TransportKind::Remote,
                stdout: "from remote\n",
            })),
        )
    }

    #[tokio::test]
    async fn test_dispatch_by_kind() {
        let executor = executor();

        let local = executor.execute(&ExecutionRequest::local("docker ps -a")).await;
        assert_eq!(local.stdout, vec!["from local"]);

        let remote = executor.execute(&ExecutionRequest::remote("docker ps -a")).await;
        assert_eq!(remote.stdout, vec!["from remote"]);
    }

    #[tokio::test]
    async fn test_remote_without_endpoint() {
        let executor = Executor::new(None);
        assert!(!executor.has_remote());

        let result = executor.execute(&ExecutionRequest::remote("docker ps -a")).await;
        assert_eq!(result.stdout, vec!["Erro: remote endpoint not configured"]);
        assert!(result.stderr.is_empty());
    }

    #[test]
    fn test_transport_lookup() {
        let executor = executor();
        assert_eq!(
            executor.transport(TransportKind::Remote).unwrap().kind(),
            TransportKind::Remote
        );
        assert!(matches!(
            Executor::new(None).transport(TransportKind::Remote),
            Err(ExecError::RemoteNotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_local_executor_runs_shell() {
        let executor = Executor::new(None).with_timeout(Duration::from_secs(10));
        let result = executor.execute(&ExecutionRequest::local("echo hi")).await;
        assert_eq!(result.stdout, vec!["hi"]);
    }
}
