//! SSH command execution using russh crate

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use russh::keys::{PrivateKeyWithHashAlg, ssh_key};
use russh::{ChannelMsg, Disconnect, client};
use tracing::{debug, error, info, instrument, warn};

use crate::endpoint::RemoteEndpoint;
use crate::error::ExecError;
use crate::keys::{AuthMethod, HostKeyPolicy, load_private_key, verify_known_host};
use crate::result::{CommandResult, TransportKind};
use crate::traits::{Transport, with_deadline};

/// SSH client handler for russh
#[derive(Debug)]
struct SshClientHandler {
    host: String,
    port: u16,
    policy: HostKeyPolicy,
    known_hosts: Option<PathBuf>,
}

impl SshClientHandler {
    fn for_endpoint(endpoint: &RemoteEndpoint) -> Self {
        Self {
            host: endpoint.host.clone(),
            port: endpoint.port,
            policy: endpoint.host_key_policy.clone(),
            known_hosts: endpoint.known_hosts.clone(),
        }
    }
}

impl client::Handler for SshClientHandler {
    type Error = ExecError;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> Result<bool, Self::Error> {
        match self.policy {
            HostKeyPolicy::AcceptAny => {
                warn!(
                    host = %self.host,
                    port = self.port,
                    "accepting server host key without verification"
                );
                Ok(true)
            }
            HostKeyPolicy::KnownHosts => {
                let known = verify_known_host(
                    &self.host,
                    self.port,
                    server_public_key,
                    self.known_hosts.as_deref(),
                )
                .map_err(|e| ExecError::HostKeyRejected {
                    host: self.host.clone(),
                    port: self.port,
                    reason: e.to_string(),
                })?;

                if known {
                    Ok(true)
                } else {
                    Err(ExecError::HostKeyRejected {
                        host: self.host.clone(),
                        port: self.port,
                        reason: "host not present in known_hosts".to_string(),
                    })
                }
            }
        }
    }
}

type Session = client::Handle<SshClientHandler>;

/// SSH command transport
///
/// Every call opens its own connection, runs one command and disconnects.
/// Nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct RemoteTransport {
    endpoint: RemoteEndpoint,
    config: Arc<client::Config>,
}

impl RemoteTransport {
    /// Create a new SSH transport for an endpoint
    #[must_use]
    pub fn new(endpoint: RemoteEndpoint) -> Self {
        Self {
            endpoint,
            config: Arc::new(client::Config::default()),
        }
    }

    /// Get endpoint
    pub fn endpoint(&self) -> &RemoteEndpoint {
        &self.endpoint
    }

    /// Connect and authenticate
    ///
    /// A session that fails authentication is disconnected before returning.
    #[instrument(skip(self), fields(host = %self.endpoint.host))]
    async fn connect(&self) -> Result<Session, ExecError> {
        info!(
            address = %self.endpoint.address(),
            user = %self.endpoint.user,
            auth = self.endpoint.auth.kind(),
            "connecting to SSH"
        );

        let mut session = client::connect(
            self.config.clone(),
            (&self.endpoint.host[..], self.endpoint.port),
            SshClientHandler::for_endpoint(&self.endpoint),
        )
        .await?;

        if let Err(e) = self.authenticate(&mut session).await {
            close(&session, &self.endpoint).await;
            return Err(e);
        }

        info!(host = %self.endpoint.host, "SSH connected and authenticated");

        Ok(session)
    }

    async fn authenticate(&self, session: &mut Session) -> Result<(), ExecError> {
        let user = &self.endpoint.user;

        let auth_res = match &self.endpoint.auth {
            AuthMethod::PrivateKeyFile(key_path) => {
                let key_pair =
                    load_private_key(key_path).map_err(|e| ExecError::SshKeyError(e.to_string()))?;

                let hash_alg = session
                    .best_supported_rsa_hash()
                    .await
                    .ok()
                    .flatten()
                    .flatten();

                session
                    .authenticate_publickey(
                        user,
                        PrivateKeyWithHashAlg::new(Arc::new(key_pair), hash_alg),
                    )
                    .await
                    .map_err(|e| ExecError::AuthenticationFailed(e.to_string()))?
            }
            AuthMethod::Password(password) => session
                .authenticate_password(user, password)
                .await
                .map_err(|e| ExecError::AuthenticationFailed(e.to_string()))?,
        };

        if auth_res.success() {
            Ok(())
        } else {
            Err(ExecError::AuthenticationFailed(format!(
                "{} authentication rejected for user {user}",
                self.endpoint.auth.kind()
            )))
        }
    }

    /// Execute command on an authenticated session
    #[instrument(skip(self, session, cmd), fields(host = %self.endpoint.host))]
    async fn execute_remote(
        &self,
        session: &mut Session,
        cmd: &str,
    ) -> Result<CommandResult, ExecError> {
        debug!(command = %cmd, "executing remote command");

        let start = Instant::now();

        let mut channel = session
            .channel_open_session()
            .await
            .map_err(|e| ExecError::IoError(e.to_string()))?;

        channel
            .exec(true, cmd)
            .await
            .map_err(|e| ExecError::IoError(e.to_string()))?;

        let mut status = -1;
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();

        // exit-status may arrive after EOF, so drain until the channel closes
        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { data } => {
                    stdout.extend_from_slice(&data);
                }
                ChannelMsg::ExtendedData { data, ext } => {
                    if ext == 1 {
                        // stderr
                        stderr.extend_from_slice(&data);
                    }
                }
                ChannelMsg::ExitStatus { exit_status } => {
                    status = exit_status.cast_signed();
                }
                _ => {}
            }
        }

        let duration = start.elapsed();
        let stdout = String::from_utf8_lossy(&stdout).to_string();
        let stderr = String::from_utf8_lossy(&stderr).to_string();

        debug!(
            command = %cmd,
            status = status,
            duration = ?duration,
            "remote command completed"
        );

        if status != 0 {
            error!(
                command = %cmd,
                status = status,
                stderr = %stderr,
                "remote command failed"
            );
        }

        Ok(CommandResult {
            status,
            stdout,
            stderr,
            duration,
        })
    }

    /// One full connect, execute, disconnect cycle
    async fn connect_and_execute(&self, cmd: &str) -> Result<CommandResult, ExecError> {
        let mut session = self.connect().await?;
        let result = self.execute_remote(&mut session, cmd).await;
        close(&session, &self.endpoint).await;
        result
    }
}

/// Disconnect a session, logging instead of failing
async fn close(session: &Session, endpoint: &RemoteEndpoint) {
    match session
        .disconnect(Disconnect::ByApplication, "", "English")
        .await
    {
        Ok(()) => info!(host = %endpoint.host, "SSH disconnected"),
        Err(e) => warn!(host = %endpoint.host, error = %e, "SSH disconnect failed"),
    }
}

#[async_trait]
impl Transport for RemoteTransport {
    #[instrument(skip(self), fields(host = %self.endpoint.host))]
    async fn run(&self, cmd: &str) -> Result<CommandResult, ExecError> {
        self.connect_and_execute(cmd).await
    }

    #[instrument(skip(self), fields(host = %self.endpoint.host))]
    async fn run_with_timeout(
        &self,
        cmd: &str,
        timeout: Duration,
    ) -> Result<CommandResult, ExecError> {
        // dropping the session handle on expiry closes the connection
        with_deadline(timeout, self.connect_and_execute(cmd)).await
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Remote
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_endpoint() -> RemoteEndpoint {
        // port 1 on loopback is closed on any sane test machine
        RemoteEndpoint::new("127.0.0.1", "ops", AuthMethod::Password("secret".to_string()))
            .with_port(1)
    }

    #[tokio::test]
    async fn test_connection_refused_is_error() {
        let transport = RemoteTransport::new(unreachable_endpoint());
        let err = transport.run("docker ps -a").await.unwrap_err();

        assert!(matches!(err, ExecError::ConnectionFailed(_)));
        assert!(err.is_transport_failure());
    }

    #[tokio::test]
    async fn test_connection_refused_becomes_error_line() {
        let transport = RemoteTransport::new(unreachable_endpoint());
        let result = transport.execute("docker ps -a").await;

        assert_eq!(result.stdout.len(), 1);
        assert!(result.stdout[0].starts_with("Erro: "));
        assert!(result.stdout[0].len() > "Erro: ".len());
        assert!(result.stderr.is_empty());
    }

    #[test]
    fn test_kind() {
        let transport = RemoteTransport::new(unreachable_endpoint());
        assert_eq!(transport.kind(), TransportKind::Remote);
        assert_eq!(transport.endpoint().port, 1);
    }

    #[tokio::test]
    async fn test_accept_any_policy() {
        let key = ssh_key::PublicKey::from_openssh(
            "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAILM+rvN+ot98qgEN796jTiQfZfG1KaT0PtFDJ/XFSqti",
        )
        .unwrap();
        let endpoint = unreachable_endpoint().with_host_key_policy(HostKeyPolicy::AcceptAny);
        let mut handler = SshClientHandler::for_endpoint(&endpoint);

        let accepted = client::Handler::check_server_key(&mut handler, &key)
            .await
            .unwrap();
        assert!(accepted);
    }

    #[tokio::test]
    async fn test_known_hosts_policy_rejects_unknown_key() {
        let key = ssh_key::PublicKey::from_openssh(
            "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAILM+rvN+ot98qgEN796jTiQfZfG1KaT0PtFDJ/XFSqti",
        )
        .unwrap();
        let known_hosts = tempfile::NamedTempFile::new().unwrap();
        let endpoint = unreachable_endpoint().with_known_hosts(known_hosts.path());
        let mut handler = SshClientHandler::for_endpoint(&endpoint);

        let err = client::Handler::check_server_key(&mut handler, &key)
            .await
            .unwrap_err();
        assert!(matches!(err, ExecError::HostKeyRejected { .. }));
    }
}
