//! Remote endpoint configuration

use std::path::PathBuf;

use crate::keys::{AuthMethod, HostKeyPolicy};

/// Default SSH port
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Connection details for the remote host
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEndpoint {
    /// Host address
    pub host: String,
    /// Port (default 22)
    pub port: u16,
    /// Username
    pub user: String,
    /// Authentication method
    pub auth: AuthMethod,
    /// Host key verification policy
    pub host_key_policy: HostKeyPolicy,
    /// known_hosts file override (defaults to `~/.ssh/known_hosts`)
    pub known_hosts: Option<PathBuf>,
}

impl RemoteEndpoint {
    /// Create new endpoint on the default port with known_hosts verification
    pub fn new(host: impl Into<String>, user: impl Into<String>, auth: AuthMethod) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_SSH_PORT,
            user: user.into(),
            auth,
            host_key_policy: HostKeyPolicy::default(),
            known_hosts: None,
        }
    }

    /// Set custom port
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set host key policy
    #[must_use]
    pub fn with_host_key_policy(mut self, policy: HostKeyPolicy) -> Self {
        self.host_key_policy = policy;
        self
    }

    /// Use a specific known_hosts file
    #[must_use]
    pub fn with_known_hosts(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts = Some(path.into());
        self
    }

    /// `host:port` for logs
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let endpoint = RemoteEndpoint::new(
            "docker01.lan",
            "ops",
            AuthMethod::Password("secret".to_string()),
        );
        assert_eq!(endpoint.port, 22);
        assert_eq!(endpoint.host_key_policy, HostKeyPolicy::KnownHosts);
        assert!(endpoint.known_hosts.is_none());
        assert_eq!(endpoint.address(), "docker01.lan:22");
    }

    #[test]
    fn test_builder() {
        let endpoint = RemoteEndpoint::new(
            "docker01.lan",
            "ops",
            AuthMethod::Password("secret".to_string()),
        )
        .with_port(2222)
        .with_host_key_policy(HostKeyPolicy::AcceptAny)
        .with_known_hosts("/etc/ssh/ssh_known_hosts");

        assert_eq!(endpoint.address(), "docker01.lan:2222");
        assert_eq!(endpoint.host_key_policy, HostKeyPolicy::AcceptAny);
        assert_eq!(
            endpoint.known_hosts,
            Some(PathBuf::from("/etc/ssh/ssh_known_hosts"))
        );
    }
}
