//! Configuration loading and types

use std::path::{Path, PathBuf};

use dockdeck_exec::{AuthMethod, DEFAULT_SSH_PORT, HostKeyPolicy, RemoteEndpoint};
use serde::{Deserialize, Serialize};

/// Environment variable pointing at a config file
pub const CONFIG_ENV: &str = "DOCKDECK_CONFIG";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote endpoint settings
    #[serde(default)]
    pub ssh: SshConfig,
    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
}

/// `[ssh]` section
///
/// Every key is optional. Without a `host` the remote transport stays
/// unconfigured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshConfig {
    /// Remote host
    pub host: Option<String>,
    /// SSH port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Login user (defaults to root)
    pub user: Option<String>,
    /// Password, used only without `key_file`
    pub password: Option<String>,
    /// Private key path
    pub key_file: Option<PathBuf>,
    /// Host key verification
    #[serde(default)]
    pub host_key_check: HostKeyPolicy,
    /// known_hosts override
    pub known_hosts: Option<PathBuf>,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: default_port(),
            user: None,
            password: None,
            key_file: None,
            host_key_check: HostKeyPolicy::default(),
            known_hosts: None,
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_SSH_PORT
}

fn default_user() -> String {
    "root".to_string()
}

impl SshConfig {
    /// Build the remote endpoint, if a host is configured
    #[must_use]
    pub fn endpoint(&self) -> Option<RemoteEndpoint> {
        let host = self.host.as_deref().filter(|h| !h.trim().is_empty())?;
        let user = self.user.clone().unwrap_or_else(default_user);

        let auth = AuthMethod::from_parts(self.key_file.clone(), self.password.clone())
            .unwrap_or_else(|| {
                tracing::warn!(host, "no key_file or password configured, trying empty password");
                AuthMethod::Password(String::new())
            });

        let mut endpoint = RemoteEndpoint::new(host, user, auth)
            .with_port(self.port)
            .with_host_key_policy(self.host_key_check.clone());
        if let Some(path) = &self.known_hosts {
            endpoint = endpoint.with_known_hosts(path.clone());
        }
        Some(endpoint)
    }
}

/// `[log]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error), `warn` unless set
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human readable
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre::eyre!("failed to read {}: {e}", path.display()))?;
        Self::parse(&content).map_err(|e| eyre::eyre!("invalid config {}: {e}", path.display()))
    }

    /// Parse configuration text
    ///
    /// # Errors
    /// Returns error on invalid TOML
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load from an explicit path, the environment or default paths
    ///
    /// Returns the path that was used, if any.
    ///
    /// # Errors
    /// Returns error if a found file cannot be read or parsed
    pub fn discover(explicit: Option<&Path>) -> eyre::Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            return Ok((Self::load(&path)?, Some(path)));
        }

        for path in default_paths() {
            if path.exists() {
                return Ok((Self::load(&path)?, Some(path)));
            }
        }

        Ok((Config::default(), None))
    }
}

fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("dockdeck.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("dockdeck").join("dockdeck.toml"));
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_has_no_remote() {
        let config = Config::parse("").unwrap();
        assert!(config.ssh.endpoint().is_none());
        assert_eq!(config.ssh.port, 22);
        assert_eq!(config.log.level, "warn");
        assert_eq!(config.log.format, LogFormat::Text);
    }

    #[test]
    fn test_full_ssh_section() {
        let config = Config::parse(
            r#"
[ssh]
host = "docker01.lan"
port = 2222
user = "ops"
password = "secret"
key_file = "/home/ops/.ssh/id_ed25519"
host_key_check = "accept-any"
known_hosts = "/etc/ssh/ssh_known_hosts"

[log]
level = "debug"
format = "json"
"#,
        )
        .unwrap();

        let endpoint = config.ssh.endpoint().unwrap();
        assert_eq!(endpoint.host, "docker01.lan");
        assert_eq!(endpoint.port, 2222);
        assert_eq!(endpoint.user, "ops");
        assert_eq!(
            endpoint.auth,
            AuthMethod::PrivateKeyFile(PathBuf::from("/home/ops/.ssh/id_ed25519"))
        );
        assert_eq!(endpoint.host_key_policy, HostKeyPolicy::AcceptAny);
        assert_eq!(
            endpoint.known_hosts,
            Some(PathBuf::from("/etc/ssh/ssh_known_hosts"))
        );
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn test_password_only() {
        let config = Config::parse(
            r#"
[ssh]
host = "docker01.lan"
password = "secret"
"#,
        )
        .unwrap();

        let endpoint = config.ssh.endpoint().unwrap();
        assert_eq!(endpoint.port, 22);
        assert_eq!(endpoint.user, "root");
        assert_eq!(endpoint.auth, AuthMethod::Password("secret".to_string()));
        assert_eq!(endpoint.host_key_policy, HostKeyPolicy::KnownHosts);
    }

    #[test]
    fn test_missing_credentials_degrade() {
        let config = Config::parse("[ssh]\nhost = \"docker01.lan\"\n").unwrap();
        let endpoint = config.ssh.endpoint().unwrap();
        assert_eq!(endpoint.auth, AuthMethod::Password(String::new()));
    }

    #[test]
    fn test_blank_host_is_unconfigured() {
        let config = Config::parse("[ssh]\nhost = \"  \"\n").unwrap();
        assert!(config.ssh.endpoint().is_none());
    }

    #[test]
    fn test_invalid_policy_rejected() {
        assert!(Config::parse("[ssh]\nhost_key_check = \"sometimes\"\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dockdeck.toml");
        std::fs::write(&path, "[ssh]\nhost = \"10.0.0.5\"\nuser = \"deploy\"\n").unwrap();

        let (config, used) = Config::discover(Some(&path)).unwrap();
        assert_eq!(used, Some(path));
        assert_eq!(config.ssh.endpoint().unwrap().user, "deploy");
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::discover(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
