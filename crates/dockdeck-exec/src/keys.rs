//! SSH authentication and host key verification

use std::fmt;
use std::path::{Path, PathBuf};

use russh::keys::{PrivateKey, check_known_hosts_path, load_secret_key, ssh_key};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How to authenticate against the remote endpoint
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMethod {
    /// Private key file on the local machine
    PrivateKeyFile(PathBuf),
    /// Password authentication
    Password(String),
}

impl AuthMethod {
    /// Pick the authentication method from configured values
    ///
    /// A configured key file always wins over a password.
    #[must_use]
    pub fn from_parts(key_file: Option<PathBuf>, password: Option<String>) -> Option<Self> {
        match (key_file, password) {
            (Some(path), _) => Some(AuthMethod::PrivateKeyFile(path)),
            (None, Some(password)) => Some(AuthMethod::Password(password)),
            (None, None) => None,
        }
    }

    /// Short label for logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            AuthMethod::PrivateKeyFile(_) => "publickey",
            AuthMethod::Password(_) => "password",
        }
    }
}

impl fmt::Debug for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMethod::PrivateKeyFile(path) => {
                f.debug_tuple("PrivateKeyFile").field(path).finish()
            }
            AuthMethod::Password(_) => f.debug_tuple("Password").field(&"<redacted>").finish(),
        }
    }
}

/// What to do with the host key presented by the server
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostKeyPolicy {
    /// Accept only keys listed in a known_hosts file
    #[default]
    KnownHosts,
    /// Accept any key without verification (like `StrictHostKeyChecking=no`)
    AcceptAny,
}

/// Key handling errors
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("key file not found: {0}")]
    NotFound(String),

    #[error("failed to load key {path}: {reason}")]
    Load { path: String, reason: String },

    #[error("known_hosts check failed: {0}")]
    KnownHosts(String),

    #[error("no known_hosts file location available")]
    NoKnownHostsPath,
}

/// Load a private key, warning if its permissions are looser than 600
pub(crate) fn load_private_key(path: &Path) -> Result<PrivateKey, KeyError> {
    if !path.exists() {
        return Err(KeyError::NotFound(path.display().to_string()));
    }

    warn_on_open_permissions(path);

    load_secret_key(path, None).map_err(|e| KeyError::Load {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

#[cfg(unix)]
fn warn_on_open_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(metadata) = std::fs::metadata(path) {
        // group/other bits set
        if metadata.permissions().mode() & 0o77 != 0 {
            warn!(path = %path.display(), "key file permissions too open (should be 600)");
        }
    }
}

#[cfg(not(unix))]
fn warn_on_open_permissions(_path: &Path) {}

/// Verify a server key against a known_hosts file
///
/// Returns `Ok(false)` for an unknown host and an error when the file lists
/// a different key for the host.
pub(crate) fn verify_known_host(
    host: &str,
    port: u16,
    key: &ssh_key::PublicKey,
    known_hosts: Option<&Path>,
) -> Result<bool, KeyError> {
    let path = match known_hosts {
        Some(path) => path.to_path_buf(),
        None => dirs::home_dir()
            .map(|home| home.join(".ssh").join("known_hosts"))
            .ok_or(KeyError::NoKnownHostsPath)?,
    };

    debug!(host, port, path = %path.display(), "checking known_hosts");

    check_known_hosts_path(host, port, key, &path).map_err(|e| KeyError::KnownHosts(e.to_string()))
}
