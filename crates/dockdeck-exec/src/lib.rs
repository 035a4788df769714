//! dockdeck-exec: Command execution abstraction
//!
//! Runs shell commands on the local machine or on a remote host over SSH and
//! surfaces stdout/stderr the same way for both.

pub mod endpoint;
pub mod error;
pub mod executor;
pub mod keys;
pub mod local;
pub mod result;
pub mod ssh;
pub mod traits;

pub use endpoint::{DEFAULT_SSH_PORT, RemoteEndpoint};
pub use error::ExecError;
pub use executor::Executor;
pub use keys::{AuthMethod, HostKeyPolicy, KeyError};
pub use local::LocalTransport;
pub use result::{
    CommandResult, ERROR_LINE_PREFIX, ExecutionRequest, ExecutionResult, TransportKind, error_line,
};
pub use ssh::RemoteTransport;
pub use traits::Transport;
