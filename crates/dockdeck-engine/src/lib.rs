//! dockdeck-engine: docker operations over local or SSH transports
//!
//! Builds docker command lines, runs them through `dockdeck-exec` and parses
//! listings with `dockdeck-table`.

pub mod commands;
pub mod docker;
pub mod error;
pub mod types;

pub use docker::DockerEngine;
pub use error::EngineError;
pub use types::{CommandOutput, ContainerAction, Listing, RunSpec, split_list};
