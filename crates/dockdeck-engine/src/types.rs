//! Type definitions for engine operations

use std::fmt;
use std::str::FromStr;

use dockdeck_table::ParsedTable;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Options for `docker run -d`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSpec {
    /// Container name
    pub name: String,
    /// Image reference
    pub image: String,
    /// Command passed after the image
    pub command: Option<String>,
    /// Port mappings (`-p`)
    pub ports: Vec<String>,
    /// Volume mounts (`-v`)
    pub volumes: Vec<String>,
    /// Environment variables (`-e`)
    pub env: Vec<String>,
    /// Containers this one depends on (`--link`)
    pub links: Vec<String>,
    /// Networks to attach (`--network`)
    pub networks: Vec<String>,
}

impl RunSpec {
    /// Create a spec with the required fields
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            ..Self::default()
        }
    }

    /// Set the container command
    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Add a port mapping
    #[must_use]
    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.ports.push(port.into());
        self
    }

    /// Add a volume mount
    #[must_use]
    pub fn with_volume(mut self, volume: impl Into<String>) -> Self {
        self.volumes.push(volume.into());
        self
    }

    /// Add an environment variable
    #[must_use]
    pub fn with_env(mut self, var: impl Into<String>) -> Self {
        self.env.push(var.into());
        self
    }

    /// Add a linked container
    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.links.push(link.into());
        self
    }

    /// Add a network
    #[must_use]
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.networks.push(network.into());
        self
    }
}

/// Split a comma-separated list, dropping blank entries
#[must_use]
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lifecycle action on an existing container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerAction {
    /// `docker stop`
    Stop,
    /// `docker rm`
    Remove,
}

impl ContainerAction {
    /// docker subcommand
    #[must_use]
    pub fn subcommand(self) -> &'static str {
        match self {
            ContainerAction::Stop => "stop",
            ContainerAction::Remove => "rm",
        }
    }
}

impl fmt::Display for ContainerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subcommand())
    }
}

impl FromStr for ContainerAction {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "stop" => Ok(ContainerAction::Stop),
            "rm" | "remove" => Ok(ContainerAction::Remove),
            other => Err(EngineError::UnknownAction(other.to_string())),
        }
    }
}

/// Parsed listing plus the stderr lines of the command that produced it
///
/// When the command could not be run the table is empty and `errors` holds
/// the single `Erro: ` line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Listing {
    /// Parsed rows
    pub table: ParsedTable,
    /// stderr lines, for the error log
    pub errors: Vec<String>,
}

impl Listing {
    /// Whether the listing command could not be run at all
    #[must_use]
    pub fn failed(&self) -> bool {
        self.table.is_empty() && dockdeck_exec::error_line(&self.errors).is_some()
    }
}

/// Output of an engine action
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandOutput {
    /// Command that was run
    pub command: String,
    /// stdout lines (or the single `Erro: ` line)
    pub stdout: Vec<String>,
    /// stderr lines, for the error log
    pub errors: Vec<String>,
}

impl CommandOutput {
    /// Whether the command reported anything on stderr or failed to run
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.failed() || !self.errors.is_empty()
    }

    /// Whether the command could not be run at all
    #[must_use]
    pub fn failed(&self) -> bool {
        dockdeck_exec::error_line(&self.stdout).is_some()
    }
}
