//! Container engine operations over an executor

use dockdeck_exec::{ExecutionRequest, ExecutionResult, Executor, TransportKind};
use dockdeck_table::{ListingKind, ParsedTable, parse_listing};
use tracing::{debug, info, instrument, warn};

use crate::commands;
use crate::error::EngineError;
use crate::types::{CommandOutput, ContainerAction, Listing, RunSpec};

/// docker CLI driver
///
/// Builds command strings, runs them on one transport and parses listings.
/// stderr lines are handed back to the caller for its error log.
#[derive(Debug, Clone)]
pub struct DockerEngine {
    executor: Executor,
    transport: TransportKind,
}

impl DockerEngine {
    /// Create an engine that runs every command on `transport`
    #[must_use]
    pub fn new(executor: Executor, transport: TransportKind) -> Self {
        Self {
            executor,
            transport,
        }
    }

    /// Transport used for commands
    #[must_use]
    pub fn transport(&self) -> TransportKind {
        self.transport
    }

    /// Run a raw command string
    #[instrument(skip(self), fields(transport = %self.transport))]
    pub async fn run_raw(&self, command: &str) -> CommandOutput {
        let result = self.execute(command).await;
        CommandOutput {
            command: command.to_string(),
            stdout: result.stdout,
            errors: result.stderr,
        }
    }

    /// `docker ps -a`
    #[instrument(skip(self), fields(transport = %self.transport))]
    pub async fn list_containers(&self) -> Listing {
        self.listing(commands::LIST_CONTAINERS, ListingKind::Containers)
            .await
    }

    /// `docker images`
    #[instrument(skip(self), fields(transport = %self.transport))]
    pub async fn list_images(&self) -> Listing {
        self.listing(commands::LIST_IMAGES, ListingKind::Images).await
    }

    /// Container names, one per entry
    pub async fn container_names(&self) -> CommandOutput {
        self.run_raw(commands::CONTAINER_NAMES).await
    }

    /// `repository:tag` of every image
    pub async fn image_names(&self) -> CommandOutput {
        self.run_raw(commands::IMAGE_NAMES).await
    }

    /// Start a detached container
    ///
    /// # Errors
    /// Returns `EngineError` when the spec cannot be turned into a command
    #[instrument(skip(self, spec), fields(name = %spec.name, image = %spec.image))]
    pub async fn run_container(&self, spec: &RunSpec) -> Result<CommandOutput, EngineError> {
        let command = commands::run_container(spec)?;
        info!(name = %spec.name, "starting container");
        Ok(self.run_raw(&command).await)
    }

    /// Build an image from a context directory
    ///
    /// # Errors
    /// Returns `EngineError::MissingField` for an empty tag or directory
    #[instrument(skip(self))]
    pub async fn build_image(
        &self,
        context_dir: &str,
        tag: &str,
    ) -> Result<CommandOutput, EngineError> {
        let command = commands::build_image(context_dir, tag)?;
        info!(tag, "building image");
        Ok(self.run_raw(&command).await)
    }

    /// Remove an image
    ///
    /// # Errors
    /// Returns `EngineError::MissingField` for an empty image reference
    #[instrument(skip(self))]
    pub async fn remove_image(&self, image: &str) -> Result<CommandOutput, EngineError> {
        let command = commands::remove_image(image)?;
        Ok(self.run_raw(&command).await)
    }

    /// Stop or remove a container
    ///
    /// # Errors
    /// Returns `EngineError::MissingField` for an empty container name
    #[instrument(skip(self))]
    pub async fn container_action(
        &self,
        action: ContainerAction,
        name: &str,
    ) -> Result<CommandOutput, EngineError> {
        let command = commands::container_action(action, name)?;
        Ok(self.run_raw(&command).await)
    }

    async fn listing(&self, command: &str, kind: ListingKind) -> Listing {
        let result = self.execute(command).await;

        // not a header line; keep it out of the parser
        if let Some(line) = result.error_line() {
            return Listing {
                table: ParsedTable::default(),
                errors: vec![line.to_string()],
            };
        }

        let table = parse_listing(kind, &result.stdout);

        debug!(
            kind = ?kind,
            rows = table.rows().len(),
            "parsed listing"
        );

        Listing {
            table,
            errors: result.stderr,
        }
    }

    async fn execute(&self, command: &str) -> ExecutionResult {
        let request = ExecutionRequest::new(command, self.transport);
        let result = self.executor.execute(&request).await;

        for line in &result.stderr {
            warn!(command, stderr = %line, "command reported an error");
        }
        if let Some(line) = result.error_line() {
            warn!(command, error = %line, "command could not be run");
        }

        result
    }
}
