//! docker command line builders
//!
//! User-supplied values are quoted before they reach the shell. Single quotes
//! are stripped from names and image references first, since listings
//! rendered with `--format '{{...}}'` may carry them.

use shell_words::quote;

use crate::error::EngineError;
use crate::types::{ContainerAction, RunSpec};

/// List all containers
pub const LIST_CONTAINERS: &str = "docker ps -a";
/// List images
pub const LIST_IMAGES: &str = "docker images";
/// One container name per line
pub const CONTAINER_NAMES: &str = "docker ps -a --format '{{.Names}}'";
/// One `repository:tag` per line
pub const IMAGE_NAMES: &str = "docker images --format '{{.Repository}}:{{.Tag}}'";

/// Strip single quotes and surrounding whitespace
fn clean(value: &str) -> String {
    value.replace('\'', "").trim().to_string()
}

fn required(value: &str, field: &'static str) -> Result<String, EngineError> {
    let value = clean(value);
    if value.is_empty() {
        Err(EngineError::MissingField(field))
    } else {
        Ok(value)
    }
}

fn push_flag(parts: &mut Vec<String>, flag: &str, values: &[String]) {
    for value in values {
        let value = value.trim();
        if !value.is_empty() {
            parts.push(flag.to_string());
            parts.push(quote(value).into_owned());
        }
    }
}

/// `docker run -d --name <name> [-p ..] [-v ..] [-e ..] [--link ..] [--network ..] <image> [cmd]`
///
/// # Errors
/// Returns `EngineError::MissingField` for an empty name or image and
/// `EngineError::InvalidCommand` for a command with unbalanced quotes
pub fn run_container(spec: &RunSpec) -> Result<String, EngineError> {
    let name = required(&spec.name, "name")?;
    let image = required(&spec.image, "image")?;

    let mut parts = vec![
        "docker".to_string(),
        "run".to_string(),
        "-d".to_string(),
        "--name".to_string(),
        quote(&name).into_owned(),
    ];

    push_flag(&mut parts, "-p", &spec.ports);
    push_flag(&mut parts, "-v", &spec.volumes);
    push_flag(&mut parts, "-e", &spec.env);
    push_flag(&mut parts, "--link", &spec.links);
    push_flag(&mut parts, "--network", &spec.networks);

    parts.push(quote(&image).into_owned());

    if let Some(command) = spec.command.as_deref() {
        let words = shell_words::split(command)
            .map_err(|e| EngineError::InvalidCommand(format!("{command}: {e}")))?;
        parts.push(shell_words::join(words));
    }

    Ok(parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" "))
}

/// `docker build -t <tag> <context>`; image tags are lowercased
///
/// # Errors
/// Returns `EngineError::MissingField` for an empty tag or context directory
pub fn build_image(context_dir: &str, tag: &str) -> Result<String, EngineError> {
    let context_dir = required(context_dir, "context directory")?;
    let tag = required(tag, "tag")?.to_lowercase();

    Ok(format!("docker build -t {} {}", quote(&tag), quote(&context_dir)))
}

/// `docker rmi <image>`
///
/// # Errors
/// Returns `EngineError::MissingField` for an empty image reference
pub fn remove_image(image: &str) -> Result<String, EngineError> {
    let image = required(image, "image")?;
    Ok(format!("docker rmi {}", quote(&image)))
}

/// `docker stop <name>` or `docker rm <name>`
///
/// # Errors
/// Returns `EngineError::MissingField` for an empty container name
pub fn container_action(action: ContainerAction, name: &str) -> Result<String, EngineError> {
    let name = required(name, "name")?;
    Ok(format!("docker {} {}", action.subcommand(), quote(&name)))
}
