//! dockdeck CLI
//!
//! Inspect and manage docker containers and images locally or on a remote
//! host over SSH

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use dockdeck_engine::{CommandOutput, ContainerAction, DockerEngine, Listing, RunSpec, split_list};
use dockdeck_exec::{Executor, Transport, TransportKind};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

use config::{Config, LogConfig, LogFormat};

#[derive(Parser)]
#[command(name = "dockdeck")]
#[command(about = "Inspect and manage docker locally or over SSH", long_about = None)]
struct Cli {
    /// Config file (defaults to $DOCKDECK_CONFIG, ./dockdeck.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Run commands on the configured SSH host
    #[arg(long, global = true)]
    remote: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Give up on a command after this many seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all containers
    Ps,
    /// List images
    Images,
    /// List container names
    Names,
    /// List images as repository:tag
    #[command(name = "image-names")]
    ImageNames,
    /// Start a detached container
    Run {
        /// Container name
        #[arg(long)]
        name: String,
        /// Image reference
        image: String,
        /// Port mappings, repeatable or comma-separated
        #[arg(short = 'p', long = "publish")]
        ports: Vec<String>,
        /// Volume mounts, repeatable or comma-separated
        #[arg(short = 'v', long = "volume")]
        volumes: Vec<String>,
        /// Environment variables, repeatable or comma-separated
        #[arg(short = 'e', long = "env")]
        env: Vec<String>,
        /// Containers to link, repeatable or comma-separated
        #[arg(long = "link")]
        links: Vec<String>,
        /// Networks, repeatable or comma-separated
        #[arg(long = "network")]
        networks: Vec<String>,
        /// Command to run in the container
        #[arg(long = "cmd")]
        command: Option<String>,
    },
    /// Build an image from a directory containing a Dockerfile
    Build {
        /// Build context directory
        context_dir: String,
        /// Image tag (lowercased)
        #[arg(short = 't', long)]
        tag: String,
    },
    /// Remove an image
    Rmi {
        /// Image reference
        image: String,
    },
    /// Stop a container
    Stop {
        /// Container name
        name: String,
    },
    /// Remove a container
    Rm {
        /// Container name
        name: String,
    },
    /// Run a raw shell command
    Exec {
        /// Command words, joined with spaces and passed to the shell as-is
        #[arg(trailing_var_arg = true, required = true)]
        command: Vec<String>,
    },
    /// Check that the SSH endpoint accepts a connection
    #[command(name = "check-ssh")]
    CheckSsh,
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match log.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn flatten(values: &[String]) -> Vec<String> {
    values.iter().flat_map(|v| split_list(v)).collect()
}

/// Route stderr lines to the operator-visible error log
fn report_errors(errors: &[String]) {
    for line in errors {
        eprintln!("error: {line}");
    }
}

/// Print a listing; returns whether its command could be run
fn print_listing(listing: &Listing, json: bool) -> Result<bool> {
    if json {
        println!("{}", serde_json::to_string_pretty(listing)?);
    } else {
        print!("{}", render::table(&listing.table));
        report_errors(&listing.errors);
    }
    Ok(!listing.failed())
}

/// Print command output; returns whether the command could be run
fn print_output(output: &CommandOutput, json: bool) -> Result<bool> {
    if json {
        println!("{}", serde_json::to_string_pretty(output)?);
    } else if output.failed() {
        report_errors(&output.stdout);
    } else {
        for line in &output.stdout {
            println!("{line}");
        }
        report_errors(&output.errors);
    }
    Ok(!output.failed())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let (config, config_path) = Config::discover(cli.config.as_deref())?;
    init_tracing(&config.log);

    match &config_path {
        Some(path) => tracing::debug!(path = %path.display(), "loaded config"),
        None => tracing::debug!("no config file found, using defaults"),
    }

    let mut executor = Executor::new(config.ssh.endpoint());
    if let Some(secs) = cli.timeout {
        executor = executor.with_timeout(Duration::from_secs(secs));
    }

    let transport = if cli.remote {
        TransportKind::Remote
    } else {
        TransportKind::Local
    };

    let engine = DockerEngine::new(executor.clone(), transport);
    if engine.transport() == TransportKind::Remote && !executor.has_remote() {
        tracing::warn!("--remote given but no [ssh] host is configured");
    }

    let ran = match cli.command {
        Commands::Ps => print_listing(&engine.list_containers().await, cli.json)?,
        Commands::Images => print_listing(&engine.list_images().await, cli.json)?,
        Commands::Names => print_output(&engine.container_names().await, cli.json)?,
        Commands::ImageNames => print_output(&engine.image_names().await, cli.json)?,
        Commands::Run {
            name,
            image,
            ports,
            volumes,
            env,
            links,
            networks,
            command,
        } => {
            let spec = RunSpec {
                name,
                image,
                command,
                ports: flatten(&ports),
                volumes: flatten(&volumes),
                env: flatten(&env),
                links: flatten(&links),
                networks: flatten(&networks),
            };
            print_output(&engine.run_container(&spec).await?, cli.json)?
        }
        Commands::Build { context_dir, tag } => {
            print_output(&engine.build_image(&context_dir, &tag).await?, cli.json)?
        }
        Commands::Rmi { image } => print_output(&engine.remove_image(&image).await?, cli.json)?,
        Commands::Stop { name } => {
            let output = engine.container_action(ContainerAction::Stop, &name).await?;
            print_output(&output, cli.json)?
        }
        Commands::Rm { name } => {
            let output = engine
                .container_action(ContainerAction::Remove, &name)
                .await?;
            print_output(&output, cli.json)?
        }
        Commands::Exec { command } => {
            print_output(&engine.run_raw(&command.join(" ")).await, cli.json)?
        }
        Commands::CheckSsh => {
            let remote = executor.transport(TransportKind::Remote)?;
            let probe = match cli.timeout {
                Some(secs) => remote.run_with_timeout("true", Duration::from_secs(secs)).await,
                None => remote.run("true").await,
            };
            match probe {
                Ok(_) => println!("connection ok"),
                Err(e) if e.is_transport_failure() => eyre::bail!("SSH endpoint unreachable: {e}"),
                Err(e) => eyre::bail!("SSH check failed: {e}"),
            }
            true
        }
    };

    Ok(if ran {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
