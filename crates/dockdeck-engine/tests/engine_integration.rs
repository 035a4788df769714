use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use dockdeck_engine::*;
use dockdeck_exec::{CommandResult, ExecError, Executor, Transport, TransportKind};

// Mock transport that records commands and replays canned output
struct MockTransport {
    kind: TransportKind,
    stdout: String,
    stderr: String,
    fail: bool,
    seen: Mutex<Vec<String>>,
}

impl MockTransport {
    fn new(kind: TransportKind, stdout: &str, stderr: &str) -> Arc<Self> {
        Arc::new(Self {
            kind,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            fail: false,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn failing(kind: TransportKind) -> Arc<Self> {
        Arc::new(Self {
            kind,
            stdout: String::new(),
            stderr: String::new(),
            fail: true,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn commands(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn run(&self, cmd: &str) -> Result<CommandResult, ExecError> {
        self.seen.lock().unwrap().push(cmd.to_string());
        if self.fail {
            return Err(ExecError::AuthenticationFailed(
                "password authentication rejected for user ops".to_string(),
            ));
        }
        Ok(CommandResult {
            status: i32::from(!self.stderr.is_empty()),
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
            duration: Duration::from_millis(1),
        })
    }

    async fn run_with_timeout(
        &self,
        cmd: &str,
        _timeout: Duration,
    ) -> Result<CommandResult, ExecError> {
        self.run(cmd).await
    }

    fn kind(&self) -> TransportKind {
        self.kind
    }
}

const PS_OUTPUT: &str = "\
CONTAINER ID   IMAGE          COMMAND                  CREATED       STATUS       PORTS                NAMES
3f4e8b2c1d0a   nginx:latest   \"/docker-entrypoint.…\"   2 hours ago   Up 2 hours   0.0.0.0:80->80/tcp   web1
";

const IMAGES_OUTPUT: &str = "\
REPOSITORY   TAG       IMAGE ID       CREATED       SIZE
nginx        latest    605c77e624dd   2 weeks ago   141MB
";

fn local_engine(transport: Arc<MockTransport>) -> DockerEngine {
    let executor = Executor::with_transports(transport, None);
    DockerEngine::new(executor, TransportKind::Local)
}

#[tokio::test]
async fn list_containers_parses_ps_output() {
    let transport = MockTransport::new(TransportKind::Local, PS_OUTPUT, "");
    let engine = local_engine(transport.clone());

    let listing = engine.list_containers().await;

    assert_eq!(transport.commands(), vec!["docker ps -a"]);
    assert_eq!(listing.table.headers().len(), 7);
    assert_eq!(listing.table.cell(0, "NAMES"), Some("web1"));
    assert!(listing.errors.is_empty());
}

#[tokio::test]
async fn list_images_uses_image_headers() {
    let transport = MockTransport::new(TransportKind::Local, IMAGES_OUTPUT, "");
    let engine = local_engine(transport.clone());

    let listing = engine.list_images().await;

    assert_eq!(transport.commands(), vec!["docker images"]);
    assert_eq!(
        listing.table.headers(),
        ["REPOSITORY", "TAG", "IMAGE ID", "CREATED", "SIZE"]
    );
    assert_eq!(listing.table.cell(0, "IMAGE ID"), Some("605c77e624dd"));
}

#[tokio::test]
async fn stderr_is_returned_for_the_error_log() {
    let transport = MockTransport::new(
        TransportKind::Local,
        "",
        "Cannot connect to the Docker daemon at unix:///var/run/docker.sock.\n",
    );
    let engine = local_engine(transport);

    let listing = engine.list_containers().await;

    assert!(listing.table.is_empty());
    assert_eq!(
        listing.errors,
        vec!["Cannot connect to the Docker daemon at unix:///var/run/docker.sock."]
    );
}

#[tokio::test]
async fn remote_failure_surfaces_as_error_line() {
    let local = MockTransport::new(TransportKind::Local, "", "");
    let remote = MockTransport::failing(TransportKind::Remote);
    let executor =
        Executor::with_transports(local.clone(), Some(remote.clone() as Arc<dyn Transport>));
    let engine = DockerEngine::new(executor, TransportKind::Remote);

    let output = engine
        .container_action(ContainerAction::Stop, "web1")
        .await
        .unwrap();

    assert!(local.commands().is_empty());
    assert_eq!(remote.commands(), vec!["docker stop web1"]);
    assert_eq!(
        output.stdout,
        vec!["Erro: authentication failed: password authentication rejected for user ops"]
    );
    assert!(output.errors.is_empty());
    assert!(output.has_errors());
}

#[tokio::test]
async fn failed_listing_reports_error_line() {
    let remote = MockTransport::failing(TransportKind::Remote);
    let executor = Executor::with_transports(
        MockTransport::new(TransportKind::Local, "", ""),
        Some(remote as Arc<dyn Transport>),
    );
    let engine = DockerEngine::new(executor, TransportKind::Remote);

    let listing = engine.list_containers().await;

    assert!(listing.table.is_empty());
    assert!(listing.table.headers().is_empty());
    assert_eq!(
        listing.errors,
        vec!["Erro: authentication failed: password authentication rejected for user ops"]
    );
    assert!(listing.failed());

    let json = serde_json::to_value(&listing).unwrap();
    assert!(
        json["errors"][0]
            .as_str()
            .unwrap()
            .starts_with("Erro: authentication failed")
    );
}

#[tokio::test]
async fn unconfigured_remote_listing_reports_error_line() {
    let executor =
        Executor::with_transports(MockTransport::new(TransportKind::Local, PS_OUTPUT, ""), None);
    let engine = DockerEngine::new(executor, TransportKind::Remote);

    let listing = engine.list_images().await;

    assert!(listing.table.rows().is_empty());
    assert_eq!(listing.errors, vec!["Erro: remote endpoint not configured"]);
}

#[tokio::test]
async fn listing_stderr_is_not_a_failure() {
    let transport = MockTransport::new(
        TransportKind::Local,
        IMAGES_OUTPUT,
        "WARNING: Error loading config file\n",
    );
    let engine = local_engine(transport);

    let listing = engine.list_images().await;

    assert_eq!(listing.table.rows().len(), 1);
    assert!(!listing.failed());
    assert_eq!(listing.errors, vec!["WARNING: Error loading config file"]);
}

#[tokio::test]
async fn run_container_builds_full_command() {
    let transport = MockTransport::new(TransportKind::Local, "f00dfeed\n", "");
    let engine = local_engine(transport.clone());

    let spec = RunSpec::new("web1", "nginx:latest")
        .with_port("8080:80")
        .with_network("frontend")
        .with_link("db");
    let output = engine.run_container(&spec).await.unwrap();

    assert_eq!(
        transport.commands(),
        vec!["docker run -d --name web1 -p 8080:80 --link db --network frontend nginx:latest"]
    );
    assert_eq!(output.stdout, vec!["f00dfeed"]);
    assert!(!output.has_errors());
}

#[tokio::test]
async fn invalid_input_never_reaches_the_shell() {
    let transport = MockTransport::new(TransportKind::Local, "", "");
    let engine = local_engine(transport.clone());

    assert_eq!(
        engine.remove_image("").await.unwrap_err(),
        EngineError::MissingField("image")
    );
    assert!(engine.build_image("", "app").await.is_err());
    assert!(transport.commands().is_empty());
}

#[tokio::test]
async fn name_lists_use_format_templates() {
    let transport = MockTransport::new(TransportKind::Local, "web1\ndb\n", "");
    let engine = local_engine(transport.clone());

    let names = engine.container_names().await;
    let _ = engine.image_names().await;

    assert_eq!(names.stdout, vec!["web1", "db"]);
    assert_eq!(
        transport.commands(),
        vec![
            "docker ps -a --format '{{.Names}}'",
            "docker images --format '{{.Repository}}:{{.Tag}}'",
        ]
    );
}

#[tokio::test]
async fn build_and_remove_commands() {
    let transport = MockTransport::new(TransportKind::Local, "", "");
    let engine = local_engine(transport.clone());

    engine.build_image("/srv/app", "MyApp").await.unwrap();
    engine.remove_image("'myapp:latest'").await.unwrap();
    engine
        .container_action(ContainerAction::Remove, "web1")
        .await
        .unwrap();

    assert_eq!(
        transport.commands(),
        vec![
            "docker build -t myapp /srv/app",
            "docker rmi myapp:latest",
            "docker rm web1",
        ]
    );
}
