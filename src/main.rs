//! yocto - command-line client for the Yoctoprint printer host
//!
//! ## Usage
//!
//! ```bash
//! # Print the current status once
//! yocto --host octopi.local status
//!
//! # Follow status updates as JSON lines
//! yocto watch --count 10
//!
//! # Jog the head up 5mm, home all axes and show the resulting status
//! yocto move --z 5
//! yocto home --wait
//!
//! # Store a file on the host
//! yocto upload-gcode ./benchy.gcode
//!
//! # Arbitrary command
//! yocto cmd POST set_temperature --body '{"to_set": "HOTEND", "target": 210}'
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};
use yocto_client::{
    ApiClient, ClientError, PollerConfig, Response, ServerAddress, StatusPoller, parse_method,
};
use yocto_config::ClientConfig;
use yocto_core::{LogGuard, RelativeMove, StatusSnapshot, init_logging};

/// Yoctoprint client
///
/// Polls the printer host's status and sends it commands.
#[derive(Parser, Debug)]
#[command(name = "yocto")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Directory for log files (defaults to ~/.yoctoprint/logs/)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Config file (defaults to ~/.yoctoprint/client.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Printer host name, overrides the config file
    #[arg(long)]
    host: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the status once and print it as JSON
    Status,

    /// Poll the status and print every update as a JSON line
    Watch {
        /// Stop after this many updates
        #[arg(long)]
        count: Option<usize>,
    },

    /// Home all axes
    Home {
        /// Refresh and print the status once the command went through
        #[arg(long)]
        wait: bool,
    },

    /// Jog the head relative to its current position (mm)
    Move {
        #[arg(long, allow_hyphen_values = true)]
        x: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        y: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        z: Option<f64>,
        /// Extruder
        #[arg(long, allow_hyphen_values = true)]
        e: Option<f64>,
        /// Refresh and print the status once the command went through
        #[arg(long)]
        wait: bool,
    },

    /// List G-code files stored on the host
    ListGcode,

    /// Upload a G-code file to the host
    UploadGcode {
        /// Local G-code file
        file: PathBuf,
        /// Name to store it under on the host (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
        /// Refresh and print the status once the upload went through
        #[arg(long)]
        wait: bool,
    },

    /// Send an arbitrary command and print the raw response
    Cmd {
        /// HTTP method, e.g. POST
        method: String,
        /// Path below /api/
        path: String,
        /// JSON request body
        #[arg(long)]
        body: Option<String>,
    },

    /// Print the URL of the host's console WebSocket
    ConsoleUrl,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match setup_logging(&cli) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::from(1);
        }
    };

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("yocto error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

/// Set up logging based on CLI arguments.
fn setup_logging(cli: &Cli) -> yocto_core::Result<LogGuard> {
    let debug = cli.verbose > 0;
    init_logging(cli.log_dir.clone(), debug)
}

/// Resolve configuration: explicit file, then default file, then defaults.
/// `--host` wins over all of them.
fn load_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let config = match &cli.config {
        Some(path) => ClientConfig::load_from(path).map_err(with_guidance)?,
        None => ClientConfig::load().map_err(with_guidance)?.unwrap_or_default(),
    };

    let config = match &cli.host {
        Some(host) => config.with_host(host.clone()),
        None => config,
    };
    config.validate().map_err(with_guidance)?;
    Ok(config)
}

fn with_guidance(err: yocto_core::YoctoError) -> anyhow::Error {
    match err.guidance() {
        Some(hint) => anyhow::anyhow!("{} ({})", err, hint),
        None => anyhow::Error::new(err),
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(&cli)?;
    let client = ApiClient::new(ServerAddress::new(config.host.clone()));
    info!(host = %client.address(), "using printer host");

    match cli.command {
        Command::Status => match client.fetch_status().await {
            Ok(status) => {
                println!("{}", serde_json::to_string_pretty(&status)?);
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                warn!(error = %e, "status fetch failed");
                println!(
                    "{}",
                    serde_json::to_string_pretty(&StatusSnapshot::default_status())?
                );
                eprintln!("{}", e.friendly_message());
                Ok(ExitCode::from(1))
            }
        },

        Command::Watch { count } => {
            let poller_config = PollerConfig::default()
                .with_interval(Duration::from_millis(config.poll_interval_ms))
                .with_channel_capacity(config.channel_capacity);
            let poller = StatusPoller::new(client, poller_config);
            let mut updates = poller.subscribe();
            let mut seen = 0usize;

            loop {
                tokio::select! {
                    update = updates.next() => {
                        let Some(status) = update else { break };
                        println!("{}", serde_json::to_string(&status)?);
                        seen += 1;
                        if count.is_some_and(|limit| seen >= limit) {
                            break;
                        }
                    }
                    _ = tokio::signal::ctrl_c() => {
                        info!("interrupted, stopping watch");
                        break;
                    }
                }
            }

            poller.stop();
            Ok(ExitCode::SUCCESS)
        }

        Command::Home { wait } => {
            let response = client.home(None).await.map_err(client_error)?;
            finish_command(&client, response, wait).await
        }

        Command::Move { x, y, z, e, wait } => {
            let offset = RelativeMove { x, y, z, e };
            if offset.is_empty() {
                anyhow::bail!("move needs at least one of --x, --y, --z, --e");
            }
            let response = client
                .move_relative(&offset, None)
                .await
                .map_err(client_error)?;
            finish_command(&client, response, wait).await
        }

        Command::UploadGcode { file, name, wait } => {
            let filename = match name {
                Some(name) => name,
                None => file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .with_context(|| format!("{} has no file name", file.display()))?,
            };
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            info!(file = %file.display(), %filename, bytes = data.len(), "uploading G-code");

            let response = client
                .upload_gcode(&filename, data, None)
                .await
                .map_err(client_error)?;
            finish_command(&client, response, wait).await
        }

        Command::ListGcode => {
            let list = client.list_gcode().await.map_err(client_error)?;
            for file in list.files {
                println!("{file}");
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Cmd { method, path, body } => {
            let method = parse_method(&method).map_err(client_error)?;
            let body = body
                .as_deref()
                .map(serde_json::from_str::<serde_json::Value>)
                .transpose()
                .context("--body is not valid JSON")?;

            let response = client
                .send_api_cmd(method, &path, body.as_ref(), None)
                .await
                .map_err(client_error)?;
            println!("{}", response.status());
            print_response(response).await
        }

        Command::ConsoleUrl => {
            println!("{}", client.console_url());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn client_error(err: ClientError) -> anyhow::Error {
    anyhow::anyhow!("{}", err.friendly_message())
}

/// Print the host's answer to a command. Non-2xx answers exit with 2.
async fn print_response(response: Response) -> anyhow::Result<ExitCode> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(ClientError::from)
        .map_err(client_error)?;
    println!("{body}");

    Ok(if status.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

/// Print the command's answer and, with `wait`, the status right after it.
async fn finish_command(
    client: &ApiClient,
    response: Response,
    wait: bool,
) -> anyhow::Result<ExitCode> {
    let code = print_response(response).await?;
    if wait {
        let poller = StatusPoller::new(client.clone(), PollerConfig::default());
        poller.refresh_handle().refresh().await;
        println!("{}", serde_json::to_string_pretty(&poller.current())?);
    }
    Ok(code)
}
