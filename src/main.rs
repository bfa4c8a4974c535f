//! Face-Assisted Authentication CLI
//!
//! Command-line driver for the sign-in and sign-up flows. Uses the mock
//! camera unless built with the `camera` feature and given `--device`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use face_auth_client::{
    capture::{CameraDevice, MockCamera},
    client::{AuthenticationClient, AuthenticationOutcome},
    config::FileConfig,
    flow::{SigninFlow, SignupFlow},
    metrics::MetricsRegistry,
    CaptureConfig,
};
use secrecy::SecretString;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "face-auth", version, about = "Face-assisted sign-in and sign-up client")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Authentication service base URL (overrides the config file)
    #[arg(long, env = "FACE_AUTH_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Camera device index (requires the `camera` feature)
    #[arg(long, global = true)]
    device: Option<u32>,

    /// Print Prometheus metrics after the command
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Verify an existing account
    Signin {
        #[arg(long)]
        username: String,
        /// Capture a face image and send it with the request
        #[arg(long)]
        face: bool,
    },
    /// Create an account, enrolling face images
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long, env = "FACE_AUTH_PASSWORD", hide_env_values = true)]
        password: String,
        /// Number of face images to enroll
        #[arg(long, default_value_t = 3)]
        captures: u32,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    match run(Cli::parse()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    info!("Face Auth Client v{}", face_auth_client::VERSION);

    let mut config = match &cli.config {
        Some(path) => FileConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => FileConfig::default(),
    };
    if let Some(base_url) = cli.base_url {
        config.service.base_url = base_url;
        config.validate().context("invalid --base-url")?;
    }
    if let Some(device) = cli.device {
        config.capture.device_id = device;
    }

    let metrics = Arc::new(MetricsRegistry::new().context("creating metrics registry")?);
    let client = AuthenticationClient::new(&config.service)
        .context("creating authentication client")?
        .with_metrics(Arc::clone(&metrics));
    let client = Arc::new(client);
    let camera = open_camera(&config.capture, cli.device.is_some());

    let outcome = match cli.command {
        Command::Signin { username, face } => {
            let mut flow = SigninFlow::new(client, camera);
            flow.set_username(username);
            if face {
                flow.set_use_face_auth(true);
                flow.start_camera().context("starting camera")?;
                flow.capture().context("capturing face image")?;
            }
            flow.submit().await?
        }
        Command::Signup {
            username,
            password,
            captures,
        } => {
            let mut flow = SignupFlow::new(client, camera);
            flow.set_username(username);
            flow.set_password(SecretString::from(password));
            if captures > 0 {
                flow.start_camera().context("starting camera")?;
                for _ in 0..captures {
                    flow.capture_and_append()
                        .context("capturing enrollment image")?;
                }
                info!("Captured {} enrollment image(s)", flow.images().len());
            }
            flow.submit().await?
        }
    };

    if cli.metrics {
        print!("{}", metrics.encode().context("encoding metrics")?);
    }

    Ok(report(&outcome))
}

#[cfg(feature = "camera")]
fn open_camera(config: &CaptureConfig, use_device: bool) -> Box<dyn CameraDevice> {
    if use_device {
        Box::new(face_auth_client::capture::NokhwaCamera::new(config.clone()))
    } else {
        Box::new(MockCamera::new(config.clone()))
    }
}

#[cfg(not(feature = "camera"))]
fn open_camera(config: &CaptureConfig, use_device: bool) -> Box<dyn CameraDevice> {
    if use_device {
        warn!("Built without the `camera` feature; using mock camera input");
    }
    Box::new(MockCamera::new(config.clone()))
}

fn report(outcome: &AuthenticationOutcome) -> ExitCode {
    match outcome {
        AuthenticationOutcome::Success { message } => {
            println!("{}", message.as_deref().unwrap_or("Success"));
            ExitCode::SUCCESS
        }
        AuthenticationOutcome::Failure(failure) => {
            warn!("{}", failure);
            println!("{}", failure.reason());
            if failure.is_transport() {
                ExitCode::from(2)
            } else {
                ExitCode::from(1)
            }
        }
    }
}
