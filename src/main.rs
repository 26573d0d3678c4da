//! Blogify CLI entrypoint: loads a feed or a post thread and prints the
//! rendered window.

mod cli;

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use blogify::telemetry::{NoopTelemetrySink, StderrJsonlTelemetrySink, TelemetrySink};
use blogify::{BlogifyConfig, FeedError, HttpGateway, OperationMode};
use ortho_config::OrthoConfig;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), FeedError> {
    let config = load_config()?;
    config.validate()?;

    let gateway = HttpGateway::new(&config.gateway_settings()?)?;
    let telemetry: Arc<dyn TelemetrySink> = if config.telemetry {
        Arc::new(StderrJsonlTelemetrySink)
    } else {
        Arc::new(NoopTelemetrySink)
    };

    let mut stdout = io::stdout().lock();
    match config.operation_mode() {
        OperationMode::Feed => cli::feed::run(&config, &gateway, telemetry, &mut stdout).await,
        OperationMode::PostThread => {
            cli::thread::run(&config, &gateway, telemetry, &mut stdout).await
        }
    }
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`FeedError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<BlogifyConfig, FeedError> {
    BlogifyConfig::load().map_err(|error| FeedError::Configuration {
        message: error.to_string(),
    })
}
