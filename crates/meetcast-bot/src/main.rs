//! Meetcast binary: joins a meeting and plays one MP3 file into it.
//!
//! Loads configuration, initializes structured logging, and stops playback
//! cleanly on SIGTERM/SIGINT.

mod config;

use config::{LoggingConfig, Runtime};
use meetcast_auth::Signer;
use meetcast_session::{ApiClient, SessionNegotiator, WsConnector};
use meetcast_stream::{cancel_pair, PlaybackError, Player, StreamReport};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "meetcast.toml";

fn resolve_config_path() -> (Option<String>, &'static str) {
    pick_config_path(std::env::args().nth(1), std::env::var("MEETCAST_CONFIG_PATH").ok())
}

fn pick_config_path(
    cli_arg: Option<String>,
    env_var: Option<String>,
) -> (Option<String>, &'static str) {
    if let Some(path) = cli_arg.filter(|value| !value.trim().is_empty()) {
        return (Some(path), "cli-arg");
    }

    if let Some(path) = env_var.filter(|value| !value.trim().is_empty()) {
        return (Some(path), "env-var");
    }

    (None, "default")
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path
        .as_deref()
        .or(Some(DEFAULT_CONFIG_PATH));

    let config = match config::load_config(selected_config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration: {e}");
            return ExitCode::from(2);
        }
    };

    init_tracing(&config.logging);

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    let runtime = match config.validate() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::from(2);
        }
    };

    match run(runtime).await {
        Ok(report) => {
            tracing::info!(
                frames = report.frames_sent,
                bytes = report.bytes_sent,
                cancelled = report.cancelled,
                "meetcast finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "playback failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(runtime: Runtime) -> Result<StreamReport, PlaybackError> {
    let signer = Signer::new(runtime.credentials);

    if runtime.verify_before_join {
        let api = ApiClient::new(runtime.api_base_url, signer.clone())?;
        let info = api.meeting(runtime.meeting.meeting_number()).await?;
        tracing::info!(
            meeting = runtime.meeting.meeting_number(),
            topic = info.topic.as_deref().unwrap_or("<untitled>"),
            status = info.status.as_deref().unwrap_or("<unknown>"),
            "meeting found"
        );
    }

    let (cancel_handle, mut cancel) = cancel_pair();
    let watcher = tokio::spawn(async move {
        shutdown_signal().await;
        cancel_handle.cancel();
    });

    let negotiator = SessionNegotiator::new(WsConnector::new(runtime.ws_url), signer)
        .with_join_timeout(runtime.join_timeout);
    let result = Player::new(negotiator, runtime.settings)
        .play(&runtime.meeting, &runtime.audio_path, &mut cancel)
        .await;

    watcher.abort();
    result
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, stopping playback"); }
        () = terminate => { tracing::info!("received SIGTERM, stopping playback"); }
    }
}
