mod api;
mod config;
mod output;
mod session;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use dialer_core::{AgentDispatch, CallTrigger, DialInfo, DispatchRegistry, HttpDispatchClient};
use dialer_logging::{init_logger, LogStream, LoggerConfig};

use api::AppState;
use config::Config;

#[derive(Parser)]
#[command(name = "dialer")]
#[command(about = "Trigger outbound voice-call agents over HTTP")]
#[command(version)]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct TriggerArgs {
    /// LiveKit server URL (defaults to LIVEKIT_URL)
    #[arg(long)]
    server_url: Option<String>,
    /// Dispatch endpoint (defaults to DIALER_DISPATCH_URL)
    #[arg(long)]
    dispatch_url: Option<String>,
    /// Seconds to wait for the dispatch server; 0 waits forever
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch one outbound call and exit
    Call {
        /// Phone number to call
        #[arg(long)]
        phone: String,
        /// Number to transfer the call to when the callee asks for a human
        #[arg(long, default_value = "")]
        transfer_to: String,
        #[command(flatten)]
        trigger: TriggerArgs,
    },
    /// Interactive call session
    Session {
        #[command(flatten)]
        trigger: TriggerArgs,
    },
    /// Start the dispatch server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Check whether the dispatch server is up
    Status,
    /// List dispatches recorded for a room
    Dispatches {
        /// Room name, e.g. outbound-call-1700000000000-k3j9x0abc
        #[arg(long)]
        room: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::from_filename(".env.local").ok();
    let config = Config::from_env();
    let cli = Cli::parse();

    let stream = matches!(cli.command, Commands::Serve { .. }).then(|| LogStream::new(256));
    init_logger(LoggerConfig {
        level: config.log_level.clone(),
        log_dir: config.log_dir.clone(),
        json: cli.json_logs,
        stream: stream.clone(),
    });

    match cli.command {
        Commands::Call {
            phone,
            transfer_to,
            trigger,
        } => {
            let mut call = build_trigger(&config, &trigger);
            call.set_dial_info(DialInfo::new(phone).with_transfer_to(transfer_to));
            let mut changes = call.subscribe();
            if session::dispatch_and_report(&mut call, &mut changes).await.is_err() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Session { trigger } => {
            session::run_session(build_trigger(&config, &trigger)).await?;
        }
        Commands::Serve { port } => {
            let config = Config {
                port: port.unwrap_or(config.port),
                ..config
            };
            let logs = stream.unwrap_or_else(|| LogStream::new(256));
            run_server(config, logs).await?;
        }
        Commands::Status => {
            let base = config.server_base();
            match fetch_health(&base).await {
                Ok(body) => println!("{}", serde_json::to_string_pretty(&body)?),
                Err(e) => {
                    match e.status() {
                        Some(status) => output::note_error(&format!(
                            "Dispatch server at {base} is unhealthy ({status})"
                        )),
                        None => output::note_error(&format!(
                            "Dispatch server is not running at {base}"
                        )),
                    }
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Dispatches { room } => {
            let base = config.server_base();
            let body: serde_json::Value = reqwest::Client::new()
                .get(format!("{base}/dispatch"))
                .query(&[("room_name", room.as_str())])
                .send()
                .await
                .with_context(|| format!("failed reaching dispatch server at {base}"))?
                .error_for_status()?
                .json()
                .await?;
            let dispatches: Vec<AgentDispatch> =
                serde_json::from_value(body["dispatches"].clone())
                    .context("failed parsing dispatch list")?;
            if dispatches.is_empty() {
                output::note_info(&format!("No dispatches in {room}"));
            } else {
                print!("{}", output::render_dispatches(&dispatches));
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// GET `/api/health`; any non-2xx reply is an error carrying its status.
async fn fetch_health(base: &str) -> reqwest::Result<serde_json::Value> {
    reqwest::get(format!("{base}/api/health"))
        .await?
        .error_for_status()?
        .json()
        .await
}

fn build_trigger(config: &Config, args: &TriggerArgs) -> CallTrigger {
    let endpoint = args
        .dispatch_url
        .clone()
        .unwrap_or_else(|| config.dispatch_url.clone());
    let timeout = match args.timeout_secs {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => config.timeout(),
    };
    let server_url = args
        .server_url
        .clone()
        .or_else(|| config.server_url.clone())
        .unwrap_or_default();

    info!(endpoint = %endpoint, timeout = ?timeout, "Preparing call trigger");

    let client = HttpDispatchClient::new().with_endpoint(endpoint);
    CallTrigger::new(Arc::new(client))
        .with_server_url(server_url)
        .with_timeout(timeout)
}

async fn run_server(config: Config, logs: LogStream) -> Result<()> {
    let state = Arc::new(AppState {
        registry: DispatchRegistry::new(),
        logs,
    });

    let app = api::build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());
    let addr = format!("{}:{}", config.bind_address, config.port);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed binding {addr}"))?;
    info!(addr = %addr, "Dispatch server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};

    async fn spawn(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn unhealthy_server_reports_its_status() {
        let router = Router::new().route(
            "/api/health",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "draining") }),
        );
        let base = spawn(router).await;

        let err = fetch_health(&base).await.unwrap_err();

        assert_eq!(err.status(), Some(reqwest::StatusCode::SERVICE_UNAVAILABLE));
    }

    #[tokio::test]
    async fn healthy_server_returns_body() {
        let state = Arc::new(AppState {
            registry: DispatchRegistry::new(),
            logs: LogStream::new(16),
        });
        let base = spawn(api::build_router(state)).await;

        let body = fetch_health(&base).await.unwrap();

        assert_eq!(body["status"], "ok");
    }
}
