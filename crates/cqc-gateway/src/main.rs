//! `cqc-gateway` binary: the CQC composition root.
//!
//! Runs the gateway-style (WhatsApp) HTTP webhook + health endpoint, drives
//! the Telegram long-polling adapter when configured, and spawns the
//! background workers (Ghost Protocol, match notifier, daily digest) behind
//! a shared shutdown signal. `migrate`/`serve` split mirrors spec §6.

mod app;
mod error;
mod http;
mod notifier;
mod schema;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use clap::{Parser, Subcommand};
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

use cqc_core::config::CqcConfig;
use cqc_oracle::{BackoffOracle, HttpOracle};
use cqc_sessions::SessionCache;
use cqc_state::LeadLockManager;
use cqc_store::Store;
use cqc_workers::{DigestWorker, GhostWorker, MatchNotifier};

use app::AppState;
use notifier::{CompositeNotifier, GatewayNotifier};

#[derive(Parser)]
#[command(name = "cqc-gateway")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    /// Path to `cqc.toml`; defaults to `~/.cqc/cqc.toml`.
    #[arg(long)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP gateway, Telegram adapter, and background workers.
    Serve,
    /// Create/upgrade the schema and stamp its version, then exit.
    Migrate,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cqc_gateway=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match CqcConfig::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            error!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    match cli.command.unwrap_or(Command::Serve) {
        Command::Migrate => match schema::migrate(&config.database.path) {
            Ok(()) => {
                info!(version = schema::SCHEMA_VERSION, "schema migrated");
                std::process::exit(0);
            }
            Err(e) => {
                error!("migration failed: {e}");
                std::process::exit(2);
            }
        },
        Command::Serve => {
            match schema::is_current(&config.database.path) {
                Ok(true) => {}
                Ok(false) => {
                    error!("database schema is stale; run `cqc-gateway migrate` first");
                    std::process::exit(3);
                }
                Err(e) => {
                    error!("could not inspect database schema: {e}");
                    std::process::exit(2);
                }
            }

            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    error!("failed to start async runtime: {e}");
                    std::process::exit(2);
                }
            };

            if let Err(e) = rt.block_on(serve(config)) {
                error!("server error: {e}");
                std::process::exit(2);
            }
        }
    }
}

async fn serve(config: CqcConfig) -> anyhow::Result<()> {
    let store = Store::open(&config.database.path)?;
    let sessions = SessionCache::new(Duration::from_secs(cqc_core::config::SESSION_TTL_SECS));
    let oracle: Box<dyn cqc_oracle::AiOracle> = Box::new(BackoffOracle::new(Box::new(HttpOracle::new(
        config.oracle.base_url.clone(),
        config.oracle.api_key.clone(),
        config.oracle.model.clone(),
    ))));
    let locks = LeadLockManager::new();

    let state = Arc::new(AppState {
        store,
        sessions,
        oracle,
        locks,
        webhook: config.gateway_webhook.clone(),
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let telegram_bot = config.telegram.as_ref().map(|tg| teloxide::Bot::new(&tg.bot_token));
    let telegram_notifier = telegram_bot
        .clone()
        .map(cqc_telegram::TelegramNotifier::new);
    let gateway_notifier = GatewayNotifier::new(config.gateway_webhook.outbound_url.clone());
    let worker_notifier = CompositeNotifier::new(telegram_notifier, gateway_notifier);

    let worker_store = Store::open(&config.database.path)?;
    let ghost_interval = Duration::from_secs(config.workers.ghost_interval_secs);
    let digest_hour = config.workers.digest_hour_utc;

    let telegram_ctx = match (&telegram_bot, &config.telegram) {
        (Some(_), Some(tg_config)) => Some((
            tg_config.clone(),
            Arc::new(cqc_telegram::adapter::TelegramContext {
                store: Store::open(&config.database.path)?,
                sessions: SessionCache::new(Duration::from_secs(cqc_core::config::SESSION_TTL_SECS)),
                oracle: Box::new(BackoffOracle::new(Box::new(HttpOracle::new(
                    config.oracle.base_url.clone(),
                    config.oracle.api_key.clone(),
                    config.oracle.model.clone(),
                )))),
                locks: LeadLockManager::new(),
            }),
        )),
        _ => None,
    };

    let app = Router::new()
        .route("/health", get(http::health::health_handler))
        .route("/webhooks/gateway", post(http::webhooks::webhook_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.gateway.bind, config.gateway.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "cqc-gateway listening");

    let http_server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal(shutdown_tx));

    let ghost = GhostWorker::new(&worker_store, &worker_notifier, ghost_interval).run(shutdown_rx.clone());
    let match_notifier = MatchNotifier::new(&worker_store, &worker_notifier).run(shutdown_rx.clone());
    let digest = DigestWorker::new(&worker_store, &worker_notifier, digest_hour).run(shutdown_rx.clone());

    let telegram_adapter = async {
        if let Some((tg_config, ctx)) = telegram_ctx {
            cqc_telegram::TelegramAdapter::new(&tg_config, ctx).run().await;
        }
    };

    let (serve_result, ..) = tokio::join!(http_server, ghost, match_notifier, digest, telegram_adapter);
    serve_result?;

    Ok(())
}

/// Waits for SIGINT/SIGTERM, then flips the shared shutdown flag so every
/// worker's `tokio::select!` tick loop exits its loop.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received");
    let _ = shutdown_tx.send(true);
}
