use std::net::SocketAddr;
use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use metar_server::cli::Cli;
use metar_server::config::AppConfig;
use metar_server::domain::ReportKind;
use metar_server::manager::Manager;
use metar_server::web::{AppState, RATE_LIMIT_WINDOW, create_router};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    if !cli.no_logs {
        let level = config.global.log.level_filter().unwrap_or(LevelFilter::INFO);
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::default().add_directive(level.into())),
            )
            .with_target(true)
            .init();
    }

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let http = reqwest::Client::builder()
        .timeout(cli.request_timeout())
        .build()?;

    let manager_config = cli.manager_config();
    let metar = Manager::new(ReportKind::Metar, &config.providers, &http, &manager_config);
    let taf = Manager::new(ReportKind::Taf, &config.providers, &http, &manager_config);
    for manager in [&metar, &taf] {
        if manager.source_count() == 0 {
            warn!(kind = %manager.kind(), "no providers configured, every lookup will be not found");
        } else {
            info!(kind = %manager.kind(), providers = manager.source_count(), "manager ready");
        }
    }

    let state = AppState::new(metar, taf).with_rate_limit(config.server.http.rate_limit);

    let shutdown = CancellationToken::new();
    let cleanup = state
        .limiter
        .as_ref()
        .map(|limiter| limiter.spawn_cleanup(RATE_LIMIT_WINDOW, shutdown.clone()));

    let app = create_router(state.clone(), cli.gzip_level);

    let addr = config.server.http.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("shutting down");
    shutdown.cancel();
    if let Some(cleanup) = cleanup {
        cleanup.await?;
    }
    state.close().await;

    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
