// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use profile_server::{
    api::router,
    auth::AuthorityClient,
    config::{Config, LogFormat, DEFAULT_LOG_FILTER},
    state::AppState,
    storage::ProfileDatabase,
};

#[tokio::main]
async fn main() {
    let config = Config::from_env().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });

    init_tracing(config.log_format);

    let db = ProfileDatabase::open(&config.database_path()).unwrap_or_else(|e| {
        tracing::error!(error = %e, path = %config.database_path().display(), "Failed to open database");
        std::process::exit(1);
    });

    let authority = AuthorityClient::new(&config.authority).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build identity authority client");
        std::process::exit(1);
    });
    tracing::info!(
        me_url = %authority.me_url(),
        timeout_secs = config.authority.timeout.as_secs(),
        max_attempts = config.authority.retry.max_attempts,
        "Identity authority configured"
    );

    let state = AppState::new(db, Arc::new(authority));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, addr = %config.bind_addr, "Failed to bind");
            std::process::exit(1);
        });

    tracing::info!(addr = %config.bind_addr, "Profile service listening (docs at /docs)");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }

    tracing::info!("Profile service stopped");
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
