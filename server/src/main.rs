mod app;
mod boundaries;
mod config;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use crate::app::SiteRoots;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let roots = SiteRoots {
        site_dir: config::site_dir(),
        data_dir: config::data_dir(),
    };
    if !roots.site_dir.is_dir() {
        tracing::warn!(site_dir = %roots.site_dir.display(), "site directory not found; build the client first");
    }
    boundaries::report(&roots.data_dir).await;

    let app = app::build_app(&roots);

    let addr = format!("0.0.0.0:{}", config::server_port());
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "failed to bind TCP listener");
            return;
        }
    };
    tracing::info!(
        site_dir = %roots.site_dir.display(),
        data_dir = %roots.data_dir.display(),
        "World Anthem listening on {addr}"
    );

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server failed");
    }

    tracing::info!("Server shut down gracefully");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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
