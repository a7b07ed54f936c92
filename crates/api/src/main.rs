use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use redline_api::config::ServerConfig;
use redline_api::router::build_app_router;
use redline_api::state::AppState;
use redline_events::{DirWatcher, EventBus};
use redline_store::DocumentStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "redline_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Store ---
    let store = Arc::new(DocumentStore::new(
        config.docs_dir.clone(),
        config.reviews_dir.clone(),
    ));
    store
        .ensure_dirs()
        .await
        .expect("Failed to create document and review directories");
    tracing::info!(
        docs_dir = %config.docs_dir.display(),
        reviews_dir = %config.reviews_dir.display(),
        "Document store ready"
    );

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    // --- File watcher ---
    let watcher = DirWatcher::new(
        store.watched_dirs(),
        Duration::from_secs(config.watch_interval_secs),
    );
    let watcher_cancel = tokio_util::sync::CancellationToken::new();
    let watcher_handle = tokio::spawn(watcher.run(Arc::clone(&event_bus), watcher_cancel.clone()));

    // --- App state ---
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    watcher_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), watcher_handle).await;
    tracing::info!("File watcher stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
