//! CoreHR Server — HR platform identity and access control backend.
//!
//! Main entry point that wires configuration, the database-backed stores,
//! the service graph, and the HTTP server together.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use corehr_api::state::AppState;
use corehr_core::config::AppConfig;
use corehr_core::error::AppError;
use corehr_core::traits::{AuditStore, CredentialStore, EmployeeDirectory, Notifier};
use corehr_database::{DatabasePool, PgAuditStore, PgCredentialStore, PgEmployeeDirectory};
use corehr_service::notify::LogNotifier;

#[tokio::main]
async fn main() {
    let env = std::env::var("COREHR_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting CoreHR v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    tracing::info!("Connecting to database...");
    let db = DatabasePool::connect(&config.database).await?;

    corehr_database::migration::run_migrations(db.pool()).await?;

    // ── Step 2: Construct the stores, once, at process start ─────
    let pool = db.into_pool();
    let store: Arc<dyn CredentialStore> = Arc::new(PgCredentialStore::new(pool.clone()));
    let audit_store: Arc<dyn AuditStore> = Arc::new(PgAuditStore::new(pool.clone()));
    let directory: Arc<dyn EmployeeDirectory> = Arc::new(PgEmployeeDirectory::new(pool));
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier::new());

    // ── Step 3: Wire the service graph ───────────────────────────
    tracing::info!("Initializing services...");
    let config = Arc::new(config);
    let state = AppState::build(
        Arc::clone(&config),
        store,
        audit_store,
        directory,
        notifier,
    )?;

    let audit_recorder = state.audit_recorder.clone();

    // ── Step 4: Build and start the HTTP server ──────────────────
    let app = corehr_api::router::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("CoreHR server listening on {addr}");

    let server = axum::serve(listener, app).with_graceful_shutdown(async {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 5: Drain the audit queue ────────────────────────────
    audit_recorder.flush().await;

    tracing::info!("CoreHR server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
