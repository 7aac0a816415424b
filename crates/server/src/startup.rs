use std::future::Future;
use std::sync::Arc;

use axum::Router;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tokio::net::TcpListener;
use tracing::{info, warn};

use configs::AppConfig;
use service::subscription::repo::SeaOrmSubscriptionRepository;

use crate::routes::{self, HttpTimeouts, ServerState};

/// Handler state backed by the Postgres repository
pub fn build_state(db: DatabaseConnection) -> ServerState {
    ServerState::new(Arc::new(SeaOrmSubscriptionRepository::new(db)))
}

/// Connect, migrate, then serve until `shutdown` resolves.
/// In-flight requests are allowed to finish before returning.
pub async fn run<F>(cfg: AppConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let db = models::db::connect_with_config(&cfg.database).await?;

    if cfg.run_migrations {
        migration::Migrator::up(&db, None).await?;
        info!(event = "migrations_applied", "database schema up to date");
    } else {
        warn!(event = "migrations_skipped", "RUN_MIGRATIONS disabled; assuming schema is current");
    }

    let app: Router = routes::build_router(build_state(db.clone()), HttpTimeouts::from(&cfg.server));

    let addr = cfg.server.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(
        event = "listening",
        %addr,
        read_timeout_ms = cfg.server.read_timeout_ms,
        write_timeout_ms = cfg.server.write_timeout_ms,
        idle_timeout_ms = cfg.server.idle_timeout_ms,
        "http server started"
    );
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;

    if let Err(e) = db.close().await {
        warn!(event = "db_close_failed", error = %e, "failed to close database pool");
    }
    info!(event = "stopped", "http server stopped");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl_c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!(event = "shutdown_signal", "shutdown signal received");
}
