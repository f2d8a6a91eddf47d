//! Axum server wiring.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;

use idsync_service::SyncService;
use idsync_store::{AuditStore, DiffStore, UserStore};

use crate::handlers;

/// Cap on in-flight HTTP requests; per-user sync concurrency is limited
/// separately inside the service.
const MAX_IN_FLIGHT_REQUESTS: usize = 64;

/// Build the invocation router around a shared [`SyncService`].
pub fn router<S>(service: Arc<SyncService<S>>) -> Router
where
    S: UserStore + DiffStore + AuditStore + Send + Sync + 'static,
{
    Router::new()
        .route("/profile", post(handlers::sync_profile::<S>))
        .route("/profiles", post(handlers::sync_profiles::<S>))
        .route("/verify", post(handlers::verify::<S>))
        .route("/health-check", post(handlers::health_check::<S>))
        .route("/healthz", get(handlers::healthz))
        .route("/metrics", get(handlers::metrics::<S>))
        .layer(TraceLayer::new_for_http())
        .layer(ConcurrencyLimitLayer::new(MAX_IN_FLIGHT_REQUESTS))
        .with_state(service)
}

/// Bind `listen_addr` and serve until the process is stopped.
pub async fn serve<S>(
    listen_addr: &str,
    service: Arc<SyncService<S>>,
) -> std::io::Result<()>
where
    S: UserStore + DiffStore + AuditStore + Send + Sync + 'static,
{
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "rpc server listening");
    axum::serve(listener, router(service)).await
}
