//! Router assembly, tracing setup and the serve loop shared by both binaries.

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::routes;
use crate::state::{HubState, WorldState};

/// Initialize the JSON tracing subscriber, honouring `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();
}

/// The hub's routes without HTTP middleware.
pub fn hub_router(state: HubState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::hub::router())
        .with_state(state)
}

/// A domain server's routes without HTTP middleware.
pub fn world_router(state: WorldState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::world::router())
        .with_state(state)
}

/// Binds `config`'s address and serves `router` with request tracing and
/// permissive CORS until the process is stopped.
///
/// # Errors
///
/// Returns `AppError` if the address is invalid or cannot be bound.
pub async fn serve(config: &ServerConfig, router: Router) -> Result<(), AppError> {
    let app = router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.bind_addr()?;
    tracing::info!(public_url = %config.public_url, "Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
