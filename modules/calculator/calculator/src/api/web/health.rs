use axum::Router;
use axum::routing::get;

const ROOT_HINT: &str = "Communication with gRPC endpoints must be made through a gRPC client.";

async fn healthy() -> &'static str {
    "Healthy"
}

async fn root() -> &'static str {
    ROOT_HINT
}

/// Liveness/readiness probes and a root hint, served over plain HTTP.
pub fn health_router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(healthy))
        .route("/health/ready", get(healthy))
        .route("/health/live", get(healthy))
}
