//! Hosting loop: one tonic server answering native gRPC, gRPC-Web and health probes.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::service::Routes;
use tonic::transport::Server;
use tonic_web::GrpcWebLayer;
use tower::Layer;

use calculator_sdk::{CalculatorServiceServer, SERVICE_NAME};

use crate::api::grpc::CalculatorServiceImpl;
use crate::api::web::{build_cors_layer, health_router};
use crate::config::{CorsConfig, ServerConfig};
use crate::domain::Service;

/// Assemble the HTTP router.
///
/// The gRPC-Web translation wraps only the calculator service route so that
/// plain HTTP/1.1 probes reach the health handlers untouched.
///
/// # Errors
/// Returns an error if the CORS settings are invalid.
pub fn build_router(cors: &CorsConfig) -> anyhow::Result<Router> {
    let service = CalculatorServiceImpl::new(Arc::new(Service::new()));
    let grpc = GrpcWebLayer::new().layer(CalculatorServiceServer::new(service));

    let cors_layer = build_cors_layer(cors).context("invalid CORS configuration")?;

    let router = Router::new()
        .route_service(&format!("/{SERVICE_NAME}/{{*rest}}"), grpc)
        .merge(health_router())
        .layer(cors_layer);
    Ok(router)
}

/// Bind the configured listen address.
///
/// # Errors
/// Returns an error if the address is invalid or cannot be bound.
pub async fn bind(cfg: &ServerConfig) -> anyhow::Result<TcpListener> {
    let addr = cfg.socket_addr()?;
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))
}

/// Serve on an already bound listener until `cancel` fires.
///
/// # Errors
/// Returns an error if the router cannot be built or the server fails.
pub async fn serve_with_listener(
    listener: TcpListener,
    cors: &CorsConfig,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let router = build_router(cors)?;
    let bound_addr: SocketAddr = listener.local_addr()?;
    tracing::info!(%bound_addr, service = SERVICE_NAME, "calculator server listening");

    let incoming = TcpListenerStream::new(listener);
    Server::builder()
        .accept_http1(true)
        .add_routes(Routes::from(router))
        .serve_with_incoming_shutdown(incoming, async move {
            cancel.cancelled().await;
            tracing::info!("calculator server shutting down");
        })
        .await
        .context("calculator server failed")?;
    Ok(())
}

/// Bind `cfg.listen_addr` and serve until `cancel` fires.
///
/// # Errors
/// Returns an error if binding or serving fails.
pub async fn serve(
    cfg: &ServerConfig,
    cors: &CorsConfig,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let listener = bind(cfg).await?;
    serve_with_listener(listener, cors, cancel).await
}
