use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use calculator_sdk::FAULT_KIND_METADATA_KEY;

use crate::config::{CorsConfig, ServerConfigError};

/// Response headers a browser client must be able to read to decode a call outcome.
pub const EXPOSED_HEADERS: [&str; 6] = [
    "grpc-status",
    "grpc-message",
    "grpc-encoding",
    "grpc-accept-encoding",
    "grpc-status-details-bin",
    FAULT_KIND_METADATA_KEY,
];

/// Build a CORS layer from config.
///
/// Any request header is allowed; gRPC-Web clients send `x-grpc-web`,
/// `x-user-agent` and `content-type`.
///
/// # Errors
/// Returns an error if an origin or method cannot be used in a header.
pub fn build_cors_layer(cfg: &CorsConfig) -> Result<CorsLayer, ServerConfigError> {
    let has_wildcard_origin = cfg.allowed_origins.iter().any(|o| o == "*");

    if has_wildcard_origin {
        warn!(
            "CORS is configured with allowed_origins=['*']. \
             Any website can call the calculator from a browser."
        );
    }

    let mut layer = CorsLayer::new().allow_headers(Any).expose_headers(
        EXPOSED_HEADERS.map(HeaderName::from_static),
    );

    if has_wildcard_origin {
        layer = layer.allow_origin(Any);
    } else {
        let origins = cfg
            .allowed_origins
            .iter()
            .map(|s| {
                HeaderValue::from_str(s).map_err(|_| ServerConfigError::InvalidOrigin(s.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if !origins.is_empty() {
            layer = layer.allow_origin(origins);
        }
    }

    if cfg.allowed_methods.iter().any(|m| m == "*") {
        layer = layer.allow_methods(Any);
    } else {
        let methods = cfg
            .allowed_methods
            .iter()
            .map(|s| {
                s.parse::<Method>()
                    .map_err(|_| ServerConfigError::InvalidMethod(s.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if !methods.is_empty() {
            layer = layer.allow_methods(methods);
        }
    }

    if cfg.max_age_seconds > 0 {
        layer = layer.max_age(std::time::Duration::from_secs(cfg.max_age_seconds));
    }

    Ok(layer)
}
