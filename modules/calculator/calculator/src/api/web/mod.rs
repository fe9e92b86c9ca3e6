//! Browser-facing HTTP pieces: CORS and plain health routes.

mod cors;
mod health;

pub use cors::{build_cors_layer, EXPOSED_HEADERS};
pub use health::health_router;
