//! Calculator Module
//!
//! Server side of the calculator service.
//!
//! ## Architecture
//!
//! - `domain/service.rs` - Core business logic
//! - `api/grpc/server.rs` - gRPC server implementation
//! - `api/web/` - CORS and health routes for browser callers
//! - `host.rs` - Listener and server lifecycle
//!
//! External consumers should use the `calculator-sdk` crate which provides
//! the gRPC and gRPC-Web clients.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod config;
pub use config::{CorsConfig, ServerConfig, ServerConfigError};

mod host;
pub use host::{bind, build_router, serve, serve_with_listener};

// === INTERNAL MODULES ===
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
