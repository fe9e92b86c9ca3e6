//! Calculator SDK
//!
//! This crate provides everything needed to consume the calculator service:
//! - Operation selector and the pure dispatcher (`Operation`, `dispatch`)
//! - API trait (`CalculatorClient`) and fault types (`Fault`, `FaultKind`)
//! - Native gRPC client (`CalculatorGrpcClient`)
//! - gRPC-Web client (`CalculatorWebClient`)
//! - Local fallback wrapper (`ResilientCalculator`)
//! - Proto stubs for server implementation
//!
//! ## Usage
//!
//! ```ignore
//! use calculator_sdk::{CalculatorClient, CalculatorGrpcClient, ClientConfig};
//!
//! let client = CalculatorGrpcClient::new(ClientConfig::new("http://localhost:5001"));
//! let result = client.add(2.0, 3.0).await?;
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

// === API TRAIT AND TYPES ===
mod api;
pub use api::{CalculatorClient, Fault, FaultKind};

mod operation;
pub use operation::{Operation, dispatch};

pub mod status;
pub use status::FAULT_KIND_METADATA_KEY;

// === CLIENTS ===
mod client;
pub mod config;
mod fallback;
pub mod transport;
pub mod web;

pub use client::CalculatorGrpcClient;
pub use config::{ClientConfig, ClientConfigError, TransportKind};
pub use fallback::{Calculation, ResilientCalculator, ResultSource};
pub use web::{CalculatorWebClient, GrpcWebMode};

// === GRPC PROTO STUBS (for server implementation) ===
/// Generated protobuf types for CalculatorService
pub mod proto {
    tonic::include_proto!("calculator");
}

// Re-export proto types needed by server
pub use proto::calculator_service_server::{CalculatorService, CalculatorServiceServer};
pub use proto::{CalculateReply, CalculateRequest};

/// Fully qualified gRPC service name.
pub const SERVICE_NAME: &str = "calculator.CalculatorService";

/// Build a boxed client for the configured transport.
#[must_use]
pub fn client_for(config: ClientConfig) -> Box<dyn CalculatorClient> {
    match config.transport {
        TransportKind::Grpc => Box::new(CalculatorGrpcClient::new(config)),
        TransportKind::GrpcWeb => Box::new(CalculatorWebClient::new(config)),
    }
}
