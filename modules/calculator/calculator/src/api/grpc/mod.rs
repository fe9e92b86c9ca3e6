//! gRPC API layer for calculator

mod server;
pub use server::CalculatorServiceImpl;
