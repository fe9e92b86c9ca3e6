//! Domain service for calculator
//!
//! Contains the core business logic for the four arithmetic operations.

use calculator_sdk::{Fault, Operation, dispatch};
use tracing::debug;

/// Domain service that performs calculator operations.
///
/// Stateless; the gRPC server holds one behind an `Arc`.
#[derive(Clone, Default)]
pub struct Service;

impl Service {
    /// Create a new service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Compute `op` over the two operands.
    ///
    /// # Errors
    /// Returns the dispatcher's fault unchanged, e.g. divide by zero.
    pub fn calculate(&self, op: Operation, a: f64, b: f64) -> Result<f64, Fault> {
        debug!(%op, a, b, "performing calculation");
        let result = dispatch(op, a, b);
        if let Err(fault) = &result {
            debug!(%op, kind = %fault.kind(), "calculation rejected");
        }
        result
    }
}
