//! Calculator API trait and types
//!
//! Contract trait and fault type shared by every transport.

use std::fmt;

use async_trait::async_trait;

use crate::operation::Operation;

/// Calculator API trait
///
/// Implemented by the native gRPC client and the gRPC-Web client. A call yields
/// either the computed value or a [`Fault`], never both.
#[async_trait]
pub trait CalculatorClient: Send + Sync {
    /// Perform `op` on the two operands.
    async fn calculate(&self, op: Operation, a: f64, b: f64) -> Result<f64, Fault>;

    /// Add two numbers and return the sum.
    async fn add(&self, a: f64, b: f64) -> Result<f64, Fault> {
        self.calculate(Operation::Add, a, b).await
    }

    /// Subtract `b` from `a`.
    async fn subtract(&self, a: f64, b: f64) -> Result<f64, Fault> {
        self.calculate(Operation::Subtract, a, b).await
    }

    /// Multiply two numbers.
    async fn multiply(&self, a: f64, b: f64) -> Result<f64, Fault> {
        self.calculate(Operation::Multiply, a, b).await
    }

    /// Divide `a` by `b`; a zero divisor is a [`FaultKind::DivideByZero`] fault.
    async fn divide(&self, a: f64, b: f64) -> Result<f64, Fault> {
        self.calculate(Operation::Divide, a, b).await
    }
}

/// Failure category of a calculator call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Unrecognised operation selector.
    InvalidOperation,
    /// Second operand exactly zero on divide.
    DivideByZero,
    /// Request payload does not carry two numeric operands.
    MalformedRequest,
    /// Server unreachable or answered with a transport-level failure.
    TransportUnavailable,
}

impl FaultKind {
    /// Stable tag carried in the `x-fault-kind` metadata entry.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            FaultKind::InvalidOperation => "invalid_operation",
            FaultKind::DivideByZero => "divide_by_zero",
            FaultKind::MalformedRequest => "malformed_request",
            FaultKind::TransportUnavailable => "transport_unavailable",
        }
    }

    /// Inverse of [`FaultKind::as_str`].
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "invalid_operation" => Some(FaultKind::InvalidOperation),
            "divide_by_zero" => Some(FaultKind::DivideByZero),
            "malformed_request" => Some(FaultKind::MalformedRequest),
            "transport_unavailable" => Some(FaultKind::TransportUnavailable),
            _ => None,
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed, non-numeric failure outcome of a calculator call.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct Fault {
    kind: FaultKind,
    message: String,
}

impl Fault {
    pub fn new(kind: FaultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn divide_by_zero() -> Self {
        Self::new(FaultKind::DivideByZero, "Cannot divide by zero")
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(FaultKind::MalformedRequest, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(FaultKind::TransportUnavailable, message)
    }

    #[must_use]
    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether a client may recover from this fault by computing locally.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        self.kind == FaultKind::TransportUnavailable
    }
}
