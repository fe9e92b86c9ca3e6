//! Remote-first calculation with local fallback when the server is unreachable.

use std::fmt;
use std::sync::Arc;

use crate::api::{CalculatorClient, Fault};
use crate::operation::{Operation, dispatch};

/// Where a [`Calculation`] value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    Remote,
    LocalFallback,
}

impl fmt::Display for ResultSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultSource::Remote => f.write_str("remote"),
            ResultSource::LocalFallback => f.write_str("local_fallback"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calculation {
    pub value: f64,
    pub source: ResultSource,
}

/// Wraps a transport client and degrades to local computation on transport faults only.
#[derive(Clone)]
pub struct ResilientCalculator {
    remote: Arc<dyn CalculatorClient>,
    fallback_enabled: bool,
}

impl ResilientCalculator {
    #[must_use]
    pub fn new(remote: Arc<dyn CalculatorClient>, fallback_enabled: bool) -> Self {
        Self {
            remote,
            fallback_enabled,
        }
    }

    #[must_use]
    pub fn fallback_enabled(&self) -> bool {
        self.fallback_enabled
    }

    /// Compute remotely, falling back to [`dispatch`] if the transport is down.
    ///
    /// # Errors
    /// Returns the remote fault unchanged unless it is a transport fault and
    /// fallback is enabled; a local divide by zero is still a fault.
    pub async fn calculate(&self, op: Operation, a: f64, b: f64) -> Result<Calculation, Fault> {
        match self.remote.calculate(op, a, b).await {
            Ok(value) => Ok(Calculation {
                value,
                source: ResultSource::Remote,
            }),
            Err(fault) if self.fallback_enabled && fault.is_transport() => {
                tracing::warn!(
                    source = %ResultSource::LocalFallback,
                    op = %op,
                    error = %fault,
                    "calculator server unavailable, computing locally"
                );
                let value = dispatch(op, a, b)?;
                Ok(Calculation {
                    value,
                    source: ResultSource::LocalFallback,
                })
            }
            Err(fault) => Err(fault),
        }
    }
}
