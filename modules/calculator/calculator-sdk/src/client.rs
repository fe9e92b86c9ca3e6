//! Native gRPC implementation of [`CalculatorClient`].
//!
//! Connects lazily on first use and caches the channel. A failed connect is
//! reported as a transport fault and retried on the next call.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tonic::transport::Channel;
use tracing::instrument;

use crate::api::{CalculatorClient, Fault};
use crate::config::ClientConfig;
use crate::operation::Operation;
use crate::proto::calculator_service_client::CalculatorServiceClient;
use crate::proto::{CalculateReply, CalculateRequest};
use crate::transport::{RetryPolicy, call_with_retry, connect_with_retry};

type GrpcClient = CalculatorServiceClient<Channel>;

/// gRPC client for the calculator service.
pub struct CalculatorGrpcClient {
    config: ClientConfig,
    policy: RetryPolicy,
    inner: RwLock<Option<GrpcClient>>,
}

impl CalculatorGrpcClient {
    /// Create a client; no connection is made until the first call.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        let policy = RetryPolicy::from(&config);
        Self {
            config,
            policy,
            inner: RwLock::new(None),
        }
    }

    /// Create a client and connect immediately.
    ///
    /// # Errors
    /// Returns a transport fault if the server cannot be reached.
    pub async fn connect(config: ClientConfig) -> Result<Self, Fault> {
        let client = Self::new(config);
        client.get_client().await?;
        Ok(client)
    }

    async fn get_client(&self) -> Result<GrpcClient, Fault> {
        // Fast path: already connected
        {
            let guard = self.inner.read().await;
            if let Some(client) = guard.as_ref() {
                return Ok(client.clone());
            }
        }

        let mut guard = self.inner.write().await;

        // Another caller may have connected while we waited for the write lock
        if let Some(client) = guard.as_ref() {
            return Ok(client.clone());
        }

        let channel = connect_with_retry(&self.config).await.map_err(|e| {
            Fault::unavailable(format!(
                "Failed to connect to calculator service at {}: {}",
                self.config.base_url(),
                error_chain(&e)
            ))
        })?;

        let client = CalculatorServiceClient::new(channel);
        *guard = Some(client.clone());
        Ok(client)
    }
}

#[async_trait]
impl CalculatorClient for CalculatorGrpcClient {
    #[instrument(skip(self), fields(transport = "grpc"))]
    async fn calculate(&self, op: Operation, a: f64, b: f64) -> Result<f64, Fault> {
        let client = self.get_client().await?;

        let reply = call_with_retry(self.policy, op.path(), || {
            let mut client = client.clone();
            async move {
                let request = tonic::Request::new(CalculateRequest {
                    operand1: Some(a),
                    operand2: Some(b),
                });
                let response = match op {
                    Operation::Add => client.add(request).await?,
                    Operation::Subtract => client.subtract(request).await?,
                    Operation::Multiply => client.multiply(request).await?,
                    Operation::Divide => client.divide(request).await?,
                };
                Ok::<_, tonic::Status>(response.into_inner())
            }
        })
        .await
        .map_err(|status| Fault::from_status(&status))?;

        reply_value(&reply)
    }
}

/// Extract the result of a decoded reply; a reply without one is a broken response.
pub(crate) fn reply_value(reply: &CalculateReply) -> Result<f64, Fault> {
    let result = reply
        .result
        .ok_or_else(|| Fault::unavailable("malformed response: reply carries no result"))?;
    tracing::debug!(result, "calculation completed");
    Ok(result)
}

/// Render an error with its sources; tonic's top-level transport error is terse.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
