//! Channel setup and retry helpers for the native gRPC client.
//!
//! Retries apply only to `UNAVAILABLE` and `DEADLINE_EXCEEDED`. All four
//! calculator operations are idempotent, so replaying them is safe.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Status};
use tracing::Instrument;

use crate::config::{ClientConfig, duration_to_u64_ms};

/// Backoff settings shared by connects and calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub max_retries: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl From<&ClientConfig> for RetryPolicy {
    fn from(cfg: &ClientConfig) -> Self {
        Self {
            max_retries: cfg.max_retries,
            base_backoff: cfg.base_backoff(),
            max_backoff: cfg.max_backoff(),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based), capped at `max_backoff`.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        (self.base_backoff * attempt).min(self.max_backoff)
    }
}

/// Build a tonic `Endpoint` with timeouts and HTTP/2 keepalive.
fn build_endpoint(cfg: &ClientConfig) -> Result<Endpoint, tonic::transport::Error> {
    let endpoint = Endpoint::from_shared(cfg.base_url().to_owned())?
        .connect_timeout(cfg.connect_timeout())
        .timeout(cfg.rpc_timeout())
        .tcp_keepalive(Some(Duration::from_secs(30)))
        .http2_keep_alive_interval(Duration::from_secs(30))
        .keep_alive_timeout(Duration::from_secs(10))
        .keep_alive_while_idle(true);

    Ok(endpoint)
}

/// Connect once, inside a tracing span.
///
/// # Errors
/// Returns the transport error if the URL is invalid or the connection fails.
pub async fn connect(cfg: &ClientConfig) -> Result<Channel, tonic::transport::Error> {
    let span = tracing::debug_span!("grpc_connect", uri = %cfg.base_url());

    async move {
        let channel = build_endpoint(cfg)?.connect().await?;
        tracing::info!(
            connect_timeout_ms = cfg.connect_timeout_ms,
            rpc_timeout_ms = cfg.rpc_timeout_ms,
            "gRPC client connected"
        );
        Ok(channel)
    }
    .instrument(span)
    .await
}

/// Connect with up to `max_retries` extra attempts.
///
/// # Errors
/// Returns the last transport error once all attempts are exhausted.
pub async fn connect_with_retry(cfg: &ClientConfig) -> Result<Channel, tonic::transport::Error> {
    let policy = RetryPolicy::from(cfg);
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        match connect(cfg).await {
            Ok(channel) => {
                if attempt > 1 {
                    tracing::info!(attempt, "gRPC connection established after retries");
                }
                return Ok(channel);
            }
            Err(e) if attempt <= policy.max_retries => {
                let backoff = policy.backoff(attempt);
                tracing::warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    error = %e,
                    backoff_ms = duration_to_u64_ms(backoff),
                    "gRPC connection failed, retrying..."
                );
                sleep(backoff).await;
            }
            Err(e) => {
                tracing::warn!(attempt, error = %e, "gRPC connection failed after all retries");
                return Err(e);
            }
        }
    }
}

/// Run a unary call, retrying transient failures with linear backoff.
///
/// # Errors
/// Returns the last `Status` if the call fails with a non-retryable code or
/// all attempts are exhausted.
pub async fn call_with_retry<F, Fut, Res>(
    policy: RetryPolicy,
    op_name: &'static str,
    call: F,
) -> Result<Res, Status>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Res, Status>>,
{
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        let span = tracing::debug_span!("grpc_call", op = op_name, attempt);
        let result = call().instrument(span).await;

        match result {
            Ok(res) => {
                if attempt > 1 {
                    tracing::info!(op = op_name, attempt, "gRPC call succeeded after retries");
                }
                return Ok(res);
            }
            Err(status) => {
                let code = status.code();
                let retryable = matches!(code, Code::Unavailable | Code::DeadlineExceeded);

                if !retryable || attempt > policy.max_retries {
                    tracing::debug!(op = op_name, attempt, code = ?code, "gRPC call giving up");
                    return Err(status);
                }

                let backoff = policy.backoff(attempt);
                tracing::debug!(
                    op = op_name,
                    attempt,
                    code = ?code,
                    backoff_ms = duration_to_u64_ms(backoff),
                    "Retrying gRPC call after backoff"
                );
                sleep(backoff).await;
            }
        }
    }
}
