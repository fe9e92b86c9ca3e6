//! gRPC-Web implementation of [`CalculatorClient`] over plain HTTP.
//!
//! Speaks the same protocol a browser runtime uses, so it exercises the
//! server's browser-compatible binding end to end.

use async_trait::async_trait;
use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tracing::instrument;

use crate::api::{CalculatorClient, Fault};
use crate::client::{error_chain, reply_value};
use crate::config::ClientConfig;
use crate::operation::Operation;
use crate::proto::{CalculateReply, CalculateRequest};
use crate::web::codec::{GRPC_STATUS_HEADER, decode_response, encode_message};

const USER_AGENT: &str = concat!("calculator-sdk/", env!("CARGO_PKG_VERSION"), " grpc-web");

type HttpClient = Client<HttpConnector, Full<Bytes>>;

/// gRPC-Web client for the calculator service.
pub struct CalculatorWebClient {
    config: ClientConfig,
    http: HttpClient,
}

impl CalculatorWebClient {
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(config.connect_timeout()));
        connector.set_nodelay(true);

        let http = Client::builder(TokioExecutor::new()).build(connector);
        Self { config, http }
    }

    async fn exchange(
        &self,
        op: Operation,
        body: Bytes,
    ) -> Result<(http::response::Parts, Bytes), Fault> {
        let mode = self.config.web_mode;
        let uri = format!("{}{}", self.config.base_url(), op.path());

        let request = http::Request::post(&uri)
            .header(CONTENT_TYPE, mode.content_type())
            .header(ACCEPT, mode.content_type())
            .header("x-grpc-web", "1")
            .header("x-user-agent", USER_AGENT)
            .body(Full::new(body))
            .map_err(|e| Fault::unavailable(format!("invalid request to {uri}: {e}")))?;

        let response = self.http.request(request).await.map_err(|e| {
            Fault::unavailable(format!(
                "Failed to reach calculator service at {}: {}",
                self.config.base_url(),
                error_chain(&e)
            ))
        })?;

        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| Fault::unavailable(format!("failed to read response body: {e}")))?
            .to_bytes();
        Ok((parts, body))
    }
}

#[async_trait]
impl CalculatorClient for CalculatorWebClient {
    #[instrument(skip(self), fields(transport = "grpc-web"))]
    async fn calculate(&self, op: Operation, a: f64, b: f64) -> Result<f64, Fault> {
        let request = CalculateRequest {
            operand1: Some(a),
            operand2: Some(b),
        };
        let body = encode_message(&request, self.config.web_mode)
            .map_err(|e| Fault::malformed(e.to_string()))?;

        let timeout = self.config.rpc_timeout();
        let (parts, body) = tokio::time::timeout(timeout, self.exchange(op, body))
            .await
            .map_err(|_| {
                Fault::unavailable(format!(
                    "request timed out after {} ms",
                    self.config.rpc_timeout_ms
                ))
            })??;

        if !parts.status.is_success() && !parts.headers.contains_key(GRPC_STATUS_HEADER) {
            let status = parts.status;
            return Err(Fault::unavailable(format!("HTTP error! status: {status}")));
        }

        let reply: CalculateReply = decode_response(&parts.headers, &body)
            .map_err(|e| Fault::unavailable(format!("malformed response: {e}")))?
            .map_err(|status| Fault::from_status(&status))?;

        reply_value(&reply)
    }
}
