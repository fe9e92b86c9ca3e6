#![allow(dead_code)]

use bytes::Bytes;
use calculator::{CorsConfig, ServerConfig};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A calculator server on an ephemeral localhost port, stopped on drop.
pub struct TestServer {
    pub base_url: String,
    cancel: CancellationToken,
    handle: Option<JoinHandle<anyhow::Result<()>>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with_cors(CorsConfig::default()).await
    }

    pub async fn start_with_cors(cors: CorsConfig) -> Self {
        let cfg = ServerConfig {
            listen_addr: "127.0.0.1:0".to_owned(),
        };
        let listener = calculator::bind(&cfg).await.unwrap();
        let addr = listener.local_addr().unwrap();

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            calculator::serve_with_listener(listener, &cors, token).await
        });

        Self {
            base_url: format!("http://{addr}"),
            cancel,
            handle: Some(handle),
        }
    }

    /// Cancel and wait for the server task to finish.
    pub async fn shutdown(mut self) -> anyhow::Result<()> {
        self.cancel.cancel();
        match self.handle.take() {
            Some(handle) => handle.await?,
            None => Ok(()),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Send a raw HTTP/1.1 request and collect the response.
pub async fn send(request: http::Request<Full<Bytes>>) -> (http::response::Parts, Bytes) {
    let client: Client<HttpConnector, Full<Bytes>> =
        Client::builder(TokioExecutor::new()).build(HttpConnector::new());
    let response = client.request(request).await.unwrap();
    let (parts, body) = response.into_parts();
    let body = body.collect().await.unwrap().to_bytes();
    (parts, body)
}

/// A port nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
