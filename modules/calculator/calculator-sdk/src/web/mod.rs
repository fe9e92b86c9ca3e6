//! gRPC-Web binding: frame codec and an HTTP/1.1 client.

mod client;
pub mod codec;

pub use client::CalculatorWebClient;
pub use codec::{CodecError, GrpcWebMode};
