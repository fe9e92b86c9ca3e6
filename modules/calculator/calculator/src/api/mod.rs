pub mod grpc;
pub mod web;
