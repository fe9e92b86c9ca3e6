//! Domain layer for calculator

mod service;
pub use service::Service;
