//! # taskmaster-server
//!
//! Axum HTTP API over the task store: four task endpoints, a liveness
//! endpoint, and the fallback/panic plumbing that keeps every failure
//! response a `{"error": ...}` JSON object.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod server;

pub use config::ServerConfig;
pub use error::ApiError;
pub use server::{build_router, start, AppState, ServerHandle};
