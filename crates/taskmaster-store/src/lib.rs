//! # taskmaster-store
//!
//! `SQLite` persistence for the task tracker. One table, four operations:
//! create, list recent incomplete, list recent completed, mark complete.
//! Connections come from an `r2d2` pool with WAL mode enabled.

#![deny(unsafe_code)]

pub mod error;
pub mod pool;
pub mod schema;
pub mod tasks;

pub use error::StoreError;
pub use pool::{ConnectionConfig, ConnectionPool, PooledConnection};
pub use tasks::TaskStore;
