//! # taskmaster-core
//!
//! Domain types shared by the task tracker's store, server, and client:
//! the `Task` row, creation-time validation, and the fixed list limits.

#![deny(unsafe_code)]

pub mod task;

pub use task::{NewTask, Task, ValidationError, ACTIVE_LIMIT, COMPLETED_LIMIT, TITLE_MAX_CHARS};
