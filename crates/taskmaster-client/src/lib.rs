//! # taskmaster-client
//!
//! The consumer side of the task API: a typed `reqwest` wrapper plus the
//! stateful form/list views that a frontend renders. Views own their
//! loading/error state and re-fetch through [`ApiClient`]; the
//! [`app::TaskBoard`] facade wires them together the way the web page does.

#![deny(unsafe_code)]

pub mod api;
pub mod app;
pub mod views;

pub use api::{ApiClient, ClientError, DEFAULT_BASE_URL};
pub use app::TaskBoard;
pub use views::{ActiveTaskList, CompletedTaskList, ListState, TaskForm};
