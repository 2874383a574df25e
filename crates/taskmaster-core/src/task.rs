//! Task domain model and creation-time validation.
//!
//! Validation lives here rather than in the HTTP layer so the server
//! (request boundary) and the client (form submit) reject the same input
//! with the same messages.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of tasks returned by the active list.
pub const ACTIVE_LIMIT: u32 = 5;

/// Maximum number of tasks returned by the completed list.
pub const COMPLETED_LIMIT: u32 = 10;

/// Maximum title length in characters, counted after trimming.
pub const TITLE_MAX_CHARS: usize = 255;

/// A persisted task row.
///
/// `description` is nullable end-to-end: absent input is stored as NULL
/// and serialized as JSON `null`, never as an empty string. `created_at`
/// is an RFC 3339 UTC string assigned by the store at insert time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: String,
}

/// Validated, normalized parameters for creating a task.
///
/// Only constructed through [`NewTask::parse`], so holding one means the
/// title is trimmed, non-empty, and within the length limit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
}

/// Rejected task input. The `Display` strings are the user-facing
/// messages returned on the wire and shown inline by the form.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Title is required")]
    TitleRequired,

    #[error("Title must be 255 characters or less")]
    TitleTooLong,
}

impl NewTask {
    /// Trim and validate raw form or request input.
    ///
    /// The title must be non-empty after trimming and at most
    /// [`TITLE_MAX_CHARS`] characters. A description that is empty after
    /// trimming is normalized to `None` so it persists as NULL rather
    /// than as an empty string.
    pub fn parse(title: Option<&str>, description: Option<&str>) -> Result<Self, ValidationError> {
        let title = title.unwrap_or_default().trim();
        if title.is_empty() {
            return Err(ValidationError::TitleRequired);
        }
        if title.chars().count() > TITLE_MAX_CHARS {
            return Err(ValidationError::TitleTooLong);
        }
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        Ok(Self {
            title: title.to_string(),
            description,
        })
    }
}

/// Current UTC time as an RFC 3339 string with millisecond precision
/// (e.g. `2026-08-25T14:03:07.412Z`).
///
/// The fixed-width format keeps lexicographic order chronological, which
/// the store relies on for newest-first listing.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
