//! Stateful form and list views over the task API.
//!
//! Each view owns exactly the state its panel needs: the rows it last
//! fetched, and the message to show when something failed. Mutating
//! methods go through [`ApiClient`]; `render` produces a plain-text
//! block for the terminal frontend.

use std::fmt::Write;

use taskmaster_core::{NewTask, Task};

use crate::api::ApiClient;

/// Fetch lifecycle for a task list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListState {
    /// No fetch has completed yet.
    Loading,
    /// Last fetch succeeded, possibly with zero rows.
    Loaded(Vec<Task>),
    /// Last fetch failed. The message is user-facing.
    Failed(String),
}

// ───── Creation form ─────

/// The task creation form: title and description fields plus an inline
/// error slot.
#[derive(Debug, Default)]
pub struct TaskForm {
    title: String,
    description: String,
    error: Option<String>,
}

impl TaskForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the title field, exactly as typed.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Replace the description field, exactly as typed.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Inline error from the last submit attempt, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Validate and submit. On success both fields clear and the created
    /// task is returned; on failure the input stays put so the user can
    /// correct it and resubmit.
    ///
    /// Validation runs locally first, with the same rules and messages
    /// the server applies, so an empty or overlong title never leaves
    /// the client.
    pub async fn submit(&mut self, api: &ApiClient) -> Option<Task> {
        self.error = None;

        let new = match NewTask::parse(Some(&self.title), Some(&self.description)) {
            Ok(new) => new,
            Err(e) => {
                self.error = Some(e.to_string());
                return None;
            }
        };

        match api.create_task(&new.title, new.description.as_deref()).await {
            Ok(task) => {
                self.title.clear();
                self.description.clear();
                Some(task)
            }
            Err(e) => {
                tracing::warn!(error = %e, "task creation failed");
                self.error = Some("Failed to create task. Please try again.".to_string());
                None
            }
        }
    }

    pub fn render(&self) -> String {
        let mut output = String::new();
        let _ = write!(output, "New Task");
        if let Some(error) = &self.error {
            let _ = write!(output, "\n  ! {error}");
        }
        let _ = write!(output, "\n  Title: {}", self.title);
        let _ = write!(output, "\n  Description: {}", self.description);
        output
    }
}

// ───── Active list ─────

/// The incomplete-task list, with its per-item complete action.
#[derive(Debug)]
pub struct ActiveTaskList {
    state: ListState,
    /// Inline failure for one item's complete action, keyed by task id.
    /// Cleared on the next refresh or complete attempt.
    item_error: Option<(i64, String)>,
}

impl ActiveTaskList {
    pub fn new() -> Self {
        Self {
            state: ListState::Loading,
            item_error: None,
        }
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    /// Rows currently rendered, newest first. Empty while loading or
    /// after a failed fetch.
    pub fn tasks(&self) -> &[Task] {
        match &self.state {
            ListState::Loaded(tasks) => tasks,
            ListState::Loading | ListState::Failed(_) => &[],
        }
    }

    /// Re-fetch from the server, replacing whatever was shown before.
    pub async fn refresh(&mut self, api: &ApiClient) {
        self.state = ListState::Loading;
        self.item_error = None;
        self.state = match api.active_tasks().await {
            Ok(tasks) => ListState::Loaded(tasks),
            Err(e) => {
                tracing::warn!(error = %e, "active list fetch failed");
                ListState::Failed("Failed to load tasks. Please try again.".to_string())
            }
        };
    }

    /// Mark one rendered task complete. Returns true when the server
    /// confirmed it, so the caller knows to refresh dependent views. On
    /// failure the row stays in place with an inline error; ids not in
    /// the current list are ignored.
    pub async fn complete(&mut self, api: &ApiClient, id: i64) -> bool {
        if !self.tasks().iter().any(|t| t.id == id) {
            return false;
        }
        self.item_error = None;

        match api.complete_task(id).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, id, "task completion failed");
                self.item_error =
                    Some((id, "Failed to complete task. Please try again.".to_string()));
                false
            }
        }
    }

    pub fn render(&self) -> String {
        let mut output = String::new();
        let _ = write!(output, "Active Tasks");
        match &self.state {
            ListState::Loading => {
                let _ = write!(output, "\n  Loading your tasks...");
            }
            ListState::Failed(message) => {
                let _ = write!(output, "\n  ! {message}");
            }
            ListState::Loaded(tasks) if tasks.is_empty() => {
                let _ = write!(output, "\n  No tasks yet. Create your first task to get started.");
            }
            ListState::Loaded(tasks) => {
                for task in tasks {
                    let _ = write!(output, "\n  [ ] #{} {}", task.id, task.title);
                    if let Some(description) = &task.description {
                        let _ = write!(output, "\n      {description}");
                    }
                    let _ = write!(output, "\n      created {}", task.created_at);
                    if let Some((id, message)) = &self.item_error {
                        if *id == task.id {
                            let _ = write!(output, "\n      ! {message}");
                        }
                    }
                }
            }
        }
        output
    }
}

impl Default for ActiveTaskList {
    fn default() -> Self {
        Self::new()
    }
}

// ───── Completed list ─────

/// Read-only list of recently completed tasks.
#[derive(Debug)]
pub struct CompletedTaskList {
    state: ListState,
}

impl CompletedTaskList {
    pub fn new() -> Self {
        Self {
            state: ListState::Loading,
        }
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn tasks(&self) -> &[Task] {
        match &self.state {
            ListState::Loaded(tasks) => tasks,
            ListState::Loading | ListState::Failed(_) => &[],
        }
    }

    /// Re-fetch. This panel surfaces the underlying error message rather
    /// than a canned one.
    pub async fn refresh(&mut self, api: &ApiClient) {
        self.state = ListState::Loading;
        self.state = match api.completed_tasks().await {
            Ok(tasks) => ListState::Loaded(tasks),
            Err(e) => {
                tracing::warn!(error = %e, "completed list fetch failed");
                ListState::Failed(e.to_string())
            }
        };
    }

    pub fn render(&self) -> String {
        let mut output = String::new();
        let _ = write!(output, "Completed Tasks");
        match &self.state {
            ListState::Loading => {
                let _ = write!(output, "\n  Loading achievements...");
            }
            ListState::Failed(message) => {
                let _ = write!(output, "\n  ! {message}");
            }
            ListState::Loaded(tasks) if tasks.is_empty() => {
                let _ = write!(output, "\n  No achievements yet. Complete some tasks to see them here.");
            }
            ListState::Loaded(tasks) => {
                for task in tasks {
                    let _ = write!(output, "\n  [x] #{} {}", task.id, task.title);
                    if let Some(description) = &task.description {
                        let _ = write!(output, "\n      {description}");
                    }
                    let _ = write!(output, "\n      created {}", task.created_at);
                }
            }
        }
        output
    }
}

impl Default for CompletedTaskList {
    fn default() -> Self {
        Self::new()
    }
}

// ───── Tests ─────
