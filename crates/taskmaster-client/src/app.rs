//! The assembled task board.
//!
//! Owns one of each view and enforces the page's refresh contract: any
//! confirmed mutation re-fetches both lists, so the two panels never
//! disagree about which side of the completed divider a task is on.

use taskmaster_core::Task;

use crate::api::ApiClient;
use crate::views::{ActiveTaskList, CompletedTaskList, TaskForm};

/// One creation form, one active panel, one completed panel.
#[derive(Debug, Default)]
pub struct TaskBoard {
    pub form: TaskForm,
    pub active: ActiveTaskList,
    pub completed: CompletedTaskList,
}

impl TaskBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch both lists.
    pub async fn refresh(&mut self, api: &ApiClient) {
        self.active.refresh(api).await;
        self.completed.refresh(api).await;
    }

    /// Submit the form. A created task refreshes both lists; a rejected
    /// or failed submit leaves them as they were.
    pub async fn submit_form(&mut self, api: &ApiClient) -> Option<Task> {
        let created = self.form.submit(api).await;
        if created.is_some() {
            self.refresh(api).await;
        }
        created
    }

    /// Complete one active task. Server confirmation refreshes both
    /// lists, which is what moves the row across panels.
    pub async fn complete_task(&mut self, api: &ApiClient, id: i64) -> bool {
        let confirmed = self.active.complete(api, id).await;
        if confirmed {
            self.refresh(api).await;
        }
        confirmed
    }

    /// All three panels as one text page.
    pub fn render(&self) -> String {
        format!(
            "{}\n\n{}\n\n{}",
            self.form.render(),
            self.active.render(),
            self.completed.render()
        )
    }
}

// ───── Tests ─────
