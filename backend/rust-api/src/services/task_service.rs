use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::models::{Task, User};
use crate::services::error::{require, PortalError};
use crate::services::portal_store::PortalStore;
use crate::storage::Update;
use crate::utils::time::{time_based_id, to_iso_millis};

const DEFAULT_DUE_IN_DAYS: i64 = 7;

pub struct TaskService {
    store: Arc<PortalStore>,
}

impl TaskService {
    pub fn new(store: Arc<PortalStore>) -> Self {
        Self { store }
    }

    /// New open task assigned to `user`, due one week from now.
    pub fn add_task(
        &self,
        user: &User,
        name: &str,
        project_id: Option<String>,
    ) -> Result<Task, PortalError> {
        require(name, "name")?;

        let task = Task {
            id: time_based_id("task"),
            name: name.trim().to_string(),
            completed: false,
            due_date: to_iso_millis(&(Utc::now() + Duration::days(DEFAULT_DUE_IN_DAYS))),
            assignee: Some(user.id.clone()),
            project_id: project_id.filter(|p| !p.is_empty()),
        };

        self.store.tasks().modify(|tasks| {
            tasks.push(task.clone());
            Update::Changed(())
        });
        tracing::debug!("Task {} added for {}", task.id, user.id);
        Ok(task)
    }

    pub fn toggle_task(&self, task_id: &str) -> Result<Task, PortalError> {
        self.store
            .tasks()
            .modify(|tasks| match tasks.iter_mut().find(|t| t.id == task_id) {
                Some(task) => {
                    task.completed = !task.completed;
                    Update::Changed(Some(task.clone()))
                }
                None => Update::Unchanged(None),
            })
            .ok_or_else(|| PortalError::not_found("task", task_id))
    }

    pub fn delete_task(&self, task_id: &str) -> Result<(), PortalError> {
        let removed = self.store.tasks().modify(|tasks| {
            let before = tasks.len();
            tasks.retain(|t| t.id != task_id);
            if tasks.len() == before {
                Update::Unchanged(false)
            } else {
                Update::Changed(true)
            }
        });
        if removed {
            Ok(())
        } else {
            Err(PortalError::not_found("task", task_id))
        }
    }

    pub fn list_tasks(&self, project_id: Option<&str>) -> Vec<Task> {
        self.store.tasks().read(|tasks| {
            tasks
                .iter()
                .filter(|t| project_id.is_none_or(|p| t.project_id.as_deref() == Some(p)))
                .cloned()
                .collect()
        })
    }
}
