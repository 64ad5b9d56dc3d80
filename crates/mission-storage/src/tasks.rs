//! Task list persisted as `{ "tasks": [...] }`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use mission_types::{NewTask, Task, TaskDocument, TaskPatch};

use crate::{JsonDocument, Result, StoreError};

pub struct TaskStore {
    document: JsonDocument<TaskDocument>,
}

impl TaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            document: JsonDocument::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.document.path()
    }

    /// Current document, or an empty one if the file is missing or unreadable.
    pub fn list(&self) -> TaskDocument {
        self.document.load_or_default()
    }

    pub fn create(&self, input: NewTask) -> Result<Task> {
        let missing = input.missing_fields();
        let Some(task) = input.into_task(Utc::now()) else {
            return Err(StoreError::missing_fields(&missing));
        };

        let mut doc = self.document.read()?.unwrap_or_default();
        doc.tasks.push(task.clone());
        self.persist(&doc)?;

        info!(task_id = task.id().unwrap_or_default(), "Created task");
        Ok(task)
    }

    pub fn update(&self, id: &str, patch: TaskPatch) -> Result<Task> {
        let mut doc = self.document.read()?.unwrap_or_default();
        let task = doc
            .tasks
            .iter_mut()
            .find(|t| t.id() == Some(id))
            .ok_or_else(|| StoreError::NotFound(format!("Task not found: {id}")))?;
        task.apply_patch(patch, Utc::now());
        let task = task.clone();
        self.persist(&doc)?;

        info!(
            task_id = %id,
            status = task.status().unwrap_or_default(),
            "Updated task"
        );
        Ok(task)
    }

    pub fn delete(&self, id: &str) -> Result<String> {
        let mut doc = self.document.read()?.unwrap_or_default();
        let before = doc.tasks.len();
        doc.tasks.retain(|t| t.id() != Some(id));
        if doc.tasks.len() == before {
            return Err(StoreError::NotFound(format!("Task not found: {id}")));
        }
        self.persist(&doc)?;

        info!(task_id = %id, "Deleted task");
        Ok(id.to_string())
    }

    fn persist(&self, doc: &TaskDocument) -> Result<()> {
        if self.document.save(doc) {
            Ok(())
        } else {
            Err(StoreError::Persistence(self.path().to_path_buf()))
        }
    }
}
