//! Owner-scoped task operations with input validation and error shaping.

use crate::task::{
    domain::{
        OwnerKey, SchemaReport, TaskDomainError, TaskDraft, TaskFields, TaskId, TaskRecord,
        UnrecognizedSchema,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use std::sync::Arc;
use thiserror::Error;

/// Service-level errors, one variant per outcome a caller has to handle.
#[derive(Debug, Clone, Error)]
pub enum TaskServiceError {
    /// Caller input was rejected.
    #[error(transparent)]
    Validation(#[from] TaskDomainError),

    /// No task with this identifier belongs to the caller.
    #[error("task {0} not found")]
    NotFound(TaskId),

    /// The task table layout is not recognized; an operator has to step in.
    #[error(transparent)]
    Configuration(UnrecognizedSchema),

    /// The store failed while serving the request.
    #[error("task store failure: {0}")]
    Store(Arc<dyn std::error::Error + Send + Sync>),
}

impl From<TaskRepositoryError> for TaskServiceError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound(id) => Self::NotFound(id),
            TaskRepositoryError::UnrecognizedSchema(schema) => Self::Configuration(schema),
            TaskRepositoryError::Persistence(source) => Self::Store(source),
        }
    }
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Task operations exposed to the HTTP layer.
///
/// Every call validates the raw owner identifier before the repository is
/// consulted.
pub struct TaskService<R>
where
    R: TaskRepository + ?Sized,
{
    repository: Arc<R>,
}

impl<R> Clone for TaskService<R>
where
    R: TaskRepository + ?Sized,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R> TaskService<R>
where
    R: TaskRepository + ?Sized,
{
    /// Creates a service over the given repository.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Lists the owner's tasks, undated tasks last.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Validation`] for a blank owner, or the
    /// repository failure otherwise. An owner without tasks is not an error.
    pub async fn list(&self, owner: &str) -> TaskServiceResult<Vec<TaskRecord>> {
        let owner = OwnerKey::new(owner)?;
        let tasks = self
            .repository
            .list_for_owner(&owner)
            .await
            .map_err(|err| log_failure("list", &owner, err))?;
        tracing::debug!(%owner, count = tasks.len(), "listed tasks");
        Ok(tasks)
    }

    /// Returns one of the owner's tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the task is missing or
    /// belongs to another owner.
    pub async fn get(&self, owner: &str, id: TaskId) -> TaskServiceResult<TaskRecord> {
        let owner = OwnerKey::new(owner)?;
        Ok(self
            .repository
            .get_for_owner(&owner, id)
            .await
            .map_err(|err| log_failure("get", &owner, err))?)
    }

    /// Validates the draft and stores it as a new task for the owner.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Validation`] for a blank owner or title or
    /// an unparseable field; nothing is written in that case.
    pub async fn create(&self, owner: &str, draft: TaskDraft) -> TaskServiceResult<TaskRecord> {
        let owner = OwnerKey::new(owner)?;
        let fields = TaskFields::from_draft(draft)?;
        let task = self
            .repository
            .create_for_owner(&owner, &fields)
            .await
            .map_err(|err| log_failure("create", &owner, err))?;
        tracing::info!(%owner, task_id = %task.id(), "created task");
        Ok(task)
    }

    /// Replaces every mutable field of one of the owner's tasks.
    ///
    /// Returns the task as stored after the update.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Validation`] for invalid input and
    /// [`TaskServiceError::NotFound`] when the task is not the owner's.
    pub async fn update(
        &self,
        owner: &str,
        id: TaskId,
        draft: TaskDraft,
    ) -> TaskServiceResult<TaskRecord> {
        let owner = OwnerKey::new(owner)?;
        let fields = TaskFields::from_draft(draft)?;
        self.repository
            .update_for_owner(&owner, id, &fields)
            .await
            .map_err(|err| log_failure("update", &owner, err))?;
        tracing::info!(%owner, task_id = %id, "updated task");
        Ok(TaskRecord::new(id, owner, fields))
    }

    /// Deletes one of the owner's tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the task is not the
    /// owner's.
    pub async fn delete(&self, owner: &str, id: TaskId) -> TaskServiceResult<()> {
        let owner = OwnerKey::new(owner)?;
        self.repository
            .delete_for_owner(&owner, id)
            .await
            .map_err(|err| log_failure("delete", &owner, err))?;
        tracing::info!(%owner, task_id = %id, "deleted task");
        Ok(())
    }

    /// Flips a task between completed and pending.
    ///
    /// The read and the write are separate statements; a concurrent update
    /// in between is overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the task is not the
    /// owner's.
    pub async fn toggle_status(&self, owner: &str, id: TaskId) -> TaskServiceResult<TaskRecord> {
        let owner = OwnerKey::new(owner)?;
        let current = self
            .repository
            .get_for_owner(&owner, id)
            .await
            .map_err(|err| log_failure("toggle", &owner, err))?;
        let status = current.status().toggled();
        let fields = current.fields().clone().with_status(status);
        self.repository
            .update_for_owner(&owner, id, &fields)
            .await
            .map_err(|err| log_failure("toggle", &owner, err))?;
        tracing::info!(%owner, task_id = %id, status = status.as_str(), "toggled task status");
        Ok(current.with_fields(fields))
    }

    /// Describes the task table for diagnostics.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Store`] when introspection fails.
    pub async fn inspect_schema(&self) -> TaskServiceResult<SchemaReport> {
        Ok(self.repository.inspect_schema().await?)
    }
}

fn log_failure(operation: &str, owner: &OwnerKey, err: TaskRepositoryError) -> TaskServiceError {
    match &err {
        TaskRepositoryError::NotFound(id) => {
            tracing::debug!(operation, %owner, task_id = %id, "task not found for owner");
        }
        TaskRepositoryError::UnrecognizedSchema(schema) => {
            tracing::error!(
                operation,
                columns = %schema.columns_list(),
                "task table layout not recognized"
            );
        }
        TaskRepositoryError::Persistence(source) => {
            tracing::error!(operation, %owner, error = %source, "task store failure");
        }
    }
    err.into()
}
