//! Repository port for owner-scoped task persistence.

use crate::task::domain::{
    OwnerKey, SchemaReport, TaskFields, TaskId, TaskRecord, UnrecognizedSchema,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Owner-scoped task persistence contract.
///
/// Every operation filters on the owner key. A row owned by somebody else is
/// reported exactly like a row that does not exist.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Returns the owner's tasks ordered by due date, undated tasks last.
    ///
    /// An owner without tasks gets an empty vector.
    async fn list_for_owner(&self, owner: &OwnerKey) -> TaskRepositoryResult<Vec<TaskRecord>>;

    /// Returns one of the owner's tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when no row matches both the
    /// identifier and the owner.
    async fn get_for_owner(&self, owner: &OwnerKey, id: TaskId)
    -> TaskRepositoryResult<TaskRecord>;

    /// Stores a new task for the owner and returns it with its assigned id.
    async fn create_for_owner(
        &self,
        owner: &OwnerKey,
        fields: &TaskFields,
    ) -> TaskRepositoryResult<TaskRecord>;

    /// Overwrites every mutable field of one of the owner's tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when no row matches both the
    /// identifier and the owner.
    async fn update_for_owner(
        &self,
        owner: &OwnerKey,
        id: TaskId,
        fields: &TaskFields,
    ) -> TaskRepositoryResult<()>;

    /// Deletes one of the owner's tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when no row matches both the
    /// identifier and the owner.
    async fn delete_for_owner(&self, owner: &OwnerKey, id: TaskId) -> TaskRepositoryResult<()>;

    /// Describes the underlying table for diagnostics.
    async fn inspect_schema(&self) -> TaskRepositoryResult<SchemaReport>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// No task with this identifier belongs to the requesting owner.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The task table exposes neither recognized owner column.
    #[error(transparent)]
    UnrecognizedSchema(#[from] UnrecognizedSchema),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
