//! In-memory repository for task tests and local runs.

use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{OwnerKey, SchemaLayout, SchemaReport, TaskFields, TaskId, TaskRecord},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Column set the in-memory store reports, mirroring the current layout.
const REPORTED_COLUMNS: [&str; 8] = [
    "ItemId",
    "Titre",
    "Description",
    "Statut",
    "DateLimite",
    "Priorite",
    SchemaLayout::CURRENT_OWNER_COLUMN,
    SchemaLayout::CURRENT_OWNER_EMAIL_COLUMN,
];

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: BTreeMap<TaskId, TaskRecord>,
    last_id: i64,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

/// Orders by due date ascending with undated tasks last, then by id.
fn by_due_date(left: &TaskRecord, right: &TaskRecord) -> Ordering {
    let due = match (left.due_date(), right.due_date()) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    due.then_with(|| left.id().cmp(&right.id()))
}

fn owned_by<'a>(
    state: &'a mut InMemoryTaskState,
    owner: &OwnerKey,
    id: TaskId,
) -> TaskRepositoryResult<&'a mut TaskRecord> {
    state
        .tasks
        .get_mut(&id)
        .filter(|task| task.owner() == owner)
        .ok_or(TaskRepositoryError::NotFound(id))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn list_for_owner(&self, owner: &OwnerKey) -> TaskRepositoryResult<Vec<TaskRecord>> {
        let state = self.read()?;
        let mut tasks: Vec<TaskRecord> = state
            .tasks
            .values()
            .filter(|task| task.owner() == owner)
            .cloned()
            .collect();
        tasks.sort_by(by_due_date);
        Ok(tasks)
    }

    async fn get_for_owner(
        &self,
        owner: &OwnerKey,
        id: TaskId,
    ) -> TaskRepositoryResult<TaskRecord> {
        let state = self.read()?;
        state
            .tasks
            .get(&id)
            .filter(|task| task.owner() == owner)
            .cloned()
            .ok_or(TaskRepositoryError::NotFound(id))
    }

    async fn create_for_owner(
        &self,
        owner: &OwnerKey,
        fields: &TaskFields,
    ) -> TaskRepositoryResult<TaskRecord> {
        let mut state = self.write()?;
        state.last_id += 1;
        let id = TaskId::new(state.last_id);
        let task = TaskRecord::new(id, owner.clone(), fields.clone());
        state.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn update_for_owner(
        &self,
        owner: &OwnerKey,
        id: TaskId,
        fields: &TaskFields,
    ) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        let task = owned_by(&mut state, owner, id)?;
        *task = task.clone().with_fields(fields.clone());
        Ok(())
    }

    async fn delete_for_owner(&self, owner: &OwnerKey, id: TaskId) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        owned_by(&mut state, owner, id)?;
        state.tasks.remove(&id);
        Ok(())
    }

    async fn inspect_schema(&self) -> TaskRepositoryResult<SchemaReport> {
        Ok(SchemaReport::from_columns(
            REPORTED_COLUMNS.iter().map(|&column| column.to_owned()).collect(),
        ))
    }
}
