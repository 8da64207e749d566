//! Diesel row models for task persistence.

use super::schema::{current_items, legacy_items};
use crate::task::{
    domain::{
        DUE_DATE_FORMAT, OwnerKey, TaskFields, TaskId, TaskPriority, TaskRecord, TaskStatus,
        TaskTitle, parse_due_date,
    },
    ports::{TaskRepositoryError, TaskRepositoryResult},
};
use diesel::prelude::*;

/// Query result row shared by both layouts.
///
/// Field order matches the column tuples selected by the repository.
#[derive(Debug, Clone, Queryable)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TaskRow {
    /// Store-assigned identifier.
    pub item_id: i64,
    /// Title.
    pub title: String,
    /// Description, `NULL` on some legacy rows.
    pub description: Option<String>,
    /// Status string.
    pub status: String,
    /// Due date string.
    pub due_date: Option<String>,
    /// Priority string.
    pub priority: String,
    /// Owner key from whichever column the layout uses.
    pub owner: String,
}

/// Insert model for the legacy layout.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = legacy_items)]
pub struct NewLegacyTaskRow {
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Status string.
    pub status: String,
    /// Due date string.
    pub due_date: Option<String>,
    /// Priority string.
    pub priority: String,
    /// Owner key.
    pub owner: String,
}

/// Insert model for the current layout.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = current_items)]
pub struct NewCurrentTaskRow {
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Status string.
    pub status: String,
    /// Due date string.
    pub due_date: Option<String>,
    /// Priority string.
    pub priority: String,
    /// Owner key.
    pub owner: String,
    /// Owner key again, for readers of the email column.
    pub owner_email: Option<String>,
}

/// Column values written for a task's mutable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValues {
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Status string.
    pub status: String,
    /// Due date string.
    pub due_date: Option<String>,
    /// Priority string.
    pub priority: String,
}

impl From<&TaskFields> for FieldValues {
    fn from(fields: &TaskFields) -> Self {
        Self {
            title: fields.title().as_str().to_owned(),
            description: fields.description().to_owned(),
            status: fields.status().as_str().to_owned(),
            due_date: fields
                .due_date()
                .map(|date| date.format(DUE_DATE_FORMAT).to_string()),
            priority: fields.priority().as_str().to_owned(),
        }
    }
}

impl NewLegacyTaskRow {
    /// Builds an insert row for the legacy layout.
    #[must_use]
    pub fn new(owner: &OwnerKey, values: FieldValues) -> Self {
        Self {
            title: values.title,
            description: Some(values.description),
            status: values.status,
            due_date: values.due_date,
            priority: values.priority,
            owner: owner.as_str().to_owned(),
        }
    }
}

impl NewCurrentTaskRow {
    /// Builds an insert row for the current layout.
    ///
    /// The owner key is written to both owner columns.
    #[must_use]
    pub fn new(owner: &OwnerKey, values: FieldValues) -> Self {
        Self {
            title: values.title,
            description: Some(values.description),
            status: values.status,
            due_date: values.due_date,
            priority: values.priority,
            owner: owner.as_str().to_owned(),
            owner_email: Some(owner.as_str().to_owned()),
        }
    }
}

/// Converts a stored row into a domain record.
///
/// # Errors
///
/// Returns [`TaskRepositoryError::Persistence`] when the row holds values the
/// domain rejects, such as an unknown status.
pub fn row_to_task(row: TaskRow) -> TaskRepositoryResult<TaskRecord> {
    let TaskRow {
        item_id,
        title,
        description,
        status,
        due_date,
        priority,
        owner,
    } = row;

    let title = TaskTitle::new(title).map_err(TaskRepositoryError::persistence)?;
    let status = TaskStatus::try_from(status.as_str()).map_err(TaskRepositoryError::persistence)?;
    let priority =
        TaskPriority::try_from(priority.as_str()).map_err(TaskRepositoryError::persistence)?;
    let due_date = match due_date {
        Some(raw) => parse_due_date(&raw).map_err(TaskRepositoryError::persistence)?,
        None => None,
    };
    let owner = OwnerKey::new(owner).map_err(TaskRepositoryError::persistence)?;

    let fields = TaskFields::new(title)
        .with_description(description.unwrap_or_default())
        .with_status(status)
        .with_priority(priority)
        .with_due_date(due_date);
    Ok(TaskRecord::new(TaskId::new(item_id), owner, fields))
}
