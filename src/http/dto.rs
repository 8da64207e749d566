//! JSON request and response bodies.
//!
//! The response types derive `Deserialize` as well so the client decodes
//! exactly what the server encodes.

use serde::{Deserialize, Serialize};

use crate::task::domain::{
    DUE_DATE_FORMAT, SchemaLayout, SchemaReport, TaskDraft, TaskPriority, TaskRecord, TaskStatus,
};

// =============================================================================
// Requests
// =============================================================================

/// Body of create and update requests.
///
/// Field names written by the first client release (`Titre`, `Statut`,
/// `DateLimite`, `Priorite`) are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    /// Task title; required and non-blank.
    #[serde(default, alias = "Titre")]
    pub title: String,
    /// Optional description.
    #[serde(default, alias = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional status, defaults to `pending`.
    #[serde(default, alias = "Statut", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Optional `YYYY-MM-DD` due date.
    #[serde(default, alias = "DateLimite", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Optional priority, defaults to `medium`.
    #[serde(default, alias = "Priorite", skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
}

impl From<TaskRequest> for TaskDraft {
    fn from(request: TaskRequest) -> Self {
        let TaskRequest {
            title,
            description,
            status,
            due_date,
            priority,
        } = request;

        let mut draft = Self::new(title);
        if let Some(description) = description {
            draft = draft.with_description(description);
        }
        if let Some(status) = status {
            draft = draft.with_status(status);
        }
        if let Some(due_date) = due_date {
            draft = draft.with_due_date(due_date);
        }
        if let Some(priority) = priority {
            draft = draft.with_priority(priority);
        }
        draft
    }
}

// =============================================================================
// Responses
// =============================================================================

/// A task as exposed over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    /// Store-assigned identifier.
    pub id: i64,
    /// Title.
    pub title: String,
    /// Description, possibly empty.
    pub description: String,
    /// Status.
    pub status: TaskStatus,
    /// `YYYY-MM-DD` due date, if any.
    pub due_date: Option<String>,
    /// Priority.
    pub priority: TaskPriority,
    /// Owning principal id.
    pub owner_key: String,
}

impl From<&TaskRecord> for TaskResponse {
    fn from(task: &TaskRecord) -> Self {
        Self {
            id: task.id().value(),
            title: task.title().as_str().to_owned(),
            description: task.description().to_owned(),
            status: task.status(),
            due_date: task
                .due_date()
                .map(|date| date.format(DUE_DATE_FORMAT).to_string()),
            priority: task.priority(),
            owner_key: task.owner().as_str().to_owned(),
        }
    }
}

/// Response carrying only a confirmation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable outcome.
    pub message: String,
}

impl MessageResponse {
    /// Creates a message response.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response carrying a message and a payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataResponse<T> {
    /// Human-readable outcome.
    pub message: String,
    /// Payload.
    pub data: T,
}

impl<T> DataResponse<T> {
    /// Creates a data response.
    #[must_use]
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

/// Response to the owner listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskListResponse {
    /// Always `success`.
    pub message: String,
    /// The owner's tasks, undated last.
    pub data: Vec<TaskResponse>,
    /// Owner the list was scoped to.
    pub owner: String,
    /// Number of tasks returned.
    pub count: usize,
}

/// Response to the schema diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaResponse {
    /// Human-readable outcome.
    pub message: String,
    /// Detected layout, absent when unrecognized.
    pub layout: Option<String>,
    /// Column names in table order.
    pub column_names: Vec<String>,
    /// Whether the legacy owner column exists.
    pub has_responsable: bool,
    /// Whether the current owner column exists.
    pub has_user_id: bool,
    /// Whether the owner email column exists.
    pub has_user_email: bool,
}

impl From<SchemaReport> for SchemaResponse {
    fn from(report: SchemaReport) -> Self {
        Self {
            message: "Schema diagnostic complete".to_owned(),
            layout: report.layout.map(|layout| layout.as_str().to_owned()),
            has_responsable: report.has_column(SchemaLayout::LEGACY_OWNER_COLUMN),
            has_user_id: report.has_column(SchemaLayout::CURRENT_OWNER_COLUMN),
            has_user_email: report.has_column(SchemaLayout::CURRENT_OWNER_EMAIL_COLUMN),
            column_names: report.columns,
        }
    }
}

/// Response for `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok`.
    pub status: String,
    /// Crate version.
    pub version: String,
}

/// Response for `GET /`: the service name and its routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexResponse {
    /// Greeting.
    pub message: String,
    /// Routes served by the API.
    pub endpoints: Vec<EndpointDescription>,
}

/// One entry of the route index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescription {
    /// HTTP method and path template.
    pub route: String,
    /// What the route does.
    pub description: String,
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Summary of the failure.
    pub error: String,
    /// Extra context, such as the available columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
